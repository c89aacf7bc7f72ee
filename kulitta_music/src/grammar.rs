// Harmonic grammar: Roman-numeral chord functions over musical parameters.
//
// Nonterminals are labeled with a scale-degree `ChordType` and carry
// `MusicParams` (duration, mode, key). Rules split a chord's duration among
// the chords that replace it, so a derivation's total duration never
// changes. The stock rule set is the classic Kulitta progression grammar:
//
//   I  -> V I   (0.3) | I I   (0.6) | I  (0.1)
//   V  -> IV V  (0.5) | V V   (0.4) | V  (0.1)
//   IV -> IV IV (0.8) | IV    (0.2)
//
// with every two-chord expansion halving the duration of both children.
//
// Rules can also be described as data (`RuleSpec`), which is how a
// `GenerationConfig` supplies its own grammar.

use kulitta_ptgg::{Rule, Symbol};
use serde::{Deserialize, Serialize};

/// Whole-note duration, the unit `MusicParams::dur` is measured in.
pub const WHOLE: f64 = 1.0;

/// Scale degree of a chord's root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordType {
    I,
    II,
    III,
    IV,
    V,
    VI,
    VII,
}

impl ChordType {
    pub const ALL: [ChordType; 7] = [
        ChordType::I,
        ChordType::II,
        ChordType::III,
        ChordType::IV,
        ChordType::V,
        ChordType::VI,
        ChordType::VII,
    ];

    /// Zero-based scale degree.
    pub fn degree(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Major,
    Minor,
}

impl Mode {
    /// Semitone offsets of the seven scale degrees from the tonic.
    pub fn scale(self) -> [i32; 7] {
        match self {
            Mode::Major => [0, 2, 4, 5, 7, 9, 11],
            Mode::Minor => [0, 2, 3, 5, 7, 8, 10],
        }
    }
}

/// Payload carried by every chord symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicParams {
    /// Duration in whole notes.
    pub dur: f64,
    pub mode: Mode,
    /// Tonic pitch class.
    pub key: i32,
    /// Start time in whole notes.
    pub onset: f64,
    /// Duration of the phrase this symbol was derived from.
    pub source_dur: f64,
}

impl Default for MusicParams {
    fn default() -> Self {
        MusicParams {
            dur: WHOLE,
            mode: Mode::Major,
            key: 0,
            onset: 0.0,
            source_dur: WHOLE,
        }
    }
}

impl MusicParams {
    /// Phrase-level parameters: `dur` whole notes in the given key and mode.
    pub fn phrase(dur: f64, mode: Mode, key: i32) -> Self {
        MusicParams {
            dur,
            mode,
            key,
            onset: 0.0,
            source_dur: dur,
        }
    }

    /// Same parameters with the duration multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        MusicParams {
            dur: self.dur * factor,
            ..*self
        }
    }
}

/// Halve the duration.
pub fn half(p: &MusicParams) -> MusicParams {
    p.scaled(0.5)
}

pub type MusicSymbol = Symbol<ChordType, MusicParams>;
pub type MusicRule = Rule<ChordType, MusicParams>;

/// A rule as data: `lhs --probability--> rhs`, where each right-hand chord
/// gets the parent's parameters with the duration scaled by its factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub probability: f64,
    pub lhs: ChordType,
    pub rhs: Vec<(ChordType, f64)>,
}

impl RuleSpec {
    pub fn new(probability: f64, lhs: ChordType, rhs: &[(ChordType, f64)]) -> Self {
        RuleSpec {
            probability,
            lhs,
            rhs: rhs.to_vec(),
        }
    }

    pub fn to_rule(&self) -> MusicRule {
        let rhs = self.rhs.clone();
        Rule::new(self.probability, self.lhs, move |p: &MusicParams| {
            rhs.iter()
                .map(|&(ctype, factor)| Symbol::nt(ctype, p.scaled(factor)))
                .collect()
        })
    }
}

/// The stock progression grammar as data.
pub fn stock_rule_specs() -> Vec<RuleSpec> {
    use ChordType::{I, IV, V};
    vec![
        RuleSpec::new(0.3, I, &[(V, 0.5), (I, 0.5)]),
        RuleSpec::new(0.6, I, &[(I, 0.5), (I, 0.5)]),
        RuleSpec::new(0.1, I, &[(I, 1.0)]),
        RuleSpec::new(0.5, V, &[(IV, 0.5), (V, 0.5)]),
        RuleSpec::new(0.4, V, &[(V, 0.5), (V, 0.5)]),
        RuleSpec::new(0.1, V, &[(V, 1.0)]),
        RuleSpec::new(0.8, IV, &[(IV, 0.5), (IV, 0.5)]),
        RuleSpec::new(0.2, IV, &[(IV, 1.0)]),
    ]
}

pub fn stock_rules() -> Vec<MusicRule> {
    stock_rule_specs().iter().map(RuleSpec::to_rule).collect()
}

/// Wrap every rule so a chord already shorter than `min_dur` rewrites to
/// itself instead of subdividing further.
pub fn min_duration_guard(rules: &[MusicRule], min_dur: f64) -> Vec<MusicRule> {
    rules
        .iter()
        .map(|rule| {
            let inner = rule.clone();
            let label = rule.label;
            Rule::new(rule.probability, label, move |p: &MusicParams| {
                if p.dur < min_dur {
                    vec![Symbol::nt(label, *p)]
                } else {
                    inner.apply(p)
                }
            })
        })
        .collect()
}
