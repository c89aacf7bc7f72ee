// Data-driven generation configuration.
//
// Everything the `generate` pipeline can tune lives in `GenerationConfig`,
// loadable from JSON. Every field has a default, so a config file only
// needs the fields it changes. The grammar itself is data here (a list of
// `RuleSpec`s), defaulting to the stock progression grammar.
//
// `VoicingConfig` groups the chord-space parameters used by
// `classical::classical_voicings`.

use crate::chord_space::Relation;
use crate::error::MusicError;
use crate::grammar::{
    ChordType, Mode, MusicParams, MusicRule, MusicSymbol, RuleSpec, min_duration_guard, stock_rule_specs,
};
use crate::search::Fallback;
use kulitta_ptgg::{Symbol, normalize};
use serde::{Deserialize, Serialize};

/// Chord-space and voice-leading parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoicingConfig {
    /// Inclusive MIDI pitch range per voice, lowest voice first.
    pub voice_ranges: Vec<(i32, i32)>,
    /// Equivalence under which a voicing realizes an abstract chord.
    pub relation: Relation,
    /// Largest move any single voice may make between consecutive chords.
    pub max_step: i32,
    /// Optional (min, max) interval between each pair of adjacent voices.
    pub spacing: Option<Vec<(i32, i32)>>,
    /// Keep only sorted voicings without doubled pitches.
    pub piano_filter: bool,
    pub fallback: Fallback,
}

impl Default for VoicingConfig {
    fn default() -> Self {
        VoicingConfig {
            voice_ranges: vec![(47, 67), (52, 76), (60, 81)],
            relation: Relation::OP,
            max_step: 7,
            spacing: None,
            piano_filter: true,
            fallback: Fallback::NearestEuclidean,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Rewriting generations applied to the start symbol.
    pub generations: usize,
    /// The single chord the derivation starts from.
    pub start_chord: ChordType,
    /// Parameters of the start chord.
    pub start: MusicParams,
    /// Chords shorter than this (in whole notes) stop subdividing.
    pub min_duration: Option<f64>,
    pub rules: Vec<RuleSpec>,
    pub voicing: VoicingConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            seed: None,
            generations: 4,
            start_chord: ChordType::I,
            start: MusicParams::phrase(4.0, Mode::Major, 0),
            min_duration: None,
            rules: stock_rule_specs(),
            voicing: VoicingConfig::default(),
        }
    }
}

impl GenerationConfig {
    pub fn from_json(json: &str) -> Result<Self, MusicError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The configured grammar, guarded by `min_duration` if set, with every
    /// rule-group normalized.
    pub fn grammar(&self) -> Result<Vec<MusicRule>, MusicError> {
        let rules: Vec<MusicRule> = self.rules.iter().map(RuleSpec::to_rule).collect();
        let rules = match self.min_duration {
            Some(min) => min_duration_guard(&rules, min),
            None => rules,
        };
        Ok(normalize(&rules)?)
    }

    pub fn start_symbol(&self) -> Vec<MusicSymbol> {
        vec![Symbol::nt(self.start_chord, self.start)]
    }
}
