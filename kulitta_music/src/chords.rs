// From grammar output to timed absolute chords.
//
// A finished derivation is a sequence of (ChordType, MusicParams) pairs.
// Each becomes the root-position triad of its scale degree in its mode,
// transposed to its key. Onsets are laid out back to back from 0.

use crate::chord_space::{PitchVector, transpose};
use crate::error::MusicError;
use crate::grammar::{ChordType, Mode, MusicSymbol};
use kulitta_ptgg::to_pairs;
use serde::{Deserialize, Serialize};

/// A chord with a position in time. Every pitch shares the onset and
/// duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TChord {
    pub key: i32,
    pub mode: Mode,
    pub dur: f64,
    pub onset: f64,
    pub pitches: PitchVector,
}

/// Root-position triad on `ctype` in `mode`, shifted up by `key` semitones.
///
/// Degrees past the seventh wrap into the next octave, so VII in C major is
/// [11, 14, 17].
pub fn to_abs_chord(ctype: ChordType, mode: Mode, key: i32) -> PitchVector {
    let scale = mode.scale();
    let degree = |d: usize| scale[d % 7] + 12 * (d / 7) as i32;
    let root = ctype.degree();
    transpose(&[degree(root), degree(root + 2), degree(root + 4)], key)
}

/// Expand a derivation and lay its chords out in time.
pub fn to_chords(terms: &[MusicSymbol]) -> Result<Vec<TChord>, MusicError> {
    let mut onset = 0.0;
    let mut out = Vec::new();
    for (ctype, params) in to_pairs(terms)? {
        out.push(TChord {
            key: params.key,
            mode: params.mode,
            dur: params.dur,
            onset,
            pitches: to_abs_chord(ctype, params.mode, params.key),
        });
        onset += params.dur;
    }
    log::debug!("{} chords spanning {onset} whole notes", out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::MusicParams;
    use kulitta_ptgg::{PtggError, Symbol};

    #[test]
    fn triads_in_c_major() {
        assert_eq!(to_abs_chord(ChordType::I, Mode::Major, 0), vec![0, 4, 7]);
        assert_eq!(to_abs_chord(ChordType::IV, Mode::Major, 0), vec![5, 9, 12]);
        assert_eq!(to_abs_chord(ChordType::V, Mode::Major, 0), vec![7, 11, 14]);
        assert_eq!(to_abs_chord(ChordType::VII, Mode::Major, 0), vec![11, 14, 17]);
    }

    #[test]
    fn minor_and_transposed() {
        assert_eq!(to_abs_chord(ChordType::I, Mode::Minor, 0), vec![0, 3, 7]);
        assert_eq!(to_abs_chord(ChordType::III, Mode::Minor, 0), vec![3, 7, 10]);
        assert_eq!(to_abs_chord(ChordType::I, Mode::Major, 2), vec![2, 6, 9]);
    }

    #[test]
    fn onsets_accumulate() {
        let p = |dur| MusicParams::phrase(dur, Mode::Major, 0);
        let terms = vec![
            Symbol::nt(ChordType::I, p(0.5)),
            Symbol::let_in(
                "x",
                vec![Symbol::nt(ChordType::V, p(0.25))],
                vec![Symbol::var("x"), Symbol::var("x")],
            ),
            Symbol::nt(ChordType::I, p(1.0)),
        ];
        let chords = to_chords(&terms).unwrap();
        let onsets: Vec<f64> = chords.iter().map(|c| c.onset).collect();
        assert_eq!(onsets, vec![0.0, 0.5, 0.75, 1.0]);
        assert_eq!(chords[1].pitches, vec![7, 11, 14]);
    }

    #[test]
    fn unbound_variable_surfaces_as_grammar_error() {
        let terms: Vec<MusicSymbol> = vec![Symbol::var("y")];
        assert!(matches!(
            to_chords(&terms),
            Err(MusicError::Grammar(PtggError::UnboundVariable(_)))
        ));
    }
}
