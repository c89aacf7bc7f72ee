// Classical foreground: voicing abstract chords for a small ensemble.
//
// The abstract chords from `chords::to_chords` are close-position triads
// near middle C. This stage builds a chord space from the configured voice
// ranges, groups it by the configured relation (OP by default, so a class is
// every spread and inversion of the same pitch-class set), and resolves the
// progression through it with a per-voice step limit.

use crate::chord_space::{PitchVector, enumerate, filter, partition, piano_filter};
use crate::chords::TChord;
use crate::config::VoicingConfig;
use crate::constraints::Predicate;
use crate::error::MusicError;
use crate::search::{classify_by, resolve};
use rand::Rng;

/// Re-voice `chords` according to `config`. Timing, key and mode are kept;
/// only the pitches change.
pub fn classical_voicings(
    chords: &[TChord],
    config: &VoicingConfig,
    rng: &mut impl Rng,
) -> Result<Vec<TChord>, MusicError> {
    let mut space = enumerate(&config.voice_ranges)?;
    if config.piano_filter {
        space = piano_filter(space);
    }
    if let Some(bounds) = &config.spacing {
        space = filter(&space, &Predicate::spacing(bounds.clone()))?;
    }
    let qspace = partition(config.relation, space)?;
    log::debug!(
        "voicing {} chords over {} classes ({} voicings)",
        chords.len(),
        qspace.len(),
        qspace.chord_count()
    );

    let abstract_chords: Vec<PitchVector> = chords.iter().map(|c| c.pitches.clone()).collect();
    let voicings = resolve(
        &qspace,
        classify_by(config.relation),
        &Predicate::max_step_within(config.max_step),
        config.fallback,
        &abstract_chords,
        rng,
    )?;

    Ok(chords
        .iter()
        .zip(voicings)
        .map(|(chord, pitches)| TChord {
            pitches,
            ..chord.clone()
        })
        .collect())
}
