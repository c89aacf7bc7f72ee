// Error type for chord spaces, constraints and voice leading.
//
// Every variant is a precondition violation in the caller's configuration
// or data; nothing here is transient. A constraint that merely evaluates to
// false is never an error; the resolver handles that through its fallback.

use kulitta_ptgg::PtggError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MusicError {
    /// Two pitch vectors (or a vector and its per-voice parameters) that
    /// must have the same number of voices do not.
    #[error("arity mismatch: {left} voices vs {right} voices")]
    ArityMismatch { left: usize, right: usize },
    /// A voice range with `lo > hi`.
    #[error("voice {voice} has empty range [{lo}, {hi}]")]
    InvalidRange { voice: usize, lo: i32, hi: i32 },
    /// The number of pitch vectors in a space overflows `usize`.
    #[error("pitch space too large to enumerate")]
    SpaceTooLarge,
    /// A random pick or fallback was asked to choose from nothing.
    #[error("cannot choose from an empty equivalence class")]
    EmptyClass,
    /// No class of the quotient space realizes an abstract chord.
    #[error("no equivalence class matches abstract chord {0}")]
    Unclassifiable(String),
    #[error(transparent)]
    Grammar(#[from] PtggError),
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// Serializing the generated chords failed.
    #[error("failed to write output: {0}")]
    Output(serde_json::Error),
}

/// Fail with `ArityMismatch` unless both vectors have the same length.
pub(crate) fn check_arity(a: &[i32], b: &[i32]) -> Result<(), MusicError> {
    if a.len() == b.len() {
        Ok(())
    } else {
        Err(MusicError::ArityMismatch {
            left: a.len(),
            right: b.len(),
        })
    }
}
