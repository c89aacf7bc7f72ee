// Kulitta-style harmony generation
//
// Generates chord progressions with a probabilistic temporal graph grammar
// (the `kulitta_ptgg` crate) and voices them by searching a chord space: the
// set of playable voicings, grouped into equivalence classes so that every
// member of a class realizes the same abstract chord.
//
// Architecture:
// - grammar.rs: Roman-numeral chord types, musical parameters, stock rules
//   and data-driven `RuleSpec`s
// - chords.rs: Derivation output to timed absolute chords (`TChord`)
// - chord_space.rs: Pitch-space enumeration, OPTIC-style equivalence
//   relations, quotient-space partitioning
// - constraints.rs: Predicates on single voicings and consecutive pairs
// - search.rs: Greedy voice-leading resolver with fallback policies, plus
//   exhaustive search for short progressions
// - classical.rs: The default voicing pipeline over a configured ensemble
// - config.rs: JSON-loadable `GenerationConfig`
// - error.rs: `MusicError`
//
// Every random choice goes through a caller-supplied `Rng`, so generation is
// deterministic given a seed.

pub mod chord_space;
pub mod chords;
pub mod classical;
pub mod config;
pub mod constraints;
pub mod error;
pub mod grammar;
pub mod search;

pub use error::MusicError;
