// Kulitta PTGG: probabilistic temporal graph grammars.
//
// A stochastic term-rewriting system over symbol sequences. Nonterminals
// carry a label (which rules apply) and an opaque payload (what the rules
// compute with, e.g. duration and key for a chord). Each generation rewrites
// every nonterminal in the sequence at once, L-system style, picking one rule
// per symbol by weighted random choice. `Let`/`Var` nodes let a grammar
// repeat an identical sub-phrase: the bound sequence is rewritten once and
// every `Var` that refers to it expands to the same material.
//
// Architecture:
// - `symbol.rs`: The `Symbol` term type and payload mapping
// - `rule.rs`: `Rule`, rule-group lookup, probability normalization and
//   weighted choice
// - `rewrite.rs`: One-generation rewriting and n-generation `generate`
// - `expand.rs`: Let/Var elimination with an explicit binding environment,
//   and conversion to terminal `(label, payload)` pairs
// - `error.rs`: `PtggError`
//
// This crate knows nothing about music. `kulitta_music` instantiates it with
// chord-type labels and musical payloads.
//
// Determinism: the only randomness is the `rng` argument threaded through
// `rewrite_once`/`generate`/`choose`. The same seed and rule set always
// produce the same sequence.

pub mod error;
pub mod expand;
pub mod rewrite;
pub mod rule;
pub mod symbol;

pub use error::PtggError;
pub use expand::{expand, to_pairs};
pub use rewrite::{generate, rewrite_once};
pub use rule::{Rule, choose, normalize, rules_for};
pub use symbol::{Symbol, map_payload};
