// Generational rewriting.
//
// One generation rewrites every symbol of the sequence in a single pass,
// left to right:
// - `Var`: kept as is (resolved later by `expand`)
// - `Let`: bound sequence and body are each rewritten one generation, then
//   re-wrapped. The `Let` replaces everything emitted earlier in the same
//   pass; symbols after it are appended as usual.
// - `NT`: if no rule carries its label it is a terminal and is kept;
//   otherwise one rule of its group is chosen and the rule's output is
//   spliced in its place.
//
// `generate` repeats this a fixed number of times. There is no fixpoint
// detection: an all-terminal sequence simply passes through the remaining
// generations unchanged.

use crate::error::PtggError;
use crate::rule::{Rule, choose, rules_for};
use crate::symbol::Symbol;
use rand::Rng;

/// Apply one generation of rewriting to `seq`.
pub fn rewrite_once<L, P>(
    rules: &[Rule<L, P>],
    seq: &[Symbol<L, P>],
    rng: &mut impl Rng,
) -> Result<Vec<Symbol<L, P>>, PtggError>
where
    L: PartialEq + Clone,
    P: Clone,
{
    let mut out = Vec::with_capacity(seq.len());
    for sym in seq {
        match sym {
            Symbol::Var(_) => out.push(sym.clone()),
            Symbol::Let(name, bound, body) => {
                let bound = rewrite_once(rules, bound, rng)?;
                let body = rewrite_once(rules, body, rng)?;
                out.clear();
                out.push(Symbol::Let(name.clone(), bound, body));
            }
            Symbol::NT(label, payload) => {
                let group = rules_for(rules, label);
                if group.is_empty() {
                    out.push(sym.clone());
                } else {
                    let rule = choose(&group, rng)?;
                    out.extend(rule.apply(payload));
                }
            }
        }
    }
    Ok(out)
}

/// Apply `generations` rounds of `rewrite_once`, starting from `start`.
pub fn generate<L, P>(
    rules: &[Rule<L, P>],
    start: &[Symbol<L, P>],
    generations: usize,
    rng: &mut impl Rng,
) -> Result<Vec<Symbol<L, P>>, PtggError>
where
    L: PartialEq + Clone,
    P: Clone,
{
    let mut seq = start.to_vec();
    for generation in 1..=generations {
        seq = rewrite_once(rules, &seq, rng)?;
        log::debug!("generation {generation}/{generations}: {} symbols", seq.len());
    }
    Ok(seq)
}
