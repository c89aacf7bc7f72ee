// Let/Var elimination.
//
// Walks a derivation with an explicit frame stack instead of recursion, so
// deeply nested `Let`s cannot exhaust the call stack. Bindings live in an
// append-only arena; each binding records the environment it was introduced
// in, and an environment is just the index of its innermost binding. Looking
// up a `Var` walks that chain from innermost to outermost, so the nearest
// enclosing `Let` of the same name shadows the others.
//
// A `Var` expands to its bound sequence, itself expanded in the environment
// of the `Let` that bound it. The result therefore contains only
// nonterminals.

use crate::error::PtggError;
use crate::symbol::Symbol;
use std::slice;

struct Binding<'a, L, P> {
    name: &'a str,
    bound: &'a [Symbol<L, P>],
    /// Environment in force where the `Let` appeared.
    parent: Option<usize>,
}

fn lookup<'a, L, P>(
    bindings: &[Binding<'a, L, P>],
    env: Option<usize>,
    name: &str,
) -> Option<(&'a [Symbol<L, P>], Option<usize>)> {
    let mut cursor = env;
    while let Some(idx) = cursor {
        let binding = &bindings[idx];
        if binding.name == name {
            return Some((binding.bound, binding.parent));
        }
        cursor = binding.parent;
    }
    None
}

/// Visit every nonterminal of the fully expanded sequence, in order.
fn walk<'a, L, P>(
    seq: &'a [Symbol<L, P>],
    mut emit: impl FnMut(&'a L, &'a P),
) -> Result<(), PtggError> {
    let mut bindings: Vec<Binding<'a, L, P>> = Vec::new();
    let mut frames: Vec<(slice::Iter<'a, Symbol<L, P>>, Option<usize>)> = vec![(seq.iter(), None)];

    while let Some((iter, env)) = frames.last_mut() {
        let env = *env;
        let Some(sym) = iter.next() else {
            frames.pop();
            continue;
        };
        match sym {
            Symbol::NT(label, payload) => emit(label, payload),
            Symbol::Let(name, bound, body) => {
                bindings.push(Binding {
                    name: name.as_str(),
                    bound,
                    parent: env,
                });
                frames.push((body.iter(), Some(bindings.len() - 1)));
            }
            Symbol::Var(name) => {
                let (bound, defined_in) = lookup(&bindings, env, name)
                    .ok_or_else(|| PtggError::UnboundVariable(name.clone()))?;
                frames.push((bound.iter(), defined_in));
            }
        }
    }
    Ok(())
}

/// Eliminate every `Let` and `Var`, leaving only nonterminals.
pub fn expand<L: Clone, P: Clone>(seq: &[Symbol<L, P>]) -> Result<Vec<Symbol<L, P>>, PtggError> {
    let mut out = Vec::new();
    walk(seq, |label, payload| out.push(Symbol::NT(label.clone(), payload.clone())))?;
    Ok(out)
}

/// Expand and strip the nonterminal wrapper: the terminal `(label, payload)`
/// pairs of a finished derivation.
pub fn to_pairs<L: Clone, P: Clone>(seq: &[Symbol<L, P>]) -> Result<Vec<(L, P)>, PtggError> {
    let mut out = Vec::new();
    walk(seq, |label, payload| out.push((label.clone(), payload.clone())))?;
    Ok(out)
}
