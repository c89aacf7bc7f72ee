// The term type rewritten by the grammar.
//
// A sequence of `Symbol`s is the whole state of a derivation. Symbols are
// never mutated: rewriting, mapping and expansion all build new sequences.

/// One element of a derivation.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol<L, P> {
    /// Nonterminal: `label` selects the applicable rules, `payload` is the
    /// rewrite functions' input. A nonterminal with no matching rules is a
    /// terminal.
    NT(L, P),
    /// Reference to the sequence bound by an enclosing `Let`.
    Var(String),
    /// `let name = bound in body`. The binding is visible only inside `body`.
    Let(String, Vec<Symbol<L, P>>, Vec<Symbol<L, P>>),
}

impl<L, P> Symbol<L, P> {
    pub fn nt(label: L, payload: P) -> Self {
        Symbol::NT(label, payload)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Symbol::Var(name.into())
    }

    pub fn let_in(
        name: impl Into<String>,
        bound: Vec<Symbol<L, P>>,
        body: Vec<Symbol<L, P>>,
    ) -> Self {
        Symbol::Let(name.into(), bound, body)
    }

    /// The label of a nonterminal, `None` for `Var`/`Let`.
    pub fn label(&self) -> Option<&L> {
        match self {
            Symbol::NT(label, _) => Some(label),
            Symbol::Var(_) | Symbol::Let(..) => None,
        }
    }
}

/// Apply `f` to every nonterminal payload, descending into both halves of
/// each `Let`. Variables are left as they are. The input is not modified.
pub fn map_payload<L, P, Q, F>(f: &F, seq: &[Symbol<L, P>]) -> Vec<Symbol<L, Q>>
where
    L: Clone,
    F: Fn(&P) -> Q,
{
    seq.iter()
        .map(|sym| match sym {
            Symbol::NT(label, payload) => Symbol::NT(label.clone(), f(payload)),
            Symbol::Var(name) => Symbol::Var(name.clone()),
            Symbol::Let(name, bound, body) => {
                Symbol::Let(name.clone(), map_payload(f, bound), map_payload(f, body))
            }
        })
        .collect()
}
