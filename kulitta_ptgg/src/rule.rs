// Weighted production rules.
//
// A `Rule` rewrites one nonterminal (matched by label) into a new sequence,
// computed from the nonterminal's payload. Rules sharing a label form a
// rule-group; one rule per group is picked by `choose` each time a matching
// nonterminal is rewritten.
//
// Probabilities are never assumed to be normalized. Call `normalize` on a
// rule set before generating; it returns a fresh rule set whose groups each
// sum to 1.0.

use crate::error::PtggError;
use crate::symbol::Symbol;
use rand::Rng;
use std::fmt;
use std::rc::Rc;

type RewriteFn<L, P> = Rc<dyn Fn(&P) -> Vec<Symbol<L, P>>>;

/// `label --probability--> rewrite(payload)`.
pub struct Rule<L, P> {
    pub probability: f64,
    pub label: L,
    rewrite: RewriteFn<L, P>,
}

impl<L, P> Rule<L, P> {
    pub fn new(
        probability: f64,
        label: L,
        rewrite: impl Fn(&P) -> Vec<Symbol<L, P>> + 'static,
    ) -> Self {
        Rule {
            probability,
            label,
            rewrite: Rc::new(rewrite),
        }
    }

    /// Run the right-hand side on a nonterminal's payload.
    pub fn apply(&self, payload: &P) -> Vec<Symbol<L, P>> {
        (self.rewrite)(payload)
    }

    /// Same label and right-hand side with a different weight.
    pub fn with_probability(&self, probability: f64) -> Self
    where
        L: Clone,
    {
        Rule {
            probability,
            label: self.label.clone(),
            rewrite: Rc::clone(&self.rewrite),
        }
    }
}

impl<L: Clone, P> Clone for Rule<L, P> {
    fn clone(&self) -> Self {
        self.with_probability(self.probability)
    }
}

impl<L: fmt::Debug, P> fmt::Debug for Rule<L, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("probability", &self.probability)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// The rule-group for `label`, in rule-set order.
pub fn rules_for<'r, L: PartialEq, P>(rules: &'r [Rule<L, P>], label: &L) -> Vec<&'r Rule<L, P>> {
    rules.iter().filter(|r| r.label == *label).collect()
}

/// Rescale every rule-group so its probabilities sum to 1.0.
///
/// Groups are emitted in order of their label's first appearance; rule order
/// within a group is preserved. A group whose total mass is zero, negative,
/// or not finite is rejected.
pub fn normalize<L, P>(rules: &[Rule<L, P>]) -> Result<Vec<Rule<L, P>>, PtggError>
where
    L: PartialEq + Clone + fmt::Debug,
{
    let mut labels: Vec<&L> = Vec::new();
    for rule in rules {
        if !labels.contains(&&rule.label) {
            labels.push(&rule.label);
        }
    }

    let mut normalized = Vec::with_capacity(rules.len());
    for label in labels {
        let group = rules_for(rules, label);
        let total: f64 = group.iter().map(|r| r.probability).sum();
        if !(total.is_finite() && total > 0.0) {
            return Err(PtggError::DegenerateGroup {
                label: format!("{label:?}"),
                total,
            });
        }
        normalized.extend(group.into_iter().map(|r| r.with_probability(r.probability / total)));
    }
    Ok(normalized)
}

/// Pick one rule from a group by walking its probability mass.
///
/// Draws `r` in [0, 1) and selects the first rule whose probability covers
/// what is left of `r`, subtracting each passed-over rule's mass. If rounding
/// leaves mass unconsumed, the last rule is selected.
pub fn choose<'r, L, P>(
    group: &[&'r Rule<L, P>],
    rng: &mut impl Rng,
) -> Result<&'r Rule<L, P>, PtggError> {
    let Some(&last) = group.last() else {
        return Err(PtggError::EmptyChoice);
    };
    let mut remaining: f64 = rng.random();
    for &rule in group {
        if rule.probability >= remaining {
            return Ok(rule);
        }
        remaining -= rule.probability;
    }
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn leaf(p: f64, label: u8, out: u8) -> Rule<u8, ()> {
        Rule::new(p, label, move |_| vec![Symbol::nt(out, ())])
    }

    #[test]
    fn normalize_scales_each_group_to_one() {
        let rules = vec![leaf(0.5, 0, 1), leaf(0.5, 0, 2), leaf(3.0, 1, 1), leaf(6.0, 1, 2)];
        let normalized = normalize(&rules).unwrap();
        for label in [0u8, 1] {
            let total: f64 = rules_for(&normalized, &label).iter().map(|r| r.probability).sum();
            assert!((total - 1.0).abs() < 1e-12, "group {label} sums to {total}");
        }
        let probs: Vec<f64> = rules_for(&normalized, &1).iter().map(|r| r.probability).collect();
        assert!((probs[0] - 1.0 / 3.0).abs() < 1e-12);
        assert!((probs[1] - 2.0 / 3.0).abs() < 1e-12);
        // Input untouched.
        assert_eq!(rules[2].probability, 3.0);
    }

    #[test]
    fn normalize_groups_by_first_appearance() {
        let rules = vec![leaf(1.0, 4, 0), leaf(1.0, 0, 0), leaf(1.0, 4, 1)];
        let labels: Vec<u8> = normalize(&rules).unwrap().iter().map(|r| r.label).collect();
        assert_eq!(labels, vec![4, 4, 0]);
    }

    #[test]
    fn normalize_empty_rule_set() {
        let rules: Vec<Rule<u8, ()>> = Vec::new();
        assert!(normalize(&rules).unwrap().is_empty());
    }

    #[test]
    fn normalize_rejects_zero_mass_group() {
        let rules = vec![leaf(0.0, 7, 0), leaf(0.0, 7, 1)];
        assert!(matches!(
            normalize(&rules),
            Err(PtggError::DegenerateGroup { ref label, .. }) if label == "7"
        ));
    }

    #[test]
    fn choose_from_empty_group_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        let group: Vec<&Rule<u8, ()>> = Vec::new();
        assert_eq!(choose(&group, &mut rng).unwrap_err(), PtggError::EmptyChoice);
    }

    #[test]
    fn choose_respects_certain_rules() {
        let mut rng = StdRng::seed_from_u64(9);
        let always = leaf(1.0, 0, 1);
        let never = leaf(0.0, 0, 2);
        for _ in 0..100 {
            let picked = choose(&[&always, &never], &mut rng).unwrap();
            assert_eq!(picked.apply(&()), vec![Symbol::nt(1, ())]);
        }
    }

    #[test]
    fn choose_falls_back_to_last_rule_on_missing_mass() {
        // Unnormalized group with total 0.2: most draws exhaust neither rule.
        let mut rng = StdRng::seed_from_u64(3);
        let a = leaf(0.1, 0, 1);
        let b = leaf(0.1, 0, 2);
        let mut last_count = 0;
        for _ in 0..1000 {
            if choose(&[&a, &b], &mut rng).unwrap().apply(&()) == vec![Symbol::nt(2, ())] {
                last_count += 1;
            }
        }
        assert!(last_count > 850, "last rule picked {last_count} times");
    }

    #[test]
    fn choose_follows_weights() {
        let mut rng = StdRng::seed_from_u64(42);
        let a = leaf(0.25, 0, 1);
        let b = leaf(0.75, 0, 2);
        let n = 10_000;
        let mut a_count = 0;
        for _ in 0..n {
            if choose(&[&a, &b], &mut rng).unwrap().apply(&()) == vec![Symbol::nt(1, ())] {
                a_count += 1;
            }
        }
        let pct = a_count as f64 / n as f64;
        assert!((0.22..0.28).contains(&pct), "expected ~25%, got {:.1}%", pct * 100.0);
    }
}
