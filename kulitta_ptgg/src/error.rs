// Errors raised by the grammar engine.
//
// All of these are programming or configuration mistakes in the rule set or
// start sequence; none are transient, so callers surface them rather than
// retry.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PtggError {
    /// A `Var` was reached with no enclosing `Let` binding its name.
    #[error("no definition for variable `{0}`")]
    UnboundVariable(String),
    /// Weighted choice was asked to pick from an empty rule-group.
    #[error("empty rule list supplied to choose")]
    EmptyChoice,
    /// A rule-group's probabilities cannot be rescaled to sum to 1.0.
    #[error("rule group for {label} has probability mass {total}, cannot normalize")]
    DegenerateGroup { label: String, total: f64 },
}
