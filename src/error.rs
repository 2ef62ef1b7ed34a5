use std::fmt;

use crate::types::{PropositionId, StateId};

/// Recoverable errors of the [`Domain`][crate::domain::Domain] layer.
///
/// Contract violations inside the kernel (out-of-range indices, mismatched
/// sizes) panic instead.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DelError {
    /// No agent with this name.
    UnknownAgent(String),
    /// No proposition with this name.
    UnknownProposition(String),
    /// The proposition is a base proposition, not an attention proposition.
    NotAttentionProposition(PropositionId),
    /// The list of default values does not match the list of propositions.
    DefaultsLength { expected: usize, actual: usize },
    /// An action was performed before any initial state was added.
    NoCurrentState,
    /// No state with this id in the history.
    UnknownState(StateId),
}

impl fmt::Display for DelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelError::UnknownAgent(name) => write!(f, "Agent not found: {}", name),
            DelError::UnknownProposition(name) => write!(f, "Proposition not found: {}", name),
            DelError::NotAttentionProposition(p) => write!(f, "Not an attention proposition: {}", p),
            DelError::DefaultsLength { expected, actual } => {
                write!(f, "Expected {} default values, got {}", expected, actual)
            }
            DelError::NoCurrentState => write!(f, "No state to update; add an initial state first"),
            DelError::UnknownState(s) => write!(f, "State not found: {}", s),
        }
    }
}

impl std::error::Error for DelError {}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_display() {
        assert_eq!(
            DelError::UnknownProposition("marble".to_string()).to_string(),
            "Proposition not found: marble"
        );
        assert_eq!(
            DelError::DefaultsLength { expected: 3, actual: 2 }.to_string(),
            "Expected 3 default values, got 2"
        );
        assert_eq!(DelError::UnknownState(StateId::new(4)).to_string(), "State not found: s4");
    }
}
