//! Status transition guards shared by processes, steps, and checkpoints

use std::fmt::Display;
use thiserror::Error;

/// Errors that can occur during a lifecycle transition
///
/// A failed transition never mutates the entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("cannot {action} {entity} in '{from}' status (requires {expected})")]
    InvalidTransition {
        entity: &'static str,
        action: &'static str,
        from: String,
        expected: String,
    },
}

impl WorkflowError {
    /// The status the entity was in when the transition was refused
    pub fn from_status(&self) -> &str {
        match self {
            WorkflowError::InvalidTransition { from, .. } => from,
        }
    }
}

/// Ensure `current` is one of `allowed` before performing `action`
pub(crate) fn require_status<S>(
    entity: &'static str,
    action: &'static str,
    current: S,
    allowed: &[S],
) -> Result<(), WorkflowError>
where
    S: Copy + PartialEq + Display,
{
    if allowed.contains(&current) {
        return Ok(());
    }

    Err(WorkflowError::InvalidTransition {
        entity,
        action,
        from: current.to_string(),
        expected: allowed
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(" or "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Light {
        Red,
        Green,
        Amber,
    }

    impl Display for Light {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Light::Red => write!(f, "red"),
                Light::Green => write!(f, "green"),
                Light::Amber => write!(f, "amber"),
            }
        }
    }

    #[test]
    fn test_require_status_allows_listed() {
        assert!(require_status("light", "go", Light::Green, &[Light::Green]).is_ok());
    }

    #[test]
    fn test_require_status_message() {
        let err = require_status("light", "go", Light::Red, &[Light::Green, Light::Amber])
            .unwrap_err();
        assert_eq!(err.from_status(), "red");
        assert_eq!(
            err.to_string(),
            "cannot go light in 'red' status (requires green or amber)"
        );
    }
}
