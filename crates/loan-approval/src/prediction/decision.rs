use serde::{Deserialize, Serialize};
use std::fmt;

use super::artifacts::InferenceError;

/// Binary outcome surfaced to whoever submitted the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanDecision {
    Approved,
    Rejected,
}

impl LoanDecision {
    /// Map a classifier label onto a decision. Only 1 and 0 are meaningful.
    pub fn from_label(label: i64) -> Result<Self, InferenceError> {
        match label {
            1 => Ok(LoanDecision::Approved),
            0 => Ok(LoanDecision::Rejected),
            other => Err(InferenceError::UnexpectedLabel(other)),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            LoanDecision::Approved => "Approved",
            LoanDecision::Rejected => "Rejected",
        }
    }

    pub const fn class(self) -> u8 {
        match self {
            LoanDecision::Approved => 1,
            LoanDecision::Rejected => 0,
        }
    }
}

impl fmt::Display for LoanDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_labels_format_as_status_strings() {
        assert_eq!(LoanDecision::from_label(1).unwrap().label(), "Approved");
        assert_eq!(LoanDecision::from_label(0).unwrap().label(), "Rejected");
        assert_eq!(LoanDecision::Approved.to_string(), "Approved");
    }

    #[test]
    fn other_labels_are_inference_failures() {
        for label in [-1, 2, 42] {
            assert_eq!(
                LoanDecision::from_label(label),
                Err(InferenceError::UnexpectedLabel(label))
            );
        }
    }

    #[test]
    fn class_round_trips_through_from_label() {
        for decision in [LoanDecision::Approved, LoanDecision::Rejected] {
            assert_eq!(
                LoanDecision::from_label(decision.class() as i64),
                Ok(decision)
            );
        }
    }
}
