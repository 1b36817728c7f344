//! Loan approval prediction core.
//!
//! Raw applicant fields are validated and encoded into a fixed eleven column
//! feature vector, the continuous columns are rescaled by a fitted scaler, and a
//! trained classifier turns the row into an `Approved` / `Rejected` decision.
//! Both artifacts are loaded once and shared read-only through
//! [`prediction::LoanApprovalEngine`].

pub mod config;
pub mod error;
pub mod prediction;
pub mod telemetry;
