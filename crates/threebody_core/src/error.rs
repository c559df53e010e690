//! Error types shared by the solve pipeline and the score store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures raised by the adaptive integrator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrationError {
    #[error("Invalid integrator settings: {0}")]
    InvalidSettings(String),

    #[error("Vector field returned a non-finite derivative at t = {t}.")]
    NonFiniteDerivative { t: f64 },

    #[error("Required step size is less than spacing between numbers (t = {t}, h = {h:e}).")]
    StepSizeTooSmall { t: f64, h: f64 },

    #[error("Step budget of {max_steps} trial steps exhausted at t = {t}.")]
    StepBudgetExhausted { max_steps: usize, t: f64 },
}

/// Errors returned across the core boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Numerical failure: {0}")]
    NumericalFailure(IntegrationError),

    #[error("A score is already recorded for token {0}.")]
    DuplicateKey(i64),
}

impl From<IntegrationError> for SolveError {
    fn from(err: IntegrationError) -> Self {
        match err {
            IntegrationError::InvalidSettings(message) => SolveError::InvalidInput(message),
            other => SolveError::NumericalFailure(other),
        }
    }
}

/// Discriminant of [`SolveError`] for callers that dispatch on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    NumericalFailure,
    DuplicateKey,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::NumericalFailure => "numerical_failure",
            ErrorKind::DuplicateKey => "duplicate_key",
        }
    }
}

impl SolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SolveError::InvalidInput(_) => ErrorKind::InvalidInput,
            SolveError::NumericalFailure(_) => ErrorKind::NumericalFailure,
            SolveError::DuplicateKey(_) => ErrorKind::DuplicateKey,
        }
    }

    /// Diagnostic text without the kind prefix. For numerical failures this is
    /// the integrator's own message.
    pub fn diagnostic(&self) -> String {
        match self {
            SolveError::InvalidInput(message) => message.clone(),
            SolveError::NumericalFailure(err) => err.to_string(),
            SolveError::DuplicateKey(token_id) => {
                format!("A score is already recorded for token {token_id}.")
            }
        }
    }
}
