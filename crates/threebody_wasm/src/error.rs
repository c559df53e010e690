//! Boundary error payloads.

use serde::Serialize;
use threebody_core::error::{ErrorKind, SolveError};
use wasm_bindgen::prelude::*;

/// What a failed call hands back to JavaScript: `{ kind, status, message }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryError {
    pub kind: ErrorKind,
    /// HTTP status a hosting service should answer with.
    pub status: u16,
    pub message: String,
}

impl BoundaryError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::from(SolveError::InvalidInput(message.into()))
    }

    pub fn into_js(self) -> JsValue {
        serde_wasm_bindgen::to_value(&self).unwrap_or_else(|_| {
            JsValue::from_str(&format!("{}: {}", self.kind.code(), self.message))
        })
    }
}

/// Status per failure class. Numerical failures are an expected outcome for
/// near-singular digests and get their own non-5xx code.
pub fn status_for(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::InvalidInput => 422,
        ErrorKind::NumericalFailure => 420,
        ErrorKind::DuplicateKey => 409,
    }
}

impl From<SolveError> for BoundaryError {
    fn from(err: SolveError) -> Self {
        let kind = err.kind();
        let message = match &err {
            SolveError::NumericalFailure(_) => {
                format!("Error integrating three-body problem: {}", err.diagnostic())
            }
            _ => err.diagnostic(),
        };
        Self {
            kind,
            status: status_for(kind),
            message,
        }
    }
}
