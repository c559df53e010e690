//! WASM bridge for `threebody_core`.
//!
//! The bridge is the validation edge: digests are parsed here, core errors
//! are turned into `{ kind, status, message }` payloads, and successful
//! solves are serialized as the `[r1, r2, r3, t, score]` tuple.

pub mod error;
pub mod scores;
pub mod solver;

pub use error::{status_for, BoundaryError};
pub use scores::WasmScoreBoard;
pub use solver::{run_solve, run_solve_result, solve, solve_with_settings};
