//! The `threebody_core` crate turns a 64-character hex digest into an
//! equal-mass three-body initial value problem, integrates it, and scores
//! how compact the resulting orbits stay.
//!
//! Key components:
//! - **Digest**: validation and the fixed-point hex → initial state mapping.
//! - **System**: the Newtonian vector field over an 18-component state.
//! - **Solvers / Integrator**: a Dormand-Prince 5(4) stepper driven with
//!   adaptive step control under a maximum step ceiling.
//! - **Reduce**: barycentric trajectories and the stability score.
//! - **Scores**: create-once storage of scores per token id.

pub mod digest;
pub mod error;
pub mod integrator;
pub mod reduce;
pub mod scores;
pub mod settings;
pub mod solve;
pub mod solvers;
pub mod system;
pub mod traits;

pub use digest::{map_digest, Digest};
pub use error::{ErrorKind, IntegrationError, SolveError};
pub use reduce::SolveResult;
pub use settings::{IntegratorSettings, MapperBounds, SolveSettings};
pub use solve::{solve, solve_with};
