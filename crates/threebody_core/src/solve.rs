//! Digest → initial state → integration → reduction.
//!
//! `solve` is pure and owns every buffer it touches, so concurrent calls on
//! separate threads need no coordination.

use crate::digest::{map_digest_with, Digest};
use crate::error::SolveError;
use crate::integrator::integrate;
use crate::reduce::{reduce_trajectory, SolveResult};
use crate::settings::SolveSettings;
use crate::system::ThreeBodySystem;

/// Solves the three-body problem seeded by `hex` with default settings.
pub fn solve(hex: &str) -> Result<SolveResult, SolveError> {
    let digest = Digest::parse(hex)?;
    solve_with(&digest, &SolveSettings::default())
}

pub fn solve_with(digest: &Digest, settings: &SolveSettings) -> Result<SolveResult, SolveError> {
    let prefix = &digest.as_str()[..8];
    tracing::debug!(digest = prefix, "solving three-body problem");

    let initial_state = map_digest_with(digest, &settings.mapper);
    let system = ThreeBodySystem::equal_masses();

    let trajectory = integrate(&system, &initial_state, &settings.integrator).map_err(|err| {
        let err = SolveError::from(err);
        if let SolveError::NumericalFailure(cause) = &err {
            tracing::warn!(digest = %digest, %cause, "integration failed");
        }
        err
    })?;

    let result = reduce_trajectory(&trajectory)?;
    tracing::debug!(samples = result.len(), score = result.score, "solve finished");
    Ok(result)
}
