//! Barycentric reduction of a trajectory and the stability score.
//!
//! The score is the time-sample average of the mean body-to-barycentre
//! distance. Lower means the bodies stayed more compact over the interval.
//! It is a summary statistic over the accepted samples (which are not evenly
//! spaced in time), not a dynamical stability criterion.

use crate::error::SolveError;
use crate::integrator::{IntegrationStats, Trajectory};
use crate::system::{position, ThreeBodySystem, BODY_COUNT, STATE_DIM};
use serde::Serialize;

pub type Point3 = [f64; 3];

/// Barycentric trajectories and score of one solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveResult {
    pub r1: Vec<Point3>,
    pub r2: Vec<Point3>,
    pub r3: Vec<Point3>,
    pub t: Vec<f64>,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<IntegrationStats>,
}

/// The `(r1, r2, r3, t, score)` shape returned over the wire.
pub type WireResult = (Vec<Point3>, Vec<Point3>, Vec<Point3>, Vec<f64>, f64);

impl SolveResult {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn into_parts(self) -> WireResult {
        (self.r1, self.r2, self.r3, self.t, self.score)
    }
}

/// Reduces raw samples with unit masses.
pub fn reduce(times: &[f64], states: &[Vec<f64>]) -> Result<SolveResult, SolveError> {
    reduce_with(&ThreeBodySystem::equal_masses(), times, states)
}

/// Reduces an integrator trajectory, carrying its statistics along.
pub fn reduce_trajectory(trajectory: &Trajectory) -> Result<SolveResult, SolveError> {
    let mut result = reduce(&trajectory.times, &trajectory.states)?;
    result.stats = Some(trajectory.stats);
    Ok(result)
}

pub fn reduce_with(
    system: &ThreeBodySystem,
    times: &[f64],
    states: &[Vec<f64>],
) -> Result<SolveResult, SolveError> {
    if times.is_empty() {
        return Err(SolveError::InvalidInput(
            "cannot reduce an empty trajectory".to_string(),
        ));
    }
    if times.len() != states.len() {
        return Err(SolveError::InvalidInput(format!(
            "trajectory has {} times but {} states",
            times.len(),
            states.len()
        )));
    }
    if let Some(bad) = states.iter().position(|s| s.len() != STATE_DIM) {
        return Err(SolveError::InvalidInput(format!(
            "state {bad} has {} components, expected {STATE_DIM}",
            states[bad].len()
        )));
    }

    let n = times.len();
    let mut relative: [Vec<Point3>; BODY_COUNT] = [
        Vec::with_capacity(n),
        Vec::with_capacity(n),
        Vec::with_capacity(n),
    ];
    let mut total = 0.0;

    for state in states {
        let rcom = system.barycenter(state);
        let mut distance_sum = 0.0;
        for (body, track) in relative.iter_mut().enumerate() {
            let rel = position(state, body) - rcom;
            distance_sum += rel.norm();
            track.push([rel.x, rel.y, rel.z]);
        }
        total += distance_sum / BODY_COUNT as f64;
    }

    let [r1, r2, r3] = relative;
    Ok(SolveResult {
        r1,
        r2,
        r3,
        t: times.to_vec(),
        score: total / n as f64,
        stats: None,
    })
}
