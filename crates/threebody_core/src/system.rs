//! Newtonian three-body vector field.

use crate::traits::DynamicalSystem;
use nalgebra::Vector3;

pub const BODY_COUNT: usize = 3;
pub const STATE_DIM: usize = 6 * BODY_COUNT;

/// Positions r1 r2 r3 followed by velocities v1 v2 v3, three components each.
pub type State = [f64; STATE_DIM];

/// Position of `body` (0, 1 or 2).
pub fn position(state: &[f64], body: usize) -> Vector3<f64> {
    Vector3::from_column_slice(&state[3 * body..3 * body + 3])
}

/// Velocity of `body` (0, 1 or 2).
pub fn velocity(state: &[f64], body: usize) -> Vector3<f64> {
    let offset = 3 * BODY_COUNT + 3 * body;
    Vector3::from_column_slice(&state[offset..offset + 3])
}

/// Three point masses under mutual gravitation with G = 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreeBodySystem {
    pub masses: [f64; BODY_COUNT],
}

impl ThreeBodySystem {
    pub fn new(masses: [f64; BODY_COUNT]) -> Self {
        Self { masses }
    }

    pub fn equal_masses() -> Self {
        Self::new([1.0; BODY_COUNT])
    }

    pub fn total_mass(&self) -> f64 {
        self.masses.iter().sum()
    }

    /// Mass-weighted mean position.
    pub fn barycenter(&self, state: &[f64]) -> Vector3<f64> {
        let mut weighted = Vector3::<f64>::zeros();
        for (body, mass) in self.masses.iter().enumerate() {
            weighted += position(state, body) * *mass;
        }
        weighted / self.total_mass()
    }
}

impl Default for ThreeBodySystem {
    fn default() -> Self {
        Self::equal_masses()
    }
}

impl DynamicalSystem<f64> for ThreeBodySystem {
    fn dimension(&self) -> usize {
        STATE_DIM
    }

    fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
        let [m1, m2, m3] = self.masses;
        let r1 = position(x, 0);
        let r2 = position(x, 1);
        let r3 = position(x, 2);

        // Coincident bodies divide by zero; the resulting NaN/inf is left
        // for the integrator to report.
        let r12 = (r2 - r1).norm();
        let r13 = (r3 - r1).norm();
        let r23 = (r3 - r2).norm();

        let dv1 = (r2 - r1) * (m2 / r12.powi(3)) + (r3 - r1) * (m3 / r13.powi(3));
        let dv2 = (r1 - r2) * (m1 / r12.powi(3)) + (r3 - r2) * (m3 / r23.powi(3));
        let dv3 = (r1 - r3) * (m1 / r13.powi(3)) + (r2 - r3) * (m2 / r23.powi(3));

        // dr/dt = v
        out[..3 * BODY_COUNT].copy_from_slice(&x[3 * BODY_COUNT..STATE_DIM]);
        out[9..12].copy_from_slice(dv1.as_slice());
        out[12..15].copy_from_slice(dv2.as_slice());
        out[15..18].copy_from_slice(dv3.as_slice());
    }
}
