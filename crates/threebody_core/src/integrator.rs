//! Adaptive-step driver around an embedded Runge-Kutta pair.
//!
//! Step-size control follows the usual explicit RK recipe: the error of each
//! trial step is measured as the RMS of `err / (atol + rtol * max(|y|, |y_new|))`,
//! steps with norm < 1 are accepted, and the next step is scaled by
//! `0.9 * norm^(-1/(q+1))` clamped to [0.2, 10], never exceeding `max_step`.

use crate::error::IntegrationError;
use crate::settings::IntegratorSettings;
use crate::solvers::DormandPrince45;
use crate::traits::{DynamicalSystem, EmbeddedStepper};
use serde::Serialize;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;

pub const SUCCESS_MESSAGE: &str =
    "The solver successfully reached the end of the integration interval.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntegrationStats {
    /// Vector field evaluations, including step selection.
    pub evaluations: usize,
    pub accepted_steps: usize,
    pub rejected_steps: usize,
}

/// Accepted samples of an integration, starting with the initial condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    pub times: Vec<f64>,
    pub states: Vec<Vec<f64>>,
    pub stats: IntegrationStats,
    pub message: String,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn final_state(&self) -> Option<&[f64]> {
        self.states.last().map(Vec::as_slice)
    }
}

/// Integrates `system` from `settings.t_start` to `settings.t_end` with the
/// Dormand-Prince 5(4) pair.
pub fn integrate<S>(
    system: &S,
    initial_state: &[f64],
    settings: &IntegratorSettings,
) -> Result<Trajectory, IntegrationError>
where
    S: DynamicalSystem<f64>,
{
    let mut stepper = DormandPrince45::new(initial_state.len());
    integrate_with(system, &mut stepper, initial_state, settings)
}

/// Same as [`integrate`] with a caller-provided stepper.
pub fn integrate_with<S, P>(
    system: &S,
    stepper: &mut P,
    initial_state: &[f64],
    settings: &IntegratorSettings,
) -> Result<Trajectory, IntegrationError>
where
    S: DynamicalSystem<f64>,
    P: EmbeddedStepper<f64>,
{
    settings.validate()?;
    let dim = system.dimension();
    if dim == 0 {
        return Err(IntegrationError::InvalidSettings(
            "System has zero dimension.".to_string(),
        ));
    }
    if initial_state.len() != dim {
        return Err(IntegrationError::InvalidSettings(format!(
            "Initial state dimension mismatch. Expected {}, got {}.",
            dim,
            initial_state.len()
        )));
    }
    if initial_state.iter().any(|v| !v.is_finite()) {
        return Err(IntegrationError::InvalidSettings(
            "Initial state must be finite.".to_string(),
        ));
    }

    let t_end = settings.t_end;
    let error_exponent = -1.0 / (stepper.error_order() as f64 + 1.0);
    let mut stats = IntegrationStats::default();

    let mut t = settings.t_start;
    let mut y = initial_state.to_vec();
    let mut f = vec![0.0; dim];
    system.apply(t, &y, &mut f);
    stats.evaluations += 1;
    ensure_finite(&f, t)?;

    let mut h_abs = match settings.first_step {
        Some(h) => h,
        None => {
            let (h, evaluations) =
                select_initial_step(system, t, &y, &f, t_end, stepper.error_order(), settings);
            stats.evaluations += evaluations;
            h
        }
    };

    let mut times = vec![t];
    let mut states = vec![y.clone()];
    let mut trials = 0usize;

    while t < t_end {
        let min_step = 10.0 * spacing(t);
        if h_abs > settings.max_step {
            h_abs = settings.max_step;
        } else if h_abs < min_step {
            h_abs = min_step;
        }

        let mut rejected = false;
        loop {
            if h_abs < min_step {
                return Err(IntegrationError::StepSizeTooSmall { t, h: h_abs });
            }
            if trials >= settings.max_steps {
                return Err(IntegrationError::StepBudgetExhausted {
                    max_steps: settings.max_steps,
                    t,
                });
            }
            trials += 1;

            let t_new = (t + h_abs).min(t_end);
            let h = t_new - t;
            h_abs = h;

            stepper.attempt(system, t, &y, &f, h);
            stats.evaluations += 6;

            let error_norm = scaled_error_norm(
                stepper.error_estimate(),
                &y,
                stepper.proposed(),
                settings.rtol,
                settings.atol,
            );

            if error_norm < 1.0 {
                let mut factor = if error_norm == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * error_norm.powf(error_exponent)).min(MAX_FACTOR)
                };
                if rejected {
                    factor = factor.min(1.0);
                }
                h_abs *= factor;

                t = t_new;
                y.copy_from_slice(stepper.proposed());
                f.copy_from_slice(stepper.proposed_derivative());
                stats.accepted_steps += 1;
                break;
            }

            // NaN norms land here too: the trial is thrown away and the step
            // shrinks until it either clears the singularity or underflows.
            let factor = if error_norm.is_nan() {
                MIN_FACTOR
            } else {
                (SAFETY * error_norm.powf(error_exponent)).max(MIN_FACTOR)
            };
            tracing::trace!(t, h, error_norm, "rejected trial step");
            h_abs *= factor;
            rejected = true;
            stats.rejected_steps += 1;
        }

        ensure_finite(&f, t)?;
        times.push(t);
        states.push(y.clone());
    }

    tracing::debug!(
        samples = times.len(),
        accepted = stats.accepted_steps,
        rejected = stats.rejected_steps,
        evaluations = stats.evaluations,
        "integration finished"
    );

    Ok(Trajectory {
        times,
        states,
        stats,
        message: SUCCESS_MESSAGE.to_string(),
    })
}

fn ensure_finite(derivative: &[f64], t: f64) -> Result<(), IntegrationError> {
    if derivative.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(IntegrationError::NonFiniteDerivative { t })
    }
}

/// Distance from `t` to the next representable f64 above it.
fn spacing(t: f64) -> f64 {
    let magnitude = t.abs();
    if !magnitude.is_finite() {
        return f64::NAN;
    }
    f64::from_bits(magnitude.to_bits() + 1) - magnitude
}

fn rms_norm(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v * v;
        count += 1;
    }
    if count == 0 {
        return 0.0;
    }
    (sum / count as f64).sqrt()
}

fn scaled_error_norm(error: &[f64], y: &[f64], y_new: &[f64], rtol: f64, atol: f64) -> f64 {
    rms_norm(error.iter().zip(y.iter().zip(y_new)).map(|(e, (a, b))| {
        let scale = atol + a.abs().max(b.abs()) * rtol;
        e / scale
    }))
}

/// Hairer-Nørsett-Wanner starting step heuristic. Returns the step and the
/// number of vector field evaluations it spent.
fn select_initial_step<S: DynamicalSystem<f64>>(
    system: &S,
    t0: f64,
    y0: &[f64],
    f0: &[f64],
    t_end: f64,
    error_order: usize,
    settings: &IntegratorSettings,
) -> (f64, usize) {
    let interval = t_end - t0;
    let scale: Vec<f64> = y0
        .iter()
        .map(|v| settings.atol + v.abs() * settings.rtol)
        .collect();

    let d0 = rms_norm(y0.iter().zip(&scale).map(|(v, s)| v / s));
    let d1 = rms_norm(f0.iter().zip(&scale).map(|(v, s)| v / s));
    let mut h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    };
    h0 = h0.min(interval);

    let y1: Vec<f64> = y0.iter().zip(f0).map(|(y, f)| y + h0 * f).collect();
    let mut f1 = vec![0.0; y0.len()];
    system.apply(t0 + h0, &y1, &mut f1);

    let d2 = rms_norm(
        f1.iter()
            .zip(f0)
            .zip(&scale)
            .map(|((a, b), s)| (a - b) / s),
    ) / h0;

    let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
        (h0 * 1e-3).max(1e-6)
    } else {
        (0.01 / d1.max(d2)).powf(1.0 / (error_order as f64 + 1.0))
    };

    let h = (100.0 * h0).min(h1).min(interval);
    // A non-finite probe falls back to the max step and lets error control shrink it.
    if h.is_finite() && h > 0.0 {
        (h, 1)
    } else {
        (settings.max_step.min(interval), 1)
    }
}
