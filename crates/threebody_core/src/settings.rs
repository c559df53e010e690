//! Tunable settings for the mapper and the integrator.
//!
//! Defaults reproduce the scoring service: bodies placed in a cube of
//! half-width 0.75, velocities within ±0.05, integrated over t ∈ [0, 5]
//! with steps no longer than 0.005.

use crate::error::IntegrationError;
use serde::{Deserialize, Serialize};

/// Closed target ranges for the digest-to-state mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperBounds {
    pub position: (f64, f64),
    pub velocity: (f64, f64),
}

impl Default for MapperBounds {
    fn default() -> Self {
        Self {
            position: (-0.75, 0.75),
            velocity: (-0.05, 0.05),
        }
    }
}

/// Settings for the adaptive Dormand-Prince integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorSettings {
    pub t_start: f64,
    pub t_end: f64,
    /// Upper bound on any accepted step.
    pub max_step: f64,
    pub rtol: f64,
    pub atol: f64,
    /// Initial step; chosen automatically when absent.
    pub first_step: Option<f64>,
    /// Ceiling on trial steps (accepted plus rejected).
    pub max_steps: usize,
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self {
            t_start: 0.0,
            t_end: 5.0,
            max_step: 0.005,
            rtol: 1e-3,
            atol: 1e-6,
            first_step: None,
            max_steps: 1_000_000,
        }
    }
}

impl IntegratorSettings {
    pub fn validate(&self) -> Result<(), IntegrationError> {
        let invalid = |msg: &str| Err(IntegrationError::InvalidSettings(msg.to_string()));

        if !self.t_start.is_finite() || !self.t_end.is_finite() {
            return invalid("t_start and t_end must be finite.");
        }
        if self.t_end <= self.t_start {
            return invalid("t_end must be greater than t_start.");
        }
        if self.max_step.is_nan() || self.max_step <= 0.0 {
            return invalid("max_step must be positive.");
        }
        if !self.rtol.is_finite() || self.rtol < 0.0 {
            return invalid("rtol must be non-negative and finite.");
        }
        if !self.atol.is_finite() || self.atol <= 0.0 {
            return invalid("atol must be positive and finite.");
        }
        if let Some(first_step) = self.first_step {
            if !first_step.is_finite() || first_step <= 0.0 {
                return invalid("first_step must be positive and finite.");
            }
        }
        if self.max_steps == 0 {
            return invalid("max_steps must be greater than zero.");
        }
        Ok(())
    }
}

/// Full pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveSettings {
    pub mapper: MapperBounds,
    pub integrator: IntegratorSettings,
}

#[cfg(test)]
mod tests {
    use super::{IntegratorSettings, SolveSettings};

    fn assert_err_contains(settings: IntegratorSettings, needle: &str) {
        let err = settings.validate().expect_err("expected invalid settings");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn defaults_are_valid() {
        let settings = IntegratorSettings::default();
        settings.validate().expect("defaults should validate");
        assert_eq!(settings.t_end, 5.0);
        assert_eq!(settings.max_step, 0.005);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let base = IntegratorSettings::default();
        assert_err_contains(
            IntegratorSettings {
                t_end: -1.0,
                ..base
            },
            "greater than t_start",
        );
        assert_err_contains(
            IntegratorSettings {
                t_start: f64::NAN,
                ..base
            },
            "finite",
        );
        assert_err_contains(
            IntegratorSettings {
                max_step: 0.0,
                ..base
            },
            "max_step",
        );
        assert_err_contains(
            IntegratorSettings {
                max_step: f64::NAN,
                ..base
            },
            "max_step",
        );
        assert_err_contains(IntegratorSettings { rtol: -1.0, ..base }, "rtol");
        assert_err_contains(IntegratorSettings { atol: 0.0, ..base }, "atol");
        assert_err_contains(
            IntegratorSettings {
                first_step: Some(0.0),
                ..base
            },
            "first_step",
        );
        assert_err_contains(
            IntegratorSettings {
                max_steps: 0,
                ..base
            },
            "max_steps",
        );
    }

    #[test]
    fn partial_settings_fill_from_defaults() {
        let json = r#"{ "integrator": { "t_end": 1.0, "rtol": 1e-6 } }"#;
        let settings: SolveSettings = serde_json::from_str(json).expect("settings should parse");
        assert_eq!(settings.integrator.t_end, 1.0);
        assert_eq!(settings.integrator.rtol, 1e-6);
        assert_eq!(settings.integrator.max_step, 0.005);
        assert_eq!(settings.integrator.first_step, None);
        assert_eq!(settings.mapper.position, (-0.75, 0.75));
        assert_eq!(settings.mapper.velocity, (-0.05, 0.05));
    }
}
