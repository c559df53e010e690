//! Solve entry points exposed to JavaScript.

use crate::error::BoundaryError;
use anyhow::anyhow;
use serde::Serialize;
use threebody_core::digest::Digest;
use threebody_core::reduce::{SolveResult, WireResult};
use threebody_core::settings::SolveSettings;
use threebody_core::solve::solve_with;
use wasm_bindgen::prelude::*;

/// Validates `hash` at the edge and runs one solve.
pub fn run_solve_result(
    hash: &str,
    settings: &SolveSettings,
) -> Result<SolveResult, BoundaryError> {
    let digest = Digest::parse(hash)?;
    Ok(solve_with(&digest, settings)?)
}

/// Runs one solve and returns the `(r1, r2, r3, t, score)` tuple.
pub fn run_solve(hash: &str, settings: &SolveSettings) -> Result<WireResult, BoundaryError> {
    run_solve_result(hash, settings).map(SolveResult::into_parts)
}

pub(crate) fn to_js<T: Serialize>(value: &T) -> anyhow::Result<JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|err| anyhow!("Serialization error: {err}"))
}

fn finish(outcome: Result<WireResult, BoundaryError>) -> Result<JsValue, JsValue> {
    match outcome {
        Ok(parts) => to_js(&parts).map_err(|err| JsValue::from_str(&err.to_string())),
        Err(err) => {
            tracing::warn!(kind = err.kind.code(), detail = %err.message, "solve rejected");
            Err(err.into_js())
        }
    }
}

/// Solves with default settings. Resolves to `[r1, r2, r3, t, score]`;
/// rejects with `{ kind, status, message }`.
#[wasm_bindgen]
pub fn solve(hash: &str) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    finish(run_solve(hash, &SolveSettings::default()))
}

/// Solves with a (possibly partial) settings object; missing fields take
/// their defaults.
#[wasm_bindgen(js_name = solveWithSettings)]
pub fn solve_with_settings(hash: &str, settings: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let settings: SolveSettings = if settings.is_undefined() || settings.is_null() {
        SolveSettings::default()
    } else {
        serde_wasm_bindgen::from_value(settings).map_err(|err| {
            BoundaryError::invalid_input(format!("Invalid settings: {err}")).into_js()
        })?
    };
    finish(run_solve(hash, &settings))
}

#[cfg(test)]
mod tests {
    use super::run_solve;
    use threebody_core::error::ErrorKind;
    use threebody_core::settings::{IntegratorSettings, SolveSettings};

    const STABLE_DIGEST: &str = "e58b081006f7e3dfc967a64cb14028d512c9791e558e08baa7196b50ac2f8670";

    fn short_settings() -> SolveSettings {
        SolveSettings {
            integrator: IntegratorSettings {
                t_end: 0.25,
                ..IntegratorSettings::default()
            },
            ..SolveSettings::default()
        }
    }

    #[test]
    fn run_solve_returns_wire_tuple() {
        let (r1, r2, r3, t, score) =
            run_solve(STABLE_DIGEST, &short_settings()).expect("solve should succeed");
        assert_eq!(r1.len(), t.len());
        assert_eq!(r2.len(), t.len());
        assert_eq!(r3.len(), t.len());
        assert_eq!(t.last().copied(), Some(0.25));
        assert!(score.is_finite());
    }

    #[test]
    fn run_solve_maps_invalid_digest() {
        let err = run_solve("1234", &SolveSettings::default()).expect_err("short digest");
        assert_eq!(err.kind, ErrorKind::InvalidInput);
        assert_eq!(err.status, 422);
    }

    #[test]
    fn run_solve_maps_collision_to_numerical_status() {
        let err = run_solve(
            "800800800840800800f00f008008008008008008008008008008000000000000",
            &SolveSettings::default(),
        )
        .expect_err("head-on collision");
        assert_eq!(err.kind, ErrorKind::NumericalFailure);
        assert_eq!(err.status, 420);
        assert!(err
            .message
            .starts_with("Error integrating three-body problem: Required step size"));
    }

    #[test]
    fn run_solve_maps_singular_digest() {
        let err = run_solve(&"0".repeat(64), &SolveSettings::default()).expect_err("singular");
        assert_eq!(err.kind, ErrorKind::NumericalFailure);
        assert_eq!(err.status, 420);
        assert!(err.message.contains("non-finite derivative"));
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::{solve, solve_with_settings};
    use js_sys::Reflect;
    use serde_wasm_bindgen::{from_value, to_value};
    use threebody_core::reduce::WireResult;
    use threebody_core::settings::{IntegratorSettings, SolveSettings};
    use wasm_bindgen::JsValue;
    use wasm_bindgen_test::wasm_bindgen_test;

    const STABLE_DIGEST: &str = "e58b081006f7e3dfc967a64cb14028d512c9791e558e08baa7196b50ac2f8670";

    fn field(value: &JsValue, name: &str) -> JsValue {
        Reflect::get(value, &JsValue::from_str(name)).expect("field")
    }

    #[wasm_bindgen_test]
    fn solve_with_settings_accepts_undefined() {
        let value = solve_with_settings(STABLE_DIGEST, JsValue::UNDEFINED)
            .expect("default settings should be used");
        let (r1, _, _, t, score): WireResult = from_value(value).expect("wire tuple");
        assert_eq!(r1.len(), t.len());
        assert_eq!(t.last().copied(), Some(5.0));
        assert!(score.is_finite());
    }

    #[wasm_bindgen_test]
    fn solve_with_settings_reads_settings_object() {
        let settings = SolveSettings {
            integrator: IntegratorSettings {
                t_end: 0.25,
                ..IntegratorSettings::default()
            },
            ..SolveSettings::default()
        };
        let value = solve_with_settings(STABLE_DIGEST, to_value(&settings).expect("settings"))
            .expect("solve should succeed");
        let (_, _, _, t, _): WireResult = from_value(value).expect("wire tuple");
        assert_eq!(t.last().copied(), Some(0.25));
    }

    #[wasm_bindgen_test]
    fn solve_rejects_singular_digest_with_payload() {
        let err = solve(&"f".repeat(64)).expect_err("coincident bodies should fail");
        assert_eq!(field(&err, "kind").as_string().as_deref(), Some("numerical_failure"));
        assert_eq!(field(&err, "status").as_f64(), Some(420.0));
        let message = field(&err, "message").as_string().expect("message");
        assert!(message.contains("non-finite derivative"));
    }

    #[wasm_bindgen_test]
    fn solve_rejects_malformed_digest() {
        let err = solve("xyz").expect_err("malformed digest should fail");
        assert_eq!(field(&err, "status").as_f64(), Some(422.0));
    }
}
