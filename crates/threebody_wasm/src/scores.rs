//! Score board handle exposed to JavaScript.

use crate::error::BoundaryError;
use crate::solver::{run_solve_result, to_js};
use threebody_core::error::SolveError;
use threebody_core::scores::{record_solve, MemoryScoreStore, ScoreRecord, ScoreStore};
use threebody_core::settings::SolveSettings;
use wasm_bindgen::prelude::*;

/// Owns one score store. The host creates a board and passes it to every
/// call that needs it; there is no shared global board.
#[wasm_bindgen]
pub struct WasmScoreBoard {
    store: MemoryScoreStore,
}

impl Default for WasmScoreBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl WasmScoreBoard {
    pub fn try_add_score(
        &mut self,
        token_id: i64,
        score: f64,
    ) -> Result<ScoreRecord, BoundaryError> {
        Ok(self.store.insert(token_id, score)?)
    }

    /// Solves `hash` and stores its score under `token_id`.
    pub fn try_score_digest(
        &mut self,
        token_id: i64,
        hash: &str,
        settings: &SolveSettings,
    ) -> Result<ScoreRecord, BoundaryError> {
        // Checked up front so a taken token does not pay for a solve.
        if self.store.get(token_id).is_some() {
            return Err(SolveError::DuplicateKey(token_id).into());
        }
        let result = run_solve_result(hash, settings)?;
        Ok(record_solve(&mut self.store, token_id, &result)?)
    }

    pub fn score_of(&self, token_id: i64) -> Option<f64> {
        self.store.get(token_id).map(|record| record.score)
    }
}

#[wasm_bindgen]
impl WasmScoreBoard {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmScoreBoard {
        console_error_panic_hook::set_once();
        WasmScoreBoard {
            store: MemoryScoreStore::new(),
        }
    }

    /// Records `score` for `token_id`. Rejects with a `duplicate_key` error
    /// if the token already has one.
    pub fn add_score(&mut self, token_id: i64, score: f64) -> Result<JsValue, JsValue> {
        let record = self
            .try_add_score(token_id, score)
            .map_err(BoundaryError::into_js)?;
        to_js(&record).map_err(|err| JsValue::from_str(&err.to_string()))
    }

    /// Solves `hash` with default settings and records the resulting score.
    pub fn score_digest(&mut self, token_id: i64, hash: &str) -> Result<JsValue, JsValue> {
        let record = self
            .try_score_digest(token_id, hash, &SolveSettings::default())
            .map_err(BoundaryError::into_js)?;
        to_js(&record).map_err(|err| JsValue::from_str(&err.to_string()))
    }

    pub fn get_score(&self, token_id: i64) -> Option<f64> {
        self.score_of(token_id)
    }

    /// Every stored score as a `Map<bigint, number>`.
    pub fn get_scores(&self) -> js_sys::Map {
        let map = js_sys::Map::new();
        for (token_id, score) in self.store.all() {
            map.set(&JsValue::from(token_id), &JsValue::from_f64(score));
        }
        map
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::WasmScoreBoard;
    use js_sys::Reflect;
    use wasm_bindgen::JsValue;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn get_scores_lists_every_token_once() {
        let mut board = WasmScoreBoard::new();
        board.add_score(1, 0.1).expect("insert");
        board.add_score(2, 0.2).expect("insert");
        assert!(board.add_score(2, 0.9).is_err());

        let scores = board.get_scores();
        assert_eq!(scores.size(), 2);
        assert_eq!(scores.get(&JsValue::from(1_i64)).as_f64(), Some(0.1));
        assert_eq!(scores.get(&JsValue::from(2_i64)).as_f64(), Some(0.2));
    }

    #[wasm_bindgen_test]
    fn add_score_rejects_duplicates_with_payload() {
        let mut board = WasmScoreBoard::new();
        board.add_score(7, 0.5).expect("insert");
        let err = board.add_score(7, 0.6).expect_err("duplicate");
        let kind = Reflect::get(&err, &JsValue::from_str("kind")).expect("kind");
        assert_eq!(kind.as_string().as_deref(), Some("duplicate_key"));
        assert_eq!(board.get_score(7), Some(0.5));
    }
}
