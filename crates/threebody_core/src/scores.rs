//! Per-token score records.
//!
//! Storage is reached through a handle the caller passes in; nothing here
//! keeps process-wide state. Each token id may be scored once.

use crate::error::SolveError;
use crate::reduce::SolveResult;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub token_id: i64,
    pub score: f64,
}

/// Create-once score storage keyed by token id.
pub trait ScoreStore {
    /// Inserts a new record; fails with `DuplicateKey` if `token_id` is taken.
    fn insert(&mut self, token_id: i64, score: f64) -> Result<ScoreRecord, SolveError>;

    fn get(&self, token_id: i64) -> Option<ScoreRecord>;

    /// Every stored record, keyed by token id.
    fn all(&self) -> BTreeMap<i64, f64>;
}

/// In-memory [`ScoreStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    scores: BTreeMap<i64, f64>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn insert(&mut self, token_id: i64, score: f64) -> Result<ScoreRecord, SolveError> {
        match self.scores.entry(token_id) {
            Entry::Occupied(_) => Err(SolveError::DuplicateKey(token_id)),
            Entry::Vacant(slot) => {
                slot.insert(score);
                Ok(ScoreRecord { token_id, score })
            }
        }
    }

    fn get(&self, token_id: i64) -> Option<ScoreRecord> {
        self.scores
            .get(&token_id)
            .map(|&score| ScoreRecord { token_id, score })
    }

    fn all(&self) -> BTreeMap<i64, f64> {
        self.scores.clone()
    }
}

/// Stores the score of a finished solve under `token_id`.
pub fn record_solve<S: ScoreStore + ?Sized>(
    store: &mut S,
    token_id: i64,
    result: &SolveResult,
) -> Result<ScoreRecord, SolveError> {
    if !result.score.is_finite() {
        return Err(SolveError::InvalidInput(format!(
            "refusing to store non-finite score for token {token_id}"
        )));
    }
    let record = store.insert(token_id, result.score)?;
    tracing::debug!(token_id, score = record.score, "score recorded");
    Ok(record)
}
