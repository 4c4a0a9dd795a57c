use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::subskill::SubskillId;

/// Append-only record of one answered (or skipped) item.
///
/// Captures the ability and mastery values on both sides of the update so
/// that history can be replayed or audited without re-running the engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub id: String,
    pub session_id: String,
    pub item_id: String,
    /// Selected choice index; `None` means the item was skipped and the
    /// attempt is graded incorrect.
    pub selected_choice: Option<usize>,
    pub correct: bool,
    pub response_time_ms: u64,
    pub hints_used: u32,
    pub timestamp: DateTime<Utc>,
    pub subskill: SubskillId,
    pub theta_before: f64,
    pub theta_after: f64,
    pub p_known_before: f64,
    pub p_known_after: f64,
}

/// Minimal in-session view of an attempt, kept in `SessionHistory`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub item_id: String,
    pub correct: bool,
}

/// Coarse cause inferred for an incorrect response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Ran well past the item's time benchmark.
    TimePressure,
    /// Answered implausibly fast.
    Careless,
    Unknown,
}

/// Logged for every incorrect practice attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    pub session_id: String,
    pub item_id: String,
    pub subskill: SubskillId,
    pub category: ErrorCategory,
    pub response_time_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// Summary emitted when a practice session completes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total: u32,
    pub correct: u32,
    pub average_response_ms: f64,
}

impl SessionStats {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}
