use async_trait::async_trait;

use crate::domain::{Attempt, DiagnosticResult, ErrorLogEntry, MasteryState, SubskillId};

/// Durable learner state, one handle per learner.
///
/// Writes must be durable before the call returns; the controllers await
/// every write before committing the corresponding in-memory transition, so
/// a failed write leaves the in-memory state untouched.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the mastery state for a subskill, if one exists yet.
    async fn get_mastery(&self, subskill: SubskillId) -> anyhow::Result<Option<MasteryState>>;

    /// Insert or update a mastery state.
    async fn upsert_mastery(&self, state: &MasteryState) -> anyhow::Result<()>;

    /// Append one immutable attempt record.
    async fn append_attempt(&self, attempt: &Attempt) -> anyhow::Result<()>;

    /// Append one error-log entry.
    async fn append_error_log(&self, entry: &ErrorLogEntry) -> anyhow::Result<()>;

    /// Record a completed diagnostic snapshot.
    async fn insert_diagnostic_result(&self, result: &DiagnosticResult) -> anyhow::Result<()>;

    /// The most recent diagnostic snapshot, if any.
    async fn latest_diagnostic(&self) -> anyhow::Result<Option<DiagnosticResult>>;
}
