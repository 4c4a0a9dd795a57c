use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::subskill::{Section, SubskillId};

/// Posterior ability estimate for one subskill at diagnostic completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubskillEstimate {
    pub subskill: SubskillId,
    pub theta: f64,
    pub standard_error: f64,
    /// Items administered for this subskill; 0 when the catalog had none.
    pub item_count: u32,
    pub accuracy: f64,
}

/// Immutable snapshot emitted when the diagnostic terminates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticResult {
    pub estimates: Vec<SubskillEstimate>,
    /// Mean theta per section, weighted by items administered.
    pub section_means: HashMap<Section, f64>,
    /// The three subskills with the lowest estimated ability.
    pub recommended_focus: Vec<SubskillId>,
    pub total_seconds: u64,
    pub completed_at: DateTime<Utc>,
}

impl DiagnosticResult {
    pub fn estimate_for(&self, subskill: SubskillId) -> Option<&SubskillEstimate> {
        self.estimates.iter().find(|e| e.subskill == subskill)
    }
}
