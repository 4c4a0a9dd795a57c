use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::subskill::{Section, SubskillId};

/// 3PL item parameters: discrimination (a), difficulty (b), guessing (c).
///
/// Kept as a plain record; calibration happens upstream and the values
/// arrive with the item catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrtParams {
    /// Discrimination, a ∈ [0.3, 3.0] for calibrated items.
    pub discrimination: f64,
    /// Difficulty on the theta scale, b ∈ [−4, 4].
    pub difficulty: f64,
    /// Pseudo-guessing floor, 0 ≤ c < 1.
    pub guessing: f64,
}

impl IrtParams {
    pub fn new(discrimination: f64, difficulty: f64, guessing: f64) -> Self {
        Self {
            discrimination,
            difficulty,
            guessing,
        }
    }

    /// Default parameters for an uncalibrated item with `choice_count` options:
    /// a = 1, b = 0, c = 1/|choices|.
    pub fn default_for_choices(choice_count: usize) -> Self {
        let guessing = if choice_count == 0 {
            0.0
        } else {
            1.0 / choice_count as f64
        };
        Self {
            discrimination: 1.0,
            difficulty: 0.0,
            guessing,
        }
    }

    /// Whether the parameters can contribute information. Non-finite or
    /// out-of-range values make the item zero-information for the selector
    /// and estimator.
    pub fn is_scorable(&self) -> bool {
        self.discrimination.is_finite()
            && self.difficulty.is_finite()
            && self.guessing.is_finite()
            && self.guessing >= 0.0
            && self.guessing < 1.0
    }
}

/// Section-specific item payload.
///
/// Reading-comprehension questions hold their passage by identifier and
/// resolve it through the catalog; the passage is never embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    /// Single-answer multiple choice.
    MultipleChoice { choices: Vec<String>, correct: usize },
    /// Multi-select with a set of equivalent acceptable answers; selecting
    /// any one of them is correct.
    MultiSelect {
        choices: Vec<String>,
        correct: Vec<usize>,
    },
    /// A question bound to a shared reading passage.
    PassageQuestion {
        passage_id: String,
        choices: Vec<String>,
        correct: usize,
    },
}

impl ItemKind {
    pub fn choices(&self) -> &[String] {
        match self {
            ItemKind::MultipleChoice { choices, .. }
            | ItemKind::MultiSelect { choices, .. }
            | ItemKind::PassageQuestion { choices, .. } => choices,
        }
    }

    /// Whether `selected` answers this item correctly. A skipped response
    /// (`None`) is always incorrect.
    pub fn grade(&self, selected: Option<usize>) -> bool {
        match (self, selected) {
            (ItemKind::MultipleChoice { correct, .. }, Some(idx))
            | (ItemKind::PassageQuestion { correct, .. }, Some(idx)) => idx == *correct,
            // The correct set lists equivalent answers; any one suffices.
            (ItemKind::MultiSelect { correct, .. }, Some(idx)) => correct.contains(&idx),
            (_, None) => false,
        }
    }
}

/// One immutable catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub section: Section,
    pub primary_subskill: SubskillId,
    #[serde(default)]
    pub secondary_subskills: Vec<SubskillId>,
    pub kind: ItemKind,
    /// Editorial difficulty tier, 1 (easiest) to 5 (hardest).
    pub tier: u8,
    /// Expected solve time in seconds.
    pub time_benchmark_secs: u32,
    pub irt: IrtParams,
}

impl Item {
    /// Check the structural invariants the catalog must uphold.
    pub fn validate(&self) -> Result<(), DomainError> {
        let choices = self.kind.choices();
        let check_index = |idx: usize| -> Result<(), DomainError> {
            if idx >= choices.len() {
                return Err(DomainError::InvalidCorrectIndex {
                    item_id: self.id.clone(),
                    index: idx,
                    choices: choices.len(),
                });
            }
            Ok(())
        };
        match &self.kind {
            ItemKind::MultipleChoice { correct, .. }
            | ItemKind::PassageQuestion { correct, .. } => check_index(*correct)?,
            ItemKind::MultiSelect { correct, .. } => {
                // A validated multi-select must be answerable: at least one
                // in-range equivalent answer, with no duplicate entries.
                if correct.is_empty() {
                    return Err(DomainError::EmptyCorrectSet(self.id.clone()));
                }
                for &idx in correct {
                    check_index(idx)?;
                }
                let mut deduped = correct.clone();
                deduped.sort_unstable();
                deduped.dedup();
                if deduped.len() != correct.len() {
                    return Err(DomainError::DuplicateCorrectIndex(self.id.clone()));
                }
            }
        }
        if !(1..=5).contains(&self.tier) {
            return Err(DomainError::InvalidTier {
                item_id: self.id.clone(),
                tier: self.tier,
            });
        }
        if self.irt.guessing < 0.0 || self.irt.guessing >= 1.0 {
            return Err(DomainError::InvalidGuessing {
                item_id: self.id.clone(),
                guessing: self.irt.guessing,
            });
        }
        if self.primary_subskill.section() != self.section {
            return Err(DomainError::SectionMismatch {
                item_id: self.id.clone(),
                subskill: self.primary_subskill,
                section: self.section,
            });
        }
        Ok(())
    }

    /// Primary plus secondary subskills, primary first, without duplicates.
    pub fn tested_subskills(&self) -> Vec<SubskillId> {
        let mut out = vec![self.primary_subskill];
        for &s in &self.secondary_subskills {
            if !out.contains(&s) {
                out.push(s);
            }
        }
        out
    }
}
