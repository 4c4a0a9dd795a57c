use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::subskill::SubskillId;

/// Mastery band derived from P(known).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryLevel {
    Novice,
    Developing,
    Proficient,
    Mastered,
}

impl MasteryLevel {
    pub fn from_p_known(p_known: f64) -> Self {
        if p_known < 0.40 {
            MasteryLevel::Novice
        } else if p_known < 0.65 {
            MasteryLevel::Developing
        } else if p_known < 0.85 {
            MasteryLevel::Proficient
        } else {
            MasteryLevel::Mastered
        }
    }
}

/// Per-(learner, subskill) tracked state, mutated only by the controllers
/// through the IRT and BKT engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteryState {
    pub subskill: SubskillId,
    /// Latent ability estimate.
    pub theta: f64,
    /// Standard error of theta, floored at 0.01.
    pub standard_error: f64,
    /// Probability the skill is known, in [0, 1].
    pub p_known: f64,
    /// Probability of learning per opportunity, clamped to [0.05, 0.20].
    pub p_learn: f64,
    /// Probability of forgetting per day, in [0, 0.2].
    pub p_forget: f64,
    pub attempts: u32,
    pub correct: u32,
    pub last_practiced: Option<DateTime<Utc>>,
}

impl MasteryState {
    /// Lazily created default for a subskill with no prior attempts:
    /// uninformed ability prior, neutral mastery.
    pub fn new_for_subskill(subskill: SubskillId) -> Self {
        Self {
            subskill,
            theta: 0.0,
            standard_error: 1.0,
            p_known: 0.3,
            p_learn: 0.10,
            p_forget: 0.02,
            attempts: 0,
            correct: 0,
            last_practiced: None,
        }
    }

    pub fn mastery_level(&self) -> MasteryLevel {
        MasteryLevel::from_p_known(self.p_known)
    }

    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.correct as f64 / self.attempts as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mastery_level_band_edges() {
        assert_eq!(MasteryLevel::from_p_known(0.0), MasteryLevel::Novice);
        assert_eq!(MasteryLevel::from_p_known(0.39), MasteryLevel::Novice);
        assert_eq!(MasteryLevel::from_p_known(0.40), MasteryLevel::Developing);
        assert_eq!(MasteryLevel::from_p_known(0.65), MasteryLevel::Proficient);
        assert_eq!(MasteryLevel::from_p_known(0.85), MasteryLevel::Mastered);
        assert_eq!(MasteryLevel::from_p_known(1.0), MasteryLevel::Mastered);
    }

    #[test]
    fn test_accuracy_empty_state() {
        let state = MasteryState::new_for_subskill(SubskillId::Geometry);
        assert_eq!(state.accuracy(), 0.0);
        assert!(state.last_practiced.is_none());
    }
}
