use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review quality reported by the learner for a flashcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewQuality {
    Forgot = 0,
    Hard = 1,
    Good = 2,
    Easy = 3,
}

impl From<u8> for ReviewQuality {
    fn from(val: u8) -> Self {
        match val {
            0 => ReviewQuality::Forgot,
            1 => ReviewQuality::Hard,
            3 => ReviewQuality::Easy,
            _ => ReviewQuality::Good,
        }
    }
}

impl ReviewQuality {
    pub fn is_success(&self) -> bool {
        matches!(self, ReviewQuality::Good | ReviewQuality::Easy)
    }
}

/// Spaced-repetition state for one (learner, word) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub word: String,
    /// Memory stability in days; 0 until the first successful review.
    pub stability: f64,
    /// Intrinsic hardness in [0, 1].
    pub difficulty: f64,
    /// SM-2 ease factor, never below 1.3.
    pub ease_factor: f64,
    /// Consecutive successful repetitions.
    pub repetitions: u32,
    pub lapse_count: u32,
    pub last_review: Option<DateTime<Utc>>,
    pub next_review: Option<DateTime<Utc>>,
    /// Current interval in hours, capped at 365 days.
    pub interval_hours: u32,
}

impl Flashcard {
    /// A card that has never been reviewed.
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            stability: 0.0,
            difficulty: 0.0,
            ease_factor: 2.5,
            repetitions: 0,
            lapse_count: 0,
            last_review: None,
            next_review: None,
            interval_hours: 0,
        }
    }

    /// Due when never scheduled or when the scheduled time has passed.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.next_review {
            None => true,
            Some(due) => due <= now,
        }
    }

    /// Hours past the scheduled review time; 0 when not yet due or never
    /// scheduled.
    pub fn overdue_hours(&self, now: DateTime<Utc>) -> f64 {
        match self.next_review {
            Some(due) if due <= now => (now - due).num_minutes() as f64 / 60.0,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_card_is_due() {
        let card = Flashcard::new("laconic");
        assert!(card.is_due(Utc::now()));
        assert_eq!(card.overdue_hours(Utc::now()), 0.0);
    }

    #[test]
    fn test_quality_from_u8_is_lenient() {
        assert_eq!(ReviewQuality::from(0), ReviewQuality::Forgot);
        assert_eq!(ReviewQuality::from(3), ReviewQuality::Easy);
        assert_eq!(ReviewQuality::from(9), ReviewQuality::Good);
    }
}
