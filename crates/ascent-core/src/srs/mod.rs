//! FSRS-inspired flashcard scheduler.
//!
//! Stability grows multiplicatively on successful reviews, damped by the
//! card's intrinsic difficulty, and collapses on lapses. The next review is
//! placed at the point where retrievability is expected to fall to the
//! configured target.

use chrono::{DateTime, Duration, Utc};

use crate::config::SrsConfig;
use crate::domain::{Flashcard, ReviewQuality};

/// Deck composition for the caller's statistics display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeckStats {
    /// Overdue or never scheduled.
    pub due: usize,
    /// 1 <= repetitions < 5.
    pub learning: usize,
    /// repetitions >= 5 with a healthy ease factor.
    pub mastered: usize,
}

/// Apply one review and return the updated card.
///
/// Good and Easy are successes; Hard and Forgot are lapses. The ease factor
/// moves on every review regardless of outcome.
pub fn review(card: &Flashcard, quality: ReviewQuality, now: DateTime<Utc>, cfg: &SrsConfig) -> Flashcard {
    let mut next = card.clone();
    let max_stability = cfg.max_interval_days as f64;

    if quality.is_success() {
        if card.stability == 0.0 {
            next.stability = match quality {
                ReviewQuality::Easy => 4.0,
                _ => 1.0,
            };
        } else {
            let multiplier = match quality {
                ReviewQuality::Easy => 3.5,
                _ => 2.5,
            };
            next.stability =
                (card.stability * multiplier * (1.0 - 0.3 * card.difficulty)).min(max_stability);
        }
        next.difficulty = (card.difficulty - 0.1 * (quality as u8 as f64 - 2.0)).clamp(0.0, 1.0);
        next.interval_hours = interval_for_stability(next.stability, cfg);
        next.repetitions = card.repetitions + 1;
    } else {
        next.stability = (card.stability * 0.2).max(0.5);
        next.difficulty = (card.difficulty + 0.2).min(1.0);
        next.interval_hours = match quality {
            ReviewQuality::Forgot => 1,
            _ => 4,
        };
        next.repetitions = 0;
        next.lapse_count = card.lapse_count + 1;
    }

    let q = quality as u8 as f64;
    next.ease_factor =
        (card.ease_factor + (0.1 - (3.0 - q) * (0.08 + (3.0 - q) * 0.02))).max(cfg.min_ease);

    next.last_review = Some(now);
    next.next_review = Some(now + Duration::hours(next.interval_hours as i64));
    next
}

fn interval_for_stability(stability: f64, cfg: &SrsConfig) -> u32 {
    let hours = (stability * cfg.target_retrievability * 24.0).round().max(1.0);
    (hours as u32).min(cfg.max_interval_days * 24)
}

/// Cards ready for review, most overdue first; ties go to the card with the
/// lowest ease factor.
pub fn due_cards<'a>(cards: &'a [Flashcard], now: DateTime<Utc>) -> Vec<&'a Flashcard> {
    let mut due: Vec<&Flashcard> = cards.iter().filter(|c| c.is_due(now)).collect();
    due.sort_by(|a, b| {
        b.overdue_hours(now)
            .partial_cmp(&a.overdue_hours(now))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                a.ease_factor
                    .partial_cmp(&b.ease_factor)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    });
    due
}

/// Deck composition snapshot.
pub fn deck_stats(cards: &[Flashcard], now: DateTime<Utc>) -> DeckStats {
    let mut stats = DeckStats::default();
    for card in cards {
        if card.is_due(now) {
            stats.due += 1;
        }
        if (1..5).contains(&card.repetitions) {
            stats.learning += 1;
        }
        if card.repetitions >= 5 && card.ease_factor >= 2.0 {
            stats.mastered += 1;
        }
    }
    stats
}
