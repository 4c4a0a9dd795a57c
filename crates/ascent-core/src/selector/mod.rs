//! Constrained item selection.
//!
//! Candidates pass a hard eligibility filter, then compete on a scored
//! objective: Fisher information, minus an accuracy penalty outside the
//! zone-of-proximal-development band, plus a balancing bonus for
//! under-represented subskills, minus an exposure penalty. The winner is
//! drawn uniformly from the stable top three so that ties do not pin a
//! single item.

use rand::rngs::StdRng;
use rand::Rng;

use crate::config::SelectorConfig;
use crate::domain::Item;
use crate::irt::{fisher_information, probability};
use crate::session::SessionHistory;

/// What the session is optimizing for; fixes the target success rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Sustained engagement: ~70% expected success.
    Learning,
    /// Maximum measurement: ~50% expected success.
    Assessment,
    /// Consolidation: ~60% expected success.
    Review,
}

/// Hard constraints plus the scoring targets for one selection call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionConstraints {
    pub max_per_subskill: u32,
    pub min_per_subskill: u32,
    pub max_exposure: u32,
    pub target_accuracy: f64,
    pub accuracy_tolerance: f64,
}

impl SelectionConstraints {
    /// Practice constraints for the given mode.
    pub fn practice(cfg: &SelectorConfig, mode: SelectionMode) -> Self {
        Self {
            max_per_subskill: cfg.max_per_subskill,
            min_per_subskill: cfg.min_per_subskill,
            max_exposure: cfg.max_exposure,
            target_accuracy: target_for(cfg, mode),
            accuracy_tolerance: cfg.accuracy_tolerance,
        }
    }

    /// Diagnostic constraints: tighter per-subskill cap, assessment target.
    pub fn diagnostic(cfg: &SelectorConfig) -> Self {
        Self {
            max_per_subskill: cfg.max_per_subskill_diagnostic,
            min_per_subskill: 1,
            max_exposure: cfg.max_exposure,
            target_accuracy: target_for(cfg, SelectionMode::Assessment),
            accuracy_tolerance: cfg.accuracy_tolerance,
        }
    }
}

fn target_for(cfg: &SelectorConfig, mode: SelectionMode) -> f64 {
    match mode {
        SelectionMode::Learning => cfg.target_accuracy_learning,
        SelectionMode::Assessment => cfg.target_accuracy_assessment,
        SelectionMode::Review => cfg.target_accuracy_review,
    }
}

/// Score one eligible item at the current ability estimate.
pub fn score_item(
    theta: f64,
    item: &Item,
    history: &SessionHistory,
    constraints: &SelectionConstraints,
    cfg: &SelectorConfig,
) -> f64 {
    let information = fisher_information(theta, &item.irt);
    let p = probability(theta, &item.irt);
    let accuracy_penalty = cfg.accuracy_weight
        * ((p - constraints.target_accuracy).abs() - constraints.accuracy_tolerance).max(0.0);
    let balance_bonus = if history.subskill_count(item.primary_subskill) < constraints.min_per_subskill
    {
        cfg.balance_bonus
    } else {
        0.0
    };
    let exposure_penalty = cfg.exposure_weight * history.exposure_count(&item.id) as f64;

    information - accuracy_penalty + balance_bonus - exposure_penalty
}

fn is_eligible(item: &Item, history: &SessionHistory, constraints: &SelectionConstraints) -> bool {
    item.irt.is_scorable()
        && !history.has_seen(&item.id)
        && history.subskill_count(item.primary_subskill) < constraints.max_per_subskill
        && history.exposure_count(&item.id) < constraints.max_exposure
}

/// Pick the next item, or `None` when the catalog is exhausted.
///
/// Eligible items are ranked by score with the item id as a stable
/// tie-breaker; one of the top three is drawn uniformly via the session
/// RNG. When nothing is eligible, any unseen item serves as a last resort.
pub fn select_next<'a>(
    theta: f64,
    items: &'a [Item],
    history: &SessionHistory,
    constraints: &SelectionConstraints,
    cfg: &SelectorConfig,
    rng: &mut StdRng,
) -> Option<&'a Item> {
    let mut scored: Vec<(&Item, f64)> = items
        .iter()
        .filter(|item| is_eligible(item, history, constraints))
        .map(|item| (item, score_item(theta, item, history, constraints, cfg)))
        .collect();

    if scored.is_empty() {
        // Last resort: relax everything except "unseen".
        return items.iter().find(|item| !history.has_seen(&item.id));
    }

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.id.cmp(&b.0.id))
    });

    let pool = scored.len().min(3);
    let pick = rng.gen_range(0..pool);
    Some(scored[pick].0)
}
