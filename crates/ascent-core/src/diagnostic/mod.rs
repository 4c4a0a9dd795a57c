//! Multi-subskill adaptive diagnostic.
//!
//! The controller repeatedly targets the subskill with the largest posterior
//! uncertainty, asks the selector for a matching item, and re-estimates
//! every subskill the answered item tests. Each subskill finishes when its
//! standard error drops under the threshold or its item budget is spent;
//! when all are finished a [`DiagnosticResult`] is emitted and per-subskill
//! mastery states are seeded.


use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, instrument, warn};

use crate::bkt;
use crate::config::{DiagnosticConfig, EngineConfig};
use crate::domain::{
    AttemptSummary, DiagnosticResult, EngineError, Item, Section, SubskillEstimate, SubskillId,
};
use crate::irt::{estimate_ability, AbilityPrior, GradedResponse};
use crate::ports::{ItemCatalog, StateStore};
use crate::selector::{select_next, SelectionConstraints};
use crate::session::SessionHistory;

/// Observable diagnostic lifecycle. Once `Completed` or `Error`, the
/// machine no longer moves.
#[derive(Debug, Clone)]
pub enum DiagnosticState {
    NotStarted,
    InProgress {
        administered: u32,
        subskills_completed: u32,
    },
    Completed(DiagnosticResult),
    Error(String),
}

impl DiagnosticState {
    fn name(&self) -> &'static str {
        match self {
            DiagnosticState::NotStarted => "not_started",
            DiagnosticState::InProgress { .. } => "in_progress",
            DiagnosticState::Completed(_) => "completed",
            DiagnosticState::Error(_) => "error",
        }
    }
}

/// Per-subskill bookkeeping while the diagnostic runs.
#[derive(Debug, Clone)]
struct SubskillProgress {
    attempts: Vec<AttemptSummary>,
    theta: f64,
    standard_error: f64,
}

impl SubskillProgress {
    fn new(prior: AbilityPrior) -> Self {
        Self {
            attempts: Vec::new(),
            theta: prior.mean,
            standard_error: prior.sd,
        }
    }

    fn correct(&self) -> u32 {
        self.attempts.iter().filter(|a| a.correct).count() as u32
    }

    fn accuracy(&self) -> f64 {
        if self.attempts.is_empty() {
            0.0
        } else {
            self.correct() as f64 / self.attempts.len() as f64
        }
    }

    fn is_complete(&self, cfg: &DiagnosticConfig, exhausted: bool) -> bool {
        exhausted
            || self.attempts.len() as u32 >= cfg.max_items_per_subskill
            || (!self.attempts.is_empty() && self.standard_error < cfg.se_threshold)
    }
}

type ProgressMap = BTreeMap<SubskillId, SubskillProgress>;
type TransitionCallback = Box<dyn Fn(&DiagnosticState) + Send + Sync>;

/// Adaptive diagnostic session over the full subskill enumeration.
pub struct DiagnosticController {
    catalog: Arc<dyn ItemCatalog>,
    store: Arc<dyn StateStore>,
    config: EngineConfig,
    items: Vec<Item>,
    item_index: HashMap<String, Item>,
    history: SessionHistory,
    progress: ProgressMap,
    /// Subskills that ran out of matching items before completing.
    exhausted: HashSet<SubskillId>,
    current: Option<Item>,
    state: DiagnosticState,
    rng: StdRng,
    started_at: Option<DateTime<Utc>>,
    on_transition: Option<TransitionCallback>,
}

impl DiagnosticController {
    pub fn new(
        catalog: Arc<dyn ItemCatalog>,
        store: Arc<dyn StateStore>,
        config: EngineConfig,
        seed: u64,
    ) -> Self {
        Self {
            catalog,
            store,
            config,
            items: Vec::new(),
            item_index: HashMap::new(),
            history: SessionHistory::new(),
            progress: ProgressMap::new(),
            exhausted: HashSet::new(),
            current: None,
            state: DiagnosticState::NotStarted,
            rng: StdRng::seed_from_u64(seed),
            started_at: None,
            on_transition: None,
        }
    }

    /// Register a callback invoked on every state transition.
    pub fn on_transition(&mut self, callback: TransitionCallback) {
        self.on_transition = Some(callback);
    }

    pub fn state(&self) -> &DiagnosticState {
        &self.state
    }

    /// The item currently awaiting an answer.
    pub fn current_item(&self) -> Option<&Item> {
        self.current.as_ref()
    }

    /// Load the catalog and present the first item.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<(), EngineError> {
        if !matches!(self.state, DiagnosticState::NotStarted) {
            return Err(EngineError::InvalidState(self.state.name()));
        }

        let items = match self.catalog.fetch_all().await {
            Ok(items) => items,
            // A catalog that cannot be read at all is unrecoverable for
            // this session.
            Err(e) => {
                self.transition(DiagnosticState::Error(e.to_string()));
                return Err(EngineError::Catalog(e));
            }
        };
        let mut usable = Vec::with_capacity(items.len());
        for item in items {
            match item.validate() {
                Ok(()) => usable.push(item),
                Err(e) => warn!("dropping invalid catalog item: {}", e),
            }
        }
        info!("diagnostic starting with {} items", usable.len());

        self.item_index = usable
            .iter()
            .map(|item| (item.id.clone(), item.clone()))
            .collect();
        self.items = usable;
        let progress: ProgressMap = SubskillId::ALL
            .iter()
            .map(|&s| (s, SubskillProgress::new(AbilityPrior::standard())))
            .collect();
        self.started_at = Some(Utc::now());

        let mut history = SessionHistory::new();
        let mut exhausted = HashSet::new();
        match self.pick_next(&history, &progress, &mut exhausted) {
            Some(item) => {
                history.mark_seen(&item.id, item.primary_subskill);
                let completed = self.completed_count(&progress, &exhausted);
                self.history = history;
                self.progress = progress;
                self.exhausted = exhausted;
                self.current = Some(item);
                self.transition(DiagnosticState::InProgress {
                    administered: 0,
                    subskills_completed: completed,
                });
                Ok(())
            }
            // Nothing to administer at all: complete with zero coverage.
            None => self.finalize(history, progress, exhausted).await,
        }
    }

    /// Grade the current item and advance. `None` means skipped.
    ///
    /// All bookkeeping for one outcome is computed first and committed only
    /// after any store writes succeed, so a store failure leaves the
    /// in-memory session exactly as it was before the attempt.
    #[instrument(skip(self))]
    pub async fn submit_answer(
        &mut self,
        choice_index: Option<usize>,
        response_time_ms: u64,
    ) -> Result<(), EngineError> {
        let administered = match &self.state {
            DiagnosticState::InProgress { administered, .. } => *administered,
            other => return Err(EngineError::InvalidState(other.name())),
        };
        let item = self.current.clone().ok_or(EngineError::NoCurrentItem)?;

        if let Some(index) = choice_index {
            let choices = item.kind.choices().len();
            if index >= choices {
                return Err(EngineError::InvalidChoice {
                    item_id: item.id.clone(),
                    index,
                    choices,
                });
            }
        }

        let correct = item.kind.grade(choice_index);
        debug!(item = %item.id, correct, response_time_ms, "diagnostic outcome");

        // Work on copies; commit below.
        let mut history = self.history.clone();
        let mut progress = self.progress.clone();
        let mut exhausted = self.exhausted.clone();

        history.record_outcome(&item.id, correct);
        for subskill in item.tested_subskills() {
            self.apply_outcome(&mut progress, subskill, &item.id, correct);
        }

        let administered = administered + 1;
        match self.pick_next(&history, &progress, &mut exhausted) {
            Some(next) => {
                history.mark_seen(&next.id, next.primary_subskill);
                let completed = self.completed_count(&progress, &exhausted);
                self.history = history;
                self.progress = progress;
                self.exhausted = exhausted;
                self.current = Some(next);
                self.transition(DiagnosticState::InProgress {
                    administered,
                    subskills_completed: completed,
                });
                Ok(())
            }
            None => self.finalize(history, progress, exhausted).await,
        }
    }

    /// Skip the current item; graded incorrect.
    pub async fn skip(&mut self, response_time_ms: u64) -> Result<(), EngineError> {
        self.submit_answer(None, response_time_ms).await
    }

    /// Abandon the diagnostic. In-memory progress is discarded and no
    /// result is emitted; the machine returns to `NotStarted`.
    pub fn cancel(&mut self) {
        if matches!(
            self.state,
            DiagnosticState::Completed(_) | DiagnosticState::Error(_)
        ) {
            return;
        }
        self.history = SessionHistory::new();
        self.progress.clear();
        self.exhausted.clear();
        self.current = None;
        self.started_at = None;
        self.transition(DiagnosticState::NotStarted);
    }

    fn transition(&mut self, state: DiagnosticState) {
        self.state = state;
        if let Some(callback) = &self.on_transition {
            callback(&self.state);
        }
    }

    fn completed_count(&self, progress: &ProgressMap, exhausted: &HashSet<SubskillId>) -> u32 {
        progress
            .iter()
            .filter(|(s, p)| p.is_complete(&self.config.diagnostic, exhausted.contains(*s)))
            .count() as u32
    }

    /// Incomplete subskills ordered by decreasing standard error.
    fn targets(&self, progress: &ProgressMap, exhausted: &HashSet<SubskillId>) -> Vec<SubskillId> {
        let mut targets: Vec<(SubskillId, f64)> = progress
            .iter()
            .filter(|(s, p)| !p.is_complete(&self.config.diagnostic, exhausted.contains(*s)))
            .map(|(s, p)| (*s, p.standard_error))
            .collect();
        targets.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        targets.into_iter().map(|(s, _)| s).collect()
    }

    fn pick_next(
        &mut self,
        history: &SessionHistory,
        progress: &ProgressMap,
        exhausted: &mut HashSet<SubskillId>,
    ) -> Option<Item> {
        // Hard bound: never administer more than budget x subskills.
        let budget =
            SubskillId::ALL.len() as u32 * self.config.diagnostic.max_items_per_subskill;
        if history.items_seen() as u32 >= budget {
            return None;
        }

        let constraints = SelectionConstraints::diagnostic(&self.config.selector);
        for target in self.targets(progress, exhausted) {
            let matching: Vec<Item> = self
                .items
                .iter()
                .filter(|item| item.tested_subskills().contains(&target))
                .cloned()
                .collect();
            let theta = progress[&target].theta;
            if let Some(item) = select_next(
                theta,
                &matching,
                history,
                &constraints,
                &self.config.selector,
                &mut self.rng,
            ) {
                return Some(item.clone());
            }
            // No item can move this subskill any further.
            warn!(subskill = %target, "no items left for subskill, reduced coverage");
            exhausted.insert(target);
        }

        // Last resort: any unseen item still informs secondary subskills,
        // as long as some subskill remains incomplete.
        if self.targets(progress, exhausted).is_empty() {
            return None;
        }
        self.items
            .iter()
            .find(|item| !history.has_seen(&item.id))
            .cloned()
    }

    fn apply_outcome(
        &self,
        progress: &mut ProgressMap,
        subskill: SubskillId,
        item_id: &str,
        correct: bool,
    ) {
        let Some(entry) = progress.get_mut(&subskill) else {
            return;
        };
        entry.attempts.push(AttemptSummary {
            item_id: item_id.to_string(),
            correct,
        });

        // Re-estimate from this subskill's attempts only, dropping any
        // attempt whose item is unknown to the catalog.
        let responses: Vec<GradedResponse> = entry
            .attempts
            .iter()
            .filter_map(|attempt| match self.item_index.get(&attempt.item_id) {
                Some(item) => Some(GradedResponse {
                    params: item.irt,
                    correct: attempt.correct,
                }),
                None => {
                    warn!(item = %attempt.item_id, "attempt references unknown item, dropped");
                    None
                }
            })
            .collect();
        let estimate = estimate_ability(AbilityPrior::standard(), &responses, &self.config.irt);
        entry.theta = estimate.theta;
        entry.standard_error = estimate.standard_error;
    }

    /// Build the result, persist it and the seeded mastery states, then
    /// commit and transition. On a store failure nothing is committed.
    async fn finalize(
        &mut self,
        history: SessionHistory,
        progress: ProgressMap,
        exhausted: HashSet<SubskillId>,
    ) -> Result<(), EngineError> {
        let completed_at = Utc::now();
        let total_seconds = self
            .started_at
            .map(|t| (completed_at - t).num_seconds().max(0) as u64)
            .unwrap_or(0);

        let estimates: Vec<SubskillEstimate> = SubskillId::ALL
            .iter()
            .map(|&subskill| {
                let entry = &progress[&subskill];
                SubskillEstimate {
                    subskill,
                    theta: entry.theta,
                    standard_error: entry.standard_error,
                    item_count: entry.attempts.len() as u32,
                    accuracy: entry.accuracy(),
                }
            })
            .collect();

        let section_means = section_means(&estimates);

        let mut by_theta: Vec<&SubskillEstimate> = estimates.iter().collect();
        by_theta.sort_by(|a, b| {
            a.theta
                .partial_cmp(&b.theta)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let recommended_focus: Vec<SubskillId> =
            by_theta.iter().take(3).map(|e| e.subskill).collect();

        let result = DiagnosticResult {
            estimates,
            section_means,
            recommended_focus,
            total_seconds,
            completed_at,
        };

        // Seed mastery for every subskill the diagnostic actually measured,
        // then persist the snapshot. All writes land before the transition;
        // if one fails the session stays in progress on its last item.
        for estimate in result.estimates.iter().filter(|e| e.item_count > 0) {
            let state = bkt::seed_from_diagnostic(estimate, &self.config.bkt);
            self.store.upsert_mastery(&state).await?;
        }
        self.store.insert_diagnostic_result(&result).await?;

        info!(
            total_seconds,
            items = history.items_seen(),
            "diagnostic complete"
        );
        self.history = history;
        self.progress = progress;
        self.exhausted = exhausted;
        self.current = None;
        self.transition(DiagnosticState::Completed(result));
        Ok(())
    }
}

fn section_means(estimates: &[SubskillEstimate]) -> HashMap<Section, f64> {
    let mut means = HashMap::new();
    for section in [Section::Quant, Section::Verbal, Section::Writing] {
        let measured: Vec<&SubskillEstimate> = estimates
            .iter()
            .filter(|e| e.subskill.section() == section && e.item_count > 0)
            .collect();
        let weight: f64 = measured.iter().map(|e| e.item_count as f64).sum();
        let mean = if weight > 0.0 {
            measured
                .iter()
                .map(|e| e.theta * e.item_count as f64)
                .sum::<f64>()
                / weight
        } else {
            0.0
        };
        means.insert(section, mean);
    }
    means
}
