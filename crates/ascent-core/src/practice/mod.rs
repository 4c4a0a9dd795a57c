//! Practice sessions.
//!
//! A practice session starts from the learner's persisted mastery state,
//! drives a fixed number of selector-chosen items, and updates ability and
//! mastery on every attempt. Each attempt is one logical atomic step: the
//! durable writes land first, then the in-memory state commits, so a store
//! failure leaves the session exactly as it was before the attempt.


mod categorizer;

pub use categorizer::{ErrorCategorizer, TimingCategorizer};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, instrument, warn};

use crate::bkt;
use crate::config::EngineConfig;
use crate::domain::{
    Attempt, EngineError, ErrorLogEntry, Item, MasteryState, Section, SessionStats, SubskillId,
};
use crate::irt::{estimate_ability, AbilityPrior, GradedResponse};
use crate::ports::{ItemCatalog, StateStore};
use crate::selector::{select_next, SelectionConstraints, SelectionMode};
use crate::session::SessionHistory;

/// External session mode, as chosen in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PracticeMode {
    Timed,
    Untimed,
    Review,
    /// Full-length mock test: maximum-measurement selection.
    MockTest,
}

impl PracticeMode {
    fn selection_mode(&self) -> SelectionMode {
        match self {
            PracticeMode::Timed | PracticeMode::Untimed => SelectionMode::Learning,
            PracticeMode::Review => SelectionMode::Review,
            PracticeMode::MockTest => SelectionMode::Assessment,
        }
    }
}

/// What the session draws items from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PracticeFocus {
    Subskills(Vec<SubskillId>),
    Section(Section),
    All,
}

impl PracticeFocus {
    fn subskills(&self) -> Vec<SubskillId> {
        match self {
            PracticeFocus::Subskills(list) => list.clone(),
            PracticeFocus::Section(section) => SubskillId::in_section(*section),
            PracticeFocus::All => SubskillId::ALL.to_vec(),
        }
    }
}

/// Session parameters fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticePlan {
    pub mode: PracticeMode,
    pub focus: PracticeFocus,
    pub question_count: u32,
}

/// Observable practice lifecycle.
#[derive(Debug, Clone)]
pub enum PracticeState {
    NotStarted,
    InProgress { answered: u32, total: u32 },
    Completed(SessionStats),
    Error(String),
}

impl PracticeState {
    fn name(&self) -> &'static str {
        match self {
            PracticeState::NotStarted => "not_started",
            PracticeState::InProgress { .. } => "in_progress",
            PracticeState::Completed(_) => "completed",
            PracticeState::Error(_) => "error",
        }
    }
}

type TransitionCallback = Box<dyn Fn(&PracticeState) + Send + Sync>;

/// Length-bounded practice session over one or more subskills.
pub struct PracticeController {
    catalog: Arc<dyn ItemCatalog>,
    store: Arc<dyn StateStore>,
    config: EngineConfig,
    plan: PracticePlan,
    session_id: String,
    items: Vec<Item>,
    history: SessionHistory,
    mastery: HashMap<SubskillId, MasteryState>,
    /// Prior mean for the session-level ability estimate.
    starting_theta: f64,
    theta: f64,
    session_responses: Vec<GradedResponse>,
    current: Option<Item>,
    state: PracticeState,
    rng: StdRng,
    categorizer: Box<dyn ErrorCategorizer>,
    answered: u32,
    correct_count: u32,
    total_response_ms: u64,
    on_transition: Option<TransitionCallback>,
}

impl PracticeController {
    pub fn new(
        catalog: Arc<dyn ItemCatalog>,
        store: Arc<dyn StateStore>,
        config: EngineConfig,
        plan: PracticePlan,
        session_id: impl Into<String>,
        seed: u64,
    ) -> Self {
        Self {
            catalog,
            store,
            config,
            plan,
            session_id: session_id.into(),
            items: Vec::new(),
            history: SessionHistory::new(),
            mastery: HashMap::new(),
            starting_theta: 0.0,
            theta: 0.0,
            session_responses: Vec::new(),
            current: None,
            state: PracticeState::NotStarted,
            rng: StdRng::seed_from_u64(seed),
            categorizer: Box::new(TimingCategorizer),
            answered: 0,
            correct_count: 0,
            total_response_ms: 0,
            on_transition: None,
        }
    }

    /// Replace the error-categorization policy.
    pub fn with_categorizer(mut self, categorizer: Box<dyn ErrorCategorizer>) -> Self {
        self.categorizer = categorizer;
        self
    }

    /// Register a callback invoked on every state transition.
    pub fn on_transition(&mut self, callback: TransitionCallback) {
        self.on_transition = Some(callback);
    }

    pub fn state(&self) -> &PracticeState {
        &self.state
    }

    pub fn current_item(&self) -> Option<&Item> {
        self.current.as_ref()
    }

    /// Session-level ability estimate as of the last attempt.
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Load items and mastery, derive the starting ability, and present the
    /// first item.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn start(&mut self) -> Result<(), EngineError> {
        if !matches!(self.state, PracticeState::NotStarted) {
            return Err(EngineError::InvalidState(self.state.name()));
        }

        let subskills = self.plan.focus.subskills();
        let items = match &self.plan.focus {
            PracticeFocus::Section(section) => self.catalog.fetch_by_section(*section).await,
            PracticeFocus::Subskills(list) => self.catalog.fetch_by_subskills(list).await,
            PracticeFocus::All => self.catalog.fetch_all().await,
        };
        let items = match items {
            Ok(items) => items,
            Err(e) => {
                self.transition(PracticeState::Error(e.to_string()));
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
        self.items = usable;

        // Load or lazily create mastery for every relevant subskill.
        for subskill in &subskills {
            let state = match self.store.get_mastery(*subskill).await? {
                Some(state) => state,
                None => {
                    let mut state = MasteryState::new_for_subskill(*subskill);
                    state.p_learn = self.config.bkt.default_learn;
                    state.p_forget = self.config.bkt.default_forget;
                    state
                }
            };
            self.mastery.insert(*subskill, state);
        }

        self.starting_theta = weighted_starting_theta(self.mastery.values());
        self.theta = self.starting_theta;
        info!(
            items = self.items.len(),
            starting_theta = self.starting_theta,
            "practice session starting"
        );

        match self.pick_next() {
            Some(item) => {
                self.history.mark_seen(&item.id, item.primary_subskill);
                self.current = Some(item);
                self.transition(PracticeState::InProgress {
                    answered: 0,
                    total: self.plan.question_count,
                });
                Ok(())
            }
            None => {
                self.complete();
                Ok(())
            }
        }
    }

    /// Grade the current item, update ability and mastery, and persist the
    /// attempt. `None` means skipped and is graded incorrect.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn submit_answer(
        &mut self,
        choice_index: Option<usize>,
        response_time_ms: f64,
    ) -> Result<(), EngineError> {
        if !matches!(self.state, PracticeState::InProgress { .. }) {
            return Err(EngineError::InvalidState(self.state.name()));
        }
        let item = self.current.clone().ok_or(EngineError::NoCurrentItem)?;

        if !response_time_ms.is_finite() || response_time_ms < 0.0 {
            return Err(EngineError::InvalidResponseTime(response_time_ms));
        }
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

        let response_ms = response_time_ms.round() as u64;
        let correct = item.kind.grade(choice_index);
        let now = Utc::now();

        let subskill = item.primary_subskill;
        let before = self
            .mastery
            .get(&subskill)
            .cloned()
            .unwrap_or_else(|| MasteryState::new_for_subskill(subskill));
        let theta_before = self.theta;
        let p_known_before = before.p_known;

        // Ability: EAP over the whole session, anchored on the starting
        // estimate.
        let mut responses = self.session_responses.clone();
        responses.push(GradedResponse {
            params: item.irt,
            correct,
        });
        let estimate = estimate_ability(
            AbilityPrior::new(self.starting_theta, 1.0),
            &responses,
            &self.config.irt,
        );

        // Mastery: forgetting since last practice, then the observation.
        let mut after = before.clone();
        after.theta = estimate.theta;
        after.standard_error = estimate.standard_error;
        if let Some(last) = after.last_practiced {
            let elapsed_days = (now - last).num_seconds().max(0) as f64 / 86_400.0;
            after.p_known = bkt::apply_forgetting(after.p_known, after.p_forget, elapsed_days);
        }
        bkt::observe(
            &mut after,
            correct,
            response_ms,
            item.time_benchmark_secs,
            &self.config.bkt,
        );
        after.attempts += 1;
        if correct {
            after.correct += 1;
        }
        after.last_practiced = Some(now);

        let attempt = Attempt {
            id: format!("{}-{}", self.session_id, self.answered + 1),
            session_id: self.session_id.clone(),
            item_id: item.id.clone(),
            selected_choice: choice_index,
            correct,
            response_time_ms: response_ms,
            hints_used: 0,
            timestamp: now,
            subskill,
            theta_before,
            theta_after: estimate.theta,
            p_known_before,
            p_known_after: after.p_known,
        };

        // Durable writes before any in-memory commit.
        self.store.upsert_mastery(&after).await?;
        self.store.append_attempt(&attempt).await?;
        if !correct {
            let entry = ErrorLogEntry {
                session_id: self.session_id.clone(),
                item_id: item.id.clone(),
                subskill,
                category: self
                    .categorizer
                    .categorize(response_ms, item.time_benchmark_secs),
                response_time_ms: response_ms,
                timestamp: now,
            };
            self.store.append_error_log(&entry).await?;
        }

        // Commit.
        self.mastery.insert(subskill, after);
        self.session_responses = responses;
        self.theta = estimate.theta;
        self.history.record_outcome(&item.id, correct);
        self.answered += 1;
        if correct {
            self.correct_count += 1;
        }
        self.total_response_ms += response_ms;
        debug!(item = %item.id, correct, theta = self.theta, "attempt committed");

        if self.answered >= self.plan.question_count {
            self.current = None;
            self.complete();
            return Ok(());
        }
        match self.pick_next() {
            Some(next) => {
                self.history.mark_seen(&next.id, next.primary_subskill);
                self.current = Some(next);
                self.transition(PracticeState::InProgress {
                    answered: self.answered,
                    total: self.plan.question_count,
                });
            }
            None => {
                self.current = None;
                self.complete();
            }
        }
        Ok(())
    }

    /// Skip the current item: graded incorrect with no selected choice.
    /// The elapsed time is still reported by the UI (a time-up event passes
    /// the full allotment).
    pub async fn skip(&mut self, response_time_ms: f64) -> Result<(), EngineError> {
        self.submit_answer(None, response_time_ms).await
    }

    /// Abandon the session between attempts. Previously committed attempts
    /// and mastery stay persisted; only in-memory history is discarded.
    pub fn cancel(&mut self) {
        if matches!(
            self.state,
            PracticeState::Completed(_) | PracticeState::Error(_)
        ) {
            return;
        }
        self.history = SessionHistory::new();
        self.session_responses.clear();
        self.current = None;
        self.transition(PracticeState::NotStarted);
    }

    fn pick_next(&mut self) -> Option<Item> {
        let constraints =
            SelectionConstraints::practice(&self.config.selector, self.plan.mode.selection_mode());
        select_next(
            self.theta,
            &self.items,
            &self.history,
            &constraints,
            &self.config.selector,
            &mut self.rng,
        )
        .cloned()
    }

    fn complete(&mut self) {
        let stats = SessionStats {
            total: self.answered,
            correct: self.correct_count,
            average_response_ms: if self.answered == 0 {
                0.0
            } else {
                self.total_response_ms as f64 / self.answered as f64
            },
        };
        info!(
            total = stats.total,
            correct = stats.correct,
            "practice session complete"
        );
        self.transition(PracticeState::Completed(stats));
    }

    fn transition(&mut self, state: PracticeState) {
        self.state = state;
        if let Some(callback) = &self.on_transition {
            callback(&self.state);
        }
    }
}

/// Attempt-count-weighted mean theta across the loaded mastery states;
/// plain mean when nothing has been attempted yet.
fn weighted_starting_theta<'a>(states: impl Iterator<Item = &'a MasteryState>) -> f64 {
    let states: Vec<&MasteryState> = states.collect();
    if states.is_empty() {
        return 0.0;
    }
    let total_attempts: u64 = states.iter().map(|s| s.attempts as u64).sum();
    if total_attempts == 0 {
        return states.iter().map(|s| s.theta).sum::<f64>() / states.len() as f64;
    }
    states
        .iter()
        .map(|s| s.theta * s.attempts as f64)
        .sum::<f64>()
        / total_attempts as f64
}
