//! Adaptive core for the Ascent test-preparation engine.
//!
//! Estimates per-subskill latent ability (IRT/EAP), tracks mastery with
//! Bayesian Knowledge Tracing, selects items under multi-criteria
//! constraints, drives the adaptive diagnostic and practice sessions, and
//! schedules vocabulary review. The core owns no persistent state and does
//! no rendering: items arrive through the [`ports::ItemCatalog`] contract,
//! learner state flows through [`ports::StateStore`], and the controllers
//! expose a non-blocking session facade to the UI.

pub mod bkt;
pub mod config;
pub mod diagnostic;
pub mod domain;
pub mod irt;
pub mod ports;
pub mod practice;
pub mod selector;
pub mod session;
pub mod srs;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used types
pub use domain::{
    Attempt, AttemptSummary, CatalogError, DiagnosticResult, DomainError, EngineError,
    ErrorCategory, ErrorLogEntry, Flashcard, IrtParams, Item, ItemKind, MasteryLevel,
    MasteryState, ReviewQuality, Section, SessionStats, SubskillEstimate, SubskillId,
};

pub use config::EngineConfig;

pub use irt::{
    estimate_ability, fisher_information, probability, scaled_score, AbilityEstimate,
    AbilityPrior, GradedResponse, ScaledScore,
};

pub use diagnostic::{DiagnosticController, DiagnosticState};
pub use practice::{
    ErrorCategorizer, PracticeController, PracticeFocus, PracticeMode, PracticePlan,
    PracticeState, TimingCategorizer,
};
pub use selector::{select_next, SelectionConstraints, SelectionMode};
pub use session::SessionHistory;
pub use srs::{deck_stats, due_cards, review, DeckStats};

pub use ports::{ItemCatalog, StateStore};
