use thiserror::Error;

use super::subskill::{Section, SubskillId};

/// Structural invariant violations in catalog data.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("item {item_id}: correct index {index} out of range for {choices} choices")]
    InvalidCorrectIndex {
        item_id: String,
        index: usize,
        choices: usize,
    },

    #[error("item {0}: multi-select correct set is empty")]
    EmptyCorrectSet(String),

    #[error("item {0}: multi-select correct set contains duplicate indices")]
    DuplicateCorrectIndex(String),

    #[error("item {item_id}: difficulty tier {tier} outside 1-5")]
    InvalidTier { item_id: String, tier: u8 },

    #[error("item {item_id}: guessing parameter {guessing} outside [0, 1)")]
    InvalidGuessing { item_id: String, guessing: f64 },

    #[error("item {item_id}: subskill {subskill} does not belong to section {section}")]
    SectionMismatch {
        item_id: String,
        subskill: SubskillId,
        section: Section,
    },
}

/// Item catalog failures.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("item not found: {0}")]
    NotFound(String),

    #[error("catalog corrupt: {0}")]
    Corrupt(String),
}

/// Controller-surface errors. Only invalid input and store failures
/// propagate to the caller; everything else is recovered internally with
/// deterministic fallbacks.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid choice index {index} for item {item_id} with {choices} choices")]
    InvalidChoice {
        item_id: String,
        index: usize,
        choices: usize,
    },

    #[error("invalid response time: {0}")]
    InvalidResponseTime(f64),

    #[error("no item is currently presented")]
    NoCurrentItem,

    #[error("session is not accepting answers in state {0}")]
    InvalidState(&'static str),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("state store error: {0}")]
    Store(anyhow::Error),
}

// anyhow::Error does not implement std::error::Error, so thiserror's
// #[from] cannot be used here.
impl From<anyhow::Error> for EngineError {
    fn from(e: anyhow::Error) -> Self {
        EngineError::Store(e)
    }
}
