//! In-memory implementations of the core's ports for integration tests,
//! plus shared item builders.
#![allow(dead_code)] // each test binary uses a different slice of this module

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use ascent_core::domain::{
    Attempt, CatalogError, DiagnosticResult, ErrorLogEntry, IrtParams, Item, ItemKind,
    MasteryState, Section, SubskillId,
};
use ascent_core::ports::{ItemCatalog, StateStore};

// ============================================================================
// Item builders
// ============================================================================

/// Four-choice item with the first choice correct.
pub fn make_item(id: &str, subskill: SubskillId, difficulty: f64) -> Item {
    Item {
        id: id.to_string(),
        section: subskill.section(),
        primary_subskill: subskill,
        secondary_subskills: vec![],
        kind: ItemKind::MultipleChoice {
            choices: vec![
                "choice A".to_string(),
                "choice B".to_string(),
                "choice C".to_string(),
                "choice D".to_string(),
            ],
            correct: 0,
        },
        tier: 3,
        time_benchmark_secs: 90,
        irt: IrtParams::new(1.0, difficulty, 0.25),
    }
}

/// A bank with `per_subskill` items for every subskill, difficulties
/// cycling through {-1, 0, +1}.
pub fn make_bank(per_subskill: usize) -> Vec<Item> {
    let mut items = Vec::new();
    for subskill in SubskillId::ALL {
        for i in 0..per_subskill {
            let difficulty = [-1.0, 0.0, 1.0][i % 3];
            items.push(make_item(
                &format!("{}-{}", subskill.as_str(), i),
                subskill,
                difficulty,
            ));
        }
    }
    items
}

// ============================================================================
// In-memory catalog
// ============================================================================

pub struct InMemoryItemCatalog {
    items: Vec<Item>,
}

impl InMemoryItemCatalog {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl ItemCatalog for InMemoryItemCatalog {
    async fn fetch_all(&self) -> Result<Vec<Item>, CatalogError> {
        Ok(self.items.clone())
    }

    async fn fetch_by_section(&self, section: Section) -> Result<Vec<Item>, CatalogError> {
        Ok(self
            .items
            .iter()
            .filter(|i| i.section == section)
            .cloned()
            .collect())
    }

    async fn fetch_by_subskills(
        &self,
        subskills: &[SubskillId],
    ) -> Result<Vec<Item>, CatalogError> {
        Ok(self
            .items
            .iter()
            .filter(|i| i.tested_subskills().iter().any(|s| subskills.contains(s)))
            .cloned()
            .collect())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Item, CatalogError> {
        self.items
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }
}

// ============================================================================
// In-memory state store
// ============================================================================

/// HashMap-backed store behind RwLocks, mirroring what the persistence
/// layer provides in production.
#[derive(Default)]
pub struct InMemoryStateStore {
    mastery: RwLock<HashMap<SubskillId, MasteryState>>,
    attempts: RwLock<Vec<Attempt>>,
    error_logs: RwLock<Vec<ErrorLogEntry>>,
    diagnostics: RwLock<Vec<DiagnosticResult>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mastery_for(&self, subskill: SubskillId) -> Option<MasteryState> {
        self.mastery.read().unwrap().get(&subskill).cloned()
    }

    pub fn attempts(&self) -> Vec<Attempt> {
        self.attempts.read().unwrap().clone()
    }

    pub fn error_logs(&self) -> Vec<ErrorLogEntry> {
        self.error_logs.read().unwrap().clone()
    }

    pub fn diagnostic_count(&self) -> usize {
        self.diagnostics.read().unwrap().len()
    }

    /// Pre-load a mastery state (prior knowledge).
    pub fn seed_mastery(&self, state: MasteryState) {
        self.mastery
            .write()
            .unwrap()
            .insert(state.subskill, state);
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get_mastery(&self, subskill: SubskillId) -> anyhow::Result<Option<MasteryState>> {
        Ok(self.mastery.read().unwrap().get(&subskill).cloned())
    }

    async fn upsert_mastery(&self, state: &MasteryState) -> anyhow::Result<()> {
        self.mastery
            .write()
            .unwrap()
            .insert(state.subskill, state.clone());
        Ok(())
    }

    async fn append_attempt(&self, attempt: &Attempt) -> anyhow::Result<()> {
        self.attempts.write().unwrap().push(attempt.clone());
        Ok(())
    }

    async fn append_error_log(&self, entry: &ErrorLogEntry) -> anyhow::Result<()> {
        self.error_logs.write().unwrap().push(entry.clone());
        Ok(())
    }

    async fn insert_diagnostic_result(&self, result: &DiagnosticResult) -> anyhow::Result<()> {
        self.diagnostics.write().unwrap().push(result.clone());
        Ok(())
    }

    async fn latest_diagnostic(&self) -> anyhow::Result<Option<DiagnosticResult>> {
        Ok(self.diagnostics.read().unwrap().last().cloned())
    }
}
