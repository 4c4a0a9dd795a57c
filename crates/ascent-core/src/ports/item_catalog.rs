use async_trait::async_trait;

use crate::domain::{CatalogError, Item, Section, SubskillId};

/// Read-only access to the calibrated item bank. Implementations live with
/// the persistence layer; the core only ever sees owned, immutable items.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    /// Fetch every item in the catalog.
    async fn fetch_all(&self) -> Result<Vec<Item>, CatalogError>;

    /// Fetch items belonging to a section.
    async fn fetch_by_section(&self, section: Section) -> Result<Vec<Item>, CatalogError>;

    /// Fetch items whose primary or secondary subskills intersect the set.
    async fn fetch_by_subskills(
        &self,
        subskills: &[SubskillId],
    ) -> Result<Vec<Item>, CatalogError>;

    /// Fetch one item by identifier.
    async fn fetch_by_id(&self, id: &str) -> Result<Item, CatalogError>;
}
