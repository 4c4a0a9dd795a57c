pub mod item_catalog;
pub mod state_store;

pub use item_catalog::ItemCatalog;
pub use state_store::StateStore;
