//! Video catalog: the items whose warnings get enriched.
//!
//! The catalog is owned by the remote service. Pipelines only ever read an
//! item and replace its warnings; nothing here creates or deletes items after
//! construction.

mod memory;
mod seed;
mod types;

pub use memory::MemoryCatalog;
pub use seed::seed_catalog;
pub use types::*;

/// Trait for catalog storage.
pub trait ItemCatalog: Send + Sync {
    /// Returns up to `limit` item ids in catalog order.
    fn list_ids(&self, limit: usize) -> Vec<String>;

    /// Gets a full item by id.
    fn get(&self, id: &str) -> Result<Item, CatalogError>;

    /// Replaces the warnings of an item (last write wins).
    fn replace_warnings(&self, id: &str, warnings: WarningSet) -> Result<(), CatalogError>;

    /// Number of items in the catalog.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
