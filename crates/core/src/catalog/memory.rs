//! In-memory catalog implementation.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{CatalogError, Item, ItemCatalog, WarningSet};

#[derive(Debug, Default)]
struct CatalogInner {
    /// Ids in insertion order.
    order: Vec<String>,
    items: HashMap<String, Item>,
}

/// Insertion-ordered in-memory catalog.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    inner: RwLock<CatalogInner>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from items. A repeated id replaces the earlier item
    /// but keeps its original position.
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        let mut inner = CatalogInner::default();
        for item in items {
            if !inner.items.contains_key(&item.id) {
                inner.order.push(item.id.clone());
            }
            inner.items.insert(item.id.clone(), item);
        }
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Inserts or replaces an item. A new id goes to the end of the order.
    pub fn insert(&self, item: Item) {
        let mut inner = self.write();
        if !inner.items.contains_key(&item.id) {
            inner.order.push(item.id.clone());
        }
        inner.items.insert(item.id.clone(), item);
    }

    /// Loads a catalog from a JSON array of items.
    pub fn load_json(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Io(format!("{}: {}", path.display(), e)))?;
        let items: Vec<Item> =
            serde_json::from_str(&raw).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Ok(Self::from_items(items))
    }

    fn read(&self) -> RwLockReadGuard<'_, CatalogInner> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, CatalogInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl ItemCatalog for MemoryCatalog {
    fn list_ids(&self, limit: usize) -> Vec<String> {
        self.read().order.iter().take(limit).cloned().collect()
    }

    fn get(&self, id: &str) -> Result<Item, CatalogError> {
        self.read()
            .items
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    fn replace_warnings(&self, id: &str, warnings: WarningSet) -> Result<(), CatalogError> {
        let mut inner = self.write();
        let item = inner
            .items
            .get_mut(id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        item.warnings = warnings;
        Ok(())
    }

    fn len(&self) -> usize {
        self.read().order.len()
    }
}
