//! Types for the video catalog.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A set of content warning labels.
///
/// Ordered so that serialization is stable; the order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WarningSet(BTreeSet<String>);

impl WarningSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a label. Returns false if it was already present.
    pub fn insert(&mut self, label: impl Into<String>) -> bool {
        self.0.insert(label.into())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(label)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for WarningSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// A video in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Opaque unique key.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Served separately from the rest of the item.
    pub transcript: String,
    pub upload_date: NaiveDate,
    pub views: u64,
    #[serde(default)]
    pub warnings: WarningSet,
}

impl Item {
    /// Returns the item without its transcript.
    pub fn metadata(&self) -> ItemMetadata {
        ItemMetadata {
            title: self.title.clone(),
            description: self.description.clone(),
            upload_date: self.upload_date,
            views: self.views,
            warnings: self.warnings.clone(),
        }
    }
}

/// Item fields returned by the "get item" operation (transcript excluded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub title: String,
    pub description: String,
    pub upload_date: NaiveDate,
    pub views: u64,
    #[serde(default)]
    pub warnings: WarningSet,
}

/// Body of an "update warnings" request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WarningsUpdate {
    pub warnings: WarningSet,
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Failed to read catalog file: {0}")]
    Io(String),

    #[error("Failed to parse catalog file: {0}")]
    Parse(String),
}
