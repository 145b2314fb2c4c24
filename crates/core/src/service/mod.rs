//! Client side of the remote video service.
//!
//! [`VideoService`] is the seam between the pipeline and the network:
//! [`HttpVideoService`] talks to a real (or simulated) service, and
//! `testing::MockVideoService` stands in for it in tests.

mod config;
mod http;
mod types;

pub use config::ClientConfig;
pub use http::HttpVideoService;
pub use types::{ServiceError, ServiceOperation};

use async_trait::async_trait;

use crate::catalog::{ItemMetadata, WarningSet};

/// Operations offered by the remote video service.
///
/// Implementations perform one request per call and never retry.
#[async_trait]
pub trait VideoService: Send + Sync {
    /// Lists up to `limit` item ids in catalog order.
    async fn list_items(&self, limit: usize) -> Result<Vec<String>, ServiceError>;

    /// Fetches an item's metadata (transcript excluded).
    async fn get_item(&self, item_id: &str) -> Result<ItemMetadata, ServiceError>;

    /// Fetches an item's raw transcript.
    async fn get_transcript(&self, item_id: &str) -> Result<String, ServiceError>;

    /// Replaces an item's warnings.
    async fn update_warnings(
        &self,
        item_id: &str,
        warnings: &WarningSet,
    ) -> Result<(), ServiceError>;
}
