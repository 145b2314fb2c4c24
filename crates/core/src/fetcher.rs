//! Service calls wrapped in their gates.
//!
//! Every outbound call holds the connection budget for its whole duration.
//! Metadata and transcript fetches additionally hold their resource gate:
//! the resource gate is taken first, then the budget, so callers parked on a
//! saturated resource gate do not sit on budget slots other operations could
//! use. Permits are RAII guards and are released on every exit path,
//! including cancellation of the calling future.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::catalog::{ItemMetadata, WarningSet};
use crate::gate::{GateError, GateSet};
use crate::service::{ServiceError, VideoService};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Gated access to a [`VideoService`].
#[derive(Clone)]
pub struct GatedFetcher {
    service: Arc<dyn VideoService>,
    gates: Arc<GateSet>,
}

impl GatedFetcher {
    pub fn new(service: Arc<dyn VideoService>, gates: Arc<GateSet>) -> Self {
        Self { service, gates }
    }

    pub fn gates(&self) -> &Arc<GateSet> {
        &self.gates
    }

    /// Lists up to `limit` item ids, holding a connection slot.
    pub async fn list_items(&self, limit: usize) -> Result<Vec<String>, FetchError> {
        let _connection = self.gates.connections.acquire().await?;
        Ok(self.service.list_items(limit).await?)
    }

    /// Fetches an item's metadata under the metadata gate.
    pub async fn fetch_item(&self, item_id: &str) -> Result<ItemMetadata, FetchError> {
        let _slot = self.gates.metadata.acquire().await?;
        let _connection = self.gates.connections.acquire().await?;
        debug!(item_id, "Fetch metadata");
        Ok(self.service.get_item(item_id).await?)
    }

    /// Fetches an item's transcript under the transcript gate.
    pub async fn fetch_transcript(&self, item_id: &str) -> Result<String, FetchError> {
        let _slot = self.gates.transcript.acquire().await?;
        let _connection = self.gates.connections.acquire().await?;
        debug!(item_id, "Fetch transcript");
        Ok(self.service.get_transcript(item_id).await?)
    }

    /// Writes back an item's full warning set, holding a connection slot.
    pub async fn persist_warnings(
        &self,
        item_id: &str,
        warnings: &WarningSet,
    ) -> Result<(), FetchError> {
        let _connection = self.gates.connections.acquire().await?;
        debug!(item_id, labels = warnings.len(), "Persist warnings");
        Ok(self.service.update_warnings(item_id, warnings).await?)
    }
}

impl std::fmt::Debug for GatedFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatedFetcher")
            .field("gates", &self.gates)
            .finish_non_exhaustive()
    }
}
