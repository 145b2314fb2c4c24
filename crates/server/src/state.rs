use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use vidwarn_core::{
    seed_catalog, CatalogError, ItemCatalog, MemoryCatalog, ServiceOperation, SimulatorConfig,
};

use crate::degradation::DegradingGate;

/// Shared state of the service simulator.
pub struct AppState {
    config: SimulatorConfig,
    catalog: Arc<dyn ItemCatalog>,
    metadata: DegradingGate,
    transcript: DegradingGate,
    update: DegradingGate,
}

impl AppState {
    pub fn new(config: SimulatorConfig, catalog: Arc<dyn ItemCatalog>) -> Self {
        Self {
            metadata: DegradingGate::new(ServiceOperation::GetItem, config.metadata),
            transcript: DegradingGate::new(ServiceOperation::GetTranscript, config.transcript),
            update: DegradingGate::new(ServiceOperation::UpdateWarnings, config.update),
            config,
            catalog,
        }
    }

    /// Builds the state with the catalog the config names: the JSON file at
    /// `catalog_path` if set, otherwise a seeded demo catalog.
    pub fn from_config(config: SimulatorConfig) -> Result<Self, CatalogError> {
        let catalog = match &config.catalog_path {
            Some(path) => {
                let catalog = MemoryCatalog::load_json(path)?;
                info!(path = %path.display(), items = catalog.len(), "Loaded catalog file");
                catalog
            }
            None => {
                let catalog =
                    MemoryCatalog::from_items(seed_catalog(config.catalog_size, config.seed));
                info!(items = catalog.len(), seed = config.seed, "Seeded demo catalog");
                catalog
            }
        };
        Ok(Self::new(config, Arc::new(catalog)))
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<dyn ItemCatalog> {
        &self.catalog
    }

    pub fn list_delay(&self) -> Duration {
        self.config.list_delay()
    }

    pub fn metadata_gate(&self) -> &DegradingGate {
        &self.metadata
    }

    pub fn transcript_gate(&self) -> &DegradingGate {
        &self.transcript
    }

    pub fn update_gate(&self) -> &DegradingGate {
        &self.update
    }

    pub fn gates(&self) -> [&DegradingGate; 3] {
        [&self.metadata, &self.transcript, &self.update]
    }
}
