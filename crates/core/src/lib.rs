pub mod catalog;
pub mod classifier;
pub mod config;
pub mod fetcher;
pub mod gate;
pub mod metrics;
pub mod orchestrator;
pub mod pipeline;
pub mod service;
pub mod testing;

pub use catalog::{
    seed_catalog, CatalogError, Item, ItemCatalog, ItemMetadata, MemoryCatalog, WarningSet,
    WarningsUpdate,
};
pub use classifier::{classify, ClassificationResult, ClassificationStage, ClassifierConfig};
pub use config::{
    load_config, load_config_from_str, load_default_config, validate_config, Config,
    ConfigError, OperationProfile, ServerConfig, SimulatorConfig,
};
pub use fetcher::{FetchError, GatedFetcher};
pub use gate::{ConcurrencyGate, ConnectionBudget, GateConfig, GateError, GateSet, GateStatus};
pub use orchestrator::{
    BatchConfig, BatchOrchestrator, BatchReport, BatchSummary, CompletionPolicy,
    OrchestratorError, OrchestratorStatus,
};
pub use pipeline::{ItemPipeline, ItemReport, PipelineError, PipelineProgress, PipelineStage};
pub use service::{ClientConfig, HttpVideoService, ServiceError, ServiceOperation, VideoService};
