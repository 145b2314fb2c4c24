//! Mock video service for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::catalog::{CatalogError, Item, ItemCatalog, ItemMetadata, MemoryCatalog, WarningSet};
use crate::service::{ServiceError, ServiceOperation, VideoService};

/// A recorded service call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub operation: ServiceOperation,
    /// Item id, or `None` for listing.
    pub item_id: Option<String>,
    /// Warnings sent, for write-backs.
    pub warnings: Option<WarningSet>,
}

/// An injected failure.
#[derive(Debug, Clone)]
struct FailureRule {
    operation: ServiceOperation,
    /// `None` matches every item.
    item_id: Option<String>,
    error: ServiceError,
}

/// Current and peak concurrent calls.
#[derive(Debug, Default)]
struct Concurrency {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl Concurrency {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Decrements the counters when a call ends, even if it is cancelled.
struct InFlight<'a> {
    op: &'a Concurrency,
    total: &'a Concurrency,
}

impl<'a> InFlight<'a> {
    fn enter(op: &'a Concurrency, total: &'a Concurrency) -> Self {
        op.enter();
        total.enter();
        Self { op, total }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.op.exit();
        self.total.exit();
    }
}

/// Mock implementation of the VideoService trait.
///
/// Serves items from an in-memory catalog and provides controllable behavior
/// for testing:
/// - Record every call for assertions
/// - Per-operation latency
/// - Failure injection per operation and item
/// - Current and peak concurrent calls per operation
///
/// # Example
///
/// ```rust,ignore
/// use vidwarn_core::testing::{fixtures, MockVideoService};
///
/// let service = MockVideoService::with_items(vec![fixtures::item("orbit", "NASA")]);
/// service.set_latency(ServiceOperation::GetItem, Duration::from_millis(20)).await;
///
/// // Run pipelines against it...
///
/// assert_eq!(service.calls_for(ServiceOperation::UpdateWarnings).await.len(), 1);
/// assert!(service.peak_in_flight(ServiceOperation::GetItem) <= 5);
/// ```
pub struct MockVideoService {
    catalog: Arc<MemoryCatalog>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    latency: Arc<RwLock<HashMap<ServiceOperation, Duration>>>,
    failures: Arc<RwLock<Vec<FailureRule>>>,
    concurrency: [Concurrency; 4],
    total: Concurrency,
}

impl Default for MockVideoService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVideoService {
    /// Create a mock service with an empty catalog.
    pub fn new() -> Self {
        Self::with_catalog(Arc::new(MemoryCatalog::new()))
    }

    /// Create a mock service serving the given items.
    pub fn with_items(items: Vec<Item>) -> Self {
        Self::with_catalog(Arc::new(MemoryCatalog::from_items(items)))
    }

    /// Create a mock service over an existing catalog.
    pub fn with_catalog(catalog: Arc<MemoryCatalog>) -> Self {
        Self {
            catalog,
            calls: Arc::new(RwLock::new(Vec::new())),
            latency: Arc::new(RwLock::new(HashMap::new())),
            failures: Arc::new(RwLock::new(Vec::new())),
            concurrency: Default::default(),
            total: Concurrency::default(),
        }
    }

    /// The backing catalog.
    pub fn catalog(&self) -> &Arc<MemoryCatalog> {
        &self.catalog
    }

    /// Current warnings of an item in the backing catalog.
    pub fn warnings_of(&self, item_id: &str) -> Option<WarningSet> {
        self.catalog.get(item_id).ok().map(|item| item.warnings)
    }

    /// Set the simulated latency of an operation.
    pub async fn set_latency(&self, operation: ServiceOperation, latency: Duration) {
        self.latency.write().await.insert(operation, latency);
    }

    /// Make every call of `operation` fail with `error`.
    pub async fn fail_operation(&self, operation: ServiceOperation, error: ServiceError) {
        self.failures.write().await.push(FailureRule {
            operation,
            item_id: None,
            error,
        });
    }

    /// Make calls of `operation` for `item_id` fail with `error`.
    pub async fn fail_item(&self, operation: ServiceOperation, item_id: &str, error: ServiceError) {
        self.failures.write().await.push(FailureRule {
            operation,
            item_id: Some(item_id.to_string()),
            error,
        });
    }

    /// Remove all injected failures.
    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    /// Get all recorded calls.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Get recorded calls of one operation.
    pub async fn calls_for(&self, operation: ServiceOperation) -> Vec<RecordedCall> {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.operation == operation)
            .cloned()
            .collect()
    }

    /// Clear recorded calls.
    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    /// Calls of `operation` currently in progress.
    pub fn in_flight(&self, operation: ServiceOperation) -> usize {
        self.counter(operation).current.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous calls of `operation` observed.
    pub fn peak_in_flight(&self, operation: ServiceOperation) -> usize {
        self.counter(operation).peak.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous calls of any kind observed.
    pub fn peak_total_in_flight(&self) -> usize {
        self.total.peak.load(Ordering::SeqCst)
    }

    fn counter(&self, operation: ServiceOperation) -> &Concurrency {
        let index = match operation {
            ServiceOperation::ListItems => 0,
            ServiceOperation::GetItem => 1,
            ServiceOperation::GetTranscript => 2,
            ServiceOperation::UpdateWarnings => 3,
        };
        &self.concurrency[index]
    }

    /// Records the call, waits the configured latency and applies any
    /// injected failure.
    async fn begin(
        &self,
        operation: ServiceOperation,
        item_id: Option<&str>,
        warnings: Option<&WarningSet>,
    ) -> Result<(), ServiceError> {
        self.calls.write().await.push(RecordedCall {
            operation,
            item_id: item_id.map(str::to_string),
            warnings: warnings.cloned(),
        });

        let latency = self.latency.read().await.get(&operation).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let failures = self.failures.read().await;
        let failure = failures.iter().find(|rule| {
            rule.operation == operation
                && (rule.item_id.is_none() || rule.item_id.as_deref() == item_id)
        });
        match failure {
            Some(rule) => Err(rule.error.clone()),
            None => Ok(()),
        }
    }
}

fn not_found(err: CatalogError) -> ServiceError {
    match err {
        CatalogError::NotFound(id) => ServiceError::NotFound(id),
        other => ServiceError::Remote {
            status: 500,
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl VideoService for MockVideoService {
    async fn list_items(&self, limit: usize) -> Result<Vec<String>, ServiceError> {
        let _guard = InFlight::enter(self.counter(ServiceOperation::ListItems), &self.total);
        self.begin(ServiceOperation::ListItems, None, None).await?;
        Ok(self.catalog.list_ids(limit))
    }

    async fn get_item(&self, item_id: &str) -> Result<ItemMetadata, ServiceError> {
        let _guard = InFlight::enter(self.counter(ServiceOperation::GetItem), &self.total);
        self.begin(ServiceOperation::GetItem, Some(item_id), None)
            .await?;
        self.catalog
            .get(item_id)
            .map(|item| item.metadata())
            .map_err(not_found)
    }

    async fn get_transcript(&self, item_id: &str) -> Result<String, ServiceError> {
        let _guard = InFlight::enter(self.counter(ServiceOperation::GetTranscript), &self.total);
        self.begin(ServiceOperation::GetTranscript, Some(item_id), None)
            .await?;
        self.catalog
            .get(item_id)
            .map(|item| item.transcript)
            .map_err(not_found)
    }

    async fn update_warnings(
        &self,
        item_id: &str,
        warnings: &WarningSet,
    ) -> Result<(), ServiceError> {
        let _guard = InFlight::enter(self.counter(ServiceOperation::UpdateWarnings), &self.total);
        self.begin(ServiceOperation::UpdateWarnings, Some(item_id), Some(warnings))
            .await?;
        self.catalog
            .replace_warnings(item_id, warnings.clone())
            .map_err(not_found)
    }
}

impl std::fmt::Debug for MockVideoService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockVideoService")
            .field("items", &self.catalog.len())
            .field("peak_total_in_flight", &self.peak_total_in_flight())
            .finish_non_exhaustive()
    }
}
