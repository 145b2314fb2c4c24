//! Testing utilities and mock implementations.
//!
//! [`MockVideoService`] stands in for the remote video service so pipelines
//! and orchestrators can be exercised without a network.
//!
//! # Example
//!
//! ```rust,ignore
//! use vidwarn_core::testing::{fixtures, MockVideoService};
//!
//! let service = MockVideoService::with_items(fixtures::items(20));
//!
//! // Configure mock behavior
//! service.set_latency(ServiceOperation::GetTranscript, Duration::from_millis(5)).await;
//! service.fail_item(ServiceOperation::GetItem, "missing", ServiceError::Timeout).await;
//!
//! // Build an orchestrator around Arc::new(service)...
//! ```

mod mock_video_service;

pub use mock_video_service::{MockVideoService, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::NaiveDate;

    use crate::catalog::{Item, WarningSet};

    /// Create a test item whose title is its id and whose transcript is
    /// `transcript`.
    pub fn item(id: &str, transcript: &str) -> Item {
        Item {
            id: id.to_string(),
            title: id.to_string(),
            description: format!("Description of {}", id),
            transcript: transcript.to_string(),
            upload_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            views: 100,
            warnings: WarningSet::new(),
        }
    }

    /// Create a test item that already carries warnings.
    pub fn item_with_warnings(id: &str, transcript: &str, warnings: &[&str]) -> Item {
        let mut item = item(id, transcript);
        item.warnings = warnings.iter().copied().collect();
        item
    }

    /// Create `count` items named `item-0000`, `item-0001`, ... with neutral
    /// transcripts.
    pub fn items(count: usize) -> Vec<Item> {
        (0..count)
            .map(|i| item(&format!("item-{:04}", i), "a calm walk through the park"))
            .collect()
    }
}
