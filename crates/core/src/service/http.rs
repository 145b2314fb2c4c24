//! HTTP client for the video service.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tracing::debug;

use crate::catalog::{ItemMetadata, WarningSet};
use crate::metrics::{SERVICE_REQUESTS, SERVICE_REQUEST_DURATION};

use super::{ClientConfig, ServiceError, ServiceOperation, VideoService};

/// [`VideoService`] over HTTP.
///
/// Endpoints:
/// - `GET /videos?n={limit}`
/// - `GET /videos/{id}`
/// - `GET /videos/{id}/transcript`
/// - `PATCH /videos/{id}` with `{"warnings": [...]}`
///
/// The client itself does not limit concurrency; callers go through the
/// gates.
#[derive(Debug, Clone)]
pub struct HttpVideoService {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct WarningsBody<'a> {
    warnings: &'a WarningSet,
}

impl HttpVideoService {
    pub fn new(config: &ClientConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn item_url(&self, item_id: &str) -> String {
        format!("{}/videos/{}", self.base_url, urlencoding::encode(item_id))
    }

    /// Maps non-success statuses to errors.
    async fn check(response: Response, item_id: &str) -> Result<Response, ServiceError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ServiceError::NotFound(item_id.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ServiceError::Remote {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn get_item_inner(&self, item_id: &str) -> Result<ItemMetadata, ServiceError> {
        let response = self
            .client
            .get(self.item_url(item_id))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = Self::check(response, item_id).await?;
        response
            .json()
            .await
            .map_err(|e| ServiceError::Decode(format!("Failed to parse item: {}", e)))
    }

    async fn get_transcript_inner(&self, item_id: &str) -> Result<String, ServiceError> {
        let url = format!("{}/transcript", self.item_url(item_id));
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = Self::check(response, item_id).await?;
        response
            .text()
            .await
            .map_err(|e| ServiceError::Decode(format!("Failed to read transcript: {}", e)))
    }

    async fn list_items_inner(&self, limit: usize) -> Result<Vec<String>, ServiceError> {
        let response = self
            .client
            .get(format!("{}/videos", self.base_url))
            .query(&[("n", limit)])
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = Self::check(response, "").await?;
        response
            .json()
            .await
            .map_err(|e| ServiceError::Decode(format!("Failed to parse item list: {}", e)))
    }

    async fn update_warnings_inner(
        &self,
        item_id: &str,
        warnings: &WarningSet,
    ) -> Result<(), ServiceError> {
        let response = self
            .client
            .patch(self.item_url(item_id))
            .json(&WarningsBody { warnings })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::check(response, item_id).await?;
        Ok(())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Timeout
    } else if err.is_decode() {
        ServiceError::Decode(err.to_string())
    } else {
        ServiceError::Transport(err.to_string())
    }
}

fn record<T>(operation: ServiceOperation, started: Instant, result: &Result<T, ServiceError>) {
    let status = match result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    };
    SERVICE_REQUEST_DURATION
        .with_label_values(&[operation.as_str(), status])
        .observe(started.elapsed().as_secs_f64());
    SERVICE_REQUESTS
        .with_label_values(&[operation.as_str(), status])
        .inc();
}

#[async_trait]
impl VideoService for HttpVideoService {
    async fn list_items(&self, limit: usize) -> Result<Vec<String>, ServiceError> {
        let started = Instant::now();
        let result = self.list_items_inner(limit).await;
        record(ServiceOperation::ListItems, started, &result);
        debug!(limit, ok = result.is_ok(), "Listed items");
        result
    }

    async fn get_item(&self, item_id: &str) -> Result<ItemMetadata, ServiceError> {
        let started = Instant::now();
        let result = self.get_item_inner(item_id).await;
        record(ServiceOperation::GetItem, started, &result);
        result
    }

    async fn get_transcript(&self, item_id: &str) -> Result<String, ServiceError> {
        let started = Instant::now();
        let result = self.get_transcript_inner(item_id).await;
        record(ServiceOperation::GetTranscript, started, &result);
        result
    }

    async fn update_warnings(
        &self,
        item_id: &str,
        warnings: &WarningSet,
    ) -> Result<(), ServiceError> {
        let started = Instant::now();
        let result = self.update_warnings_inner(item_id, warnings).await;
        record(ServiceOperation::UpdateWarnings, started, &result);
        result
    }
}
