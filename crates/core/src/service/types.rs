//! Types shared by service clients.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operations exposed by the remote video service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceOperation {
    ListItems,
    GetItem,
    GetTranscript,
    UpdateWarnings,
}

impl ServiceOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListItems => "list_items",
            Self::GetItem => "get_item",
            Self::GetTranscript => "get_transcript",
            Self::UpdateWarnings => "update_warnings",
        }
    }
}

impl std::fmt::Display for ServiceOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the remote video service.
///
/// Slow responses are never errors: overload shows up as latency only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The item (or its transcript) does not exist.
    #[error("item not found: {0}")]
    NotFound(String),

    /// Connection-level failure.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The request timed out.
    #[error("request timed out")]
    Timeout,

    /// The service answered with an unexpected status.
    #[error("remote error (HTTP {status}): {message}")]
    Remote { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Transport(_) => "transport",
            Self::Timeout => "timeout",
            Self::Remote { .. } => "remote",
            Self::Decode(_) => "decode",
        }
    }
}
