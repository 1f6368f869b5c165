//! Error types for Tandem
//!
//! Centralized error handling using thiserror. Errors are layered the way
//! requests are: the transport knows nothing about endpoints, the API layer
//! knows nothing about pipeline stages, and only `LoadError` crosses the
//! pipeline boundary.

use std::time::Duration;

use thiserror::Error;

use crate::pipeline::Stage;

/// Failure with no response from the backend.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Every attempt allowed by the retry policy failed before a response arrived
    #[error("Network error after {attempts} attempt(s): {message}")]
    Exhausted { attempts: u32, message: String },
}

impl TransportError {
    /// Number of dispatches made before giving up
    pub fn attempts(&self) -> u32 {
        match self {
            TransportError::Exhausted { attempts, .. } => *attempts,
        }
    }
}

/// Errors from a single typed backend operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Backend answered with the rate-limit status; never retried locally
    #[error("Rate limited on {endpoint}, retry after {retry_after:?}")]
    RateLimited {
        endpoint: String,
        retry_after: Option<Duration>,
    },

    /// Resource does not exist (or does not exist yet)
    #[error("Not found: {endpoint}")]
    NotFound { endpoint: String },

    /// Any other non-2xx response
    #[error("API error {status} on {endpoint}: {body}")]
    Status { endpoint: String, status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("Invalid response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ApiError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

/// Whole-dashboard load failures. Any of these means no dashboard is shown.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No bearer token was supplied by the auth collaborator
    #[error("No access token available")]
    MissingToken,

    /// A prerequisite stage (identity, pairing, catalog, ...) failed
    #[error("Failed to load dashboard: {stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: ApiError,
    },

    /// A stage finished without producing the data later stages need
    #[error("Failed to load dashboard: {0} stage produced no data")]
    Incomplete(Stage),

    /// The caller-supplied deadline elapsed before the load finished
    #[error("Failed to load dashboard: deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

impl LoadError {
    /// The stage that failed, if the failure came from a stage
    pub fn stage(&self) -> Option<Stage> {
        match self {
            LoadError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, LoadError::Stage { source, .. } if source.is_rate_limit())
    }
}

/// Result type alias for dashboard loads
pub type Result<T> = std::result::Result<T, LoadError>;
