//! Tandem - client-side request orchestration for the couples dashboard
//!
//! Tandem loads the dashboard from a rate-limited backend. Every call goes
//! through one globally throttled transport. Network failures are retried
//! with backoff and rate-limit responses are never retried. Per-category
//! lookups run in paced batches, and each category degrades on its own
//! instead of failing the whole load.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod pipeline;
pub mod resolver;
pub mod scheduler;
pub mod transport;

pub use error::{ApiError, LoadError, Result, TransportError};
