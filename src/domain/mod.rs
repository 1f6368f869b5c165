//! Domain types for Tandem
//!
//! This module contains the per-run data the dashboard is assembled from:
//! - CategoryStatus / CoupleResult: what the two per-category lookups return
//! - Outcome / CategoryOutcome: the tagged result of resolving one category
//! - DashboardViewModel: the merged view with its summary metrics
//!
//! Nothing here outlives the load that created it.

pub mod category;
pub mod dashboard;

pub use category::{
    CategoryOutcome, CategoryStatus, CoupleResult, Failure, FailureKind, Outcome, ResolveState, ResolveStep,
    SkipReason,
};
pub use dashboard::{CategoryView, DashboardSummary, DashboardViewModel};
