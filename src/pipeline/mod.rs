//! Aggregation Pipeline - the whole-dashboard load
//!
//! A load runs in stages:
//! 1. Profile, pairing, invitation, catalog, and appointments, one after
//!    another with a fixed pacing delay between them. Any failure here is
//!    fatal to the load.
//! 2. A paced fan-out of the per-category resolver over the catalog. Failures
//!    here only degrade the affected category.
//! 3. Merge into a `DashboardViewModel` and derive the summary metrics.

mod loader;
mod stage;

pub use loader::DashboardLoader;
pub use stage::{DEFAULT_STAGE_DELAY, LOAD_STAGES, PipelineConfig, Stage};
