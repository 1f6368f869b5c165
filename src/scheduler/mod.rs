//! Scheduler module for paced, bounded-concurrency task execution.
//!
//! This module provides:
//! - **Batch windows**: run independent tasks in fixed-size concurrent windows
//!   with a pause between windows, keeping input order in the output.
//!
//! The window size bounds in-flight *logical* operations. Raw request spacing
//! is still enforced underneath by the transport's throttle gate.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use tandem::scheduler::run_batched;
//!
//! let tasks: Vec<_> = ids.into_iter().map(|id| move || fetch(id)).collect();
//! let results = run_batched(tasks, 2, Duration::from_millis(500)).await;
//! ```

mod batch;

pub use batch::{BatchConfig, run_batched, run_with_config};
