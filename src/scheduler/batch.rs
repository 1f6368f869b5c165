//! Windowed batch execution.
//!
//! Tasks run in consecutive windows of at most `batch_size`. Everything in a
//! window runs concurrently; the scheduler pauses `inter_batch_delay` between
//! windows. Output index `i` is always the result of input task `i`.

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::sleep;

/// Window size and pause between windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Max tasks in flight at once (0 behaves like 1).
    pub batch_size: usize,
    /// Pause after each window except the last.
    pub inter_batch_delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1,
            inter_batch_delay: Duration::from_millis(1000),
        }
    }
}

impl BatchConfig {
    pub fn new(batch_size: usize, inter_batch_delay: Duration) -> Self {
        Self {
            batch_size,
            inter_batch_delay,
        }
    }

    /// Number of windows needed for `task_count` tasks.
    pub fn window_count(&self, task_count: usize) -> usize {
        task_count.div_ceil(self.batch_size.max(1))
    }
}

/// Run `tasks` in windows and collect every output in input order.
///
/// Tasks that fail should return their error as a value (`T = Result<_, _>`);
/// one task's failure never stops the remaining windows.
pub async fn run_batched<T, F, Fut>(tasks: Vec<F>, batch_size: usize, inter_batch_delay: Duration) -> Vec<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    let batch_size = batch_size.max(1);
    let total = tasks.len();
    let mut results = Vec::with_capacity(total);
    let mut pending = tasks.into_iter().peekable();
    let mut window_index = 0usize;

    while pending.peek().is_some() {
        let window: Vec<Fut> = pending.by_ref().take(batch_size).map(|task| task()).collect();
        tracing::debug!(window = window_index, size = window.len(), total = total, "Running batch window");

        results.extend(join_all(window).await);
        window_index += 1;

        if pending.peek().is_some() && !inter_batch_delay.is_zero() {
            sleep(inter_batch_delay).await;
        }
    }

    results
}

/// Same as [`run_batched`] with the knobs taken from a `BatchConfig`.
pub async fn run_with_config<T, F, Fut>(tasks: Vec<F>, config: &BatchConfig) -> Vec<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    tracing::debug!(
        tasks = tasks.len(),
        windows = config.window_count(tasks.len()),
        "Scheduling batched tasks"
    );
    run_batched(tasks, config.batch_size, config.inter_batch_delay).await
}
