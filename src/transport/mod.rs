//! Throttled Transport - the single path every backend call takes
//!
//! This module provides:
//! - `RemoteCall` / `RemoteResponse` request and response descriptions
//! - `ThrottleGate` for global minimum spacing between dispatches
//! - `RetryPolicy` for bounded exponential backoff on network failures
//! - `Dispatcher` trait and the reqwest-backed `HttpDispatcher`
//! - `ThrottledTransport`, which ties them together
//!
//! Policy: network failures are retried with backoff. A rate-limit response
//! is handed straight back to the caller and never retried here.

pub mod call;
pub mod http;
pub mod retry;
pub mod throttle;

use std::sync::Arc;

use tokio::time::sleep;

use crate::error::TransportError;

pub use call::{Method, RATE_LIMIT_STATUS, RemoteCall, RemoteResponse};
pub use http::{DispatchError, Dispatcher, HttpDispatcher};
pub use retry::RetryPolicy;
pub use throttle::{DEFAULT_MIN_INTERVAL, ThrottleGate};

/// Dispatcher wrapped in the global throttle gate and retry policy
#[derive(Clone)]
pub struct ThrottledTransport {
    dispatcher: Arc<dyn Dispatcher>,
    gate: Arc<ThrottleGate>,
}

impl ThrottledTransport {
    pub fn new(dispatcher: Arc<dyn Dispatcher>, gate: Arc<ThrottleGate>) -> Self {
        Self { dispatcher, gate }
    }

    pub fn gate(&self) -> &Arc<ThrottleGate> {
        &self.gate
    }

    /// Send one call.
    ///
    /// Each attempt, retries included, passes through the throttle gate.
    /// Any response (success, error status, or rate limit) is returned as-is;
    /// only dispatch failures are retried, up to `policy.max_attempts`.
    pub async fn send(&self, call: &RemoteCall, policy: &RetryPolicy) -> Result<RemoteResponse, TransportError> {
        let mut attempt: u32 = 1;

        loop {
            self.gate.acquire().await;
            tracing::debug!(
                method = call.method().as_str(),
                path = call.target(),
                attempt = attempt,
                "Dispatching call"
            );

            match self.dispatcher.dispatch(call).await {
                Ok(response) => {
                    if response.is_rate_limited() {
                        tracing::warn!(
                            path = call.target(),
                            retry_after_secs = response.retry_after().map(|d| d.as_secs()),
                            "Rate limited by backend, not retrying"
                        );
                    }
                    return Ok(response);
                }
                Err(err) if policy.should_retry(attempt) => {
                    let delay = policy.delay_for(attempt);
                    tracing::warn!(
                        path = call.target(),
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Network failure, backing off"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        path = call.target(),
                        attempts = attempt,
                        error = %err,
                        "Network failure, retries exhausted"
                    );
                    return Err(TransportError::Exhausted {
                        attempts: attempt,
                        message: err.0,
                    });
                }
            }
        }
    }
}

impl std::fmt::Debug for ThrottledTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThrottledTransport")
            .field("min_interval", &self.gate.min_interval())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Plays back a fixed script of dispatch results and records dispatch times
    struct ScriptedDispatcher {
        script: Mutex<VecDeque<Result<RemoteResponse, DispatchError>>>,
        fallback: Result<RemoteResponse, DispatchError>,
        dispatched: Mutex<Vec<Instant>>,
    }

    impl ScriptedDispatcher {
        fn new(
            script: Vec<Result<RemoteResponse, DispatchError>>,
            fallback: Result<RemoteResponse, DispatchError>,
        ) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback,
                dispatched: Mutex::new(Vec::new()),
            }
        }

        fn always(result: Result<RemoteResponse, DispatchError>) -> Self {
            Self::new(Vec::new(), result)
        }

        fn dispatch_count(&self) -> usize {
            self.dispatched.lock().unwrap().len()
        }

        fn stamps(&self) -> Vec<Instant> {
            self.dispatched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Dispatcher for ScriptedDispatcher {
        async fn dispatch(&self, _call: &RemoteCall) -> Result<RemoteResponse, DispatchError> {
            self.dispatched.lock().unwrap().push(Instant::now());
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| self.fallback.clone())
        }
    }

    fn network_error() -> Result<RemoteResponse, DispatchError> {
        Err(DispatchError("connection reset".to_string()))
    }

    fn transport(dispatcher: Arc<ScriptedDispatcher>, min_interval_ms: u64) -> ThrottledTransport {
        let gate = Arc::new(ThrottleGate::new(Duration::from_millis(min_interval_ms)));
        ThrottledTransport::new(dispatcher, gate)
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_is_single_dispatch() {
        let dispatcher = Arc::new(ScriptedDispatcher::always(Ok(RemoteResponse::new(200, "{}"))));
        let transport = transport(dispatcher.clone(), 500);

        let resp = transport
            .send(&RemoteCall::get("/api/users/me"), &RetryPolicy::default())
            .await
            .unwrap();

        assert_eq!(resp.status, 200);
        assert_eq!(dispatcher.dispatch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_is_never_retried() {
        let limited = RemoteResponse::new(429, "slow down").with_header("Retry-After", "30");
        let dispatcher = Arc::new(ScriptedDispatcher::always(Ok(limited.clone())));
        let transport = transport(dispatcher.clone(), 500);

        let policy = RetryPolicy::new(5, Duration::from_millis(100));
        let resp = transport.send(&RemoteCall::get("/api/categories"), &policy).await.unwrap();

        assert_eq!(resp, limited);
        assert_eq!(dispatcher.dispatch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_status_is_not_retried() {
        let dispatcher = Arc::new(ScriptedDispatcher::always(Ok(RemoteResponse::new(503, "down"))));
        let transport = transport(dispatcher.clone(), 500);

        let resp = transport
            .send(&RemoteCall::get("/api/categories"), &RetryPolicy::default())
            .await
            .unwrap();

        assert_eq!(resp.status, 503);
        assert_eq!(dispatcher.dispatch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_before_success() {
        let dispatcher = Arc::new(ScriptedDispatcher::new(
            vec![network_error(), network_error()],
            Ok(RemoteResponse::new(200, "[]")),
        ));
        let transport = transport(dispatcher.clone(), 10);
        let policy = RetryPolicy::new(4, Duration::from_millis(100));

        let start = Instant::now();
        let resp = transport.send(&RemoteCall::get("/api/appointments"), &policy).await.unwrap();

        assert_eq!(resp.status, 200);
        assert_eq!(dispatcher.dispatch_count(), 3);
        // 100ms after the first failure, 200ms after the second
        assert!(Instant::now() - start >= Duration::from_millis(300));

        let stamps = dispatcher.stamps();
        assert!(stamps[1] - stamps[0] >= Duration::from_millis(100));
        assert!(stamps[2] - stamps[1] >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_exhausted() {
        let dispatcher = Arc::new(ScriptedDispatcher::always(network_error()));
        let transport = transport(dispatcher.clone(), 10);
        let policy = RetryPolicy::new(3, Duration::from_millis(50));

        let err = transport
            .send(&RemoteCall::get("/api/users/me"), &policy)
            .await
            .unwrap_err();

        assert_eq!(err.attempts(), 3);
        assert_eq!(dispatcher.dispatch_count(), 3);
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_pass_through_gate() {
        let dispatcher = Arc::new(ScriptedDispatcher::new(
            vec![network_error()],
            Ok(RemoteResponse::new(200, "{}")),
        ));
        // Gate interval longer than the backoff: the retry still waits for the gate
        let transport = transport(dispatcher.clone(), 1000);
        let policy = RetryPolicy::new(2, Duration::from_millis(10));

        transport.send(&RemoteCall::get("/api/users/me"), &policy).await.unwrap();

        let stamps = dispatcher.stamps();
        assert_eq!(stamps.len(), 2);
        assert!(stamps[1] - stamps[0] >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_sends_share_gate() {
        let dispatcher = Arc::new(ScriptedDispatcher::always(Ok(RemoteResponse::new(200, "{}"))));
        let transport = transport(dispatcher.clone(), 500);
        let policy = RetryPolicy::default();

        let calls: Vec<RemoteCall> = (0..5).map(|i| RemoteCall::get(format!("/api/categories/{}", i))).collect();
        let sends = calls.iter().map(|call| transport.send(call, &policy));
        let results = futures::future::join_all(sends).await;

        assert!(results.iter().all(|r| r.is_ok()));
        let stamps = dispatcher.stamps();
        assert_eq!(stamps.len(), 5);
        for pair in stamps.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(500));
        }
    }
}
