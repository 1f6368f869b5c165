//! Backend API over the throttled transport

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::api::client::DashboardApi;
use crate::api::types::{
    Appointment, Category, CoupleInfo, CoupleResultPayload, Invitation, PartnerStatusPayload, UserProfile,
};
use crate::error::ApiError;
use crate::transport::{RemoteCall, RemoteResponse, RetryPolicy, ThrottledTransport};

const PROFILE_PATH: &str = "/api/users/me";
const COUPLE_PATH: &str = "/api/couples/me";
const INVITATION_PATH: &str = "/api/invitations/status";
const CATEGORIES_PATH: &str = "/api/categories";
const APPOINTMENTS_PATH: &str = "/api/appointments";

fn partner_status_path(category_id: u64) -> String {
    format!("/api/categories/{}/partner-status", category_id)
}

fn couple_result_path(category_id: u64) -> String {
    format!("/api/categories/{}/couple-result", category_id)
}

/// `DashboardApi` backed by HTTP calls through the throttled transport
#[derive(Debug, Clone)]
pub struct HttpDashboardApi {
    transport: ThrottledTransport,
    policy: RetryPolicy,
}

impl HttpDashboardApi {
    pub fn new(transport: ThrottledTransport, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    async fn get(&self, token: &str, path: &str) -> Result<RemoteResponse, ApiError> {
        let call = RemoteCall::get(path).bearer(token);
        Ok(self.transport.send(&call, &self.policy).await?)
    }

    /// Fetch and decode a resource that must exist
    async fn fetch<T: DeserializeOwned>(&self, token: &str, path: &str) -> Result<T, ApiError> {
        let response = self.get(token, path).await?;
        decode(path, check_status(path, response)?)
    }

    /// Fetch a resource whose absence is a normal outcome
    async fn fetch_optional<T: DeserializeOwned>(&self, token: &str, path: &str) -> Result<Option<T>, ApiError> {
        let response = self.get(token, path).await?;
        match check_status(path, response) {
            Ok(body) if body.trim().is_empty() => Ok(None),
            Ok(body) => decode(path, body),
            Err(ApiError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Map a response to its body, or to the matching error
fn check_status(path: &str, response: RemoteResponse) -> Result<String, ApiError> {
    if response.is_success() {
        return Ok(response.body);
    }

    let endpoint = path.to_string();
    if response.is_rate_limited() {
        return Err(ApiError::RateLimited {
            endpoint,
            retry_after: response.retry_after(),
        });
    }
    if response.status == 404 {
        return Err(ApiError::NotFound { endpoint });
    }
    Err(ApiError::Status {
        endpoint,
        status: response.status,
        body: response.body,
    })
}

fn decode<T: DeserializeOwned>(path: &str, body: String) -> Result<T, ApiError> {
    serde_json::from_str(&body).map_err(|source| ApiError::Decode {
        endpoint: path.to_string(),
        source,
    })
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn profile(&self, token: &str) -> Result<UserProfile, ApiError> {
        self.fetch(token, PROFILE_PATH).await
    }

    async fn couple(&self, token: &str) -> Result<Option<CoupleInfo>, ApiError> {
        self.fetch_optional(token, COUPLE_PATH).await
    }

    async fn invitation(&self, token: &str) -> Result<Option<Invitation>, ApiError> {
        self.fetch_optional(token, INVITATION_PATH).await
    }

    async fn categories(&self, token: &str) -> Result<Vec<Category>, ApiError> {
        self.fetch(token, CATEGORIES_PATH).await
    }

    async fn partner_status(&self, token: &str, category_id: u64) -> Result<PartnerStatusPayload, ApiError> {
        self.fetch(token, &partner_status_path(category_id)).await
    }

    async fn couple_result(&self, token: &str, category_id: u64) -> Result<CoupleResultPayload, ApiError> {
        self.fetch(token, &couple_result_path(category_id)).await
    }

    async fn appointments(&self, token: &str) -> Result<Vec<Appointment>, ApiError> {
        self.fetch(token, APPOINTMENTS_PATH).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{DispatchError, Dispatcher, ThrottleGate};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Serves canned responses per path and records the calls it saw
    #[derive(Default)]
    struct RoutedDispatcher {
        routes: HashMap<String, Result<RemoteResponse, DispatchError>>,
        seen: Mutex<Vec<RemoteCall>>,
    }

    impl RoutedDispatcher {
        fn route(mut self, path: &str, status: u16, body: &str) -> Self {
            self.routes.insert(path.to_string(), Ok(RemoteResponse::new(status, body)));
            self
        }

        fn route_response(mut self, path: &str, response: RemoteResponse) -> Self {
            self.routes.insert(path.to_string(), Ok(response));
            self
        }

        fn fail(mut self, path: &str) -> Self {
            self.routes
                .insert(path.to_string(), Err(DispatchError("connection refused".to_string())));
            self
        }
    }

    #[async_trait]
    impl Dispatcher for RoutedDispatcher {
        async fn dispatch(&self, call: &RemoteCall) -> Result<RemoteResponse, DispatchError> {
            self.seen.lock().unwrap().push(call.clone());
            self.routes
                .get(call.target())
                .cloned()
                .unwrap_or_else(|| Ok(RemoteResponse::new(404, "")))
        }
    }

    fn api(dispatcher: Arc<RoutedDispatcher>) -> HttpDashboardApi {
        let gate = Arc::new(ThrottleGate::new(Duration::from_millis(1)));
        let transport = ThrottledTransport::new(dispatcher, gate);
        HttpDashboardApi::new(transport, RetryPolicy::new(2, Duration::from_millis(1)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_profile_sends_bearer_token() {
        let dispatcher = Arc::new(RoutedDispatcher::default().route(
            PROFILE_PATH,
            200,
            r#"{"id": 9, "email": "jo@example.com"}"#,
        ));
        let api = api(dispatcher.clone());

        let user = api.profile("tok-123").await.unwrap();

        assert_eq!(user.id, 9);
        let seen = dispatcher.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].target(), PROFILE_PATH);
        assert!(
            seen[0]
                .headers()
                .iter()
                .any(|(k, v)| k == "Authorization" && v == "Bearer tok-123")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unpaired_is_none() {
        let api = api(Arc::new(RoutedDispatcher::default()));
        assert_eq!(api.couple("t").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_optional_null_and_empty_bodies() {
        let dispatcher = Arc::new(
            RoutedDispatcher::default()
                .route(COUPLE_PATH, 200, "null")
                .route(INVITATION_PATH, 200, "  "),
        );
        let api = api(dispatcher);
        assert_eq!(api.couple("t").await.unwrap(), None);
        assert_eq!(api.invitation("t").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invitation_present() {
        let dispatcher = Arc::new(RoutedDispatcher::default().route(
            INVITATION_PATH,
            200,
            r#"{"id": 4, "status": "pending", "inviteeEmail": "p@example.com"}"#,
        ));
        let invitation = api(dispatcher).invitation("t").await.unwrap().unwrap();
        assert_eq!(invitation.status, "pending");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_maps_to_error() {
        let dispatcher = Arc::new(RoutedDispatcher::default().route_response(
            &partner_status_path(3),
            RemoteResponse::new(429, "").with_header("Retry-After", "12"),
        ));
        let err = api(dispatcher.clone()).partner_status("t", 3).await.unwrap_err();

        match err {
            ApiError::RateLimited { endpoint, retry_after } => {
                assert_eq!(endpoint, "/api/categories/3/partner-status");
                assert_eq!(retry_after, Some(Duration::from_secs(12)));
            }
            other => panic!("expected rate limit, got {:?}", other),
        }
        assert_eq!(dispatcher.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_required_resource_not_found() {
        let err = api(Arc::new(RoutedDispatcher::default()))
            .couple_result("t", 5)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_error_status() {
        let dispatcher = Arc::new(RoutedDispatcher::default().route(CATEGORIES_PATH, 500, "oops"));
        let err = api(dispatcher).categories("t").await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_decode_error() {
        let dispatcher = Arc::new(RoutedDispatcher::default().route(APPOINTMENTS_PATH, 200, "{not json"));
        let err = api(dispatcher).appointments("t").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_is_retried_then_surfaces() {
        let dispatcher = Arc::new(RoutedDispatcher::default().fail(PROFILE_PATH));
        let err = api(dispatcher.clone()).profile("t").await.unwrap_err();

        assert!(err.is_transport());
        assert_eq!(dispatcher.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_categories_decode() {
        let dispatcher = Arc::new(RoutedDispatcher::default().route(
            CATEGORIES_PATH,
            200,
            r#"[{"id": 1, "name": "Communication", "progress": 50, "isComplete": false}]"#,
        ));
        let cats = api(dispatcher).categories("t").await.unwrap();
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].name, "Communication");
        assert_eq!(cats[0].progress, 50.0);
    }
}
