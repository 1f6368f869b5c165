//! Backend operation trait
//!
//! One method per logical backend operation the dashboard consumes. Every
//! method takes the caller's bearer token; token acquisition is not ours.

use async_trait::async_trait;

use crate::api::types::{
    Appointment, Category, CoupleInfo, CoupleResultPayload, Invitation, PartnerStatusPayload, UserProfile,
};
use crate::error::ApiError;

#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Current user profile
    async fn profile(&self, token: &str) -> Result<UserProfile, ApiError>;

    /// Pairing info; `None` when the user is not paired
    async fn couple(&self, token: &str) -> Result<Option<CoupleInfo>, ApiError>;

    /// Invitation state; `None` when there is no invitation
    async fn invitation(&self, token: &str) -> Result<Option<Invitation>, ApiError>;

    /// Category catalog
    async fn categories(&self, token: &str) -> Result<Vec<Category>, ApiError>;

    /// Completion status of both sides for one category
    async fn partner_status(&self, token: &str, category_id: u64) -> Result<PartnerStatusPayload, ApiError>;

    /// Couple result for one category; only meaningful once both sides are done
    async fn couple_result(&self, token: &str, category_id: u64) -> Result<CoupleResultPayload, ApiError>;

    /// Appointment summaries
    async fn appointments(&self, token: &str) -> Result<Vec<Appointment>, ApiError>;
}
