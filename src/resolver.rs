//! Per-category status resolver.
//!
//! For one category: fetch both partners' completion status, and only when
//! both are done fetch the couple result. Nothing escapes as an error; every
//! path ends in a `CategoryOutcome`, so one broken category cannot take the
//! rest of the dashboard down with it.

use std::sync::Arc;

use log::{debug, warn};

use crate::api::DashboardApi;
use crate::domain::{CategoryOutcome, CategoryStatus, CoupleResult, Failure, Outcome, ResolveStep, SkipReason};

/// Resolves one category at a time against the backend
#[derive(Clone)]
pub struct CategoryResolver {
    api: Arc<dyn DashboardApi>,
}

impl CategoryResolver {
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self { api }
    }

    /// Resolve one category. Never fails; failures degrade to a null score.
    pub async fn resolve(&self, category_id: u64, token: &str) -> CategoryOutcome {
        let status = match self.api.partner_status(token, category_id).await {
            Ok(payload) => CategoryStatus::from_payload(category_id, &payload),
            Err(err) => {
                warn!("Category {} degraded: status fetch failed: {}", category_id, err);
                return CategoryOutcome::status_failed(category_id, Failure::from_api(ResolveStep::Status, &err));
            }
        };

        if !status.both_complete {
            debug!(
                "Category {} not ready (user: {}, partner: {})",
                category_id, status.user_complete, status.partner_complete
            );
            return CategoryOutcome::from_status(
                &status,
                Outcome::Skipped {
                    reason: SkipReason::NotBothComplete,
                },
            );
        }

        if status.corroborated_locally() {
            warn!(
                "Category {}: both sides report complete but server bothComplete is false; fetching result anyway",
                category_id
            );
        }

        let outcome = match self.api.couple_result(token, category_id).await {
            Ok(payload) => match CoupleResult::from_payload(category_id, payload) {
                Some(result) => Outcome::Fetched(result),
                None => {
                    debug!("Category {} result has no score yet", category_id);
                    Outcome::Skipped {
                        reason: SkipReason::ResultNotReady,
                    }
                }
            },
            Err(err) if err.is_not_found() => {
                debug!("Category {} result not available yet", category_id);
                Outcome::Skipped {
                    reason: SkipReason::ResultNotReady,
                }
            }
            Err(err) => {
                warn!("Category {} degraded: result fetch failed: {}", category_id, err);
                Outcome::Failed(Failure::from_api(ResolveStep::Result, &err))
            }
        };

        CategoryOutcome::from_status(&status, outcome)
    }
}

impl std::fmt::Debug for CategoryResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryResolver").finish_non_exhaustive()
    }
}
