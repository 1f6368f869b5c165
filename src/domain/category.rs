//! Per-category status, result, and outcome types.
//!
//! A category's compatibility result only exists once both partners have
//! finished it. `Outcome` keeps "not applicable yet" apart from "fetch
//! failed", even though both display as a pending category.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::types::{CoupleResultPayload, PartnerStatusPayload};
use crate::error::ApiError;

/// Completion state of both sides for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStatus {
    pub category_id: u64,
    pub user_complete: bool,
    pub partner_complete: bool,
    /// Server flag OR both local flags.
    pub both_complete: bool,
    /// The server's own combined flag, kept to spot disagreement.
    pub server_both_complete: bool,
    pub progress: f64,
}

impl CategoryStatus {
    pub fn from_payload(category_id: u64, payload: &PartnerStatusPayload) -> Self {
        let user_complete = payload.user_status.completed;
        let partner_complete = payload.partner_status.completed;

        Self {
            category_id,
            user_complete,
            partner_complete,
            // FIXME: confirm with the backend whether bothComplete can lag the per-side flags
            both_complete: payload.both_complete || (user_complete && partner_complete),
            server_both_complete: payload.both_complete,
            progress: payload.user_status.progress,
        }
    }

    /// True when the local flags claim completion but the server flag does not.
    pub fn corroborated_locally(&self) -> bool {
        self.both_complete && !self.server_both_complete
    }
}

/// Compatibility result for a category both partners have finished.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoupleResult {
    pub category_id: u64,
    pub score: f64,
    pub compatibility_score: Option<f64>,
    pub emotional_score: Option<f64>,
    pub attempt_count: u32,
    pub insights: Vec<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CoupleResult {
    /// `None` unless the payload carries a score.
    pub fn from_payload(category_id: u64, payload: CoupleResultPayload) -> Option<Self> {
        let result = payload.result?;
        Some(Self {
            category_id,
            score: result.score?,
            compatibility_score: result.compatibility_score,
            emotional_score: result.emotional_score,
            attempt_count: payload.attempt,
            insights: result.insights,
            updated_at: result.updated_at,
        })
    }
}

/// Which of the resolver's two calls a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveStep {
    Status,
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    RateLimited,
    Transport,
    Status,
    Decode,
}

/// Why a category's result fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub step: ResolveStep,
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn from_api(step: ResolveStep, err: &ApiError) -> Self {
        let kind = match err {
            ApiError::RateLimited { .. } => FailureKind::RateLimited,
            ApiError::Transport(_) => FailureKind::Transport,
            ApiError::Decode { .. } => FailureKind::Decode,
            ApiError::NotFound { .. } | ApiError::Status { .. } => FailureKind::Status,
        };
        Self {
            step,
            kind,
            message: err.to_string(),
        }
    }
}

/// Why no result fetch was made (or why its absence is expected).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// At least one partner has not finished the category
    NotBothComplete,
    /// Result endpoint had nothing yet even though both sides look done
    ResultNotReady,
}

/// Tagged per-category result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Fetched(CoupleResult),
    Skipped { reason: SkipReason },
    Failed(Failure),
}

/// Terminal state of one resolver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveState {
    StatusFailed,
    SkippedNotReady,
    ResultFetched,
    ResultFailed,
}

/// Merged per-category record the dashboard is built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryOutcome {
    pub category_id: u64,
    pub user_completed: bool,
    pub partner_completed: bool,
    pub progress: f64,
    pub outcome: Outcome,
}

impl CategoryOutcome {
    /// Status fetch failed: nothing is known about either side.
    pub fn status_failed(category_id: u64, failure: Failure) -> Self {
        Self {
            category_id,
            user_completed: false,
            partner_completed: false,
            progress: 0.0,
            outcome: Outcome::Failed(failure),
        }
    }

    /// Status known; `outcome` describes what happened to the result.
    pub fn from_status(status: &CategoryStatus, outcome: Outcome) -> Self {
        Self {
            category_id: status.category_id,
            user_completed: status.user_complete,
            partner_completed: status.partner_complete,
            progress: status.progress,
            outcome,
        }
    }

    /// Score to display; `None` for every non-fetched outcome.
    pub fn score(&self) -> Option<f64> {
        match &self.outcome {
            Outcome::Fetched(result) => Some(result.score),
            _ => None,
        }
    }

    pub fn attempts(&self) -> u32 {
        match &self.outcome {
            Outcome::Fetched(result) => result.attempt_count,
            _ => 0,
        }
    }

    pub fn last_taken_date(&self) -> Option<DateTime<Utc>> {
        match &self.outcome {
            Outcome::Fetched(result) => result.updated_at,
            _ => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }

    pub fn state(&self) -> ResolveState {
        match &self.outcome {
            Outcome::Fetched(_) => ResolveState::ResultFetched,
            Outcome::Skipped { .. } => ResolveState::SkippedNotReady,
            Outcome::Failed(f) if f.step == ResolveStep::Status => ResolveState::StatusFailed,
            Outcome::Failed(_) => ResolveState::ResultFailed,
        }
    }
}
