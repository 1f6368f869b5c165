//! Dashboard view model and summary metrics

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::types::{Appointment, Category, CoupleInfo, Invitation, UserProfile};
use crate::domain::category::{CategoryOutcome, Outcome, ResolveState, SkipReason};

/// One category row: catalog metadata merged with its resolved outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryView {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    /// Catalog progress for the user
    pub progress: f64,
    pub score: Option<f64>,
    pub attempts: u32,
    pub user_completed: bool,
    pub partner_completed: bool,
    pub last_taken_date: Option<DateTime<Utc>>,
    pub state: ResolveState,
    pub outcome: Outcome,
}

impl CategoryView {
    pub fn merge(category: &Category, outcome: CategoryOutcome) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            description: category.description.clone(),
            color: category.color.clone(),
            progress: category.progress,
            score: outcome.score(),
            attempts: outcome.attempts(),
            // The catalog knows the user's own completion even when the status fetch failed
            user_completed: outcome.user_completed || category.is_complete,
            partner_completed: outcome.partner_completed,
            last_taken_date: outcome.last_taken_date(),
            state: outcome.state(),
            outcome: outcome.outcome,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.score.is_none()
    }
}

/// Scalars derived from the category rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_categories: usize,
    /// Categories with a score
    pub completed_count: usize,
    pub pending_count: usize,
    /// Rounded mean of all present scores, 0 when there are none
    pub overall_compatibility: u32,
    /// Categories the user has started, per catalog progress
    pub total_attempts: usize,
}

impl DashboardSummary {
    pub fn from_rows(categories: &[Category], rows: &[CategoryView]) -> Self {
        let scores: Vec<f64> = rows.iter().filter_map(|r| r.score).collect();
        let completed_count = scores.len();
        let total_categories = rows.len();

        Self {
            total_categories,
            completed_count,
            pending_count: total_categories - completed_count,
            overall_compatibility: mean_rounded(&scores),
            total_attempts: categories.iter().filter(|c| c.progress > 0.0).count(),
        }
    }
}

fn mean_rounded(scores: &[f64]) -> u32 {
    if scores.is_empty() {
        return 0;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    mean.round().max(0.0) as u32
}

/// Everything the dashboard renders, built fresh on every load
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardViewModel {
    pub user: UserProfile,
    pub couple: Option<CoupleInfo>,
    pub invitation: Option<Invitation>,
    pub categories: Vec<CategoryView>,
    pub appointments: Vec<Appointment>,
    pub summary: DashboardSummary,
}

impl DashboardViewModel {
    /// Merge the catalog with per-category outcomes.
    ///
    /// Outcomes are matched to catalog entries by category id; a catalog
    /// entry with no outcome is treated as not yet resolved.
    pub fn build(
        user: UserProfile,
        couple: Option<CoupleInfo>,
        invitation: Option<Invitation>,
        catalog: Vec<Category>,
        outcomes: Vec<CategoryOutcome>,
        appointments: Vec<Appointment>,
    ) -> Self {
        let mut outcomes = outcomes;
        let rows: Vec<CategoryView> = catalog
            .iter()
            .map(|category| {
                let outcome = match outcomes.iter().position(|o| o.category_id == category.id) {
                    Some(idx) => outcomes.swap_remove(idx),
                    None => CategoryOutcome {
                        category_id: category.id,
                        user_completed: false,
                        partner_completed: false,
                        progress: category.progress,
                        outcome: Outcome::Skipped {
                            reason: SkipReason::NotBothComplete,
                        },
                    },
                };
                CategoryView::merge(category, outcome)
            })
            .collect();

        let summary = DashboardSummary::from_rows(&catalog, &rows);

        Self {
            user,
            couple,
            invitation,
            categories: rows,
            appointments,
            summary,
        }
    }

    pub fn is_paired(&self) -> bool {
        self.couple.is_some()
    }

    /// Categories whose resolution failed (as opposed to not being ready)
    pub fn degraded_categories(&self) -> impl Iterator<Item = &CategoryView> {
        self.categories
            .iter()
            .filter(|c| matches!(c.state, ResolveState::StatusFailed | ResolveState::ResultFailed))
    }
}
