//! Dashboard loader - runs the whole aggregation for one session.
//!
//! The loader holds no session lock: callers must not run two loads for the
//! same session at once. A retry from the user re-runs `load()` from scratch.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::{sleep, timeout};

use crate::api::{Appointment, Category, CoupleInfo, DashboardApi, Invitation, UserProfile};
use crate::domain::{CategoryOutcome, DashboardViewModel};
use crate::error::{ApiError, LoadError, Result};
use crate::pipeline::stage::{LOAD_STAGES, PipelineConfig, Stage};
use crate::resolver::CategoryResolver;
use crate::scheduler::run_with_config;

/// Data gathered stage by stage
#[derive(Debug, Default)]
struct Collected {
    user: Option<UserProfile>,
    couple: Option<CoupleInfo>,
    invitation: Option<Invitation>,
    categories: Vec<Category>,
    appointments: Vec<Appointment>,
    outcomes: Vec<CategoryOutcome>,
}

/// Aggregation pipeline entry point
pub struct DashboardLoader {
    api: Arc<dyn DashboardApi>,
    resolver: CategoryResolver,
    config: PipelineConfig,
}

impl DashboardLoader {
    pub fn new(api: Arc<dyn DashboardApi>, config: PipelineConfig) -> Self {
        let resolver = CategoryResolver::new(api.clone());
        Self { api, resolver, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the dashboard, bounded by the configured deadline if any.
    pub async fn load(&self, token: &str) -> Result<DashboardViewModel> {
        self.load_with_deadline(token, self.config.deadline).await
    }

    /// Load the dashboard with an explicit deadline (`None` = unbounded).
    pub async fn load_with_deadline(&self, token: &str, deadline: Option<Duration>) -> Result<DashboardViewModel> {
        if token.trim().is_empty() {
            warn!("Dashboard load refused: no access token");
            return Err(LoadError::MissingToken);
        }

        match deadline {
            Some(limit) => timeout(limit, self.run(token)).await.map_err(|_| {
                warn!("Dashboard load exceeded deadline of {:?}", limit);
                LoadError::DeadlineExceeded(limit)
            })?,
            None => self.run(token).await,
        }
    }

    async fn run(&self, token: &str) -> Result<DashboardViewModel> {
        let mut collected = Collected::default();

        for (index, stage) in LOAD_STAGES.iter().enumerate() {
            if index > 0 {
                self.pace().await;
            }
            info!("Loading {}", stage);
            self.run_stage(*stage, token, &mut collected).await.map_err(|source| {
                warn!("Dashboard load failed at {} stage: {}", stage, source);
                LoadError::Stage { stage: *stage, source }
            })?;
            info!("Loaded {}", stage);
        }

        let user = collected.user.ok_or(LoadError::Incomplete(Stage::Profile))?;
        let view = DashboardViewModel::build(
            user,
            collected.couple,
            collected.invitation,
            collected.categories,
            collected.outcomes,
            collected.appointments,
        );

        info!(
            "Dashboard loaded: {} categories, {} scored, overall compatibility {}",
            view.summary.total_categories, view.summary.completed_count, view.summary.overall_compatibility
        );
        Ok(view)
    }

    async fn run_stage(&self, stage: Stage, token: &str, collected: &mut Collected) -> std::result::Result<(), ApiError> {
        match stage {
            Stage::Profile => collected.user = Some(self.api.profile(token).await?),
            Stage::Couple => {
                collected.couple = self.api.couple(token).await?;
                if collected.couple.is_none() {
                    debug!("User is not paired");
                }
            }
            Stage::Invitation => collected.invitation = self.api.invitation(token).await?,
            Stage::Categories => collected.categories = self.api.categories(token).await?,
            Stage::Appointments => collected.appointments = self.api.appointments(token).await?,
            // Per-category failures degrade that category only
            Stage::CategoryFanOut => {
                collected.outcomes = self.resolve_categories(token, &collected.categories).await;
            }
        }
        Ok(())
    }

    /// Resolve every category through the batch scheduler. Never fails.
    async fn resolve_categories(&self, token: &str, categories: &[Category]) -> Vec<CategoryOutcome> {
        info!("Resolving {} categories", categories.len());
        let resolver = &self.resolver;
        let tasks: Vec<_> = categories
            .iter()
            .map(|category| {
                let id = category.id;
                move || async move { resolver.resolve(id, token).await }
            })
            .collect();

        let outcomes = run_with_config(tasks, &self.config.category_batch).await;

        let degraded = outcomes.iter().filter(|o| o.is_degraded()).count();
        if degraded > 0 {
            warn!("{} of {} categories degraded", degraded, outcomes.len());
        }
        outcomes
    }

    async fn pace(&self) {
        if !self.config.stage_delay.is_zero() {
            sleep(self.config.stage_delay).await;
        }
    }
}

impl std::fmt::Debug for DashboardLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardLoader")
            .field("config", &self.config)
            .finish()
    }
}
