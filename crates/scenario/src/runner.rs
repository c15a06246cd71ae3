use hireflow_browser::{ActionHandler, TimeoutConfig};
use hireflow_core::{
    ApplicationOutcome, DefaultErrorHealer, Driver, FlowError, RunReport, RunSummary, Verdict,
};
use hireflow_storage::ArtifactStore;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::ScenarioConfig;
use crate::diagnostics::Diagnostics;
use crate::pages::{DepartmentFilter, HomePage, ListingPage, PositionForm};
use crate::recovery::Recovery;

const STALE_RETRIES: u32 = 3;

/// Drives the whole careers flow over one browser session.
pub struct ScenarioRunner {
    config: Arc<ScenarioConfig>,
    home: HomePage,
    listing: ListingPage,
    diagnostics: Arc<Diagnostics>,
}

impl ScenarioRunner {
    pub fn new(
        config: Arc<ScenarioConfig>,
        driver: Arc<dyn Driver>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        let timeouts = config.timeouts();
        Self::with_timeouts(config, driver, store, timeouts)
    }

    pub fn with_timeouts(
        config: Arc<ScenarioConfig>,
        driver: Arc<dyn Driver>,
        store: Arc<dyn ArtifactStore>,
        timeouts: TimeoutConfig,
    ) -> Self {
        let actions = Arc::new(ActionHandler::new(driver.clone(), timeouts));
        let diagnostics = Arc::new(Diagnostics::new(driver, store));
        let form = PositionForm::new(actions.clone(), &config.careers_path, config.frame_scrolls);
        let listing = ListingPage::new(
            actions.clone(),
            form,
            Arc::new(DefaultErrorHealer::new(STALE_RETRIES)),
            &config.careers_path,
        );
        let home = HomePage::new(actions, config.clone(), diagnostics.clone());

        Self {
            config,
            home,
            listing,
            diagnostics,
        }
    }

    /// Runs the scenario to completion and stores its report.
    ///
    /// Never fails: every problem ends up in the report's outcomes or verdict.
    pub async fn run(&self) -> RunReport {
        let strategy = self.config.strategy.effective();
        let department = self.config.department.as_str();
        let started_at = chrono::Utc::now().to_rfc3339();
        info!(department, strategy = ?strategy, "starting scenario");

        let (outcomes, discovery_error) = match self.discover().await {
            Ok((filter, total)) => (self.process(filter, total).await, None),
            Err(e) => {
                error!(error = %e, "position discovery failed");
                self.diagnostics.capture("discovery_failed").await;
                (Vec::new(), Some(e))
            }
        };

        let summary = RunSummary::from_outcomes(&outcomes);
        let verdict = match discovery_error {
            Some(e) => Verdict::Failed(format!("discovery failed: {}", e)),
            None => Verdict::from_summary(&summary),
        };
        info!(
            total = summary.total,
            success = summary.success,
            failed = summary.failed,
            skipped = summary.skipped,
            verdict = ?verdict,
            "scenario finished"
        );

        let report = RunReport {
            department: department.to_string(),
            started_at,
            finished_at: chrono::Utc::now().to_rfc3339(),
            verdict,
            summary,
            outcomes,
        };
        if let Err(e) = self.diagnostics.store().save_report(&report).await {
            warn!(error = %e, "could not store run report");
        }
        report
    }

    async fn discover(&self) -> Result<(DepartmentFilter, usize), FlowError> {
        self.home.open().await?;
        self.home.navigate_to_careers().await?;
        let filter = self.listing.filter_by_department(&self.config.department).await?;
        let total = self.listing.list_applyable_positions(&filter).await.len();
        info!(department = %filter.department, total, "discovered positions");
        Ok((filter, total))
    }

    /// One outcome per discovered index, strictly in order.
    async fn process(&self, mut filter: DepartmentFilter, total: usize) -> Vec<ApplicationOutcome> {
        let recovery = Recovery::new(&self.home, &self.listing, &self.config.department);
        let mut outcomes = Vec::with_capacity(total);

        for index in 0..total {
            let (outcome, attempted) = self.attempt(index, total, &filter).await;
            outcomes.push(outcome);

            if attempted {
                match recovery.restore().await {
                    Ok(restored) => filter = restored,
                    Err(e) => error!(ordinal = index, error = %e, "could not restore listing"),
                }
            }
        }
        outcomes
    }

    /// Returns the outcome and whether the browser left the listing.
    async fn attempt(
        &self,
        index: usize,
        total: usize,
        filter: &DepartmentFilter,
    ) -> (ApplicationOutcome, bool) {
        let positions = self.listing.list_applyable_positions(filter).await;
        let Some(position) = positions.get(index) else {
            warn!(ordinal = index, listed = positions.len(), "position no longer listed");
            let detail = format!("listing shows only {} positions", positions.len());
            return (
                ApplicationOutcome::skipped(index, format!("Position {}", index + 1), detail),
                false,
            );
        };

        let title = position.display_title();
        info!(ordinal = index, title = %title, "processing position {}/{}", index + 1, total);

        let outcome = match self
            .listing
            .apply_to_position(position, filter, &self.config.profile)
            .await
        {
            Ok(true) => {
                info!(ordinal = index, title = %title, "application filled");
                ApplicationOutcome::success(index, title)
            }
            Ok(false) => {
                warn!(ordinal = index, title = %title, "application form could not be filled");
                ApplicationOutcome::failed(index, title, "application form could not be filled")
            }
            Err(e) if e.is_stale() => {
                warn!(ordinal = index, title = %title, error = %e, "position skipped");
                ApplicationOutcome::skipped(index, title, e.to_string())
            }
            Err(e) => {
                error!(ordinal = index, title = %title, error = %e, "error processing position");
                self.diagnostics
                    .capture(&format!("position_{}_failed", index + 1))
                    .await;
                ApplicationOutcome::failed(index, title, e.to_string())
            }
        };
        (outcome, true)
    }
}
