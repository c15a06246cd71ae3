//! hireflow - fills every open application of one careers department without submitting.

use anyhow::{Context, Result};
use clap::Parser;
use hireflow_browser::ChromiumDriver;
use hireflow_scenario::{ScenarioConfig, ScenarioRunner};
use hireflow_storage::FsArtifactStore;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

mod cli;
mod telemetry;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(settings) => {
            let config = settings.scenario_config();
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run(settings) => {
            let _guard = telemetry::init_tracing(&settings.log_dir, &settings.log_level)?;
            let config = settings.scenario_config();
            if let Err(e) = config.validate() {
                error!(error = %e, "invalid configuration");
                return Err(e.into());
            }
            run(Arc::new(config)).await
        }
    }
}

async fn run(config: Arc<ScenarioConfig>) -> Result<ExitCode> {
    info!(
        base_url = %config.base_url,
        department = %config.department,
        browser = ?config.browser.engine,
        headless = config.browser.headless,
        "launching browser"
    );
    let driver = Arc::new(
        ChromiumDriver::launch(&config.browser, config.timeouts())
            .await
            .context("launching browser")?,
    );
    let store = Arc::new(FsArtifactStore::new(
        config.screenshot_dir.clone(),
        config.report_dir.clone(),
    ));

    let report = ScenarioRunner::new(config.clone(), driver.clone(), store)
        .run()
        .await;

    if let Err(e) = driver.close().await {
        warn!(error = %e, "browser did not shut down cleanly");
    }

    let summary = &report.summary;
    info!(
        total = summary.total,
        success = summary.success,
        failed = summary.failed,
        skipped = summary.skipped,
        "run summary"
    );

    if report.verdict.is_failure() {
        error!(verdict = ?report.verdict, "scenario failed");
        return Ok(ExitCode::FAILURE);
    }
    info!(verdict = ?report.verdict, "scenario completed");
    Ok(ExitCode::SUCCESS)
}
