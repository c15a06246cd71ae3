use clap::{Args, Parser, Subcommand};
use hireflow_core::{ApplicantProfile, BrowserConfig, BrowserEngine};
use hireflow_scenario::config::{
    DEFAULT_BASE_URL, DEFAULT_CAREERS_PATH, DEFAULT_DEPARTMENT, DEFAULT_TIMEOUT_SECS,
    resolve_path,
};
use hireflow_scenario::{ExecutionStrategy, ScenarioConfig, TimeoutPreset};
use std::path::PathBuf;

/// Fills (never submits) every open application of one careers department.
#[derive(Parser)]
#[command(name = "hireflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the application scenario in a browser
    Run(Settings),

    /// Print the resolved configuration as JSON
    Config(Settings),
}

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Site home page
    #[arg(long, env = "BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Address fragment of the careers listing
    #[arg(long, env = "CAREERS_PATH", default_value = DEFAULT_CAREERS_PATH)]
    pub careers_path: String,

    /// Department to apply in, matched exactly
    #[arg(long, env = "TARGET_DEPARTMENT", default_value = DEFAULT_DEPARTMENT)]
    pub department: String,

    #[arg(long, env = "FIRST_NAME", default_value = "Test")]
    pub first_name: String,

    #[arg(long, env = "LAST_NAME", default_value = "Automation")]
    pub last_name: String,

    #[arg(long, env = "EMAIL", default_value = "test.automation@example.com")]
    pub email: String,

    #[arg(long, env = "PHONE", default_value = "+1234567890")]
    pub phone: String,

    #[arg(long, env = "LINKEDIN_URL")]
    pub linkedin_url: Option<String>,

    /// CV to upload; relative paths resolve against the working directory
    #[arg(long, env = "CV_FILE_PATH", default_value = "example_cv.pdf")]
    pub cv_path: PathBuf,

    /// Run the browser without a window
    #[arg(long, env = "HEADLESS")]
    pub headless: bool,

    /// Element and navigation wait in seconds
    #[arg(long, env = "TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// fast, default or patient pacing for probes and pauses
    #[arg(long, env = "TIMEOUT_PRESET", default_value = "default")]
    pub timeouts: TimeoutPreset,

    #[arg(long, env = "SCREENSHOT_DIR", default_value = "screenshots")]
    pub screenshot_dir: PathBuf,

    #[arg(long, env = "REPORT_DIR", default_value = "reports")]
    pub report_dir: PathBuf,

    #[arg(long, env = "LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,

    /// Used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// chromium, chrome or edge
    #[arg(long, env = "BROWSER", default_value = "chromium")]
    pub browser: BrowserEngine,

    /// standard or parallel
    #[arg(long, env = "STRATEGY", default_value = "standard")]
    pub strategy: ExecutionStrategy,
}

impl Settings {
    pub fn scenario_config(&self) -> ScenarioConfig {
        let profile = ApplicantProfile {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            linkedin_url: self.linkedin_url.clone().filter(|u| !u.trim().is_empty()),
            cv_path: resolve_path(&self.cv_path),
        };

        let mut config = ScenarioConfig::new(profile);
        config.base_url = self.base_url.clone();
        config.careers_path = self.careers_path.clone();
        config.department = self.department.clone();
        config.browser = BrowserConfig {
            engine: self.browser,
            headless: self.headless,
            ..BrowserConfig::default()
        };
        config.timeout_secs = self.timeout;
        config.timeout_preset = self.timeouts;
        config.strategy = self.strategy;
        config.screenshot_dir = self.screenshot_dir.clone();
        config.report_dir = self.report_dir.clone();
        config
    }
}
