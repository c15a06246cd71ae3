use hireflow_browser::TimeoutConfig;
use hireflow_browser::frame::DEFAULT_MAX_SCROLLS;
use hireflow_core::{ApplicantProfile, BrowserConfig, FlowError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::strategy::ExecutionStrategy;

pub const DEFAULT_BASE_URL: &str = "https://connecteam.com/";
pub const DEFAULT_CAREERS_PATH: &str = "careers";
pub const DEFAULT_DEPARTMENT: &str = "R&D";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Pacing profile for every wait except the element and navigation bounds.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutPreset {
    /// Shorter probes and pauses for a fast, stable connection.
    Fast,
    #[default]
    Default,
    /// Longer probes and pauses for slow networks or loaded machines.
    Patient,
}

impl TimeoutPreset {
    pub fn config(self) -> TimeoutConfig {
        match self {
            TimeoutPreset::Fast => TimeoutConfig::fast(),
            TimeoutPreset::Default => TimeoutConfig::default(),
            TimeoutPreset::Patient => TimeoutConfig::patient(),
        }
    }
}

impl FromStr for TimeoutPreset {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fast" => Ok(TimeoutPreset::Fast),
            "default" => Ok(TimeoutPreset::Default),
            "patient" => Ok(TimeoutPreset::Patient),
            other => Err(FlowError::configuration(format!(
                "Unsupported timeout preset: {} (expected fast, default or patient)",
                other
            ))),
        }
    }
}

/// Everything a run needs, resolved once at startup and shared read-only.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioConfig {
    pub base_url: String,
    /// Path fragment that identifies the careers listing in the address bar.
    pub careers_path: String,
    /// Matched exactly against the decoded option text.
    pub department: String,
    pub profile: ApplicantProfile,
    pub browser: BrowserConfig,
    /// Element and navigation wait, in seconds.
    pub timeout_secs: u64,
    pub timeout_preset: TimeoutPreset,
    pub frame_scrolls: u32,
    pub strategy: ExecutionStrategy,
    pub screenshot_dir: PathBuf,
    pub report_dir: PathBuf,
}

impl ScenarioConfig {
    pub fn new(profile: ApplicantProfile) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            careers_path: DEFAULT_CAREERS_PATH.to_string(),
            department: DEFAULT_DEPARTMENT.to_string(),
            profile,
            browser: BrowserConfig::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            timeout_preset: TimeoutPreset::default(),
            frame_scrolls: DEFAULT_MAX_SCROLLS,
            strategy: ExecutionStrategy::default(),
            screenshot_dir: PathBuf::from("screenshots"),
            report_dir: PathBuf::from("reports"),
        }
    }

    /// The preset's pacing with `timeout_secs` as the element and navigation bound.
    pub fn timeouts(&self) -> TimeoutConfig {
        let ms = self.timeout_secs.saturating_mul(1000);
        self.timeout_preset
            .config()
            .with_element_wait(ms)
            .with_navigation(ms)
    }

    /// Rejects values a run could not possibly succeed with.
    pub fn validate(&self) -> Result<(), FlowError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(FlowError::configuration(format!(
                "Base URL must be http(s): {}",
                self.base_url
            )));
        }
        if self.department.trim().is_empty() {
            return Err(FlowError::configuration("Target department is empty"));
        }
        if self.careers_path.trim().is_empty() {
            return Err(FlowError::configuration("Careers path is empty"));
        }
        if self.timeout_secs == 0 {
            return Err(FlowError::configuration("Timeout must be at least one second"));
        }

        let cv = &self.profile.cv_path;
        if !cv.is_absolute() || !cv.is_file() {
            return Err(FlowError::configuration(format!("CV file not found: {}", cv.display()))
                .with_context(json!({ "cv_path": cv })));
        }
        Ok(())
    }
}

/// Absolute form of a user-supplied path, relative to the working directory.
pub fn resolve_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
