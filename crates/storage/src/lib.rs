use anyhow::{Context, Result};
use async_trait::async_trait;
use hireflow_core::RunReport;
use std::path::{Path, PathBuf};
use tracing::info;

/// Sink for the files a run leaves behind.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Stores PNG bytes under `<tag>_<timestamp>.png`.
    async fn save_screenshot(&self, tag: &str, png: &[u8]) -> Result<PathBuf>;

    async fn save_report(&self, report: &RunReport) -> Result<PathBuf>;
}

pub struct FsArtifactStore {
    pub screenshot_dir: PathBuf,
    pub report_dir: PathBuf,
}

impl FsArtifactStore {
    pub fn new(screenshot_dir: impl Into<PathBuf>, report_dir: impl Into<PathBuf>) -> Self {
        Self {
            screenshot_dir: screenshot_dir.into(),
            report_dir: report_dir.into(),
        }
    }

    async fn write(dir: &Path, file_name: String, data: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating {}", dir.display()))?;
        let path = dir.join(file_name);
        tokio::fs::write(&path, data)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

pub fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d-%H%M%S").to_string()
}

/// Keeps tags usable as file names on every platform.
pub fn sanitize_tag(tag: &str) -> String {
    let cleaned: String = tag
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "screenshot".to_string() } else { cleaned }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn save_screenshot(&self, tag: &str, png: &[u8]) -> Result<PathBuf> {
        let name = format!("{}_{}.png", sanitize_tag(tag), timestamp());
        let path = Self::write(&self.screenshot_dir, name, png).await?;
        info!(path = %path.display(), "screenshot saved");
        Ok(path)
    }

    async fn save_report(&self, report: &RunReport) -> Result<PathBuf> {
        let data = serde_json::to_string_pretty(report)?;
        let name = format!("run_{}.json", timestamp());
        let path = Self::write(&self.report_dir, name, data.as_bytes()).await?;
        info!(path = %path.display(), "run report saved");
        Ok(path)
    }
}
