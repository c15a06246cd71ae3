use hireflow_core::Driver;
use hireflow_storage::ArtifactStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Failure screenshots. Capturing never fails the caller.
pub struct Diagnostics {
    driver: Arc<dyn Driver>,
    store: Arc<dyn ArtifactStore>,
}

impl Diagnostics {
    pub fn new(driver: Arc<dyn Driver>, store: Arc<dyn ArtifactStore>) -> Self {
        Self { driver, store }
    }

    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    pub async fn capture(&self, tag: &str) -> Option<PathBuf> {
        let png = match self.driver.screenshot().await {
            Ok(png) => png,
            Err(e) => {
                warn!(tag, error = %e, "could not take screenshot");
                return None;
            }
        };

        match self.store.save_screenshot(tag, &png).await {
            Ok(path) => {
                info!(tag, path = %path.display(), "screenshot captured");
                Some(path)
            }
            Err(e) => {
                warn!(tag, error = %e, "could not store screenshot");
                None
            }
        }
    }
}
