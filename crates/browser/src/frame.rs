use futures::FutureExt;
use hireflow_core::{ElementDescriptor, FlowError};
use serde_json::json;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::actions::ActionHandler;
use crate::shared::js;
use crate::wait::Readiness;

pub const DEFAULT_MAX_SCROLLS: u32 = 8;

/// Finds a lazily attached embedded document and moves the active context into it.
pub struct FrameNavigator {
    actions: Arc<ActionHandler>,
    /// Probed in order, most specific first.
    candidates: Vec<ElementDescriptor>,
    max_scrolls: u32,
}

impl FrameNavigator {
    pub fn new(actions: Arc<ActionHandler>, candidates: Vec<ElementDescriptor>) -> Self {
        Self {
            actions,
            candidates,
            max_scrolls: DEFAULT_MAX_SCROLLS,
        }
    }

    pub fn with_max_scrolls(mut self, max_scrolls: u32) -> Self {
        self.max_scrolls = max_scrolls.max(1);
        self
    }

    /// Probes every candidate, scrolling one viewport between rounds, and
    /// switches into the first frame found.
    pub async fn enter(&self) -> Result<(), FlowError> {
        let driver = self.actions.driver().as_ref();
        let waits = self.actions.waits();
        let probe = self.actions.timeouts().frame_probe;

        for round in 1..=self.max_scrolls {
            for candidate in &self.candidates {
                let handle = match waits
                    .wait_for_element(driver, candidate, probe, Readiness::Present)
                    .await
                {
                    Ok(handle) => handle,
                    Err(_) => continue,
                };

                match driver.switch_to_frame(&handle).await {
                    Ok(()) => {
                        info!(frame = %candidate, round, "switched into embedded frame");
                        return Ok(());
                    }
                    Err(e) => {
                        warn!(frame = %candidate, error = %e, "found frame but could not enter it")
                    }
                }
            }

            debug!(round, max = self.max_scrolls, "frame not attached yet, scrolling");
            if let Err(e) = driver.execute(js::page::SCROLL_BY_VIEWPORT, vec![]).await {
                debug!(error = %e, "viewport scroll failed");
            }
            sleep(self.actions.timeouts().settle_delay).await;
        }

        Err(FlowError::navigation_timeout(format!(
            "embedded frame not found after {} scrolls",
            self.max_scrolls
        ))
        .with_context(json!({
            "max_scrolls": self.max_scrolls,
            "candidates": self.candidates.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
        })))
    }

    /// Returns to the top-level document. Failures are logged, never raised.
    pub async fn leave(&self) {
        match self.actions.driver().switch_to_default().await {
            Ok(()) => debug!("back in top-level document"),
            Err(e) => warn!(error = %e, "could not switch back to top-level document"),
        }
    }

    /// Runs `work` inside the frame when it can be entered, in the top-level
    /// document otherwise, and leaves afterwards, also when `work` panics.
    ///
    /// Dropping the returned future mid-way skips the leave; callers that
    /// cancel must call [`FrameNavigator::leave`] themselves.
    pub async fn within<T>(&self, work: impl Future<Output = T>) -> T {
        if let Err(e) = self.enter().await {
            warn!(error = %e, "proceeding with direct document interaction");
        }
        let out = AssertUnwindSafe(work).catch_unwind().await;
        self.leave().await;
        match out {
            Ok(out) => out,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}
