use hireflow_core::{
    Driver, DriverError, DriverResult, ElementDescriptor, ElementHandle, Locatable, ScriptArg,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::shared::{TimeoutConfig, js};
use crate::wait::{Readiness, WaitStrategy};

const CLICK_ATTEMPTS: u32 = 3;

/// Locate-and-interact primitives.
///
/// Every operation reports failure through its return value and logs it; none
/// of them raise. Callers decide whether a miss is fatal.
pub struct ActionHandler {
    driver: Arc<dyn Driver>,
    wait_strategy: WaitStrategy,
}

impl ActionHandler {
    pub fn new(driver: Arc<dyn Driver>, config: TimeoutConfig) -> Self {
        Self {
            driver,
            wait_strategy: WaitStrategy::new(config),
        }
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    pub fn waits(&self) -> &WaitStrategy {
        &self.wait_strategy
    }

    pub fn timeouts(&self) -> &TimeoutConfig {
        self.wait_strategy.config()
    }

    /// Resolves a target to a live handle; an existing handle is returned as-is.
    pub async fn find(
        &self,
        target: Locatable<'_>,
        timeout: Option<Duration>,
    ) -> Option<ElementHandle> {
        let descriptor = match target {
            Locatable::Handle(handle) => return Some(handle.clone()),
            Locatable::Descriptor(d) => d,
        };
        let timeout = timeout.unwrap_or_else(|| self.wait_strategy.timeout_for(descriptor));

        match self
            .wait_strategy
            .wait_for_element(self.driver.as_ref(), descriptor, timeout, Readiness::Present)
            .await
        {
            Ok(handle) => {
                debug!(descriptor = %descriptor, "found element");
                Some(handle)
            }
            Err(DriverError::Timeout(_)) => {
                warn!(
                    descriptor = %descriptor,
                    timeout_ms = timeout.as_millis() as u64,
                    "element not found"
                );
                None
            }
            Err(e) => {
                error!(descriptor = %descriptor, error = %e, "error finding element");
                None
            }
        }
    }

    pub async fn find_all(&self, descriptor: &ElementDescriptor) -> Vec<ElementHandle> {
        let timeout = self.wait_strategy.timeout_for(descriptor);
        match self
            .wait_strategy
            .wait_for_all(self.driver.as_ref(), descriptor, timeout)
            .await
        {
            Ok(found) => {
                debug!(descriptor = %descriptor, count = found.len(), "found elements");
                found
            }
            Err(e) => {
                debug!(descriptor = %descriptor, error = %e, "no elements found");
                Vec::new()
            }
        }
    }

    /// Waits for a displayed, enabled match and clicks it natively.
    pub async fn click(&self, descriptor: &ElementDescriptor) -> bool {
        let timeout = self.wait_strategy.timeout_for(descriptor);

        for attempt in 1..=CLICK_ATTEMPTS {
            let result: DriverResult<()> = async {
                let handle = self
                    .wait_strategy
                    .wait_for_element(
                        self.driver.as_ref(),
                        descriptor,
                        timeout,
                        Readiness::Clickable,
                    )
                    .await?;
                self.driver.click(&handle).await
            }
            .await;

            match result {
                Ok(()) => {
                    info!(descriptor = %descriptor, "clicked");
                    return true;
                }
                Err(e) => {
                    warn!(descriptor = %descriptor, attempt, error = %e, "click attempt failed");
                    if attempt < CLICK_ATTEMPTS {
                        sleep(self.timeouts().retry_pause).await;
                    }
                }
            }
        }

        error!(descriptor = %descriptor, attempts = CLICK_ATTEMPTS, "failed to click");
        false
    }

    /// Clears a visible field, types `text` and re-reads it.
    ///
    /// A value that differs after typing is only a warning: masked inputs
    /// routinely reformat what they receive.
    pub async fn send_text(&self, descriptor: &ElementDescriptor, text: &str) -> bool {
        let timeout = self.wait_strategy.timeout_for(descriptor);
        let result: DriverResult<String> = async {
            let handle = self
                .wait_strategy
                .wait_for_element(self.driver.as_ref(), descriptor, timeout, Readiness::Visible)
                .await?;
            self.driver.clear(&handle).await?;
            self.driver.send_keys(&handle, text).await?;
            self.driver.value(&handle).await
        }
        .await;

        match result {
            Ok(actual) => {
                if actual != text {
                    warn!(
                        descriptor = %descriptor,
                        expected = text,
                        actual = %actual,
                        "text verification failed"
                    );
                }
                true
            }
            Err(e) => {
                error!(descriptor = %descriptor, error = %e, "failed to send keys");
                false
            }
        }
    }

    /// Smooth-scrolls the target to the viewport center, then lets it settle.
    pub async fn scroll_into_view(&self, target: Locatable<'_>) -> bool {
        let Some(handle) = self.find(target, None).await else {
            return false;
        };
        match self
            .driver
            .execute(
                js::page::SCROLL_INTO_VIEW,
                vec![ScriptArg::from(&handle), json!("center").into()],
            )
            .await
        {
            Ok(_) => {
                sleep(self.timeouts().scroll_settle).await;
                true
            }
            Err(e) => {
                warn!(target = %target.describe(), error = %e, "scroll failed");
                false
            }
        }
    }

    pub async fn wait_for_disappearance(&self, descriptor: &ElementDescriptor) -> bool {
        let timeout = self.wait_strategy.timeout_for(descriptor);
        match self
            .wait_strategy
            .wait_for_invisibility(self.driver.as_ref(), descriptor, timeout)
            .await
        {
            Ok(()) => {
                debug!(descriptor = %descriptor, "element disappeared");
                true
            }
            Err(e) => {
                warn!(descriptor = %descriptor, error = %e, "element did not disappear");
                false
            }
        }
    }

    /// Script-level click: no visibility or overlay checks.
    pub async fn js_click(&self, handle: &ElementHandle) -> DriverResult<()> {
        self.driver
            .execute(js::page::JS_CLICK, vec![ScriptArg::from(handle)])
            .await
            .map(|_| ())
    }

    /// Trimmed text of the first match within `parent`, if any.
    pub async fn child_text(
        &self,
        parent: &ElementHandle,
        descriptor: &ElementDescriptor,
    ) -> Option<String> {
        let children = self
            .driver
            .find_children(parent, &descriptor.locator)
            .await
            .ok()?;
        let first = children.first()?;
        self.text_of(first).await
    }

    pub async fn text_of(&self, handle: &ElementHandle) -> Option<String> {
        match self.driver.text(handle).await {
            Ok(text) => Some(text.trim().to_string()),
            Err(e) => {
                debug!(element = %handle, error = %e, "could not read text");
                None
            }
        }
    }

    /// Best-effort visibility check; unreadable elements count as hidden.
    pub async fn is_displayed(&self, handle: &ElementHandle) -> bool {
        self.driver.is_displayed(handle).await.unwrap_or(false)
    }

    /// Whether some match of the descriptor is currently displayed, without waiting.
    pub async fn any_displayed(&self, descriptor: &ElementDescriptor) -> bool {
        let Ok(found) = self.driver.find_elements(&descriptor.locator).await else {
            return false;
        };
        for handle in &found {
            if self.is_displayed(handle).await {
                return true;
            }
        }
        false
    }
}
