use hireflow_core::{Driver, DriverError, DriverResult, ElementDescriptor, ElementHandle};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, trace};

use crate::shared::{TimeoutConfig, js};

/// What an element must satisfy before a wait returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Present,
    Visible,
    /// Visible and enabled.
    Clickable,
}

pub struct WaitStrategy {
    config: TimeoutConfig,
}

impl WaitStrategy {
    pub fn new(config: TimeoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TimeoutConfig {
        &self.config
    }

    /// The descriptor's own timeout, else the configured element wait.
    pub fn timeout_for(&self, descriptor: &ElementDescriptor) -> Duration {
        descriptor.timeout.unwrap_or(self.config.element_wait)
    }

    /// Polls `probe` every check interval until it yields a value.
    ///
    /// Stale references seen while polling are treated as a re-render in
    /// progress and polled through; any other error ends the wait.
    pub async fn poll_until<T, F, Fut>(
        &self,
        what: &str,
        timeout: Duration,
        mut probe: F,
    ) -> DriverResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = DriverResult<Option<T>>>,
    {
        let start = Instant::now();

        loop {
            match probe().await {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {}
                Err(e) if e.is_stale() => trace!(what, "re-render while polling"),
                Err(e) => return Err(e),
            }

            if start.elapsed() >= timeout {
                return Err(DriverError::Timeout(format!(
                    "{} not satisfied after {}ms",
                    what,
                    timeout.as_millis()
                )));
            }

            sleep(self.config.check_interval).await;
        }
    }

    pub async fn wait_for_element(
        &self,
        driver: &dyn Driver,
        descriptor: &ElementDescriptor,
        timeout: Duration,
        readiness: Readiness,
    ) -> DriverResult<ElementHandle> {
        let what = descriptor.to_string();
        self.poll_until(&what, timeout, move || async move {
            for handle in driver.find_elements(&descriptor.locator).await? {
                if Self::is_ready(driver, &handle, readiness).await? {
                    return Ok(Some(handle));
                }
            }
            Ok(None)
        })
        .await
    }

    pub async fn wait_for_all(
        &self,
        driver: &dyn Driver,
        descriptor: &ElementDescriptor,
        timeout: Duration,
    ) -> DriverResult<Vec<ElementHandle>> {
        let what = descriptor.to_string();
        self.poll_until(&what, timeout, move || async move {
            let found = driver.find_elements(&descriptor.locator).await?;
            Ok((!found.is_empty()).then_some(found))
        })
        .await
    }

    /// Succeeds once no match of the descriptor is displayed.
    pub async fn wait_for_invisibility(
        &self,
        driver: &dyn Driver,
        descriptor: &ElementDescriptor,
        timeout: Duration,
    ) -> DriverResult<()> {
        let what = format!("{} to disappear", descriptor);
        self.poll_until(&what, timeout, move || async move {
            for handle in driver.find_elements(&descriptor.locator).await? {
                match driver.is_displayed(&handle).await {
                    Ok(true) => return Ok(None),
                    Ok(false) => {}
                    Err(e) if e.is_stale() => {}
                    Err(e) => return Err(e),
                }
            }
            Ok(Some(()))
        })
        .await
    }

    /// Polls the current address until `accept` holds for it.
    pub async fn wait_for_url<P>(
        &self,
        driver: &dyn Driver,
        what: &str,
        timeout: Duration,
        accept: P,
    ) -> DriverResult<String>
    where
        P: Fn(&str) -> bool,
    {
        let accept = &accept;
        self.poll_until(what, timeout, move || async move {
            let url = driver.current_url().await?;
            Ok(accept(&url.to_lowercase()).then_some(url))
        })
        .await
    }

    /// Waits for the document to finish loading with no requests in flight.
    ///
    /// Never fails: an unstable page after the timeout is logged and tolerated.
    pub async fn wait_for_stable(&self, driver: &dyn Driver) -> DriverResult<()> {
        let start = Instant::now();
        let mut stable_checks = 0;
        let required_stable_checks = 3;

        loop {
            match driver.execute(js::wait::CHECK_LOADING, vec![]).await {
                Ok(state) => {
                    let ready =
                        state.get("readyState").and_then(|v| v.as_str()) == Some("complete");
                    let active = state
                        .get("activeRequests")
                        .and_then(|v| v.as_u64())
                        .unwrap_or(0);

                    if ready && active == 0 {
                        stable_checks += 1;
                        if stable_checks >= required_stable_checks {
                            debug!(
                                elapsed_ms = start.elapsed().as_millis() as u64,
                                "page stabilized"
                            );
                            sleep(self.config.settle_delay).await;
                            return Ok(());
                        }
                    } else {
                        stable_checks = 0;
                    }
                }
                Err(e) if e.is_stale() => {
                    trace!("context replaced during load");
                    stable_checks = 0;
                }
                Err(e) => return Err(e),
            }

            if start.elapsed() > self.config.page_stable {
                debug!("page stabilization timeout, continuing anyway");
                return Ok(());
            }

            sleep(self.config.check_interval).await;
        }
    }

    async fn is_ready(
        driver: &dyn Driver,
        handle: &ElementHandle,
        readiness: Readiness,
    ) -> DriverResult<bool> {
        Ok(match readiness {
            Readiness::Present => true,
            Readiness::Visible => driver.is_displayed(handle).await?,
            Readiness::Clickable => {
                driver.is_displayed(handle).await? && driver.is_enabled(handle).await?
            }
        })
    }
}
