use hireflow_browser::shared::js;
use hireflow_browser::{ActionHandler, Fallback};
use hireflow_core::{DriverError, ElementDescriptor, ElementHandle, FlowError, Locatable, ScriptArg};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::ScenarioConfig;
use crate::diagnostics::Diagnostics;

pub const CAREERS_LINK: ElementDescriptor =
    ElementDescriptor::xpath("//footer//a[text()='Careers']", "Careers link in footer");
pub const COOKIE_BANNER: ElementDescriptor =
    ElementDescriptor::id("onetrust-banner-sdk", "Cookie consent banner");
pub const COOKIE_ACCEPT: ElementDescriptor =
    ElementDescriptor::id("onetrust-accept-btn-handler", "Accept cookies button");

const COOKIE_OVERLAYS: &str = "#onetrust-banner-sdk, .onetrust-pc-dark-filter";

const CAREERS_BY_XPATH: &str = r#"
return document.evaluate("//footer//a[text()='Careers']", document, null,
    XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;
"#;

const CAREERS_BY_HREF: &str = r#"
return document.querySelector('footer a[href*="careers"]');
"#;

const NAVIGATION_ATTEMPTS: u32 = 3;
const LINK_PROBE: Duration = Duration::from_secs(2);

pub struct HomePage {
    actions: Arc<ActionHandler>,
    config: Arc<ScenarioConfig>,
    diagnostics: Arc<Diagnostics>,
}

impl HomePage {
    pub fn new(
        actions: Arc<ActionHandler>,
        config: Arc<ScenarioConfig>,
        diagnostics: Arc<Diagnostics>,
    ) -> Self {
        Self {
            actions,
            config,
            diagnostics,
        }
    }

    /// Loads the site root and gets the cookie overlay out of the way.
    pub async fn open(&self) -> Result<(), FlowError> {
        let url = &self.config.base_url;
        self.actions.driver().goto(url).await.map_err(|e| {
            error!(url = %url, error = %e, "failed to open home page");
            FlowError::from(e).with_context(json!({ "url": url }))
        })?;
        info!(url = %url, "opened home page");

        self.dismiss_cookies().await;
        Ok(())
    }

    /// Best-effort: a banner that survives every strategy is only logged.
    pub async fn dismiss_cookies(&self) {
        let actions = self.actions.as_ref();
        let driver = actions.driver().as_ref();
        let probe = actions.timeouts().cookie_banner;

        let outcome = Fallback::new("cookie banner")
            .step("script", move || async move {
                let args = vec![
                    json!(COOKIE_BANNER.locator.selector()).into(),
                    json!(COOKIE_ACCEPT.locator.selector()).into(),
                ];
                match driver.execute(js::cookie::DISMISS_BANNER, args).await? {
                    Value::String(state) => Ok(state),
                    other => Err(DriverError::Script(format!("unexpected banner state {}", other))),
                }
            })
            .step("accept button", move || async move {
                let banner = actions.find(Locatable::from(&COOKIE_BANNER), Some(probe)).await;
                match banner {
                    Some(banner) if actions.is_displayed(&banner).await => {}
                    _ => return Ok("absent".to_string()),
                }
                if actions.click(&COOKIE_ACCEPT).await {
                    Ok("clicked".to_string())
                } else {
                    Err(DriverError::NotInteractable(COOKIE_ACCEPT.to_string()))
                }
            })
            .step("remove", move || async move {
                let removed = driver
                    .execute(js::cookie::REMOVE_BANNER, vec![json!(COOKIE_OVERLAYS).into()])
                    .await?;
                Ok(format!("removed {}", removed))
            })
            .run()
            .await;

        match outcome {
            Ok((step, state)) => info!(step, state = %state, "cookie banner handled"),
            Err(e) => warn!(error = %e, "could not handle cookie banner"),
        }
    }

    /// Follows the footer careers link until the address shows the listing.
    pub async fn navigate_to_careers(&self) -> Result<(), FlowError> {
        let driver = self.actions.driver().as_ref();
        let careers_path = self.config.careers_path.to_lowercase();
        let mut last_error = String::from("careers link not found");

        for attempt in 1..=NAVIGATION_ATTEMPTS {
            if let Err(e) = driver.execute(js::page::SCROLL_TO_BOTTOM, vec![]).await {
                debug!(error = %e, "scroll to footer failed");
            }

            let Some(link) = self.careers_link().await else {
                warn!(attempt, "careers link not found");
                sleep(self.actions.timeouts().retry_pause).await;
                continue;
            };

            if let Err(e) = driver
                .execute(
                    js::page::SCROLL_INTO_VIEW,
                    vec![ScriptArg::from(&link), json!("center").into()],
                )
                .await
            {
                debug!(error = %e, "scroll to careers link failed");
            }

            let navigated = match self.actions.js_click(&link).await {
                Ok(()) => {
                    self.actions
                        .waits()
                        .wait_for_url(
                            driver,
                            "careers page",
                            self.actions.timeouts().navigation,
                            |url| url.contains(&careers_path),
                        )
                        .await
                }
                Err(e) => Err(e),
            };

            match navigated {
                Ok(url) => {
                    info!(url = %url, attempt, "navigated to careers page");
                    return Ok(());
                }
                Err(e) => {
                    error!(attempt, error = %e, "careers navigation attempt failed");
                    last_error = e.to_string();
                    if attempt < NAVIGATION_ATTEMPTS {
                        sleep(self.actions.timeouts().retry_pause).await;
                    }
                }
            }
        }

        self.diagnostics.capture("careers_navigation_failed").await;
        Err(FlowError::navigation_timeout(format!(
            "Failed to reach careers page after {} attempts: {}",
            NAVIGATION_ATTEMPTS, last_error
        ))
        .with_context(json!({ "careers_path": self.config.careers_path })))
    }

    async fn careers_link(&self) -> Option<ElementHandle> {
        let actions = self.actions.as_ref();
        let driver = actions.driver().as_ref();
        let probe = actions.timeouts().element_wait.min(LINK_PROBE);

        let not_found = || DriverError::NoSuchElement(CAREERS_LINK.to_string());
        Fallback::new("careers link")
            .step("footer locator", move || async move {
                actions
                    .find(Locatable::from(&CAREERS_LINK), Some(probe))
                    .await
                    .ok_or_else(not_found)
            })
            .step("document xpath", move || async move {
                driver.query(CAREERS_BY_XPATH, vec![]).await?.ok_or_else(not_found)
            })
            .step("href match", move || async move {
                driver.query(CAREERS_BY_HREF, vec![]).await?.ok_or_else(not_found)
            })
            .run()
            .await
            .map(|(step, link)| {
                debug!(step, "careers link located");
                link
            })
            .ok()
    }
}
