use hireflow_browser::shared::js;
use hireflow_browser::{ActionHandler, Fallback, FrameNavigator};
use hireflow_core::{
    ApplicantProfile, DriverError, ElementDescriptor, FlowError, Locatable, ScriptArg,
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

pub const APPLICATION_FORM: ElementDescriptor =
    ElementDescriptor::id("application-form", "Application form element");

pub const BOARD_FRAMES: [ElementDescriptor; 3] = [
    ElementDescriptor::id("grnhse_iframe", "Greenhouse board iframe"),
    ElementDescriptor::css(
        "iframe[src*='greenhouse'], iframe[id*='grnhse']",
        "Greenhouse iframe",
    ),
    ElementDescriptor::css("iframe", "Any inline frame"),
];

pub const FIRST_NAME: ElementDescriptor = ElementDescriptor::id("first_name", "First name input");
pub const LAST_NAME: ElementDescriptor = ElementDescriptor::id("last_name", "Last name input");
pub const EMAIL: ElementDescriptor = ElementDescriptor::id("email", "Email input");
pub const PHONE: ElementDescriptor = ElementDescriptor::id("phone", "Phone input");

pub const CV_UPLOAD_BUTTON: ElementDescriptor =
    ElementDescriptor::css(".file-upload__wrapper .btn", "CV upload button");
pub const CV_INPUT: ElementDescriptor = ElementDescriptor::id("resume", "CV upload input field");
pub const LINKEDIN: ElementDescriptor =
    ElementDescriptor::id("question_12434949004", "LinkedIn profile input");

pub const ONSITE_DROPDOWN: ElementDescriptor =
    ElementDescriptor::css(".select__control", "On-site work question dropdown");
pub const ONSITE_YES: ElementDescriptor = ElementDescriptor::css(
    "div[id^='react-select'][id$='-option-0']",
    "'Yes' option for on-site work question",
);

pub const SUBMIT_BUTTON: ElementDescriptor = ElementDescriptor::css(
    ".application--submit button[type='submit']",
    "Submit application button",
);

pub const CLOSE_BUTTON: ElementDescriptor =
    ElementDescriptor::css("button[aria-label='Close']", "Close form modal button");
pub const BACK_TO_POSITIONS: ElementDescriptor =
    ElementDescriptor::css("a.section-careers-single-back", "Back to all open positions link");

const PICK_FIRST_OPTION: &str = r#"
const options = document.querySelectorAll('[id^="react-select"][id$="-option-0"]');
if (options.length === 0) return false;
options[0].click();
return true;
"#;

const CLICK_CLOSE: &str = r#"
const button = document.querySelector('button[aria-label="Close"]');
if (!button) return false;
button.click();
return true;
"#;

const RETURN_ATTEMPTS: u32 = 3;
const BACK_LINK_PROBE: Duration = Duration::from_secs(5);

/// The embedded application form of one position.
pub struct PositionForm {
    actions: Arc<ActionHandler>,
    frames: FrameNavigator,
    careers_path: String,
}

impl PositionForm {
    pub fn new(
        actions: Arc<ActionHandler>,
        careers_path: impl Into<String>,
        frame_scrolls: u32,
    ) -> Self {
        let frames = FrameNavigator::new(actions.clone(), BOARD_FRAMES.to_vec())
            .with_max_scrolls(frame_scrolls);
        Self {
            actions,
            frames,
            careers_path: careers_path.into().to_lowercase(),
        }
    }

    /// Fills every field of the form without submitting it.
    ///
    /// Runs inside the board frame when it can be entered and always returns
    /// to the top-level document. `false` means a required field failed.
    pub async fn fill(&self, profile: &ApplicantProfile) -> bool {
        self.frames.within(self.fill_fields(profile)).await
    }

    async fn fill_fields(&self, profile: &ApplicantProfile) -> bool {
        if self
            .actions
            .find(Locatable::from(&APPLICATION_FORM), None)
            .await
            .is_none()
        {
            warn!("application form container not found, continuing anyway");
        }

        let fields = [
            (&FIRST_NAME, profile.first_name.as_str()),
            (&LAST_NAME, profile.last_name.as_str()),
            (&EMAIL, profile.email.as_str()),
            (&PHONE, profile.phone.as_str()),
        ];
        for (descriptor, value) in fields {
            if !self.actions.send_text(descriptor, value).await {
                error!(field = %descriptor, "failed to fill required field");
                return false;
            }
            debug!(field = %descriptor.description, "filled");
            sleep(self.actions.timeouts().field_pacing).await;
        }

        if !self.upload_cv(&profile.cv_path).await {
            return false;
        }

        if let Some(url) = profile.linkedin_url.as_deref() {
            if !self.actions.send_text(&LINKEDIN, url).await {
                warn!("could not fill LinkedIn field");
            }
        }

        self.answer_onsite_question().await;

        info!("filled all form fields without submitting");
        sleep(self.actions.timeouts().settle_delay).await;
        true
    }

    /// Hands the CV straight to the file input; no dialog is opened.
    async fn upload_cv(&self, cv_path: &Path) -> bool {
        if !cv_path.is_file() {
            error!(path = %cv_path.display(), "CV file not found");
            return false;
        }

        let probe = self.actions.timeouts().frame_probe;
        if self
            .actions
            .find(Locatable::from(&CV_UPLOAD_BUTTON), Some(probe))
            .await
            .is_none()
        {
            debug!("no styled upload button, using the input directly");
        }

        let Some(input) = self.actions.find(Locatable::from(&CV_INPUT), None).await else {
            error!("CV upload input not found");
            return false;
        };

        let driver = self.actions.driver();
        if let Err(e) = driver
            .execute(js::page::REVEAL_FILE_INPUT, vec![ScriptArg::from(&input)])
            .await
        {
            debug!(error = %e, "could not reveal file input");
        }

        match driver.set_file(&input, cv_path).await {
            Ok(()) => {
                info!(path = %cv_path.display(), "uploaded CV");
                sleep(self.actions.timeouts().settle_delay).await;
                true
            }
            Err(e) => {
                error!(path = %cv_path.display(), error = %e, "failed to upload CV");
                false
            }
        }
    }

    async fn answer_onsite_question(&self) {
        let actions = self.actions.as_ref();
        let outcome = Fallback::new("on-site dropdown")
            .step("option click", move || async move {
                actions
                    .find(Locatable::from(&ONSITE_DROPDOWN), None)
                    .await
                    .ok_or_else(|| DriverError::NoSuchElement(ONSITE_DROPDOWN.to_string()))?;
                if !actions.click(&ONSITE_DROPDOWN).await {
                    return Err(DriverError::NotInteractable(ONSITE_DROPDOWN.to_string()));
                }
                sleep(actions.timeouts().scroll_settle).await;
                if actions.click(&ONSITE_YES).await {
                    Ok(())
                } else {
                    Err(DriverError::NotInteractable(ONSITE_YES.to_string()))
                }
            })
            .step("scripted option", move || async move {
                match actions.driver().execute(PICK_FIRST_OPTION, vec![]).await? {
                    Value::Bool(true) => Ok(()),
                    _ => Err(DriverError::NoSuchElement(ONSITE_YES.to_string())),
                }
            })
            .run()
            .await;

        match outcome {
            Ok((step, ())) => info!(step, "answered on-site question"),
            Err(e) => warn!(error = %e, "could not answer on-site question"),
        }
    }

    /// Whether a close control for an open form is on screen right now.
    pub async fn is_open(&self) -> bool {
        self.actions.any_displayed(&CLOSE_BUTTON).await
    }

    /// Closes the form modal. Never fails; an unclosable form is logged.
    pub async fn close(&self) {
        self.frames.leave().await;

        let actions = self.actions.as_ref();
        let driver = actions.driver().as_ref();
        let probe = actions.timeouts().frame_probe;

        let outcome = Fallback::new("close form")
            .step("close button", move || async move {
                let button = actions
                    .find(Locatable::from(&CLOSE_BUTTON), Some(probe))
                    .await
                    .ok_or_else(|| DriverError::NoSuchElement(CLOSE_BUTTON.to_string()))?;
                driver.click(&button).await?;
                if actions.wait_for_disappearance(&CLOSE_BUTTON).await {
                    Ok(())
                } else {
                    Err(DriverError::NotInteractable(format!("{} stayed open", CLOSE_BUTTON)))
                }
            })
            .step("scripted close", move || async move {
                match driver.execute(CLICK_CLOSE, vec![]).await? {
                    Value::Bool(true) => Ok(()),
                    _ => Err(DriverError::NoSuchElement(CLOSE_BUTTON.to_string())),
                }
            })
            .step("escape key", move || async move {
                driver.execute(js::page::DISPATCH_ESCAPE, vec![]).await.map(|_| ())
            })
            .run()
            .await;

        match outcome {
            Ok((step, ())) => {
                info!(step, "closed application form");
                sleep(actions.timeouts().scroll_settle).await;
            }
            Err(e) => warn!(error = %e, "could not close application form"),
        }
    }

    /// Clicks back to the full listing and waits for the address to show it.
    pub async fn return_to_listing(&self) -> Result<(), FlowError> {
        self.frames.leave().await;

        let driver = self.actions.driver().as_ref();
        let probe = self.actions.timeouts().element_wait.min(BACK_LINK_PROBE);
        let careers_path = self.careers_path.as_str();

        for attempt in 1..=RETURN_ATTEMPTS {
            let result = match self
                .actions
                .find(Locatable::from(&BACK_TO_POSITIONS), Some(probe))
                .await
            {
                Some(link) => {
                    self.actions.scroll_into_view(Locatable::from(&link)).await;
                    match self.actions.js_click(&link).await {
                        Ok(()) => {
                            self.actions
                                .waits()
                                .wait_for_url(
                                    driver,
                                    "positions listing",
                                    self.actions.timeouts().navigation,
                                    |url| url.contains(careers_path) && !url.contains("gh_jid"),
                                )
                                .await
                        }
                        Err(e) => Err(e),
                    }
                }
                None => Err(DriverError::NoSuchElement(BACK_TO_POSITIONS.to_string())),
            };

            match result {
                Ok(url) => {
                    info!(url = %url, attempt, "returned to all positions");
                    sleep(self.actions.timeouts().settle_delay).await;
                    return Ok(());
                }
                Err(e) if attempt < RETURN_ATTEMPTS => {
                    warn!(attempt, error = %e, "return to listing failed, retrying");
                    sleep(self.actions.timeouts().retry_pause).await;
                }
                Err(e) => {
                    error!(attempts = RETURN_ATTEMPTS, error = %e, "failed to return to positions");
                    return Err(FlowError::navigation_timeout(format!(
                        "Could not return to positions after {} attempts: {}",
                        RETURN_ATTEMPTS, e
                    )));
                }
            }
        }

        Err(FlowError::navigation_timeout("Could not return to positions"))
    }
}
