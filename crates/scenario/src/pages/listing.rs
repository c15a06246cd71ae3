use hireflow_browser::ActionHandler;
use hireflow_browser::shared::js;
use hireflow_core::{
    ApplicantProfile, DriverError, DriverResult, ElementDescriptor, ElementHandle, ErrorContext,
    ErrorHealer, FlowError, HealingAction, Locatable, Locator, Position, ScriptArg,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::position::PositionForm;
use crate::text::{css_quote, decode_entities};

pub const DEPARTMENT_SELECT: ElementDescriptor =
    ElementDescriptor::id("department-filter", "Department filter dropdown");
pub const DEPARTMENT_OPTION: ElementDescriptor =
    ElementDescriptor::css("option", "Department option");
pub const NO_RESULTS: ElementDescriptor =
    ElementDescriptor::css(".no-results", "No open positions message");
pub const JOB_TITLE: ElementDescriptor = ElementDescriptor::css("td.title", "Job title cell");
pub const APPLY_LINK: ElementDescriptor =
    ElementDescriptor::css("td.link a[href*='careers']", "Apply now link");

const FILTER_ATTEMPTS: u32 = 3;
const STALE_ATTEMPTS: u32 = 3;

/// Rows of one department, keyed by the option value read off the dropdown.
pub fn department_rows(value: &str) -> ElementDescriptor {
    ElementDescriptor::dynamic(
        Locator::Css(format!("tr[data-department='{}']", css_quote(value)).into()),
        format!("{} job rows", value),
    )
}

/// What the listing showed once the filter settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    Openings,
    /// The page explicitly says the department has nothing open.
    NoOpenings,
}

/// An applied department filter.
#[derive(Debug, Clone)]
pub struct DepartmentFilter {
    pub department: String,
    /// Raw `value` of the selected option.
    pub option_value: String,
    pub outcome: FilterOutcome,
    rows: ElementDescriptor,
}

impl DepartmentFilter {
    pub fn rows(&self) -> &ElementDescriptor {
        &self.rows
    }
}

pub struct ListingPage {
    actions: Arc<ActionHandler>,
    form: PositionForm,
    healer: Arc<dyn ErrorHealer>,
    careers_path: String,
}

impl ListingPage {
    pub fn new(
        actions: Arc<ActionHandler>,
        form: PositionForm,
        healer: Arc<dyn ErrorHealer>,
        careers_path: impl Into<String>,
    ) -> Self {
        Self {
            actions,
            form,
            healer,
            careers_path: careers_path.into().to_lowercase(),
        }
    }

    pub fn form(&self) -> &PositionForm {
        &self.form
    }

    /// Whether the browser shows the listing rather than a single job.
    pub async fn is_current(&self) -> bool {
        match self.actions.driver().current_url().await {
            Ok(url) => {
                let url = url.to_lowercase();
                url.contains(&self.careers_path) && !url.contains("gh_jid")
            }
            Err(_) => false,
        }
    }

    /// Selects `department` in the dropdown and waits until the listing
    /// reflects it, either with matching rows or with the empty-state message.
    pub async fn filter_by_department(
        &self,
        department: &str,
    ) -> Result<DepartmentFilter, FlowError> {
        let mut last_error = FlowError::element_not_found(DEPARTMENT_SELECT.to_string());

        for attempt in 1..=FILTER_ATTEMPTS {
            match self.try_filter(department).await {
                Ok(filter) => {
                    info!(
                        department,
                        outcome = ?filter.outcome,
                        attempt,
                        "department filter applied"
                    );
                    return Ok(filter);
                }
                Err(e) => {
                    warn!(department, attempt, error = %e, "department filter attempt failed");
                    last_error = e;
                    if attempt < FILTER_ATTEMPTS {
                        sleep(self.actions.timeouts().retry_pause).await;
                    }
                }
            }
        }

        error!(department, attempts = FILTER_ATTEMPTS, "could not apply department filter");
        Err(last_error)
    }

    async fn try_filter(&self, department: &str) -> Result<DepartmentFilter, FlowError> {
        let driver = self.actions.driver().as_ref();
        let select = self
            .actions
            .find(Locatable::from(&DEPARTMENT_SELECT), None)
            .await
            .ok_or_else(|| FlowError::element_not_found(DEPARTMENT_SELECT.to_string()))?;

        let mut offered = Vec::new();
        let mut value = None;
        for option in driver.find_children(&select, &DEPARTMENT_OPTION.locator).await? {
            let label = decode_entities(&driver.text(&option).await?);
            if label == department {
                value = Some(driver.attribute(&option, "value").await?.unwrap_or(label));
                break;
            }
            offered.push(label);
        }
        let Some(value) = value else {
            return Err(FlowError::element_not_found(format!("department option '{}'", department))
                .with_context(json!({ "department": department, "offered": offered })));
        };

        let selected = driver
            .execute(
                js::page::SELECT_OPTION,
                vec![ScriptArg::from(&select), json!(value).into()],
            )
            .await?;
        if selected != Value::Bool(true) {
            warn!(department, value = %value, "dropdown did not keep the selected value");
        }
        sleep(self.actions.timeouts().settle_delay).await;

        let rows = department_rows(&value);
        let outcome = self.settled_outcome(&rows, department).await?;
        Ok(DepartmentFilter {
            department: department.to_string(),
            option_value: value,
            outcome,
            rows,
        })
    }

    async fn settled_outcome(
        &self,
        rows: &ElementDescriptor,
        department: &str,
    ) -> Result<FilterOutcome, FlowError> {
        let actions = self.actions.as_ref();
        let driver = actions.driver().as_ref();
        let timeout = actions.waits().timeout_for(rows);

        actions
            .waits()
            .poll_until("department filter to settle", timeout, move || async move {
                for row in driver.find_elements(&rows.locator).await? {
                    if !driver.is_displayed(&row).await? {
                        continue;
                    }
                    let tagged = driver.attribute(&row, "data-department").await?;
                    if tagged.map(|d| decode_entities(&d)).as_deref() == Some(department) {
                        return Ok(Some(FilterOutcome::Openings));
                    }
                }
                if actions.any_displayed(&NO_RESULTS).await {
                    return Ok(Some(FilterOutcome::NoOpenings));
                }
                Ok(None)
            })
            .await
            .map_err(|e| {
                FlowError::from(e).with_context(json!({
                    "department": department,
                    "rows": rows.to_string(),
                }))
            })
    }

    /// Displayed rows of the filtered department that offer an apply link.
    ///
    /// Queries the page afresh on every call; rows do not survive re-renders.
    pub async fn list_applyable_positions(&self, filter: &DepartmentFilter) -> Vec<Position> {
        let driver = self.actions.driver().as_ref();
        let rows = match driver.find_elements(&filter.rows.locator).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(department = %filter.department, error = %e, "could not query job rows");
                return Vec::new();
            }
        };

        let mut positions = Vec::new();
        for row in rows {
            match self.applyable(&row).await {
                Ok(true) => {
                    let title = self.actions.child_text(&row, &JOB_TITLE).await;
                    positions.push(Position {
                        ordinal: positions.len(),
                        handle: row,
                        title: title.filter(|t| !t.is_empty()),
                    });
                }
                Ok(false) => {}
                Err(e) => debug!(row = %row, error = %e, "skipping unreadable row"),
            }
        }

        info!(
            department = %filter.department,
            count = positions.len(),
            "found applyable positions"
        );
        positions
    }

    async fn applyable(&self, row: &ElementHandle) -> DriverResult<bool> {
        let driver = self.actions.driver().as_ref();
        if !driver.is_displayed(row).await? {
            return Ok(false);
        }
        for link in driver.find_children(row, &APPLY_LINK.locator).await? {
            if driver.text(&link).await?.contains("Apply") {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Opens the position's application, fills it and closes it again.
    ///
    /// A row that went stale is looked up again by ordinal in a fresh listing
    /// for as long as the healer allows. The form is closed on every path.
    pub async fn apply_to_position(
        &self,
        position: &Position,
        filter: &DepartmentFilter,
        profile: &ApplicantProfile,
    ) -> Result<bool, FlowError> {
        let result: Result<bool, FlowError> = async {
            self.open_application(position, filter).await?;
            Ok(self.form.fill(profile).await)
        }
        .await;

        self.form.close().await;
        result
    }

    async fn open_application(
        &self,
        position: &Position,
        filter: &DepartmentFilter,
    ) -> Result<(), FlowError> {
        let ordinal = position.ordinal;
        let mut current = position.clone();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let error = match self.click_apply(&current).await {
                Ok(()) => {
                    info!(ordinal, title = %current.display_title(), attempt, "application opened");
                    return Ok(());
                }
                Err(e) if e.is_stale() => FlowError::stale(format!(
                    "position {} went stale: {}",
                    ordinal + 1,
                    e
                ))
                .with_context(json!({ "ordinal": ordinal, "attempt": attempt })),
                Err(e) => {
                    return Err(FlowError::from(e).with_context(json!({ "ordinal": ordinal })));
                }
            };

            let context = ErrorContext {
                ordinal,
                error,
                attempt,
                max_attempts: STALE_ATTEMPTS,
            };
            match self.healer.heal(&context).await {
                HealingAction::Retry => {}
                HealingAction::RetryAfter(ms) => sleep(Duration::from_millis(ms)).await,
                HealingAction::Skip => {
                    warn!(ordinal, attempt, "healer skipped stale position");
                    return Err(context.error);
                }
                HealingAction::Abort => {
                    warn!(ordinal, attempts = attempt, "stale retry budget spent");
                    return Err(context.error);
                }
            }

            warn!(ordinal, attempt, "position went stale, re-acquiring by ordinal");
            let fresh = self.list_applyable_positions(filter).await;
            current = fresh.into_iter().nth(ordinal).ok_or_else(|| {
                FlowError::stale(format!("position {} no longer listed", ordinal + 1))
                    .with_context(json!({ "ordinal": ordinal }))
            })?;
        }
    }

    async fn click_apply(&self, position: &Position) -> DriverResult<()> {
        let driver = self.actions.driver().as_ref();
        let link = driver
            .find_children(&position.handle, &APPLY_LINK.locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NoSuchElement(APPLY_LINK.to_string()))?;

        driver
            .execute(
                js::page::SCROLL_INTO_VIEW,
                vec![ScriptArg::from(&link), json!("center").into()],
            )
            .await?;
        sleep(self.actions.timeouts().scroll_settle).await;
        self.actions.js_click(&link).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_keyed_by_discovered_value() {
        let rows = department_rows("R&D");
        assert_eq!(rows.locator.selector(), "tr[data-department='R&D']");
        assert_eq!(rows.description, "R&D job rows");

        let quoted = department_rows("Ops 'EU'");
        assert_eq!(quoted.locator.selector(), "tr[data-department='Ops \\'EU\\'']");
    }
}
