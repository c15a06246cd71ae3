use hireflow_core::FlowError;
use tracing::{error, info, warn};

use crate::pages::{DepartmentFilter, HomePage, ListingPage};

/// Brings the browser back to a filtered listing after a position attempt.
///
/// Tier one closes a form left open, tier two walks back to the listing and
/// re-applies the filter. Tier three starts over from the home page and only
/// runs when the first two fail.
pub struct Recovery<'a> {
    home: &'a HomePage,
    listing: &'a ListingPage,
    department: &'a str,
}

impl<'a> Recovery<'a> {
    pub fn new(home: &'a HomePage, listing: &'a ListingPage, department: &'a str) -> Self {
        Self {
            home,
            listing,
            department,
        }
    }

    pub async fn restore(&self) -> Result<DepartmentFilter, FlowError> {
        match self.back_to_listing().await {
            Ok(filter) => Ok(filter),
            Err(e) => {
                warn!(error = %e, "listing not restored in place, navigating from home");
                self.renavigate().await
            }
        }
    }

    async fn back_to_listing(&self) -> Result<DepartmentFilter, FlowError> {
        let form = self.listing.form();
        if form.is_open().await {
            form.close().await;
        }

        if !self.listing.is_current().await {
            form.return_to_listing().await?;
        }
        self.listing.filter_by_department(self.department).await
    }

    /// Home, careers, filter: the path a fresh run takes.
    pub async fn renavigate(&self) -> Result<DepartmentFilter, FlowError> {
        let result: Result<DepartmentFilter, FlowError> = async {
            self.home.open().await?;
            self.home.navigate_to_careers().await?;
            self.listing.filter_by_department(self.department).await
        }
        .await;

        match &result {
            Ok(_) => info!(department = self.department, "listing restored from home page"),
            Err(e) => error!(error = %e, "recovery navigation failed"),
        }
        result
    }
}
