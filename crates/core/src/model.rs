use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::locator::ElementHandle;

/// Applicant identity used for every position in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub linkedin_url: Option<String>,
    /// Absolute path of the CV handed to the file input.
    pub cv_path: PathBuf,
}

/// One openable job row as found by the latest listing query.
///
/// The handle dies with the next re-render of the listing; the ordinal is what
/// survives, and is used to look the row up again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub ordinal: usize,
    pub handle: ElementHandle,
    pub title: Option<String>,
}

impl Position {
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("Position {}", self.ordinal + 1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Success,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationOutcome {
    pub ordinal: usize,
    pub title: String,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ApplicationOutcome {
    pub fn success(ordinal: usize, title: impl Into<String>) -> Self {
        Self {
            ordinal,
            title: title.into(),
            status: ApplicationStatus::Success,
            detail: None,
        }
    }

    pub fn failed(ordinal: usize, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            ordinal,
            title: title.into(),
            status: ApplicationStatus::Failed,
            detail: Some(detail.into()),
        }
    }

    pub fn skipped(ordinal: usize, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            ordinal,
            title: title.into(),
            status: ApplicationStatus::Skipped,
            detail: Some(detail.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[ApplicationOutcome]) -> Self {
        outcomes.iter().fold(
            Self {
                total: outcomes.len(),
                ..Self::default()
            },
            |mut acc, outcome| {
                match outcome.status {
                    ApplicationStatus::Success => acc.success += 1,
                    ApplicationStatus::Failed => acc.failed += 1,
                    ApplicationStatus::Skipped => acc.skipped += 1,
                }
                acc
            },
        )
    }

    /// Positions that were actually attempted, whatever the result.
    pub fn processed(&self) -> usize {
        self.success + self.failed
    }
}

/// Terminal state of a whole scenario run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum Verdict {
    /// Every discovered position was filled.
    Passed,
    /// Some positions were processed, not all of them successfully.
    Partial,
    /// Nothing to do: the department lists no openings.
    Skipped(String),
    /// Discovery broke, or no discovered position could be processed at all.
    Failed(String),
}

impl Verdict {
    pub fn from_summary(summary: &RunSummary) -> Self {
        if summary.total == 0 {
            Verdict::Skipped("no applyable positions discovered".to_string())
        } else if summary.processed() == 0 {
            Verdict::Failed(format!(
                "none of the {} discovered positions could be processed",
                summary.total
            ))
        } else if summary.success == summary.total {
            Verdict::Passed
        } else {
            Verdict::Partial
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Verdict::Failed(_))
    }
}

/// Record of one run, as written by the artifact store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub department: String,
    pub started_at: String,
    pub finished_at: String,
    #[serde(flatten)]
    pub verdict: Verdict,
    pub summary: RunSummary,
    pub outcomes: Vec<ApplicationOutcome>,
}
