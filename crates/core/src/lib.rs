use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

pub mod driver;
pub mod locator;
pub mod model;

pub use driver::{Driver, DriverError, DriverResult, ScriptArg};
pub use locator::{ElementDescriptor, ElementHandle, Locatable, Locator};
pub use model::{
    ApplicantProfile, ApplicationOutcome, ApplicationStatus, Position, RunReport, RunSummary,
    Verdict,
};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BrowserConfig {
    pub engine: BrowserEngine,
    pub headless: bool,
    pub viewport_width: Option<u32>,
    pub viewport_height: Option<u32>,
    /// Overrides executable discovery for the selected engine.
    pub executable: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            engine: BrowserEngine::Chromium,
            headless: false,
            viewport_width: Some(1920),
            viewport_height: Some(1080),
            executable: None,
        }
    }
}

/// Browsers that speak the DevTools protocol and can be driven by this crate.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BrowserEngine {
    Chromium,
    Chrome,
    Edge,
}

impl FromStr for BrowserEngine {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chromium" => Ok(BrowserEngine::Chromium),
            "chrome" => Ok(BrowserEngine::Chrome),
            "edge" | "msedge" => Ok(BrowserEngine::Edge),
            other => Err(FlowError::configuration(format!(
                "Unsupported browser: {} (expected chromium, chrome or edge)",
                other
            ))),
        }
    }
}

/// Error categories for better error handling and recovery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Target element absent within its timeout
    ElementNotFound,
    /// A handle no longer maps to a live node
    StaleReference,
    /// Expected address or page state change did not happen in time
    NavigationTimeout,
    /// Embedded frame could not be located or entered
    Frame,
    /// Injected script failed
    ScriptExecution,
    /// Browser/driver errors
    Browser,
    /// Invalid or missing configuration
    Configuration,
    /// Anything not classified above
    Unexpected,
}

/// Structured error with context for better debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowError {
    /// Error category for programmatic handling
    pub category: ErrorCategory,
    /// Human-readable error message
    pub message: String,
    /// Optional context (URL, selector, ordinal, etc.)
    pub context: serde_json::Value,
    /// Whether this error is potentially recoverable
    pub recoverable: bool,
    /// Suggested retry delay in milliseconds
    pub retry_after_ms: Option<u64>,
}

impl FlowError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            context: serde_json::json!({}),
            recoverable: false,
            retry_after_ms: None,
        }
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }

    pub fn recoverable(mut self) -> Self {
        self.recoverable = true;
        self
    }

    pub fn with_retry_delay(mut self, ms: u64) -> Self {
        self.retry_after_ms = Some(ms);
        self.recoverable = true;
        self
    }

    pub fn element_not_found(what: impl Into<String>) -> Self {
        let what = what.into();
        Self::new(ErrorCategory::ElementNotFound, format!("Element not found: {}", what))
            .with_context(serde_json::json!({ "element": what }))
    }

    pub fn stale(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::StaleReference, message).recoverable()
    }

    pub fn navigation_timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::NavigationTimeout, message).with_retry_delay(1000)
    }

    pub fn frame_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Frame, message)
    }

    pub fn script_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::ScriptExecution, message)
    }

    pub fn browser_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Browser, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Configuration, message)
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Unexpected, message)
    }

    pub fn is_stale(&self) -> bool {
        self.category == ErrorCategory::StaleReference
    }
}

impl std::fmt::Display for FlowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.category, self.message)
    }
}

impl std::error::Error for FlowError {}

impl From<DriverError> for FlowError {
    fn from(e: DriverError) -> Self {
        let message = e.to_string();
        match e {
            DriverError::NoSuchElement(what) => FlowError::element_not_found(what),
            DriverError::StaleElement(_) => FlowError::stale(message),
            DriverError::Timeout(_) | DriverError::Navigation(_) => {
                FlowError::navigation_timeout(message)
            }
            DriverError::Frame(_) => FlowError::frame_error(message),
            DriverError::Script(_) => FlowError::script_error(message),
            DriverError::NotInteractable(_) | DriverError::Browser(_) => {
                FlowError::browser_error(message)
            }
            DriverError::Io(_) => FlowError::unexpected(message),
        }
    }
}

/// Context passed to error healing hooks
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub ordinal: usize,
    pub error: FlowError,
    pub attempt: u32,
    pub max_attempts: u32,
}

/// Result of an error healing attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealingAction {
    /// Re-acquire and retry immediately
    Retry,
    /// Retry after a delay (milliseconds)
    RetryAfter(u64),
    /// Give up on this position; the error is not worth retrying
    Skip,
    /// Stop retrying; the caller's attempt budget is spent
    Abort,
}

/// Decides what to do when a position step fails.
#[async_trait]
pub trait ErrorHealer: Send + Sync {
    async fn heal(&self, context: &ErrorContext) -> HealingAction;
}

/// Retries recoverable errors up to a fixed attempt count.
///
/// Aborts once the caller's own `max_attempts` is reached, skips when its
/// own retry count runs out first or the error is not recoverable.
pub struct DefaultErrorHealer {
    pub max_retries: u32,
}

impl DefaultErrorHealer {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }
}

#[async_trait]
impl ErrorHealer for DefaultErrorHealer {
    async fn heal(&self, context: &ErrorContext) -> HealingAction {
        if context.attempt >= context.max_attempts {
            return HealingAction::Abort;
        }

        if context.attempt >= self.max_retries || !context.error.recoverable {
            return HealingAction::Skip;
        }

        match context.error.retry_after_ms {
            Some(delay) => HealingAction::RetryAfter(delay),
            None => HealingAction::Retry,
        }
    }
}
