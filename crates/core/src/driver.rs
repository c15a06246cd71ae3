use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

use crate::locator::{ElementHandle, Locator};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DriverError {
    #[error("no such element: {0}")]
    NoSuchElement(String),

    #[error("stale element reference: {0}")]
    StaleElement(String),

    #[error("element not interactable: {0}")]
    NotInteractable(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("frame error: {0}")]
    Frame(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("io error: {0}")]
    Io(String),
}

impl DriverError {
    pub fn is_stale(&self) -> bool {
        matches!(self, DriverError::StaleElement(_))
    }
}

impl From<std::io::Error> for DriverError {
    fn from(e: std::io::Error) -> Self {
        DriverError::Io(e.to_string())
    }
}

pub type DriverResult<T> = Result<T, DriverError>;

/// Argument passed to an injected script, addressable as `arguments[n]`.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptArg {
    Value(Value),
    Element(ElementHandle),
}

impl From<&ElementHandle> for ScriptArg {
    fn from(handle: &ElementHandle) -> Self {
        ScriptArg::Element(handle.clone())
    }
}

impl From<Value> for ScriptArg {
    fn from(value: Value) -> Self {
        ScriptArg::Value(value)
    }
}

/// Capability surface of the remote browser.
///
/// Every call runs against the currently active browsing context: the top-level
/// document, or the frame selected by [`Driver::switch_to_frame`]. Scripts are
/// function bodies that read their inputs from `arguments`.
#[async_trait]
pub trait Driver: Send + Sync {
    async fn goto(&self, url: &str) -> DriverResult<()>;

    async fn current_url(&self) -> DriverResult<String>;

    async fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementHandle>>;

    async fn find_children(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> DriverResult<Vec<ElementHandle>>;

    async fn is_displayed(&self, element: &ElementHandle) -> DriverResult<bool>;

    async fn is_enabled(&self, element: &ElementHandle) -> DriverResult<bool>;

    async fn text(&self, element: &ElementHandle) -> DriverResult<String>;

    async fn attribute(&self, element: &ElementHandle, name: &str) -> DriverResult<Option<String>>;

    /// Current `value` property of a form control.
    async fn value(&self, element: &ElementHandle) -> DriverResult<String>;

    async fn click(&self, element: &ElementHandle) -> DriverResult<()>;

    async fn clear(&self, element: &ElementHandle) -> DriverResult<()>;

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> DriverResult<()>;

    /// Hands a local file to an `<input type="file">` without opening a dialog.
    async fn set_file(&self, element: &ElementHandle, path: &Path) -> DriverResult<()>;

    async fn execute(&self, script: &str, args: Vec<ScriptArg>) -> DriverResult<Value>;

    /// Runs a script whose return value is an element, if any.
    async fn query(
        &self,
        script: &str,
        args: Vec<ScriptArg>,
    ) -> DriverResult<Option<ElementHandle>>;

    async fn switch_to_frame(&self, frame: &ElementHandle) -> DriverResult<()>;

    async fn switch_to_default(&self) -> DriverResult<()>;

    async fn in_frame(&self) -> bool;

    /// PNG bytes of the current viewport.
    async fn screenshot(&self) -> DriverResult<Vec<u8>>;
}
