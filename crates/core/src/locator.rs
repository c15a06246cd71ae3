use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

/// How an element is looked up in the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locator {
    Id(Cow<'static, str>),
    Name(Cow<'static, str>),
    Css(Cow<'static, str>),
    XPath(Cow<'static, str>),
}

impl Locator {
    pub fn strategy(&self) -> &'static str {
        match self {
            Locator::Id(_) => "id",
            Locator::Name(_) => "name",
            Locator::Css(_) => "css",
            Locator::XPath(_) => "xpath",
        }
    }

    pub fn selector(&self) -> &str {
        match self {
            Locator::Id(s) | Locator::Name(s) | Locator::Css(s) | Locator::XPath(s) => s,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy(), self.selector())
    }
}

/// A strategy+selector pair with a human-readable description.
///
/// Descriptors never carry live handles, so they stay valid across re-renders.
/// Page objects declare most of them as `const`; the few that depend on values
/// discovered in the DOM are produced by construction functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    pub locator: Locator,
    pub description: Cow<'static, str>,
    pub timeout: Option<Duration>,
}

impl ElementDescriptor {
    pub const fn id(selector: &'static str, description: &'static str) -> Self {
        Self::new(Locator::Id(Cow::Borrowed(selector)), description)
    }

    pub const fn name(selector: &'static str, description: &'static str) -> Self {
        Self::new(Locator::Name(Cow::Borrowed(selector)), description)
    }

    pub const fn css(selector: &'static str, description: &'static str) -> Self {
        Self::new(Locator::Css(Cow::Borrowed(selector)), description)
    }

    pub const fn xpath(selector: &'static str, description: &'static str) -> Self {
        Self::new(Locator::XPath(Cow::Borrowed(selector)), description)
    }

    const fn new(locator: Locator, description: &'static str) -> Self {
        Self {
            locator,
            description: Cow::Borrowed(description),
            timeout: None,
        }
    }

    /// Builds a descriptor at runtime, e.g. from an attribute value read off the page.
    pub fn dynamic(locator: Locator, description: impl Into<String>) -> Self {
        Self {
            locator,
            description: Cow::Owned(description.into()),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl fmt::Display for ElementDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description, self.locator)
    }
}

/// Live reference to a located element.
///
/// Only valid until the next re-render of the node it points at; afterwards the
/// driver reports it as stale and the element must be looked up again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Something an action can target: a descriptor still to be resolved or an
/// already-resolved handle.
#[derive(Debug, Clone, Copy)]
pub enum Locatable<'a> {
    Descriptor(&'a ElementDescriptor),
    Handle(&'a ElementHandle),
}

impl Locatable<'_> {
    pub fn describe(&self) -> String {
        match self {
            Locatable::Descriptor(d) => d.to_string(),
            Locatable::Handle(h) => format!("element {}", h),
        }
    }
}

impl<'a> From<&'a ElementDescriptor> for Locatable<'a> {
    fn from(descriptor: &'a ElementDescriptor) -> Self {
        Locatable::Descriptor(descriptor)
    }
}

impl<'a> From<&'a ElementHandle> for Locatable<'a> {
    fn from(handle: &'a ElementHandle) -> Self {
        Locatable::Handle(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APPLY: ElementDescriptor = ElementDescriptor::css("td.link a", "Apply link");

    #[test]
    fn const_descriptors_render_strategy_and_selector() {
        assert_eq!(APPLY.locator.strategy(), "css");
        assert_eq!(APPLY.to_string(), "Apply link (css=td.link a)");
        assert!(APPLY.timeout.is_none());
    }

    #[test]
    fn dynamic_descriptor_owns_its_selector() {
        let value = String::from("R&D");
        let d = ElementDescriptor::dynamic(
            Locator::Css(format!("tr[data-department='{}']", value).into()),
            format!("{} rows", value),
        )
        .with_timeout(Duration::from_secs(2));

        assert_eq!(d.locator.selector(), "tr[data-department='R&D']");
        assert_eq!(d.timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn locatable_describes_both_variants() {
        let handle = ElementHandle::new("obj-1");
        assert!(Locatable::from(&APPLY).describe().contains("Apply link"));
        assert_eq!(Locatable::from(&handle).describe(), "element obj-1");
    }
}
