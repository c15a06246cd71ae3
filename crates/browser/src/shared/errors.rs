use hireflow_core::DriverError;

/// Sorts a raw protocol failure into the driver taxonomy by its message.
pub fn to_driver_error(e: impl std::fmt::Display, action: &str) -> DriverError {
    let s = e.to_string();
    if s.contains("stale element reference")
        || s.contains("Could not find object")
        || s.contains("Cannot find context")
        || s.contains("Execution context was destroyed")
        || s.contains("No node with given id")
    {
        DriverError::StaleElement(format!("{}: {}", action, s))
    } else if s.contains("timeout") || s.contains("Timeout") {
        DriverError::Timeout(format!("{} timed out: {}", action, s))
    } else if s.contains("navigation") || s.contains("Navigation") || s.contains("net::ERR") {
        DriverError::Navigation(format!("{} navigation failed: {}", action, s))
    } else if s.contains("not interactable") || s.contains("not focusable") {
        DriverError::NotInteractable(format!("{}: {}", action, s))
    } else if s.contains("not found") || s.contains("null") {
        DriverError::NoSuchElement(format!("{}: {}", action, s))
    } else {
        DriverError::Browser(format!("{} failed: {}", action, s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_objects_are_stale() {
        let e = to_driver_error("Could not find object with given id", "Click");
        assert!(e.is_stale());
        let e = to_driver_error("Error: stale element reference: node detached", "Text");
        assert!(e.is_stale());
    }

    #[test]
    fn other_messages_keep_their_kind() {
        assert!(matches!(
            to_driver_error("Request timeout", "Goto"),
            DriverError::Timeout(_)
        ));
        assert!(matches!(
            to_driver_error("net::ERR_NAME_NOT_RESOLVED", "Goto"),
            DriverError::Navigation(_)
        ));
        assert!(matches!(
            to_driver_error("websocket closed", "Eval"),
            DriverError::Browser(_)
        ));
    }
}
