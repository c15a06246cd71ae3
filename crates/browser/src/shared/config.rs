use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Default wait for a descriptor that carries no timeout of its own.
    pub element_wait: Duration,
    /// Bound on URL polls after a navigating click.
    pub navigation: Duration,
    pub page_stable: Duration,
    pub cookie_banner: Duration,
    /// Per-candidate probe while hunting for an embedded frame.
    pub frame_probe: Duration,
    pub check_interval: Duration,
    pub settle_delay: Duration,
    /// Pause between a scroll and the next interaction.
    pub scroll_settle: Duration,
    /// Pause between consecutive form fields.
    pub field_pacing: Duration,
    /// Pause between retries of the same step.
    pub retry_pause: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            element_wait: Duration::from_millis(10000),
            navigation: Duration::from_millis(10000),
            page_stable: Duration::from_millis(30000),
            cookie_banner: Duration::from_millis(2000),
            frame_probe: Duration::from_millis(1000),
            check_interval: Duration::from_millis(500),
            settle_delay: Duration::from_millis(1000),
            scroll_settle: Duration::from_millis(500),
            field_pacing: Duration::from_millis(300),
            retry_pause: Duration::from_millis(1000),
        }
    }
}

impl TimeoutConfig {
    pub fn with_element_wait(mut self, ms: u64) -> Self {
        self.element_wait = Duration::from_millis(ms);
        self
    }

    pub fn with_navigation(mut self, ms: u64) -> Self {
        self.navigation = Duration::from_millis(ms);
        self
    }

    pub fn fast() -> Self {
        Self {
            element_wait: Duration::from_millis(6000),
            navigation: Duration::from_millis(8000),
            page_stable: Duration::from_millis(20000),
            cookie_banner: Duration::from_millis(1000),
            frame_probe: Duration::from_millis(500),
            check_interval: Duration::from_millis(200),
            settle_delay: Duration::from_millis(500),
            scroll_settle: Duration::from_millis(300),
            field_pacing: Duration::from_millis(150),
            retry_pause: Duration::from_millis(500),
        }
    }

    pub fn patient() -> Self {
        Self {
            element_wait: Duration::from_millis(30000),
            navigation: Duration::from_millis(30000),
            page_stable: Duration::from_millis(60000),
            cookie_banner: Duration::from_millis(5000),
            frame_probe: Duration::from_millis(2000),
            check_interval: Duration::from_millis(500),
            settle_delay: Duration::from_millis(2000),
            scroll_settle: Duration::from_millis(1000),
            field_pacing: Duration::from_millis(500),
            retry_pause: Duration::from_millis(2000),
        }
    }

    /// Near-zero waits for driving in-memory pages.
    pub fn instant() -> Self {
        Self {
            element_wait: Duration::from_millis(40),
            navigation: Duration::from_millis(40),
            page_stable: Duration::from_millis(40),
            cookie_banner: Duration::from_millis(10),
            frame_probe: Duration::from_millis(5),
            check_interval: Duration::from_millis(1),
            settle_delay: Duration::ZERO,
            scroll_settle: Duration::ZERO,
            field_pacing: Duration::ZERO,
            retry_pause: Duration::ZERO,
        }
    }
}
