pub mod actions;
pub mod chromium;
pub mod fallback;
pub mod frame;
pub mod shared;
pub mod wait;

pub use actions::ActionHandler;
pub use chromium::ChromiumDriver;
pub use fallback::{Fallback, FallbackExhausted};
pub use frame::FrameNavigator;
pub use shared::TimeoutConfig;
pub use wait::{Readiness, WaitStrategy};
