pub mod config;
pub mod diagnostics;
pub mod pages;
pub mod recovery;
pub mod runner;
pub mod strategy;
mod text;

pub use config::{ScenarioConfig, TimeoutPreset};
pub use diagnostics::Diagnostics;
pub use pages::{DepartmentFilter, FilterOutcome, HomePage, ListingPage, PositionForm};
pub use recovery::Recovery;
pub use runner::ScenarioRunner;
pub use strategy::ExecutionStrategy;
