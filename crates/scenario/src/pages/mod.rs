//! Page objects for the careers flow.
//!
//! Each page owns the descriptors of the elements it works with and reports
//! terminal failures of required steps as [`hireflow_core::FlowError`]; every
//! optional step is logged and tolerated.

pub mod home;
pub mod listing;
pub mod position;

pub use home::HomePage;
pub use listing::{DepartmentFilter, FilterOutcome, ListingPage};
pub use position::PositionForm;
