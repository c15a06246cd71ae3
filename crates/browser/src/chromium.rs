mod driver;
mod launch;

pub use driver::ChromiumDriver;
pub use launch::executable_for;
