//! Command handlers.

mod analyze;
mod fetch;

pub use analyze::analyze;
pub use fetch::fetch;
