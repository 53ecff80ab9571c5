//! CLI library components for the origin localizer.

pub mod batch;
pub mod logging;
pub mod summary;
pub mod types;
