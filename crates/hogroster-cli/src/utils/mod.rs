//! Utility functions for string formatting.

pub mod format;

pub use format::{column, format_optional, truncate_string};
