//! Utility functions for string formatting and manipulation.

pub mod format;

pub use format::{format_price, format_rupees, truncate_string};
