//! Output of generated configs.
//!
//! - [`json`] - Config file in the store layout
//! - [`terminal`] - Publish summary with colors

mod json;
mod terminal;

pub use json::write_root_config;
pub use terminal::{format_field, print_publish_summary, summary_rows};
