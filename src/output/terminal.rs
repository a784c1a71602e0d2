//! Terminal output utilities.
//!
//! Provides the publish summary printed after a config is generated.

use crate::models::IpFamily;
use crate::processing::{GroupBySettings, RootConfig};
use colored::Colorize;

/// Format a value as a quoted, right-aligned field.
///
/// # Arguments
/// * `value` - The value to format
/// * `width` - The minimum width of the field
///
/// # Returns
/// A quoted, right-aligned string
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let value_str = value.to_string();
    let quoted = format!("\"{value_str}\"");
    let quoted_len = quoted.len();

    if quoted_len >= width {
        quoted
    } else {
        format!("{quoted:>width$}")
    }
}

/// One summary row per family: `"family", "level", "mappings", "buckets"`.
pub fn summary_rows(root: &RootConfig, settings: &GroupBySettings) -> Vec<String> {
    [IpFamily::Ipv4, IpFamily::Ipv6]
        .iter()
        .map(|family| {
            let config = root.family(*family);
            format!(
                "{family},{level},{mappings},{buckets}",
                family = format_field(family, 6),
                level = format_field(settings.policy(*family).label(), 6),
                mappings = format_field(config.len(), 8),
                buckets = format_field(config.bucket_count(), 8),
            )
        })
        .collect()
}

/// Print per-family counts and the runtime config string for resolvers.
///
/// # Arguments
/// * `root` - The generated config
/// * `settings` - Grouping it was built with
/// * `runtime_config` - Config string to show, secret already masked
pub fn print_publish_summary(
    root: &RootConfig,
    settings: &GroupBySettings,
    runtime_config: Option<&str>,
) {
    println!(r#""family", "level", "mappings", "buckets""#);
    for row in summary_rows(root, settings) {
        println!("{row}");
    }
    println!("Grouping: {}", settings.to_string().green());
    if let Some(runtime_config) = runtime_config {
        println!("Runtime config: {}", runtime_config.on_blue());
    }
}
