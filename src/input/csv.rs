//! CSV mapping loader.
//!
//! One `cidr, connection` pair per line. Blank lines are skipped and exact
//! repeats of an earlier line are dropped before validation.

use crate::models::ConnectionMapping;
use crate::processing::{de_duplicate_mappings, partition_by_family};
use itertools::Itertools;
use regex::Regex;
use std::error::Error;
use std::path::Path;
use std::sync::OnceLock;

/// Any whitespace left inside a field after trimming.
static WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_whitespace_regex() -> &'static Regex {
    WHITESPACE_REGEX.get_or_init(|| Regex::new(r"\s").expect("Invalid Regex"))
}

fn line_error(line_no: usize, reason: impl std::fmt::Display) -> Box<dyn Error> {
    format!("File parse error at or near line {line_no}: {reason}").into()
}

/// Parse one line; `line_no` is 1-based.
fn parse_line(line_no: usize, line: &str) -> Result<ConnectionMapping, Box<dyn Error>> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 2 {
        return Err(line_error(
            line_no,
            format!("expected 2 comma separated fields, found {}", fields.len()),
        ));
    }
    for field in &fields {
        if get_whitespace_regex().is_match(field) {
            return Err(line_error(
                line_no,
                format!("whitespace not allowed in '{field}'"),
            ));
        }
    }
    ConnectionMapping::new(fields[0], fields[1]).map_err(|e| line_error(line_no, e))
}

/// Parse CSV text into mappings in source order.
///
/// # Arguments
/// * `content` - Whole file content
///
/// # Returns
/// * `Ok(Vec<ConnectionMapping>)` - One entry per distinct non-blank line
/// * `Err` - The first bad line, by its line number in the file
pub fn parse_mapping_csv(content: &str) -> Result<Vec<ConnectionMapping>, Box<dyn Error>> {
    let lines: Vec<(usize, &str)> = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
        .unique_by(|(_, line)| *line)
        .collect();
    log::debug!("parse_mapping_csv() {} distinct lines", lines.len());

    lines
        .into_iter()
        .map(|(line_no, line)| parse_line(line_no, line))
        .collect()
}

/// Read a mapping CSV file and split it per family.
///
/// Entries repeating an earlier CIDR are dropped, see
/// [`de_duplicate_mappings`].
///
/// # Returns
/// `(ipv4, ipv6)` lists, each in file order
pub fn read_mapping_csv(
    file: &str,
) -> Result<(Vec<ConnectionMapping>, Vec<ConnectionMapping>), Box<dyn Error>> {
    if !Path::new(file).exists() {
        return Err(format!("Input file does not exist: {file}").into());
    }
    log::info!("Reading mappings from: {file}");
    let content = std::fs::read_to_string(file)?;
    let mappings = de_duplicate_mappings(parse_mapping_csv(&content)?);
    let (ipv4, ipv6) = partition_by_family(mappings);
    log::info!("Loaded {} IPv4 and {} IPv6 mappings", ipv4.len(), ipv6.len());
    Ok((ipv4, ipv6))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_sample() {
        let (v4, v6) = read_mapping_csv("src/tests/test_data/sample.csv").unwrap();
        assert_eq!(v4.len(), 3);
        assert_eq!(v6.len(), 3);
        assert_eq!(v4[0].cidr.as_str(), "83.29.4.2/16");
        assert_eq!(v4[0].connection, "fabrikam-adfs");
        assert_eq!(v6[2].connection, "ms-azuread-6");
    }

    #[test]
    fn test_read_duplicates_and_blank_lines() {
        let (v4, v6) = read_mapping_csv("src/tests/test_data/sample_duplicates.csv").unwrap();
        assert_eq!(
            v4.iter().map(|m| m.connection.as_str()).collect::<Vec<_>>(),
            vec!["fabrikam-adfs", "contoso-ping"]
        );
        assert_eq!(v6.len(), 1);
    }

    #[test]
    fn test_whitespace_in_field_names_line() {
        let err = read_mapping_csv("src/tests/test_data/sample_invalid_space.csv").unwrap_err();
        assert_eq!(
            err.to_string(),
            "File parse error at or near line 2: whitespace not allowed in 'contoso ping'"
        );
    }

    #[test]
    fn test_line_number_counts_blank_lines() {
        let err = parse_mapping_csv("83.29.4.2/16, fabrikam-adfs\n\n\n99.2.4.28, contoso-ping\n")
            .unwrap_err();
        assert!(err.to_string().starts_with("File parse error at or near line 4:"), "{err}");
    }

    #[test]
    fn test_field_count() {
        for bad in ["83.29.4.2/16", "83.29.4.2/16, a, b", "83.29.4.2/16,"] {
            assert!(parse_mapping_csv(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_missing_file() {
        assert!(read_mapping_csv("src/tests/test_data/does_not_exist.csv").is_err());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_mapping_csv("\n  \n").unwrap().is_empty());
    }
}
