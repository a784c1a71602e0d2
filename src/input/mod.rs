//! Mapping input files.
//!
//! - [`csv`] - `cidr, connection` lines as maintained by operators

mod csv;

pub use csv::{parse_mapping_csv, read_mapping_csv};
