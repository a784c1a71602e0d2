//! Error types for parsing, grouping and resolving connection mappings.

use crate::models::IpFamily;
use thiserror::Error;

/// Problems with the runtime configuration string or a granularity token.
///
/// Always detected before any store access.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No configuration string was supplied at all.
    #[error("configuration is required, use <endpoint>|<secret>|<ipv4GroupBy>|<ipv6GroupBy>")]
    Missing,

    /// The configuration string did not split into four fields.
    #[error("configuration format is incorrect, expected 4 '|' separated fields but found {found}. Use <endpoint>|<secret>|<ipv4GroupBy>|<ipv6GroupBy>")]
    FieldCount { found: usize },

    /// A required field was blank.
    #[error("configuration field '{0}' must not be empty")]
    EmptyField(&'static str),

    /// The granularity token is not one of the family's levels.
    #[error("invalid {family} group by '{value}', valid options: {valid}")]
    UnsupportedGranularity {
        family: IpFamily,
        value: String,
        valid: &'static str,
    },
}

/// The query address was absent or not an IP literal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("ip parameter is required")]
    Missing,

    #[error("invalid ip parameter: '{0}'")]
    InvalidAddress(String),
}

/// A CIDR string that could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CidrError {
    #[error("invalid CIDR format '{0}', expected <address>/<prefix>")]
    Format(String),

    #[error("invalid address '{0}' in CIDR")]
    Address(String),

    #[error("invalid prefix length '{prefix}' in CIDR '{cidr}'")]
    Prefix { cidr: String, prefix: String },

    #[error("prefix length {prefix} is too long for {family} (max {max})")]
    PrefixTooLong {
        family: IpFamily,
        prefix: u8,
        max: u8,
    },
}

/// A `{cidr, connection}` pair that fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error(transparent)]
    Cidr(#[from] CidrError),

    #[error("connection name must not be empty")]
    EmptyConnection,

    #[error("illegal spacing in connection name '{0}'")]
    ConnectionWhitespace(String),
}

/// Failures talking to, or decoding data from, a configuration store.
///
/// These carry endpoint level detail and are only ever logged; callers of the
/// resolver see [`ResolveError::ServiceUnavailable`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store returned status {status} for {path}")]
    Status { status: u16, path: String },

    #[error("malformed store data at {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("malformed entry #{index} in bucket {bucket}: {source}")]
    MalformedEntry {
        bucket: String,
        index: usize,
        #[source]
        source: MappingError,
    },

    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by [`crate::processing::resolve`] and [`crate::lookup`].
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("input validation error: {0}")]
    InputValidation(#[from] InputError),

    /// Redacted store failure; details went to the log.
    #[error("Service unavailable")]
    ServiceUnavailable,
}

impl From<StoreError> for ResolveError {
    fn from(e: StoreError) -> Self {
        log::error!("store failure during resolve: {e}");
        ResolveError::ServiceUnavailable
    }
}
