//! Runtime configuration and batch tool defaults.

use crate::error::ConfigError;
use crate::processing::{GroupBySettings, Ipv4GroupBy, Ipv6GroupBy};
use std::fmt;
use std::str::FromStr;

/// Upper bound on mock mappings per family.
pub const COUNT_MAX: usize = 10_000;
/// Mock mappings per family when `--count` is not given.
pub const DEFAULT_COUNT: usize = 1_000;
/// Candidate draws per mock slot before giving up on a free range.
pub const MAX_ATTEMPTS_PER_SLOT: usize = 1_000;
/// Length of generated mock connection names.
pub const MOCK_CONNECTION_NAME_LEN: usize = 12;
/// Request timeout for store calls.
pub const STORE_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_INPUT_FILE: &str = "config.csv";
pub const DEFAULT_OUTPUT_FILE: &str = "output/configMap.json";
pub const DEFAULT_MOCK_OUTPUT_FILE: &str = "output/mockConfigMap.json";

/// Environment variable names read by the binary for deploys.
pub const ENV_FIREBASE_URL: &str = "FIREBASE_URL";
pub const ENV_FIREBASE_TOKEN: &str = "FIREBASE_TOKEN";

const FIELD_SEPARATOR: char = '|';

/// Parsed `<endpoint>|<secret>|<ipv4GroupBy>|<ipv6GroupBy>` string.
#[derive(Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub endpoint: String,
    pub secret: String,
    pub ipv4_group_by: Ipv4GroupBy,
    pub ipv6_group_by: Ipv6GroupBy,
}

impl RuntimeConfig {
    /// Parse an optional config string; a missing one is a [`ConfigError`].
    pub fn parse(raw: Option<&str>) -> Result<RuntimeConfig, ConfigError> {
        match raw {
            Some(raw) if !raw.is_empty() => raw.parse(),
            _ => Err(ConfigError::Missing),
        }
    }

    pub fn group_by(&self) -> GroupBySettings {
        GroupBySettings::new(self.ipv4_group_by, self.ipv6_group_by)
    }

    /// The config string with the secret masked, for printing.
    pub fn redacted(&self) -> String {
        format!(
            "{}{sep}***{sep}{}{sep}{}",
            self.endpoint,
            self.ipv4_group_by,
            self.ipv6_group_by,
            sep = FIELD_SEPARATOR
        )
    }
}

impl FromStr for RuntimeConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(FIELD_SEPARATOR).collect();
        if fields.len() != 4 {
            return Err(ConfigError::FieldCount {
                found: fields.len(),
            });
        }
        if fields[0].is_empty() {
            return Err(ConfigError::EmptyField("endpoint"));
        }
        if fields[1].is_empty() {
            return Err(ConfigError::EmptyField("secret"));
        }
        Ok(RuntimeConfig {
            endpoint: fields[0].to_string(),
            secret: fields[1].to_string(),
            ipv4_group_by: fields[2].parse()?,
            ipv6_group_by: fields[3].parse()?,
        })
    }
}

impl fmt::Display for RuntimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}{sep}{}",
            self.endpoint,
            self.secret,
            self.ipv4_group_by,
            self.ipv6_group_by,
            sep = FIELD_SEPARATOR
        )
    }
}

impl fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("endpoint", &self.endpoint)
            .field("secret", &"***")
            .field("ipv4_group_by", &self.ipv4_group_by)
            .field("ipv6_group_by", &self.ipv6_group_by)
            .finish()
    }
}
