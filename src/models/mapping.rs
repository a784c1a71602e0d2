//! CIDR to connection mappings and lookup results.

use super::CidrRange;
use crate::error::MappingError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection name returned when no range matches.
pub const UNKNOWN_CONNECTION: &str = "unknown";

/// A validated `{cidr, connection}` pair.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(try_from = "StoredMapping")]
pub struct ConnectionMapping {
    /// Range matched against query addresses.
    pub cidr: CidrRange,
    /// Opaque connection token, never empty and without whitespace.
    pub connection: String,
}

impl ConnectionMapping {
    pub fn new(cidr: &str, connection: &str) -> Result<ConnectionMapping, MappingError> {
        let cidr = CidrRange::new(cidr)?;
        if connection.is_empty() {
            return Err(MappingError::EmptyConnection);
        }
        if connection.chars().any(char::is_whitespace) {
            return Err(MappingError::ConnectionWhitespace(connection.to_string()));
        }
        Ok(ConnectionMapping {
            cidr,
            connection: connection.to_string(),
        })
    }
}

impl fmt::Display for ConnectionMapping {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} => {}", self.cidr, self.connection)
    }
}

/// Raw `{cidr, connection}` record exactly as a store returns it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StoredMapping {
    pub cidr: String,
    pub connection: String,
}

impl TryFrom<StoredMapping> for ConnectionMapping {
    type Error = MappingError;

    fn try_from(raw: StoredMapping) -> Result<Self, Self::Error> {
        ConnectionMapping::new(&raw.cidr, &raw.connection)
    }
}

impl From<&ConnectionMapping> for StoredMapping {
    fn from(m: &ConnectionMapping) -> Self {
        StoredMapping {
            cidr: m.cidr.to_string(),
            connection: m.connection.clone(),
        }
    }
}

/// Outcome of a lookup: a connection name or the `unknown` sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Connection(String),
    Unknown,
}

impl Resolution {
    pub fn connection(&self) -> &str {
        match self {
            Resolution::Connection(name) => name,
            Resolution::Unknown => UNKNOWN_CONNECTION,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Resolution::Unknown)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.connection())
    }
}

// Wire form is {"connection": "<name>"}
impl Serialize for Resolution {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("Resolution", 1)?;
        s.serialize_field("connection", self.connection())?;
        s.end()
    }
}
