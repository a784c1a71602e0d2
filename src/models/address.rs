//! IP address classification.

use crate::error::InputError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Address family of an [`Address`] or [`super::CidrRange`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum IpFamily {
    Ipv4,
    Ipv6,
}

impl IpFamily {
    /// Key of this family in the stored root object.
    pub fn as_str(&self) -> &'static str {
        match self {
            IpFamily::Ipv4 => "ipv4",
            IpFamily::Ipv6 => "ipv6",
        }
    }

    /// Number of bits in an address of this family.
    pub fn max_prefix(&self) -> u8 {
        match self {
            IpFamily::Ipv4 => 32,
            IpFamily::Ipv6 => 128,
        }
    }

    pub fn of(ip: &IpAddr) -> IpFamily {
        match ip {
            IpAddr::V4(_) => IpFamily::Ipv4,
            IpAddr::V6(_) => IpFamily::Ipv6,
        }
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated IP literal together with the text it was parsed from.
///
/// The text is kept because bucket keys are derived from the textual form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    ip: IpAddr,
    text: String,
}

impl Address {
    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn family(&self) -> IpFamily {
        IpFamily::of(&self.ip)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Parse untrusted text into an [`Address`].
///
/// Accepts IPv4 dotted-quad and IPv6 colon-hex literals only. Hostnames, port
/// suffixes, zone ids and surrounding whitespace are all rejected.
pub fn classify(text: &str) -> Result<Address, InputError> {
    if text.is_empty() {
        return Err(InputError::Missing);
    }
    let ip: IpAddr = text
        .parse()
        .map_err(|_| InputError::InvalidAddress(text.to_string()))?;
    Ok(Address {
        ip,
        text: text.to_string(),
    })
}
