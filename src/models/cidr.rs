//! CIDR range parsing and membership.
//!
//! Provides [`CidrRange`] for IPv4 and IPv6 ranges along with the prefix mask
//! helpers used to compare leading bits.

use super::IpFamily;
use crate::error::CidrError;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Maximum length for an IPv4 prefix (32 bits).
pub const MAX_LENGTH_V4: u8 = 32;
/// Maximum length for an IPv6 prefix (128 bits).
pub const MAX_LENGTH_V6: u8 = 128;

/// Convert a prefix length to an IPv4 netmask.
///
/// # Examples
/// ```
/// use ip_connection_map::models::get_cidr_mask_v4;
/// assert_eq!(get_cidr_mask_v4(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask_v4(len: u8) -> Result<u32, CidrError> {
    if len > MAX_LENGTH_V4 {
        return Err(CidrError::PrefixTooLong {
            family: IpFamily::Ipv4,
            prefix: len,
            max: MAX_LENGTH_V4,
        });
    }
    let right_len = MAX_LENGTH_V4 - len;
    let all_bits = u32::MAX as u64;
    Ok(((all_bits >> right_len) << right_len) as u32)
}

/// Convert a prefix length to an IPv6 netmask.
pub fn get_cidr_mask_v6(len: u8) -> Result<u128, CidrError> {
    if len > MAX_LENGTH_V6 {
        return Err(CidrError::PrefixTooLong {
            family: IpFamily::Ipv6,
            prefix: len,
            max: MAX_LENGTH_V6,
        });
    }
    // checked_shl avoids the overflow on a full 128 bit shift for /0
    Ok(u128::MAX
        .checked_shl(u32::from(MAX_LENGTH_V6 - len))
        .unwrap_or(0))
}

/// Get the network address for a given IP and prefix length.
pub fn cut_addr(addr: IpAddr, len: u8) -> Result<IpAddr, CidrError> {
    match addr {
        IpAddr::V4(v4) => {
            let mask = get_cidr_mask_v4(len)?;
            Ok(IpAddr::V4(Ipv4Addr::from(u32::from(v4) & mask)))
        }
        IpAddr::V6(v6) => {
            let mask = get_cidr_mask_v6(len)?;
            Ok(IpAddr::V6(Ipv6Addr::from(u128::from(v6) & mask)))
        }
    }
}

/// An address/prefix pair such as `83.29.4.2/16`.
///
/// Host bits are kept as written and the original text is retained, so a
/// range serialises back to exactly the string it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CidrRange {
    addr: IpAddr,
    prefix: u8,
    text: String,
}

impl CidrRange {
    /// Create a new [`CidrRange`] from a CIDR string (e.g. "10.0.0.0/24").
    pub fn new(addr_cidr: &str) -> Result<CidrRange, CidrError> {
        let parts: Vec<&str> = addr_cidr.split('/').collect();
        if parts.len() != 2 {
            return Err(CidrError::Format(addr_cidr.to_string()));
        }
        let addr: IpAddr = parts[0]
            .parse()
            .map_err(|_| CidrError::Address(parts[0].to_string()))?;
        // u8 parsing alone would accept "+16"
        if parts[1].is_empty() || !parts[1].bytes().all(|b| b.is_ascii_digit()) {
            return Err(CidrError::Prefix {
                cidr: addr_cidr.to_string(),
                prefix: parts[1].to_string(),
            });
        }
        let prefix: u8 = parts[1].parse().map_err(|_| CidrError::Prefix {
            cidr: addr_cidr.to_string(),
            prefix: parts[1].to_string(),
        })?;
        let family = IpFamily::of(&addr);
        if prefix > family.max_prefix() {
            return Err(CidrError::PrefixTooLong {
                family,
                prefix,
                max: family.max_prefix(),
            });
        }
        Ok(CidrRange {
            addr,
            prefix,
            text: addr_cidr.to_string(),
        })
    }

    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn family(&self) -> IpFamily {
        IpFamily::of(&self.addr)
    }

    /// The string this range was parsed from.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Lowest address in the range (host bits cleared).
    pub fn network(&self) -> IpAddr {
        // prefix was range checked in new()
        cut_addr(self.addr, self.prefix).unwrap_or(self.addr)
    }

    /// True when `ip` shares the leading `prefix` bits of this range.
    ///
    /// Addresses of the other family never match; this is a plain `false`,
    /// not an error.
    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self.addr, ip) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => match get_cidr_mask_v4(self.prefix) {
                Ok(mask) => u32::from(net) & mask == u32::from(ip) & mask,
                Err(_) => false,
            },
            (IpAddr::V6(net), IpAddr::V6(ip)) => match get_cidr_mask_v6(self.prefix) {
                Ok(mask) => u128::from(net) & mask == u128::from(ip) & mask,
                Err(_) => false,
            },
            _ => false,
        }
    }

    /// True when the two ranges share at least one address.
    pub fn overlaps(&self, other: &CidrRange) -> bool {
        self.contains(other.network()) || other.contains(self.network())
    }

    /// True when every address of `other` is inside this range.
    pub fn covers(&self, other: &CidrRange) -> bool {
        self.family() == other.family()
            && self.prefix <= other.prefix
            && self.contains(other.network())
    }
}

impl Serialize for CidrRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for CidrRange {
    fn deserialize<D>(deserializer: D) -> Result<CidrRange, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CidrRange::new(&s).map_err(de::Error::custom)
    }
}

impl std::fmt::Display for CidrRange {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_get_cidr_mask_v4() {
        assert_eq!(get_cidr_mask_v4(0).unwrap(), 0x00000000);
        assert_eq!(get_cidr_mask_v4(8).unwrap(), 0xFF000000);
        assert_eq!(get_cidr_mask_v4(16).unwrap(), 0xFFFF0000);
        assert_eq!(get_cidr_mask_v4(24).unwrap(), 0xFFFFFF00);
        assert_eq!(get_cidr_mask_v4(32).unwrap(), 0xFFFFFFFF);
        assert!(get_cidr_mask_v4(33).is_err());
    }

    #[test]
    fn test_get_cidr_mask_v6() {
        assert_eq!(get_cidr_mask_v6(0).unwrap(), 0);
        assert_eq!(get_cidr_mask_v6(16).unwrap(), 0xFFFFu128 << 112);
        assert_eq!(get_cidr_mask_v6(128).unwrap(), u128::MAX);
        assert!(get_cidr_mask_v6(129).is_err());
    }

    #[test]
    fn test_cut_addr() {
        assert_eq!(cut_addr(ip("192.168.1.42"), 24).unwrap(), ip("192.168.1.0"));
        assert_eq!(cut_addr(ip("192.168.1.42"), 8).unwrap(), ip("192.0.0.0"));
        assert_eq!(cut_addr(ip("192.168.1.42"), 32).unwrap(), ip("192.168.1.42"));
        assert!(cut_addr(ip("192.168.1.42"), 33).is_err());
        assert_eq!(cut_addr(ip("2001:db8:ffff::1"), 32).unwrap(), ip("2001:db8::"));
    }

    #[test]
    fn test_new_keeps_text_and_host_bits() {
        let cidr = CidrRange::new("83.29.4.2/16").unwrap();
        assert_eq!(cidr.as_str(), "83.29.4.2/16");
        assert_eq!(cidr.addr(), ip("83.29.4.2"));
        assert_eq!(cidr.network(), ip("83.29.0.0"));
        assert_eq!(cidr.prefix(), 16);
        assert_eq!(cidr.family(), IpFamily::Ipv4);

        let v6 = CidrRange::new("60b9:0fd3:7e62:e6fe:72e2:1407:5cfa:52f6/40").unwrap();
        assert_eq!(v6.to_string(), "60b9:0fd3:7e62:e6fe:72e2:1407:5cfa:52f6/40");
        assert_eq!(v6.family(), IpFamily::Ipv6);
    }

    #[test]
    fn test_new_rejects_bad_input() {
        assert!(matches!(CidrRange::new("10.0.0.0"), Err(CidrError::Format(_))));
        assert!(matches!(CidrRange::new("10.0.0.0/8/8"), Err(CidrError::Format(_))));
        assert!(matches!(CidrRange::new("10.0.0.256/8"), Err(CidrError::Address(_))));
        assert!(matches!(CidrRange::new("10.0.0.0/"), Err(CidrError::Prefix { .. })));
        assert!(matches!(CidrRange::new("10.0.0.0/+8"), Err(CidrError::Prefix { .. })));
        assert!(matches!(
            CidrRange::new("10.0.0.0/33"),
            Err(CidrError::PrefixTooLong { .. })
        ));
        assert!(matches!(
            CidrRange::new("::1/129"),
            Err(CidrError::PrefixTooLong { .. })
        ));
        assert!(CidrRange::new("::1/128").is_ok());
    }

    #[test]
    fn test_contains_ipv4() {
        let cidr = CidrRange::new("83.29.4.2/16").unwrap();
        assert!(cidr.contains(ip("83.29.4.6")));
        assert!(cidr.contains(ip("83.29.16.6")));
        assert!(!cidr.contains(ip("83.30.4.6")));

        let all = CidrRange::new("0.0.0.0/0").unwrap();
        assert!(all.contains(ip("255.255.255.255")));
    }

    #[test]
    fn test_contains_exact_boundary() {
        let host = CidrRange::new("99.2.4.28/32").unwrap();
        assert!(host.contains(ip("99.2.4.28")));
        assert!(!host.contains(ip("99.2.4.29")));
        assert!(!host.contains(ip("99.2.4.27")));

        let host6 = CidrRange::new("2001:db8::7/128").unwrap();
        assert!(host6.contains(ip("2001:db8::7")));
        assert!(!host6.contains(ip("2001:db8::8")));
    }

    #[test]
    fn test_contains_other_family_is_false() {
        let v6 = CidrRange::new("200b:af16:a83f:c7be:dd00:d9fb:ddc3:92aa/40").unwrap();
        assert!(!v6.contains(ip("83.30.4.6")));
        let v4 = CidrRange::new("0.0.0.0/0").unwrap();
        assert!(!v4.contains(ip("::1")));
    }

    #[test]
    fn test_overlaps_and_covers() {
        let wide = CidrRange::new("83.0.0.0/8").unwrap();
        let narrow = CidrRange::new("83.29.4.2/16").unwrap();
        let other = CidrRange::new("84.0.0.0/8").unwrap();
        assert!(wide.overlaps(&narrow));
        assert!(narrow.overlaps(&wide));
        assert!(!wide.overlaps(&other));
        assert!(wide.covers(&narrow));
        assert!(!narrow.covers(&wide));
        let v6 = CidrRange::new("::/0").unwrap();
        assert!(!v6.overlaps(&wide));
    }

    #[test]
    fn test_serde_as_string() {
        let cidr = CidrRange::new("44.2.4.3/16").unwrap();
        let json = serde_json::to_string(&cidr).unwrap();
        assert_eq!(json, "\"44.2.4.3/16\"");
        let back: CidrRange = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cidr);
        assert!(serde_json::from_str::<CidrRange>("\"44.2.4.3\"").is_err());
    }
}
