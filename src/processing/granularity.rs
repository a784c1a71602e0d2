//! Granularity levels and bucket key derivation.
//!
//! IPv4 ranges can be grouped by their first 8, 16 or 24 bits and IPv6 ranges
//! by their first 16, 32 or 48 bits. Grouping keeps each fetch small: a lookup
//! only needs the bucket its address falls in. The level is parsed once into a
//! [`GroupingPolicy`], which carries the bucket function and the mask lengths
//! that are plausible at that level.

use crate::error::ConfigError;
use crate::models::IpFamily;
use std::fmt;
use std::str::FromStr;

/// Valid `--ipv4GroupBy` tokens, for messages.
pub const IPV4_GROUP_BY_OPTIONS: &str = "none, 8, 16, 24";
/// Valid `--ipv6GroupBy` tokens, for messages.
pub const IPV6_GROUP_BY_OPTIONS: &str = "none, 16, 32, 48";

/// Separator between segments of a bucket key.
///
/// `.` is not allowed in Firebase keys, so both families use `:`.
pub const BUCKET_KEY_SEPARATOR: &str = ":";

/// IPv4 grouping level in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ipv4GroupBy {
    None,
    By8Bits,
    By16Bits,
    By24Bits,
}

/// IPv6 grouping level in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ipv6GroupBy {
    None,
    By16Bits,
    By32Bits,
    By48Bits,
}

impl Ipv4GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ipv4GroupBy::None => "none",
            Ipv4GroupBy::By8Bits => "8",
            Ipv4GroupBy::By16Bits => "16",
            Ipv4GroupBy::By24Bits => "24",
        }
    }

    pub fn policy(&self) -> GroupingPolicy {
        let (segments, mask_lengths): (Option<usize>, &'static [u8]) = match self {
            Ipv4GroupBy::None => (None, &[8, 16, 24, 32]),
            Ipv4GroupBy::By8Bits => (Some(1), &[8, 16, 24, 32]),
            Ipv4GroupBy::By16Bits => (Some(2), &[16, 24, 32]),
            Ipv4GroupBy::By24Bits => (Some(3), &[24, 32]),
        };
        GroupingPolicy {
            family: IpFamily::Ipv4,
            label: self.as_str(),
            segments,
            mask_lengths,
        }
    }
}

impl Ipv6GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ipv6GroupBy::None => "none",
            Ipv6GroupBy::By16Bits => "16",
            Ipv6GroupBy::By32Bits => "32",
            Ipv6GroupBy::By48Bits => "48",
        }
    }

    pub fn policy(&self) -> GroupingPolicy {
        let (segments, mask_lengths): (Option<usize>, &'static [u8]) = match self {
            Ipv6GroupBy::None => (None, &[16, 32, 48, 64]),
            Ipv6GroupBy::By16Bits => (Some(1), &[16, 32, 48, 64]),
            Ipv6GroupBy::By32Bits => (Some(2), &[32, 48, 64]),
            Ipv6GroupBy::By48Bits => (Some(3), &[48, 64]),
        };
        GroupingPolicy {
            family: IpFamily::Ipv6,
            label: self.as_str(),
            segments,
            mask_lengths,
        }
    }
}

impl FromStr for Ipv4GroupBy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Ipv4GroupBy::None),
            "8" => Ok(Ipv4GroupBy::By8Bits),
            "16" => Ok(Ipv4GroupBy::By16Bits),
            "24" => Ok(Ipv4GroupBy::By24Bits),
            _ => Err(ConfigError::UnsupportedGranularity {
                family: IpFamily::Ipv4,
                value: s.to_string(),
                valid: IPV4_GROUP_BY_OPTIONS,
            }),
        }
    }
}

impl FromStr for Ipv6GroupBy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Ipv6GroupBy::None),
            "16" => Ok(Ipv6GroupBy::By16Bits),
            "32" => Ok(Ipv6GroupBy::By32Bits),
            "48" => Ok(Ipv6GroupBy::By48Bits),
            _ => Err(ConfigError::UnsupportedGranularity {
                family: IpFamily::Ipv6,
                value: s.to_string(),
                valid: IPV6_GROUP_BY_OPTIONS,
            }),
        }
    }
}

impl fmt::Display for Ipv4GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Ipv6GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete grouping behaviour for one family at one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupingPolicy {
    family: IpFamily,
    label: &'static str,
    /// Leading segments in a bucket key, `None` for a single flat list.
    segments: Option<usize>,
    mask_lengths: &'static [u8],
}

impl GroupingPolicy {
    pub fn family(&self) -> IpFamily {
        self.family
    }

    /// The level token this policy was built from ("none", "16", ...).
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn is_grouped(&self) -> bool {
        self.segments.is_some()
    }

    /// Prefix lengths no shorter than the bucket width, ascending.
    pub fn mask_lengths(&self) -> &'static [u8] {
        self.mask_lengths
    }

    /// Bucket key for a CIDR or bare address string.
    ///
    /// A level of "none" still yields the first-segment key, matching the
    /// 8 and 16 bit levels.
    pub fn bucket_key(&self, text: &str) -> String {
        bucket_key(self.family, text, self.segments.unwrap_or(1))
    }

    /// Bucket to fetch for `text`, or `None` when this policy is flat.
    pub fn bucket_for(&self, text: &str) -> Option<String> {
        self.segments
            .map(|segments| bucket_key(self.family, text, segments))
    }
}

/// Take the first `segments` segments of an address or CIDR string.
///
/// Works on the text only: any `/prefix` suffix is dropped, the rest is split
/// on `.` (IPv4) or `:` (IPv6) and rejoined with [`BUCKET_KEY_SEPARATOR`].
/// Segments are not normalised, so `0fd3` and `fd3` give different keys.
pub fn bucket_key(family: IpFamily, text: &str, segments: usize) -> String {
    let addr = text.split('/').next().unwrap_or_default();
    let split_on = match family {
        IpFamily::Ipv4 => '.',
        IpFamily::Ipv6 => ':',
    };
    addr.split(split_on)
        .take(segments)
        .collect::<Vec<&str>>()
        .join(BUCKET_KEY_SEPARATOR)
}

/// Both per-family policies, resolved once from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupBySettings {
    ipv4: GroupingPolicy,
    ipv6: GroupingPolicy,
}

impl GroupBySettings {
    pub fn new(ipv4: Ipv4GroupBy, ipv6: Ipv6GroupBy) -> GroupBySettings {
        GroupBySettings {
            ipv4: ipv4.policy(),
            ipv6: ipv6.policy(),
        }
    }

    pub fn policy(&self, family: IpFamily) -> &GroupingPolicy {
        match family {
            IpFamily::Ipv4 => &self.ipv4,
            IpFamily::Ipv6 => &self.ipv6,
        }
    }
}

impl fmt::Display for GroupBySettings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "IPv4: {} IPv6: {}", self.ipv4.label, self.ipv6.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!("none".parse::<Ipv4GroupBy>().unwrap(), Ipv4GroupBy::None);
        assert_eq!("24".parse::<Ipv4GroupBy>().unwrap(), Ipv4GroupBy::By24Bits);
        assert_eq!("48".parse::<Ipv6GroupBy>().unwrap(), Ipv6GroupBy::By48Bits);
        for bad in ["32", "by16Bits", "", "NONE", " 8"] {
            assert!(bad.parse::<Ipv4GroupBy>().is_err(), "ipv4 {bad:?}");
        }
        for bad in ["8", "24", "64", "by32Bits"] {
            assert!(bad.parse::<Ipv6GroupBy>().is_err(), "ipv6 {bad:?}");
        }
    }

    #[test]
    fn test_parse_roundtrips_display() {
        for level in ["none", "8", "16", "24"] {
            assert_eq!(level.parse::<Ipv4GroupBy>().unwrap().to_string(), level);
        }
        for level in ["none", "16", "32", "48"] {
            assert_eq!(level.parse::<Ipv6GroupBy>().unwrap().to_string(), level);
        }
    }

    #[test]
    fn test_mask_lengths() {
        assert_eq!(Ipv4GroupBy::None.policy().mask_lengths(), &[8, 16, 24, 32]);
        assert_eq!(Ipv4GroupBy::By8Bits.policy().mask_lengths(), &[8, 16, 24, 32]);
        assert_eq!(Ipv4GroupBy::By16Bits.policy().mask_lengths(), &[16, 24, 32]);
        assert_eq!(Ipv4GroupBy::By24Bits.policy().mask_lengths(), &[24, 32]);
        assert_eq!(Ipv6GroupBy::None.policy().mask_lengths(), &[16, 32, 48, 64]);
        assert_eq!(Ipv6GroupBy::By16Bits.policy().mask_lengths(), &[16, 32, 48, 64]);
        assert_eq!(Ipv6GroupBy::By32Bits.policy().mask_lengths(), &[32, 48, 64]);
        assert_eq!(Ipv6GroupBy::By48Bits.policy().mask_lengths(), &[48, 64]);
    }

    #[test]
    fn test_bucket_key_ipv4() {
        let cidr = "83.29.4.2/16";
        assert_eq!(Ipv4GroupBy::By8Bits.policy().bucket_key(cidr), "83");
        assert_eq!(Ipv4GroupBy::By16Bits.policy().bucket_key(cidr), "83:29");
        assert_eq!(Ipv4GroupBy::By24Bits.policy().bucket_key(cidr), "83:29:4");
        assert_eq!(Ipv4GroupBy::None.policy().bucket_key(cidr), "83");
    }

    #[test]
    fn test_bucket_key_ipv6() {
        let cidr = "200b:af16:a83f:c7be:dd00:d9fb:ddc3:92aa/40";
        assert_eq!(Ipv6GroupBy::By16Bits.policy().bucket_key(cidr), "200b");
        assert_eq!(Ipv6GroupBy::By32Bits.policy().bucket_key(cidr), "200b:af16");
        assert_eq!(Ipv6GroupBy::By48Bits.policy().bucket_key(cidr), "200b:af16:a83f");
        assert_eq!(
            Ipv6GroupBy::By32Bits.policy().bucket_key("60b9:0fd3:7e62:e6fe:72e2:1407:5cfa:52f6/40"),
            "60b9:0fd3"
        );
    }

    #[test]
    fn test_bucket_key_same_for_cidr_and_address() {
        let pairs = [
            ("83.29.4.2/16", "83.29.4.6"),
            ("99.2.4.28/32", "99.2.4.28"),
            ("10.200.3.0/24", "10.200.3.77"),
        ];
        for level in [Ipv4GroupBy::By8Bits, Ipv4GroupBy::By16Bits, Ipv4GroupBy::By24Bits] {
            let policy = level.policy();
            for (cidr, addr) in pairs {
                assert_eq!(policy.bucket_key(cidr), policy.bucket_key(addr), "{level} {cidr}");
            }
        }
        let pairs6 = [(
            "eaf5:59b7:ee1f:e78a:d5bd:a5e6:251b:7d29/64",
            "eaf5:59b7:ee1f:1:2:3:4:5",
        )];
        for level in [Ipv6GroupBy::By16Bits, Ipv6GroupBy::By32Bits, Ipv6GroupBy::By48Bits] {
            let policy = level.policy();
            for (cidr, addr) in pairs6 {
                assert_eq!(policy.bucket_key(cidr), policy.bucket_key(addr), "{level} {cidr}");
            }
        }
    }

    #[test]
    fn test_bucket_for_flat_policy() {
        assert_eq!(Ipv4GroupBy::None.policy().bucket_for("83.29.4.6"), None);
        assert_eq!(
            Ipv4GroupBy::By16Bits.policy().bucket_for("83.29.4.6"),
            Some("83:29".to_string())
        );
        assert!(!Ipv6GroupBy::None.policy().is_grouped());
    }

    #[test]
    fn test_settings_select_family() {
        let settings = GroupBySettings::new(Ipv4GroupBy::By16Bits, Ipv6GroupBy::By32Bits);
        assert_eq!(settings.policy(IpFamily::Ipv4).label(), "16");
        assert_eq!(settings.policy(IpFamily::Ipv6).family(), IpFamily::Ipv6);
        assert_eq!(settings.to_string(), "IPv4: 16 IPv6: 32");
    }
}
