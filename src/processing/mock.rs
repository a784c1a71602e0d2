//! Mock configuration generator.
//!
//! Creates random IPv4 and IPv6 mappings whose ranges never overlap, with
//! prefix lengths drawn from the grouping policy so the data looks like what
//! would be published at that level.

use super::granularity::{GroupBySettings, GroupingPolicy};
use super::grouping::{build_root, RootConfig};
use crate::config::{COUNT_MAX, MAX_ATTEMPTS_PER_SLOT, MOCK_CONNECTION_NAME_LEN};
use crate::models::{CidrRange, ConnectionMapping, IpFamily};
use rand::seq::SliceRandom;
use rand::Rng;
use std::error::Error;
use std::net::Ipv4Addr;

const IPV4_FIXTURES: [(&str, &str); 3] = [
    ("83.29.4.2/16", "fabrikam-adfs"),
    ("99.2.4.28/32", "contoso-ping"),
    ("44.2.4.3/16", "ms-azuread"),
];

const IPV6_FIXTURES: [(&str, &str); 3] = [
    ("200b:af16:a83f:c7be:dd00:d9fb:ddc3:92aa/40", "fabrikam-adfs-6"),
    ("60b9:0fd3:7e62:e6fe:72e2:1407:5cfa:52f6/40", "contoso-ping-6"),
    ("eaf5:59b7:ee1f:e78a:d5bd:a5e6:251b:7d29/64", "ms-azuread-6"),
];

/// Known mappings that can be mixed into mock data for smoke tests.
pub fn fixture_mappings(family: IpFamily) -> Vec<ConnectionMapping> {
    let fixtures: &[(&str, &str)] = match family {
        IpFamily::Ipv4 => &IPV4_FIXTURES,
        IpFamily::Ipv6 => &IPV6_FIXTURES,
    };
    fixtures
        .iter()
        .filter_map(|(cidr, conn)| ConnectionMapping::new(cidr, conn).ok())
        .collect()
}

/// Random address text; IPv6 is written as eight full groups so bucket keys
/// line up with the uncompressed form.
fn random_address<R: Rng + ?Sized>(family: IpFamily, rng: &mut R) -> String {
    match family {
        IpFamily::Ipv4 => Ipv4Addr::from(rng.gen::<u32>()).to_string(),
        IpFamily::Ipv6 => (0..8)
            .map(|_| format!("{:04x}", rng.gen::<u16>()))
            .collect::<Vec<String>>()
            .join(":"),
    }
}

fn random_connection_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..MOCK_CONNECTION_NAME_LEN)
        .map(|_| rng.gen_range(b'a'..=b'z') as char)
        .collect()
}

/// Generate `count` mappings that overlap neither each other nor `existing`.
///
/// Each slot draws up to [`MAX_ATTEMPTS_PER_SLOT`] candidates and fails once
/// they are used up, rather than looping while the space runs out.
///
/// # Arguments
/// * `policy` - Family and prefix lengths to draw from
/// * `count` - Number of new mappings
/// * `existing` - Already accepted mappings (e.g. fixtures) to stay clear of
/// * `rng` - Random source
pub fn generate_mappings<R: Rng + ?Sized>(
    policy: &GroupingPolicy,
    count: usize,
    existing: &[ConnectionMapping],
    rng: &mut R,
) -> Result<Vec<ConnectionMapping>, Box<dyn Error>> {
    if count > COUNT_MAX {
        return Err(format!("Count limit exceeded: {count} > {COUNT_MAX}").into());
    }
    let family = policy.family();
    let mut accepted: Vec<CidrRange> = existing.iter().map(|m| m.cidr.clone()).collect();
    let mut generated = Vec::with_capacity(count);

    for slot in 0..count {
        let mut placed = false;
        for _ in 0..MAX_ATTEMPTS_PER_SLOT {
            let mask = policy
                .mask_lengths()
                .choose(rng)
                .ok_or("Grouping policy has no mask lengths")?;
            let cidr = CidrRange::new(&format!("{}/{}", random_address(family, rng), mask))?;
            if accepted.iter().any(|a| a.overlaps(&cidr)) {
                continue;
            }
            let mapping = ConnectionMapping::new(cidr.as_str(), &random_connection_name(rng))?;
            accepted.push(cidr);
            generated.push(mapping);
            placed = true;
            break;
        }
        if !placed {
            return Err(format!(
                "No free {family} range for mock mapping #{slot} after {MAX_ATTEMPTS_PER_SLOT} attempts"
            )
            .into());
        }
    }

    log::info!("Generated {} mock {family} mappings", generated.len());
    Ok(generated)
}

/// Fixtures (when asked for) followed by `count` random mappings.
fn generate_family<R: Rng + ?Sized>(
    settings: &GroupBySettings,
    family: IpFamily,
    count: usize,
    with_fixtures: bool,
    rng: &mut R,
) -> Result<Vec<ConnectionMapping>, Box<dyn Error>> {
    let mut list = if with_fixtures {
        fixture_mappings(family)
    } else {
        vec![]
    };
    let generated = generate_mappings(settings.policy(family), count, &list, rng)?;
    list.extend(generated);
    Ok(list)
}

/// Generate a complete mock root for both families.
///
/// With `with_fixtures` the known fixture mappings come first in each list,
/// followed by `count` random ones.
pub fn generate_mock_root<R: Rng + ?Sized>(
    settings: &GroupBySettings,
    count: usize,
    with_fixtures: bool,
    rng: &mut R,
) -> Result<RootConfig, Box<dyn Error>> {
    let ipv4 = generate_family(settings, IpFamily::Ipv4, count, with_fixtures, rng)?;
    let ipv6 = generate_family(settings, IpFamily::Ipv6, count, with_fixtures, rng)?;
    Ok(build_root(ipv4, ipv6, settings))
}
