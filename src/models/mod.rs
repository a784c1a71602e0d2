//! Domain models for CIDR to connection mapping.
//!
//! This module contains the core data structures used throughout the crate:
//! - [`Address`] - a validated IP literal and its family
//! - [`CidrRange`] - IPv4/IPv6 range with membership tests
//! - [`ConnectionMapping`] and [`Resolution`] - mapping entries and lookup results

mod address;
mod cidr;
mod mapping;

// Re-export public types
pub use address::{classify, Address, IpFamily};
pub use cidr::{
    cut_addr, get_cidr_mask_v4, get_cidr_mask_v6, CidrRange, MAX_LENGTH_V4, MAX_LENGTH_V6,
};
pub use mapping::{ConnectionMapping, Resolution, StoredMapping, UNKNOWN_CONNECTION};
