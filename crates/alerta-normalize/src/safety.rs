//! SSRF safety checks against resolved or literal IP addresses.
//!
//! Grounded on the `secure_fetch` handler of the pack's SSRF demo binary:
//! reject loopback, link-local, unique-local, private, multicast,
//! broadcast, and the cloud metadata address, checking octets directly
//! rather than relying on unstable `std::net` predicates.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Cloud-metadata address blocked regardless of its (link-local) range
/// classification, called out explicitly because it is the single most
/// common SSRF exfiltration target.
const METADATA_ADDR: Ipv4Addr = Ipv4Addr::new(169, 254, 169, 254);

/// Returns `Some(reason)` if `addr` must be rejected as an SSRF-hazardous
/// fetch target, `None` if it is safe to reach.
pub fn blocked_reason(addr: IpAddr) -> Option<&'static str> {
    match addr {
        IpAddr::V4(v4) => blocked_reason_v4(v4),
        IpAddr::V6(v6) => blocked_reason_v6(v6),
    }
}

fn blocked_reason_v4(addr: Ipv4Addr) -> Option<&'static str> {
    if addr == METADATA_ADDR {
        return Some("cloud metadata address");
    }
    if addr.is_loopback() {
        return Some("loopback address");
    }
    if addr.is_link_local() {
        return Some("link-local address");
    }
    if addr.is_private() {
        return Some("private address");
    }
    if addr.is_multicast() {
        return Some("multicast address");
    }
    if addr.is_broadcast() {
        return Some("broadcast address");
    }
    if addr.is_unspecified() {
        return Some("unspecified address");
    }
    None
}

fn blocked_reason_v6(addr: Ipv6Addr) -> Option<&'static str> {
    if addr.is_loopback() {
        return Some("loopback address");
    }
    if addr.is_unspecified() {
        return Some("unspecified address");
    }
    if addr.is_multicast() {
        return Some("multicast address");
    }
    // Unique-local: fc00::/7.
    if (addr.segments()[0] & 0xfe00) == 0xfc00 {
        return Some("unique-local address");
    }
    // Link-local: fe80::/10.
    if (addr.segments()[0] & 0xffc0) == 0xfe80 {
        return Some("link-local address");
    }
    // IPv4-mapped addresses inherit the IPv4 check.
    if let Some(v4) = addr.to_ipv4_mapped() {
        return blocked_reason_v4(v4);
    }
    None
}
