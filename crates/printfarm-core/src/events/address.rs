// ── Remote-address labeling ──
//
// Session events carry the web client's remote socket address as an
// opaque string. Ticker lines label it: a connection from one of the
// host's own addresses shows the configured site title instead of an
// IP, anything else shows the parsed address, and an absent or
// unparseable value shows a fixed placeholder.

use std::net::{IpAddr, SocketAddr};

/// Placeholder for an absent or unparseable remote address.
pub const UNKNOWN_ADDRESS: &str = "Unknown IP";

/// Extract the bare IP from a reported remote address.
///
/// Controllers report addresses in several shapes: a plain IP, an
/// `ip:port` socket address, or an IPv4 tunneled through the IPv6
/// mapped prefix (`::ffff:10.0.0.5`). All collapse to the underlying
/// IP.
pub fn parse_remote_ip(raw: &str) -> Option<IpAddr> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(addr) = trimmed.parse::<IpAddr>() {
        return Some(unmap(addr));
    }
    if let Ok(sock) = trimmed.parse::<SocketAddr>() {
        return Some(unmap(sock.ip()));
    }
    // "::ffff:10.0.0.5:8080" is not a valid SocketAddr; peel the
    // mapped prefix and retry.
    if let Some(rest) = trimmed.strip_prefix("::ffff:") {
        return parse_remote_ip(rest);
    }
    None
}

fn unmap(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(IpAddr::V6(v6), IpAddr::V4),
        v4 @ IpAddr::V4(_) => v4,
    }
}

/// Label a reported remote address for display.
///
/// A remote matching one of the host's own addresses is shown as the
/// site title; any other parseable remote shows its IP; everything
/// else shows [`UNKNOWN_ADDRESS`].
pub fn label_remote_address(
    remote: Option<&str>,
    local_addresses: &[IpAddr],
    site_title: &str,
) -> String {
    match remote.and_then(parse_remote_ip) {
        Some(ip) if local_addresses.contains(&ip) => site_title.to_owned(),
        Some(ip) => ip.to_string(),
        None => UNKNOWN_ADDRESS.to_owned(),
    }
}
