//! Picks the address to advertise in the connection URL.

use std::net::{IpAddr, SocketAddr, UdpSocket};

/// The local address the OS would route LAN traffic from.
///
/// Connecting a UDP socket selects a route without sending anything.
pub fn best_effort_local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("192.0.2.1:80").ok()?;
    Some(socket.local_addr().ok()?.ip())
}

/// Address devices should dial for a listener bound to `bind_addr`.
///
/// A specific bind address is used as is.  For a wildcard bind the routed
/// LAN address is used, falling back to loopback.
pub fn advertise_host_for(bind_addr: SocketAddr) -> String {
    let ip = bind_addr.ip();
    if !ip.is_unspecified() {
        return ip.to_string();
    }
    best_effort_local_ip()
        .filter(|ip| !ip.is_unspecified())
        .unwrap_or_else(|| IpAddr::from([127, 0, 0, 1]))
        .to_string()
}
