//! Connectivity gate checked before a fetch cycle starts.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use crate::config::ViewerConfig;

/// Synchronous "can we reach the network at all" query.
pub trait NetworkAvailability: Send + Sync {
    fn is_available(&self) -> bool;
}

/// Asks the OS routing table whether `target` is reachable.
///
/// Connecting a UDP socket only resolves a route; no datagram is sent.
#[derive(Debug, Clone, Copy)]
pub struct RouteProbe {
    target: SocketAddr,
}

impl RouteProbe {
    pub fn new(target: SocketAddr) -> Self {
        Self { target }
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl From<&ViewerConfig> for RouteProbe {
    fn from(config: &ViewerConfig) -> Self {
        Self::new(config.probe_addr)
    }
}

impl NetworkAvailability for RouteProbe {
    fn is_available(&self) -> bool {
        let local: SocketAddr = match self.target {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };

        let result = UdpSocket::bind(local).and_then(|socket| socket.connect(self.target));
        if let Err(e) = &result {
            tracing::debug!("No route to {}: {e}", self.target);
        }
        result.is_ok()
    }
}

/// Fixed answer, for forced offline mode and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticAvailability(pub bool);

impl NetworkAvailability for StaticAvailability {
    fn is_available(&self) -> bool {
        self.0
    }
}

impl<T: NetworkAvailability + ?Sized> NetworkAvailability for std::sync::Arc<T> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}
