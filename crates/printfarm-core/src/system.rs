// ── Host system information ──

use std::net::IpAddr;

/// Host facts consumed by the address-labeling heuristic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemSnapshot {
    /// Addresses the farm host answers on. A web client connecting
    /// from one of these is the farm's own UI.
    pub network_addresses: Vec<IpAddr>,
    /// Display title configured for this farm instance.
    pub site_title: String,
}

/// Source of host facts.
///
/// The default implementation is a static snapshot fed from config;
/// a deployment that enumerates interfaces at runtime plugs in here.
pub trait SystemLookup: Send + Sync {
    fn info(&self) -> SystemSnapshot;
}

/// Process-local [`SystemLookup`] holding a fixed snapshot.
#[derive(Debug, Clone)]
pub struct StaticSystemLookup {
    snapshot: SystemSnapshot,
}

impl StaticSystemLookup {
    pub fn new(network_addresses: Vec<IpAddr>, site_title: impl Into<String>) -> Self {
        Self {
            snapshot: SystemSnapshot {
                network_addresses,
                site_title: site_title.into(),
            },
        }
    }
}

impl SystemLookup for StaticSystemLookup {
    fn info(&self) -> SystemSnapshot {
        self.snapshot.clone()
    }
}
