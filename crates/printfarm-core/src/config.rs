// ── Runtime farm settings ──
//
// These types describe how the pipeline behaves at runtime. The
// config crate constructs a `FarmSettings` from disk and environment;
// core never reads config files.

use std::net::IpAddr;
use std::sync::Arc;

use crate::events::DEFAULT_LANE_DEPTH;
use crate::system::StaticSystemLookup;
use crate::ticker::DEFAULT_TICKER_CAPACITY;

/// Runtime tuning for one farm instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FarmSettings {
    /// Display title for this farm, shown in place of local addresses.
    pub site_title: String,
    /// Addresses the farm host answers on.
    pub network_addresses: Vec<IpAddr>,
    /// Activity ticker ring capacity.
    pub ticker_capacity: usize,
    /// Queue depth of each per-printer event lane.
    pub lane_depth: usize,
}

impl Default for FarmSettings {
    fn default() -> Self {
        Self {
            site_title: "PrintFarm".into(),
            network_addresses: Vec::new(),
            ticker_capacity: DEFAULT_TICKER_CAPACITY,
            lane_depth: DEFAULT_LANE_DEPTH,
        }
    }
}

impl FarmSettings {
    /// System lookup backed by these settings.
    pub fn system_lookup(&self) -> Arc<StaticSystemLookup> {
        Arc::new(StaticSystemLookup::new(
            self.network_addresses.clone(),
            self.site_title.clone(),
        ))
    }
}
