// ── Activity ticker ──
//
// Bounded journal of human-readable connection activity, one line per
// noteworthy event. Dashboards subscribe to the snapshot feed; the
// pipeline only ever appends.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::warn;

use crate::model::PrinterId;
use crate::stream::SnapshotStream;

pub const DEFAULT_TICKER_CAPACITY: usize = 1000;

/// Display severity of a ticker line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[non_exhaustive]
pub enum TickerSeverity {
    Info,
    Active,
    Complete,
    Offline,
}

/// One journaled activity line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerEntry {
    pub at: DateTime<Utc>,
    pub printer_id: PrinterId,
    /// Controller URL at the time of the entry, for display.
    pub printer_url: String,
    pub message: String,
    pub severity: TickerSeverity,
}

type TickerSnapshot = Arc<Vec<Arc<TickerEntry>>>;

/// Bounded ring of recent activity with a reactive snapshot feed.
///
/// When the ring is full the oldest entry is evicted. Appending never
/// fails observably; a poisoned ring drops the entry after a log line
/// rather than unwinding into the caller.
pub struct ActivityTicker {
    entries: Mutex<VecDeque<Arc<TickerEntry>>>,
    capacity: usize,
    snapshot: watch::Sender<TickerSnapshot>,
}

impl ActivityTicker {
    pub fn new(capacity: usize) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_TICKER_CAPACITY))),
            capacity: capacity.max(1),
            snapshot,
        }
    }

    /// Append an activity line, evicting the oldest when full.
    pub fn add_issue(
        &self,
        printer_id: PrinterId,
        printer_url: impl Into<String>,
        message: impl Into<String>,
        severity: TickerSeverity,
    ) {
        let entry = Arc::new(TickerEntry {
            at: Utc::now(),
            printer_id,
            printer_url: printer_url.into(),
            message: message.into(),
            severity,
        });

        let Ok(mut entries) = self.entries.lock() else {
            warn!(printer = %printer_id, "ticker ring poisoned, dropping entry");
            return;
        };
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);

        let snap: Vec<Arc<TickerEntry>> = entries.iter().map(Arc::clone).collect();
        drop(entries);
        self.snapshot.send_modify(|s| *s = Arc::new(snap));
    }

    /// Current journal, oldest first (cheap `Arc` clone).
    pub fn snapshot(&self) -> TickerSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to journal changes.
    pub fn subscribe(&self) -> SnapshotStream<TickerSnapshot> {
        SnapshotStream::new(self.snapshot.subscribe())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ActivityTicker {
    fn default() -> Self {
        Self::new(DEFAULT_TICKER_CAPACITY)
    }
}
