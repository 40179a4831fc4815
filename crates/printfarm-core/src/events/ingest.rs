// ── Event ingestion lanes ──
//
// The boundary between the printer connection layer and the pipeline.
// Each printer gets a dedicated mpsc lane and worker task, so events
// from one printer process strictly in arrival order while distinct
// printers run fully in parallel. Workers are cancellation-aware and
// joined on shutdown.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::events::normalize::normalize;
use crate::events::router::EventRouter;
use crate::model::PrinterId;

pub const DEFAULT_LANE_DEPTH: usize = 256;

struct RawEvent {
    raw_kind: String,
    payload: serde_json::Value,
}

struct Lane {
    tx: mpsc::Sender<RawEvent>,
    handle: JoinHandle<()>,
}

/// Per-printer ingestion front of the pipeline.
///
/// `submit` is non-blocking apart from lane backpressure: a full lane
/// makes the caller wait for queue space, which is the push-back that
/// keeps a flooding controller from unbounded memory growth.
pub struct EventIngest {
    router: Arc<EventRouter>,
    lanes: DashMap<PrinterId, Lane>,
    lane_depth: usize,
    cancel: CancellationToken,
}

impl EventIngest {
    pub fn new(router: Arc<EventRouter>, lane_depth: usize) -> Self {
        Self {
            router,
            lanes: DashMap::new(),
            lane_depth: lane_depth.max(1),
            cancel: CancellationToken::new(),
        }
    }

    /// Queue one raw controller event for processing.
    ///
    /// The first event from a printer spins up its lane. Returns once
    /// the event is queued; processing happens on the lane worker.
    pub async fn submit(
        &self,
        printer_id: PrinterId,
        raw_kind: impl Into<String>,
        payload: serde_json::Value,
    ) -> CoreResult<()> {
        if self.cancel.is_cancelled() {
            return Err(CoreError::ShuttingDown);
        }

        let tx = match self.lanes.entry(printer_id) {
            Entry::Occupied(occupied) => occupied.get().tx.clone(),
            Entry::Vacant(vacant) => {
                let (tx, rx) = mpsc::channel(self.lane_depth);
                let handle = tokio::spawn(lane_worker(
                    printer_id,
                    rx,
                    Arc::clone(&self.router),
                    self.cancel.child_token(),
                ));
                vacant.insert(Lane {
                    tx: tx.clone(),
                    handle,
                });
                debug!(printer = %printer_id, "opened event lane");
                tx
            }
        };

        let event = RawEvent {
            raw_kind: raw_kind.into(),
            payload,
        };
        tx.send(event)
            .await
            .map_err(|_| CoreError::LaneClosed { id: printer_id })
    }

    /// Tear down one printer's lane, letting queued events drain first.
    pub async fn close_lane(&self, printer_id: PrinterId) {
        if let Some((_, lane)) = self.lanes.remove(&printer_id) {
            drop(lane.tx);
            if let Err(e) = lane.handle.await {
                warn!(printer = %printer_id, error = %e, "lane worker ended abnormally");
            }
        }
    }

    /// Stop accepting events, cancel every worker, and join them.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let ids: Vec<PrinterId> = self.lanes.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            if let Some((_, lane)) = self.lanes.remove(&id) {
                drop(lane.tx);
                if let Err(e) = lane.handle.await {
                    warn!(printer = %id, error = %e, "lane worker ended abnormally");
                }
            }
        }
    }

    /// Number of currently open lanes.
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }
}

async fn lane_worker(
    printer_id: PrinterId,
    mut rx: mpsc::Receiver<RawEvent>,
    router: Arc<EventRouter>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            maybe_event = rx.recv() => {
                let Some(event) = maybe_event else { break };
                let envelope = normalize(printer_id, &event.raw_kind, event.payload);
                // Sequential dispatch is the ordering guarantee: all
                // effects of this event land before the next starts.
                router.dispatch(&envelope).await;
            }
        }
    }
    debug!(printer = %printer_id, "event lane closed");
}
