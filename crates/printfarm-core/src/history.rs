// ── Print history capture ──
//
// Terminal print events and controller errors produce immutable
// records for the history collection. The snapshot is taken
// synchronously, at the moment the event is processed, so the record
// reflects the state the event arrived against; the submission itself
// is fire-and-forget.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info};

use crate::error::CoreResult;
use crate::model::{ErrorRecord, EventEnvelope, HistoryRecord, JobOutcome, PrinterState};

/// Destination for finished-print and error records.
#[async_trait]
pub trait HistorySink: Send + Sync {
    async fn capture_print(&self, record: HistoryRecord) -> CoreResult<()>;
    async fn error_log(&self, record: ErrorRecord) -> CoreResult<()>;
}

/// Builds records from live state and hands them to the sink.
#[derive(Clone)]
pub struct HistoryCapture {
    sink: Arc<dyn HistorySink>,
}

impl HistoryCapture {
    pub fn new(sink: Arc<dyn HistorySink>) -> Self {
        Self { sink }
    }

    /// Snapshot a finished print and submit it. Returns immediately;
    /// the submission outcome is logged on a spawned task.
    pub fn capture_print(
        &self,
        printer: &PrinterState,
        envelope: &EventEnvelope,
        outcome: JobOutcome,
    ) {
        let record = HistoryRecord {
            printer_id: printer.id,
            outcome,
            job: printer.job.clone(),
            elapsed_secs: envelope.job_time_secs(),
            resend_stats: printer.resend_stats,
            captured_at: Utc::now(),
        };

        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            let printer_id = record.printer_id;
            match sink.capture_print(record).await {
                Ok(()) => info!(printer = %printer_id, %outcome, "captured print history"),
                Err(e) => {
                    error!(printer = %printer_id, error = %e, "failed to capture print history");
                }
            }
        });
    }

    /// Snapshot a controller-reported error and submit it.
    pub fn error_log(&self, printer: &PrinterState, envelope: &EventEnvelope) {
        let message = envelope
            .payload
            .get("error")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unspecified error")
            .to_owned();

        let record = ErrorRecord {
            printer_id: printer.id,
            message,
            job: printer.job.clone(),
            resend_stats: printer.resend_stats,
            captured_at: Utc::now(),
        };

        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            let printer_id = record.printer_id;
            match sink.error_log(record).await {
                Ok(()) => info!(printer = %printer_id, "captured error log"),
                Err(e) => error!(printer = %printer_id, error = %e, "failed to capture error log"),
            }
        });
    }
}
