// ── Automation script triggering ──
//
// Operators attach scripts to lifecycle hooks ("started", "paused",
// "clientauthed", ...). Script execution lives behind the
// `ScriptExecutor` seam; this adapter only decides when to fire and
// guarantees the pipeline never waits on a script.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::error::CoreResult;
use crate::model::PrinterState;

/// Executes an operator script attached to a lifecycle hook.
#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    /// Run whatever script is registered for `hook` against `printer`.
    /// `context` carries optional event data for scripts that want it.
    async fn check(
        &self,
        printer: Arc<PrinterState>,
        hook: &str,
        context: Option<serde_json::Value>,
    ) -> CoreResult<serde_json::Value>;
}

/// Fire-and-forget bridge from the event pipeline to the executor.
///
/// `fire` returns before the script runs; the outcome is logged on a
/// spawned task and never propagates. A hung or failing script costs
/// one background task, not lane throughput.
#[derive(Clone)]
pub struct AutomationTrigger {
    executor: Arc<dyn ScriptExecutor>,
}

impl AutomationTrigger {
    pub fn new(executor: Arc<dyn ScriptExecutor>) -> Self {
        Self { executor }
    }

    pub fn fire(&self, printer: Arc<PrinterState>, hook: &'static str) {
        self.fire_with_context(printer, hook, None);
    }

    pub fn fire_with_context(
        &self,
        printer: Arc<PrinterState>,
        hook: &'static str,
        context: Option<serde_json::Value>,
    ) {
        let executor = Arc::clone(&self.executor);
        let printer_id = printer.id;
        tokio::spawn(async move {
            match executor.check(printer, hook, context).await {
                Ok(result) => {
                    info!(printer = %printer_id, hook, %result, "automation script completed");
                }
                Err(e) => {
                    error!(printer = %printer_id, hook, error = %e, "automation script failed");
                }
            }
        });
    }
}
