// End-to-end pipeline tests: ingest lanes -> router -> reactions,
// wired to recording collaborator doubles.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;

use printfarm_core::events::reactions::{default_router, FirmwareReaction};
use printfarm_core::{
    ActivityTicker, AutomationTrigger, CoreError, CoreResult, ErrorRecord, EventEnvelope,
    EventIngest, EventKind, EventRouter, HistoryCapture, HistoryRecord, HistorySink, JobOutcome,
    PrinterId, PrinterPatch, PrinterState, PrinterStore, Reaction, ReactionContext,
    ScriptExecutor, StaticSystemLookup, TickerSeverity,
};

// ── Recording doubles ───────────────────────────────────────────────

#[derive(Default)]
struct RecordingExecutor {
    hooks: Mutex<Vec<(PrinterId, String)>>,
    reject: Mutex<Vec<String>>,
}

impl RecordingExecutor {
    fn hooks(&self) -> Vec<(PrinterId, String)> {
        self.hooks.lock().unwrap().clone()
    }

    fn hook_names(&self) -> Vec<String> {
        self.hooks().into_iter().map(|(_, h)| h).collect()
    }

    fn reject_hook(&self, hook: &str) {
        self.reject.lock().unwrap().push(hook.to_owned());
    }
}

#[async_trait]
impl ScriptExecutor for RecordingExecutor {
    async fn check(
        &self,
        printer: Arc<PrinterState>,
        hook: &str,
        _context: Option<serde_json::Value>,
    ) -> CoreResult<serde_json::Value> {
        self.hooks.lock().unwrap().push((printer.id, hook.to_owned()));
        if self.reject.lock().unwrap().iter().any(|h| h == hook) {
            return Err(CoreError::Script {
                hook: hook.to_owned(),
                message: "operator script exited nonzero".into(),
            });
        }
        Ok(serde_json::Value::Null)
    }
}

#[derive(Default)]
struct RecordingSink {
    prints: Mutex<Vec<HistoryRecord>>,
    errors: Mutex<Vec<ErrorRecord>>,
}

impl RecordingSink {
    fn prints(&self) -> Vec<HistoryRecord> {
        self.prints.lock().unwrap().clone()
    }

    fn errors(&self) -> Vec<ErrorRecord> {
        self.errors.lock().unwrap().clone()
    }
}

#[async_trait]
impl HistorySink for RecordingSink {
    async fn capture_print(&self, record: HistoryRecord) -> CoreResult<()> {
        self.prints.lock().unwrap().push(record);
        Ok(())
    }

    async fn error_log(&self, record: ErrorRecord) -> CoreResult<()> {
        self.errors.lock().unwrap().push(record);
        Ok(())
    }
}

// ── Harness ─────────────────────────────────────────────────────────

struct Harness {
    store: Arc<PrinterStore>,
    ticker: Arc<ActivityTicker>,
    executor: Arc<RecordingExecutor>,
    sink: Arc<RecordingSink>,
    ingest: EventIngest,
}

impl Harness {
    fn context(
        store: &Arc<PrinterStore>,
        ticker: &Arc<ActivityTicker>,
        executor: &Arc<RecordingExecutor>,
        sink: &Arc<RecordingSink>,
    ) -> ReactionContext {
        ReactionContext {
            store: Arc::clone(store),
            ticker: Arc::clone(ticker),
            automation: AutomationTrigger::new(
                Arc::clone(executor) as Arc<dyn ScriptExecutor>
            ),
            history: HistoryCapture::new(Arc::clone(sink) as Arc<dyn HistorySink>),
            system: Arc::new(StaticSystemLookup::new(
                vec!["192.168.1.10".parse().unwrap()],
                "Test Farm",
            )),
        }
    }

    fn new() -> Self {
        Self::with_router(default_router)
    }

    fn with_router(build: impl FnOnce(ReactionContext) -> EventRouter) -> Self {
        let store = Arc::new(PrinterStore::new());
        let ticker = Arc::new(ActivityTicker::new(100));
        let executor = Arc::new(RecordingExecutor::default());
        let sink = Arc::new(RecordingSink::default());

        let router = build(Self::context(&store, &ticker, &executor, &sink));
        let ingest = EventIngest::new(Arc::new(router), 64);

        Self {
            store,
            ticker,
            executor,
            sink,
            ingest,
        }
    }

    fn register_printer(&self) -> PrinterId {
        let id = PrinterId::new();
        self.store
            .register(PrinterState::new(id, "http://printer.local"))
            .unwrap();
        id
    }
}

async fn wait_for(cond: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !cond() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within deadline"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

// ── Scenarios ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_patch_update_visible_to_next_read() {
    let harness = Harness::new();
    let id = harness.register_printer();

    harness
        .store
        .update(id, PrinterPatch::default().current_user(Some("alice".into())))
        .unwrap();

    assert_eq!(
        harness.store.get(id).unwrap().current_user.as_deref(),
        Some("alice")
    );
}

#[tokio::test]
async fn test_client_authed_from_local_address_with_empty_cache() {
    let harness = Harness::new();
    let id = harness.register_printer();

    harness
        .ingest
        .submit(
            id,
            "ClientAuthed",
            json!({"username": "alice", "remoteAddress": "::ffff:192.168.1.10:45720"}),
        )
        .await
        .unwrap();

    let ticker = Arc::clone(&harness.ticker);
    wait_for(move || !ticker.snapshot().is_empty()).await;

    let snap = harness.ticker.snapshot();
    assert_eq!(snap.len(), 1);
    // The site title stands in for the farm's own address, and with no
    // user in the store the payload username is not trusted.
    assert_eq!(
        snap[0].message,
        "Socket authed for: Test Farm with user: A pesky ghost (Don't know who)"
    );
    assert_eq!(snap[0].severity, TickerSeverity::Complete);

    let executor = Arc::clone(&harness.executor);
    wait_for(move || executor.hook_names() == vec!["clientauthed".to_owned()]).await;
}

#[tokio::test]
async fn test_print_done_captures_once_and_fires_legacy_hook() {
    let harness = Harness::new();
    let id = harness.register_printer();

    harness
        .ingest
        .submit(
            id,
            "PrintDone",
            json!({"name": "benchy.gcode", "path": "prints/benchy.gcode", "time": 3512.0}),
        )
        .await
        .unwrap();

    let sink = Arc::clone(&harness.sink);
    wait_for(move || sink.prints().len() == 1).await;
    let executor = Arc::clone(&harness.executor);
    wait_for(move || !executor.hook_names().is_empty()).await;

    let prints = harness.sink.prints();
    assert_eq!(prints.len(), 1);
    assert_eq!(prints[0].outcome, JobOutcome::Success);
    assert_eq!(harness.executor.hook_names(), vec!["connected".to_owned()]);
}

#[tokio::test]
async fn test_print_failed_records_failure_outcome() {
    let harness = Harness::new();
    let id = harness.register_printer();

    harness
        .ingest
        .submit(id, "PrintFailed", json!({"name": "vase.gcode", "time": 120.0}))
        .await
        .unwrap();

    let sink = Arc::clone(&harness.sink);
    wait_for(move || sink.prints().len() == 1).await;
    assert_eq!(harness.sink.prints()[0].outcome, JobOutcome::Failure);
}

#[tokio::test]
async fn test_unrecognized_kind_is_dropped_quietly() {
    let harness = Harness::new();
    let id = harness.register_printer();

    harness
        .ingest
        .submit(id, "SomePluginEvent", json!({"anything": true}))
        .await
        .unwrap();
    // A recognized event after the unknown one proves the lane survived.
    harness.ingest.submit(id, "PrintStarted", json!({})).await.unwrap();

    let executor = Arc::clone(&harness.executor);
    wait_for(move || executor.hook_names() == vec!["started".to_owned()]).await;
    assert!(harness.sink.prints().is_empty());
    assert!(harness.ticker.snapshot().is_empty());
}

#[tokio::test]
async fn test_script_rejection_does_not_delay_next_event() {
    let harness = Harness::new();
    let id = harness.register_printer();
    harness.executor.reject_hook("started");

    harness.ingest.submit(id, "PrintStarted", json!({})).await.unwrap();
    harness.ingest.submit(id, "PrintPaused", json!({})).await.unwrap();

    let executor = Arc::clone(&harness.executor);
    wait_for(move || executor.hook_names().len() == 2).await;
    assert_eq!(
        harness.executor.hook_names(),
        vec!["started".to_owned(), "paused".to_owned()]
    );
}

#[tokio::test]
async fn test_distinct_printers_update_independently() {
    let harness = Harness::new();
    let first = harness.register_printer();
    let second = harness.register_printer();

    harness
        .ingest
        .submit(first, "FirmwareData", json!({"name": "Marlin 2.1.2"}))
        .await
        .unwrap();
    harness
        .ingest
        .submit(second, "FirmwareData", json!({"name": "Klipper 0.12"}))
        .await
        .unwrap();

    let store = Arc::clone(&harness.store);
    wait_for(move || {
        store.get(first).unwrap().firmware.is_some()
            && store.get(second).unwrap().firmware.is_some()
    })
    .await;

    assert_eq!(
        harness.store.get(first).unwrap().firmware.as_deref(),
        Some("Marlin 2.1.2")
    );
    assert_eq!(
        harness.store.get(second).unwrap().firmware.as_deref(),
        Some("Klipper 0.12")
    );
}

/// Records the firmware string the store shows at the moment the
/// reaction runs, proving earlier events' effects are visible.
struct FirmwareProbe {
    seen: Arc<Mutex<Vec<Option<String>>>>,
}

#[async_trait]
impl Reaction for FirmwareProbe {
    fn name(&self) -> &'static str {
        "firmware_probe"
    }

    async fn react(&self, ctx: &ReactionContext, envelope: &EventEnvelope) -> CoreResult<()> {
        let firmware = ctx
            .store
            .get(envelope.printer_id)
            .and_then(|state| state.firmware.clone());
        self.seen.lock().unwrap().push(firmware);
        Ok(())
    }
}

#[tokio::test]
async fn test_same_printer_effects_visible_to_later_events() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let probe_seen = Arc::clone(&seen);
    let harness = Harness::with_router(move |ctx| {
        EventRouter::builder(ctx)
            .register(EventKind::FirmwareData, Arc::new(FirmwareReaction))
            .register(EventKind::ZChange, Arc::new(FirmwareProbe { seen: probe_seen }))
            .build()
    });
    let id = harness.register_printer();

    harness
        .ingest
        .submit(id, "FirmwareData", json!({"name": "Marlin 2.1.2"}))
        .await
        .unwrap();
    harness.ingest.submit(id, "ZChange", json!({})).await.unwrap();

    let seen_clone = Arc::clone(&seen);
    wait_for(move || !seen_clone.lock().unwrap().is_empty()).await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![Some("Marlin 2.1.2".to_owned())]
    );
}

#[tokio::test]
async fn test_shutdown_joins_lanes_and_rejects_new_events() {
    let harness = Harness::new();
    let id = harness.register_printer();

    harness.ingest.submit(id, "PrintStarted", json!({})).await.unwrap();
    harness.ingest.shutdown().await;

    assert_eq!(harness.ingest.lane_count(), 0);
    let err = harness
        .ingest
        .submit(id, "PrintPaused", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ShuttingDown));
}
