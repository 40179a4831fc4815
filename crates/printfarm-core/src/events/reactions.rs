// ── Built-in reactions ──
//
// The default response set for the known event vocabulary. Most kinds
// only fire an operator script hook; those share one parameterized
// reaction driven by the table below. The handful of kinds with real
// pipeline behavior get dedicated reactions.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{CoreError, CoreResult};
use crate::events::address::label_remote_address;
use crate::events::router::{EventRouter, Reaction, ReactionContext};
use crate::events::user::ActingUser;
use crate::model::{EventEnvelope, EventKind, JobOutcome, PrinterPatch, PrinterState};
use crate::ticker::TickerSeverity;

// ── Generic script hooks ────────────────────────────────────────────

/// Kinds whose only response is an operator script hook, with the hook
/// name each fires. `TransferDone` and `Upload` share a hook.
pub const GENERIC_HOOKS: &[(EventKind, &str)] = &[
    (EventKind::Connected, "connected"),
    (EventKind::Disconnecting, "disconnecting"),
    (EventKind::Disconnected, "disconnected"),
    (EventKind::Dwelling, "dwelling"),
    (EventKind::FileAdded, "fileadded"),
    (EventKind::FileDeselected, "filedeselected"),
    (EventKind::FileRemoved, "fileremoved"),
    (EventKind::FolderAdded, "folderadded"),
    (EventKind::FolderRemoved, "folderremoved"),
    (EventKind::Home, "homed"),
    (EventKind::MetadataAnalysisFinished, "metadatafinished"),
    (EventKind::MetadataAnalysisStarted, "metadatastarted"),
    (EventKind::MetadataStatisticsUpdated, "metadataupdated"),
    (EventKind::PositionUpdate, "positionupdated"),
    (EventKind::PrintCancelled, "cancelled"),
    (EventKind::PrintCancelling, "cancelling"),
    (EventKind::PrintPaused, "paused"),
    (EventKind::PrintStarted, "started"),
    (EventKind::PrinterStateChanged, "statechange"),
    (EventKind::TransferDone, "fileupload"),
    (EventKind::TransferStarted, "fileuploading"),
    (EventKind::UpdatedFiles, "fileupdate"),
    (EventKind::Upload, "fileupload"),
    (EventKind::ZChange, "zchange"),
];

/// Fires one named script hook against the printer's current state.
pub struct ScriptHookReaction {
    hook: &'static str,
}

impl ScriptHookReaction {
    pub fn new(hook: &'static str) -> Self {
        Self { hook }
    }
}

#[async_trait]
impl Reaction for ScriptHookReaction {
    fn name(&self) -> &'static str {
        "script_hook"
    }

    async fn react(&self, ctx: &ReactionContext, envelope: &EventEnvelope) -> CoreResult<()> {
        let printer = lookup(ctx, envelope)?;
        ctx.automation.fire(printer, self.hook);
        Ok(())
    }
}

// ── Client session events ───────────────────────────────────────────

/// Journals a web-client session event (open, close, authenticate)
/// with a labeled remote address, then fires the matching hook.
///
/// Only the authenticate variant resolves an acting user; open and
/// close payloads carry no username.
pub struct ClientSessionReaction {
    prefix: &'static str,
    severity: TickerSeverity,
    hook: &'static str,
    resolves_user: bool,
}

impl ClientSessionReaction {
    pub fn authed() -> Self {
        Self {
            prefix: "Socket authed for: ",
            severity: TickerSeverity::Complete,
            hook: "clientauthed",
            resolves_user: true,
        }
    }

    pub fn closed() -> Self {
        Self {
            prefix: "Socket was closed for: ",
            severity: TickerSeverity::Info,
            hook: "clientclosed",
            resolves_user: false,
        }
    }

    pub fn opened() -> Self {
        Self {
            prefix: "Socket opened for: ",
            severity: TickerSeverity::Info,
            hook: "clientopened",
            resolves_user: false,
        }
    }
}

#[async_trait]
impl Reaction for ClientSessionReaction {
    fn name(&self) -> &'static str {
        "client_session"
    }

    async fn react(&self, ctx: &ReactionContext, envelope: &EventEnvelope) -> CoreResult<()> {
        let printer = lookup(ctx, envelope)?;
        let system = ctx.system.info();

        let address = label_remote_address(
            envelope.remote_address(),
            &system.network_addresses,
            &system.site_title,
        );

        let message = if self.resolves_user {
            let user = ActingUser::resolve(printer.current_user.as_deref(), envelope.username());
            format!("{}{address} with user: {user}", self.prefix)
        } else {
            format!("{}{address}", self.prefix)
        };

        ctx.ticker
            .add_issue(printer.id, printer.printer_url.clone(), message, self.severity);
        ctx.automation.fire(printer, self.hook);
        Ok(())
    }
}

// ── Controller login journal ────────────────────────────────────────

/// Journals controller-side login and logout with the resolved acting
/// user. No hook fires for these.
pub struct SessionJournalReaction {
    suffix: &'static str,
}

impl SessionJournalReaction {
    pub fn logged_in() -> Self {
        Self {
            suffix: " has logged in to the controller.",
        }
    }

    pub fn logged_out() -> Self {
        Self {
            suffix: " has logged out of the controller.",
        }
    }
}

#[async_trait]
impl Reaction for SessionJournalReaction {
    fn name(&self) -> &'static str {
        "session_journal"
    }

    async fn react(&self, ctx: &ReactionContext, envelope: &EventEnvelope) -> CoreResult<()> {
        let printer = lookup(ctx, envelope)?;
        let user = ActingUser::resolve(printer.current_user.as_deref(), envelope.username());
        let message = format!("User: {user}{}", self.suffix);

        ctx.ticker.add_issue(
            printer.id,
            printer.printer_url.clone(),
            message,
            TickerSeverity::Info,
        );
        Ok(())
    }
}

// ── Error capture ───────────────────────────────────────────────────

/// Journals a controller-reported error into history. Fires no hook.
pub struct ErrorCaptureReaction;

#[async_trait]
impl Reaction for ErrorCaptureReaction {
    fn name(&self) -> &'static str {
        "error_capture"
    }

    async fn react(&self, ctx: &ReactionContext, envelope: &EventEnvelope) -> CoreResult<()> {
        let printer = lookup(ctx, envelope)?;
        ctx.history.error_log(&printer, envelope);
        Ok(())
    }
}

// ── Finished print ──────────────────────────────────────────────────

/// Captures a terminal print into history, then fires the legacy
/// `connected` hook the way operator scripts have always expected.
pub struct FinishedPrintReaction {
    outcome: JobOutcome,
}

impl FinishedPrintReaction {
    pub fn success() -> Self {
        Self {
            outcome: JobOutcome::Success,
        }
    }

    pub fn failure() -> Self {
        Self {
            outcome: JobOutcome::Failure,
        }
    }
}

#[async_trait]
impl Reaction for FinishedPrintReaction {
    fn name(&self) -> &'static str {
        "finished_print"
    }

    async fn react(&self, ctx: &ReactionContext, envelope: &EventEnvelope) -> CoreResult<()> {
        let printer = lookup(ctx, envelope)?;
        ctx.history.capture_print(&printer, envelope, self.outcome);
        ctx.automation.fire(printer, "connected");
        Ok(())
    }
}

// ── Firmware report ─────────────────────────────────────────────────

/// Mirrors the controller's reported firmware name straight into the
/// store. Bypasses ticker, history, and hooks.
pub struct FirmwareReaction;

#[async_trait]
impl Reaction for FirmwareReaction {
    fn name(&self) -> &'static str {
        "firmware"
    }

    async fn react(&self, ctx: &ReactionContext, envelope: &EventEnvelope) -> CoreResult<()> {
        let name = envelope.firmware_name().map(str::to_owned);
        ctx.store.update(
            envelope.printer_id,
            PrinterPatch::default().firmware(name),
        )?;
        Ok(())
    }
}

// ── Default routing table ───────────────────────────────────────────

/// Build the full default router: the generic hook table plus every
/// special-cased kind.
pub fn default_router(ctx: ReactionContext) -> EventRouter {
    let mut builder = EventRouter::builder(ctx);

    for &(kind, hook) in GENERIC_HOOKS {
        builder = builder.register(kind, Arc::new(ScriptHookReaction::new(hook)));
    }

    builder
        .register(EventKind::ClientAuthed, Arc::new(ClientSessionReaction::authed()))
        .register(EventKind::ClientClosed, Arc::new(ClientSessionReaction::closed()))
        .register(EventKind::ClientOpened, Arc::new(ClientSessionReaction::opened()))
        .register(EventKind::UserLoggedIn, Arc::new(SessionJournalReaction::logged_in()))
        .register(EventKind::UserLoggedOut, Arc::new(SessionJournalReaction::logged_out()))
        .register(EventKind::Error, Arc::new(ErrorCaptureReaction))
        .register(EventKind::PrintDone, Arc::new(FinishedPrintReaction::success()))
        .register(EventKind::PrintFailed, Arc::new(FinishedPrintReaction::failure()))
        .register(EventKind::FirmwareData, Arc::new(FirmwareReaction))
        .build()
}

// ── Helpers ─────────────────────────────────────────────────────────

fn lookup(ctx: &ReactionContext, envelope: &EventEnvelope) -> CoreResult<Arc<PrinterState>> {
    ctx.store
        .get(envelope.printer_id)
        .ok_or(CoreError::PrinterNotFound {
            id: envelope.printer_id,
        })
}
