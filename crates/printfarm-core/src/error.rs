// ── Core error types ──
//
// User-facing errors from printfarm-core. Reaction failures are NOT
// represented here -- the router logs and swallows them so one bad
// handler can never poison the lane. Only contract violations the
// caller can act on surface as errors.

use thiserror::Error;

use crate::model::PrinterId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Store errors ─────────────────────────────────────────────────
    #[error("Printer not found: {id}")]
    PrinterNotFound { id: PrinterId },

    #[error("Printer already registered: {id}")]
    PrinterAlreadyRegistered { id: PrinterId },

    // ── Ingest errors ────────────────────────────────────────────────
    #[error("Event lane closed for printer {id}")]
    LaneClosed { id: PrinterId },

    #[error("Ingest is shutting down")]
    ShuttingDown,

    // ── Collaborator errors ──────────────────────────────────────────
    #[error("Automation script '{hook}' failed: {message}")]
    Script { hook: String, message: String },

    #[error("History submission failed: {message}")]
    History { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the crate.
pub type CoreResult<T> = Result<T, CoreError>;
