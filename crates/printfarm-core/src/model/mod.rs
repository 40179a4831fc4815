// ── Domain model ──
//
// Plain data types shared across the pipeline. No I/O, no locking;
// ownership and mutation rules live in the store.

pub mod event;
pub mod history;
pub mod printer;

pub use event::{EventEnvelope, EventKind};
pub use history::{ErrorRecord, HistoryRecord, JobOutcome};
pub use printer::{
    ConnectionStatus, FileRecord, JobSnapshot, PrinterId, PrinterPatch, PrinterState, ResendStats,
};
