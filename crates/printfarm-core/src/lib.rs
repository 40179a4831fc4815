// printfarm-core: Event ingestion and live-state synchronization for a
// fleet of 3D printer controllers.

pub mod automation;
pub mod config;
pub mod error;
pub mod events;
pub mod history;
pub mod model;
pub mod store;
pub mod stream;
pub mod system;
pub mod ticker;

// ── Primary re-exports ──────────────────────────────────────────────
pub use automation::{AutomationTrigger, ScriptExecutor};
pub use config::FarmSettings;
pub use error::{CoreError, CoreResult};
pub use events::{
    default_router, normalize, EventIngest, EventRouter, EventRouterBuilder, Reaction,
    ReactionContext,
};
pub use history::{HistoryCapture, HistorySink};
pub use store::PrinterStore;
pub use stream::SnapshotStream;
pub use system::{StaticSystemLookup, SystemLookup, SystemSnapshot};
pub use ticker::{ActivityTicker, TickerEntry, TickerSeverity};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Printer state
    ConnectionStatus, FileRecord, JobSnapshot, PrinterId, PrinterPatch, PrinterState, ResendStats,
    // Events
    EventEnvelope, EventKind,
    // History
    ErrorRecord, HistoryRecord, JobOutcome,
};
