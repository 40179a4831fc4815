// ── Printer domain types ──
//
// PrinterId is the correlation key for everything in the pipeline:
// store entries, event envelopes, ticker lines, history records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ── PrinterId ───────────────────────────────────────────────────────

/// Opaque identifier for a managed printer controller.
///
/// Immutable once assigned. Used as the store key and as the
/// correlation key on every event envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrinterId(Uuid);

impl PrinterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PrinterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PrinterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PrinterId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl From<Uuid> for PrinterId {
    fn from(u: Uuid) -> Self {
        Self(u)
    }
}

// ── ConnectionStatus ────────────────────────────────────────────────

/// Last-reported connection status of a printer controller.
///
/// The pipeline mirrors whatever the controller reports; out-of-order
/// or skipped transitions are tolerated (last-report-wins).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[non_exhaustive]
pub enum ConnectionStatus {
    Operational,
    Printing,
    Paused,
    Error,
    Offline,
    Disconnected,
    #[default]
    Unknown,
}

impl ConnectionStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Printing | Self::Paused)
    }

    pub fn is_reachable(&self) -> bool {
        !matches!(self, Self::Offline | Self::Disconnected | Self::Unknown)
    }
}

// ── Job / file / transport snapshots ────────────────────────────────

/// Snapshot of the job a printer is currently working on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub file_name: String,
    pub file_path: String,
    /// Estimated total print time, seconds.
    pub estimated_secs: Option<i64>,
    /// Completion, 0.0 – 100.0.
    pub progress: Option<f64>,
    pub started_at: Option<DateTime<Utc>>,
}

/// A file known to the printer's local storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    pub path: String,
    pub size_bytes: Option<u64>,
}

/// Serial-transport resend counters, carried into history records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResendStats {
    pub transmitted: u64,
    pub resent: u64,
}

impl ResendStats {
    /// Resend ratio in percent, `None` when nothing was transmitted.
    pub fn ratio_pct(&self) -> Option<f64> {
        if self.transmitted == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        Some(self.resent as f64 / self.transmitted as f64 * 100.0)
    }
}

// ── PrinterState ────────────────────────────────────────────────────

/// Live mirror of one printer controller.
///
/// Owned exclusively by the [`PrinterStore`](crate::store::PrinterStore);
/// every mutation goes through the store's `update` operation. Readers
/// receive `Arc` snapshots with last-known semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterState {
    pub id: PrinterId,
    pub status: ConnectionStatus,
    /// User currently authenticated on the controller, if any.
    pub current_user: Option<String>,
    pub job: Option<JobSnapshot>,
    pub firmware: Option<String>,
    /// Base URL of the controller's web interface.
    pub printer_url: String,
    pub camera_url: Option<String>,
    pub files: Vec<FileRecord>,
    pub resend_stats: ResendStats,
    pub updated_at: DateTime<Utc>,
}

impl PrinterState {
    pub fn new(id: PrinterId, printer_url: impl Into<String>) -> Self {
        Self {
            id,
            status: ConnectionStatus::Unknown,
            current_user: None,
            job: None,
            firmware: None,
            printer_url: printer_url.into(),
            camera_url: None,
            files: Vec::new(),
            resend_stats: ResendStats::default(),
            updated_at: Utc::now(),
        }
    }
}

// ── PrinterPatch ────────────────────────────────────────────────────

/// Shallow-merge partial update for a [`PrinterState`].
///
/// `None` leaves a field unchanged. Nullable fields use a nested
/// `Option` so a patch can distinguish "leave alone" from "clear".
/// Applying any patch refreshes `updated_at`.
#[derive(Debug, Clone, Default)]
pub struct PrinterPatch {
    pub status: Option<ConnectionStatus>,
    pub current_user: Option<Option<String>>,
    pub job: Option<Option<JobSnapshot>>,
    pub firmware: Option<Option<String>>,
    pub printer_url: Option<String>,
    pub camera_url: Option<Option<String>>,
    pub files: Option<Vec<FileRecord>>,
    pub resend_stats: Option<ResendStats>,
}

impl PrinterPatch {
    pub fn status(mut self, status: ConnectionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn current_user(mut self, user: Option<String>) -> Self {
        self.current_user = Some(user);
        self
    }

    pub fn job(mut self, job: Option<JobSnapshot>) -> Self {
        self.job = Some(job);
        self
    }

    pub fn firmware(mut self, firmware: Option<String>) -> Self {
        self.firmware = Some(firmware);
        self
    }

    pub fn printer_url(mut self, url: impl Into<String>) -> Self {
        self.printer_url = Some(url.into());
        self
    }

    pub fn camera_url(mut self, url: Option<String>) -> Self {
        self.camera_url = Some(url);
        self
    }

    pub fn files(mut self, files: Vec<FileRecord>) -> Self {
        self.files = Some(files);
        self
    }

    pub fn resend_stats(mut self, stats: ResendStats) -> Self {
        self.resend_stats = Some(stats);
        self
    }

    /// Merge this patch into `state`, field by field, and refresh the
    /// last-updated timestamp.
    pub fn apply(self, state: &mut PrinterState) {
        if let Some(status) = self.status {
            state.status = status;
        }
        if let Some(user) = self.current_user {
            state.current_user = user;
        }
        if let Some(job) = self.job {
            state.job = job;
        }
        if let Some(firmware) = self.firmware {
            state.firmware = firmware;
        }
        if let Some(url) = self.printer_url {
            state.printer_url = url;
        }
        if let Some(camera) = self.camera_url {
            state.camera_url = camera;
        }
        if let Some(files) = self.files {
            state.files = files;
        }
        if let Some(stats) = self.resend_stats {
            state.resend_stats = stats;
        }
        state.updated_at = Utc::now();
    }
}
