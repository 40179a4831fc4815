// ── Print history domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::printer::{JobSnapshot, PrinterId, ResendStats};

/// How a print job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[non_exhaustive]
pub enum JobOutcome {
    Success,
    Failure,
}

/// Immutable snapshot of a finished print, submitted to the history
/// sink at the moment the terminal event arrives.
///
/// Everything here is copied out of the live state before the store
/// moves on, so later patches cannot retroactively change a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub printer_id: PrinterId,
    pub outcome: JobOutcome,
    pub job: Option<JobSnapshot>,
    /// Elapsed job time in seconds as reported by the controller.
    pub elapsed_secs: Option<f64>,
    pub resend_stats: ResendStats,
    pub captured_at: DateTime<Utc>,
}

/// A controller-reported error, journaled alongside print history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub printer_id: PrinterId,
    /// Error text as reported, verbatim.
    pub message: String,
    pub job: Option<JobSnapshot>,
    pub resend_stats: ResendStats,
    pub captured_at: DateTime<Utc>,
}
