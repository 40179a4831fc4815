// ── Event domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::printer::PrinterId;

// ── EventKind ───────────────────────────────────────────────────────

/// Classified kind of a controller push event.
///
/// Variant names mirror the raw kind strings the controller emits, so
/// classification is a straight string parse. Anything outside the
/// vocabulary lands on [`EventKind::Unclassified`] and is dropped by
/// the router after a debug log.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[non_exhaustive]
pub enum EventKind {
    ClientAuthed,
    ClientClosed,
    ClientOpened,
    Connected,
    Disconnecting,
    Disconnected,
    Dwelling,
    Error,
    FileAdded,
    FileDeselected,
    FileRemoved,
    FirmwareData,
    FolderAdded,
    FolderRemoved,
    Home,
    MetadataAnalysisFinished,
    MetadataAnalysisStarted,
    MetadataStatisticsUpdated,
    PositionUpdate,
    PrintCancelled,
    PrintCancelling,
    PrintDone,
    PrintFailed,
    PrintPaused,
    PrintStarted,
    PrinterStateChanged,
    TransferDone,
    TransferStarted,
    UpdatedFiles,
    Upload,
    UserLoggedIn,
    UserLoggedOut,
    ZChange,
    /// Raw kind outside the known vocabulary.
    #[strum(disabled)]
    Unclassified,
}

impl EventKind {
    /// Classify a raw kind string, falling back to
    /// [`EventKind::Unclassified`] for anything unknown.
    pub fn classify(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Unclassified)
    }

    /// True for the session events emitted by the controller's web
    /// client (open, close, authenticate).
    pub fn is_client_session(&self) -> bool {
        matches!(self, Self::ClientAuthed | Self::ClientClosed | Self::ClientOpened)
    }

    /// True for the terminal outcome of a print job.
    pub fn is_print_terminal(&self) -> bool {
        matches!(self, Self::PrintDone | Self::PrintFailed)
    }
}

// ── EventEnvelope ───────────────────────────────────────────────────

/// A classified event bound to the printer that produced it.
///
/// The payload is carried verbatim as JSON; reactions pull out the
/// fields they need through the typed accessors below and ignore the
/// rest. An envelope is immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub printer_id: PrinterId,
    pub kind: EventKind,
    /// Raw kind string as received, preserved for logs even when the
    /// kind is [`EventKind::Unclassified`].
    pub raw_kind: String,
    pub payload: serde_json::Value,
    pub received_at: DateTime<Utc>,
}

impl EventEnvelope {
    pub fn new(
        printer_id: PrinterId,
        raw_kind: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        let raw_kind = raw_kind.into();
        Self {
            printer_id,
            kind: EventKind::classify(&raw_kind),
            raw_kind,
            payload,
            received_at: Utc::now(),
        }
    }

    fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(serde_json::Value::as_str)
    }

    /// Username carried by client-session and login events, if any.
    pub fn username(&self) -> Option<&str> {
        self.payload_str("username")
    }

    /// Remote socket address of the web client, as reported.
    pub fn remote_address(&self) -> Option<&str> {
        self.payload_str("remoteAddress")
    }

    /// File name for file and print lifecycle events.
    pub fn file_name(&self) -> Option<&str> {
        self.payload_str("name")
    }

    /// Storage path for file and print lifecycle events.
    pub fn file_path(&self) -> Option<&str> {
        self.payload_str("path")
    }

    /// Firmware name reported by a `FirmwareData` event. The controller
    /// reuses the `name` key for this.
    pub fn firmware_name(&self) -> Option<&str> {
        self.payload_str("name")
    }

    /// Elapsed job time in seconds for terminal print events.
    pub fn job_time_secs(&self) -> Option<f64> {
        self.payload.get("time").and_then(serde_json::Value::as_f64)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_known_and_unknown_kinds() {
        assert_eq!(EventKind::classify("PrintDone"), EventKind::PrintDone);
        assert_eq!(EventKind::classify("ClientAuthed"), EventKind::ClientAuthed);
        assert_eq!(EventKind::classify("SomeNewEvent"), EventKind::Unclassified);
        assert_eq!(EventKind::classify(""), EventKind::Unclassified);
    }

    #[test]
    fn kind_display_matches_raw_vocabulary() {
        assert_eq!(EventKind::PrinterStateChanged.to_string(), "PrinterStateChanged");
        assert_eq!(EventKind::ZChange.to_string(), "ZChange");
    }

    #[test]
    fn envelope_preserves_raw_kind_for_unknowns() {
        let envelope = EventEnvelope::new(PrinterId::new(), "MysteryKind", json!({}));
        assert_eq!(envelope.kind, EventKind::Unclassified);
        assert_eq!(envelope.raw_kind, "MysteryKind");
    }

    #[test]
    fn payload_accessors_pull_typed_fields() {
        let envelope = EventEnvelope::new(
            PrinterId::new(),
            "PrintDone",
            json!({
                "name": "benchy.gcode",
                "path": "prints/benchy.gcode",
                "time": 4321.5,
                "origin": "local",
            }),
        );

        assert_eq!(envelope.file_name(), Some("benchy.gcode"));
        assert_eq!(envelope.file_path(), Some("prints/benchy.gcode"));
        assert!((envelope.job_time_secs().unwrap() - 4321.5).abs() < f64::EPSILON);
        assert_eq!(envelope.username(), None);
    }

    #[test]
    fn session_and_terminal_predicates() {
        assert!(EventKind::ClientClosed.is_client_session());
        assert!(!EventKind::Connected.is_client_session());
        assert!(EventKind::PrintFailed.is_print_terminal());
        assert!(!EventKind::PrintCancelled.is_print_terminal());
    }
}
