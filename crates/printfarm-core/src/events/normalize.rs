// ── Event normalization ──

use crate::model::{EventEnvelope, PrinterId};

/// Convert a raw controller push into a classified envelope.
///
/// Pure shape conversion: classify the kind, stamp the arrival time,
/// carry the payload verbatim. Unknown kinds are not an error; they
/// classify as [`EventKind::Unclassified`] and the router drops them
/// after a debug log.
///
/// [`EventKind::Unclassified`]: crate::model::EventKind::Unclassified
pub fn normalize(
    printer_id: PrinterId,
    raw_kind: &str,
    payload: serde_json::Value,
) -> EventEnvelope {
    EventEnvelope::new(printer_id, raw_kind, payload)
}
