// ── Event pipeline ──
//
// Raw controller push -> normalize -> per-printer lane -> router ->
// reactions. Everything after the lane boundary is ordering-safe per
// printer and failure-isolated per reaction.

pub mod address;
pub mod ingest;
pub mod normalize;
pub mod reactions;
pub mod router;
pub mod user;

pub use ingest::{EventIngest, DEFAULT_LANE_DEPTH};
pub use normalize::normalize;
pub use reactions::{default_router, GENERIC_HOOKS};
pub use router::{EventRouter, EventRouterBuilder, Reaction, ReactionContext};
pub use user::{ActingUser, UNKNOWN_ACTOR};

// ── Shared test fixtures ────────────────────────────────────────────
