// ── Event routing ──
//
// Maps each classified event kind to an ordered list of reactions and
// invokes them with a per-invocation failure boundary. The router
// itself never fails: a reaction returning `Err` or panicking is
// logged and its siblings still run.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use tracing::{debug, error, warn};

use crate::automation::AutomationTrigger;
use crate::error::CoreResult;
use crate::history::HistoryCapture;
use crate::model::{EventEnvelope, EventKind};
use crate::store::PrinterStore;
use crate::system::SystemLookup;
use crate::ticker::ActivityTicker;

/// Shared collaborators handed to every reaction.
#[derive(Clone)]
pub struct ReactionContext {
    pub store: Arc<PrinterStore>,
    pub ticker: Arc<ActivityTicker>,
    pub automation: AutomationTrigger,
    pub history: HistoryCapture,
    pub system: Arc<dyn SystemLookup>,
}

/// One unit of response to an event kind.
///
/// Reactions run inside the printer's lane, so a slow body delays that
/// printer's next event. Anything long-running belongs behind the
/// fire-and-forget adapters, not in `react`.
#[async_trait]
pub trait Reaction: Send + Sync {
    /// Stable name for failure logs.
    fn name(&self) -> &'static str;

    async fn react(&self, ctx: &ReactionContext, envelope: &EventEnvelope) -> CoreResult<()>;
}

/// Kind-to-reactions dispatch table.
pub struct EventRouter {
    ctx: ReactionContext,
    reactions: HashMap<EventKind, Vec<Arc<dyn Reaction>>>,
}

impl EventRouter {
    pub fn builder(ctx: ReactionContext) -> EventRouterBuilder {
        EventRouterBuilder {
            ctx,
            reactions: HashMap::new(),
        }
    }

    /// Invoke every reaction registered for the envelope's kind, in
    /// registration order, each exactly once.
    pub async fn dispatch(&self, envelope: &EventEnvelope) {
        if envelope.kind == EventKind::Unclassified {
            debug!(
                printer = %envelope.printer_id,
                raw_kind = %envelope.raw_kind,
                "no reaction for unclassified event"
            );
            return;
        }

        let Some(reactions) = self.reactions.get(&envelope.kind) else {
            debug!(
                printer = %envelope.printer_id,
                kind = %envelope.kind,
                "no reactions registered"
            );
            return;
        };

        for reaction in reactions {
            match AssertUnwindSafe(reaction.react(&self.ctx, envelope))
                .catch_unwind()
                .await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(
                        reaction = reaction.name(),
                        printer = %envelope.printer_id,
                        kind = %envelope.kind,
                        error = %e,
                        "reaction failed"
                    );
                }
                Err(_) => {
                    error!(
                        reaction = reaction.name(),
                        printer = %envelope.printer_id,
                        kind = %envelope.kind,
                        "reaction panicked"
                    );
                }
            }
        }
    }

    /// Kinds with at least one registered reaction.
    pub fn registered_kinds(&self) -> Vec<EventKind> {
        self.reactions.keys().copied().collect()
    }
}

pub struct EventRouterBuilder {
    ctx: ReactionContext,
    reactions: HashMap<EventKind, Vec<Arc<dyn Reaction>>>,
}

impl EventRouterBuilder {
    /// Append a reaction to the kind's ordered list.
    #[must_use]
    pub fn register(mut self, kind: EventKind, reaction: Arc<dyn Reaction>) -> Self {
        self.reactions.entry(kind).or_default().push(reaction);
        self
    }

    pub fn build(self) -> EventRouter {
        EventRouter {
            ctx: self.ctx,
            reactions: self.reactions,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::events::test_support::test_context;
    use crate::model::PrinterId;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingReaction {
        name: &'static str,
        calls: Arc<AtomicUsize>,
        mode: Mode,
    }

    enum Mode {
        Ok,
        Fail,
        Panic,
    }

    #[async_trait]
    impl Reaction for CountingReaction {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn react(&self, _ctx: &ReactionContext, _env: &EventEnvelope) -> CoreResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.mode {
                Mode::Ok => Ok(()),
                Mode::Fail => Err(CoreError::Internal("deliberate failure".into())),
                Mode::Panic => panic!("deliberate panic"),
            }
        }
    }

    fn counting(name: &'static str, mode: Mode) -> (Arc<dyn Reaction>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let reaction = Arc::new(CountingReaction {
            name,
            calls: Arc::clone(&calls),
            mode,
        });
        (reaction, calls)
    }

    #[tokio::test]
    async fn every_reaction_runs_exactly_once() {
        let (ctx, _fixtures) = test_context();
        let (first, first_calls) = counting("first", Mode::Ok);
        let (second, second_calls) = counting("second", Mode::Ok);

        let router = EventRouter::builder(ctx)
            .register(EventKind::Connected, first)
            .register(EventKind::Connected, second)
            .build();

        let envelope = EventEnvelope::new(PrinterId::new(), "Connected", json!({}));
        router.dispatch(&envelope).await;

        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_reaction_does_not_stop_siblings() {
        let (ctx, _fixtures) = test_context();
        let (first, first_calls) = counting("first", Mode::Fail);
        let (second, second_calls) = counting("second", Mode::Ok);

        let router = EventRouter::builder(ctx)
            .register(EventKind::Connected, first)
            .register(EventKind::Connected, second)
            .build();

        router
            .dispatch(&EventEnvelope::new(PrinterId::new(), "Connected", json!({})))
            .await;

        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn panicking_reaction_is_contained() {
        let (ctx, _fixtures) = test_context();
        let (first, _first_calls) = counting("first", Mode::Panic);
        let (second, second_calls) = counting("second", Mode::Ok);

        let router = EventRouter::builder(ctx)
            .register(EventKind::Connected, first)
            .register(EventKind::Connected, second)
            .build();

        router
            .dispatch(&EventEnvelope::new(PrinterId::new(), "Connected", json!({})))
            .await;

        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unclassified_event_dispatches_nothing() {
        let (ctx, _fixtures) = test_context();
        let (reaction, calls) = counting("any", Mode::Ok);

        let router = EventRouter::builder(ctx)
            .register(EventKind::Connected, reaction)
            .build();

        router
            .dispatch(&EventEnvelope::new(PrinterId::new(), "NotARealKind", json!({})))
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
