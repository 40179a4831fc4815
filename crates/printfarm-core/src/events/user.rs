// ── Acting-user resolution ──

use std::fmt;

/// Placeholder shown when no user is known for a session event.
pub const UNKNOWN_ACTOR: &str = "A pesky ghost (Don't know who)";

/// Outcome of reconciling the event's reported username against the
/// user the store last saw authenticated on the controller.
///
/// The cached user wins every disagreement: the store reflects what
/// the controller told us most recently, while the event payload may
/// lag behind a session handover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActingUser {
    /// Cache and payload agree.
    Same(String),
    /// The store has no authenticated user on record.
    Unknown,
    /// Cache and payload disagree; carries the cached name.
    Other(String),
}

impl ActingUser {
    /// Resolve the acting user from the cached store value and the
    /// username reported in the event payload.
    pub fn resolve(cached: Option<&str>, reported: Option<&str>) -> Self {
        match cached {
            None => Self::Unknown,
            Some(c) if Some(c) == reported => Self::Same(c.to_owned()),
            Some(c) => Self::Other(c.to_owned()),
        }
    }

    /// Display name for ticker and log lines.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Same(name) | Self::Other(name) => name,
            Self::Unknown => UNKNOWN_ACTOR,
        }
    }
}

impl fmt::Display for ActingUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_names_resolve_to_same() {
        assert_eq!(
            ActingUser::resolve(Some("alice"), Some("alice")),
            ActingUser::Same("alice".into())
        );
    }

    #[test]
    fn empty_cache_resolves_to_unknown() {
        assert_eq!(ActingUser::resolve(None, Some("alice")), ActingUser::Unknown);
        assert_eq!(ActingUser::resolve(None, None), ActingUser::Unknown);
        assert_eq!(ActingUser::resolve(None, None).display_name(), UNKNOWN_ACTOR);
    }

    #[test]
    fn mismatch_resolves_to_cached_name() {
        let resolved = ActingUser::resolve(Some("alice"), Some("bob"));
        assert_eq!(resolved, ActingUser::Other("alice".into()));
        assert_eq!(resolved.display_name(), "alice");
    }

    #[test]
    fn cached_user_without_report_is_other() {
        assert_eq!(
            ActingUser::resolve(Some("alice"), None),
            ActingUser::Other("alice".into())
        );
    }
}
