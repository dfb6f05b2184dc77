use chrono::{DateTime, Utc};

/// A domain-agnostic event.
///
/// Events are facts: immutable once raised, and carry a schema version so
/// downstream consumers (cache invalidation, audit log) can evolve.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "admin.user.role_changed").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
