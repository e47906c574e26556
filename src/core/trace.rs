//! Trace of completed transitions.
//!
//! The driver records every state change it performs — including
//! reentries and exits — as an immutable trace. Recording returns a new
//! trace rather than mutating in place, so a snapshot taken at any
//! point stays valid.

use super::id::StateId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of one completed state change.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use segue::core::FiredTransition;
///
/// let fired = FiredTransition {
///     from: "idle",
///     to: "run",
///     timestamp: Utc::now(),
///     forced: false,
/// };
///
/// let json = serde_json::to_string(&fired).unwrap();
/// let back: FiredTransition<String> = serde_json::from_str(&json).unwrap();
/// assert_eq!(back.to, "run");
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize",
    deserialize = "S: serde::de::DeserializeOwned"
))]
pub struct FiredTransition<S: StateId> {
    /// The state that was exited.
    pub from: S,
    /// The state that was entered.
    pub to: S,
    /// When the change completed.
    pub timestamp: DateTime<Utc>,
    /// Whether the firing transition bypassed the needs-exit-time
    /// negotiation.
    pub forced: bool,
}

/// Ordered trace of completed transitions.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use segue::core::{FiredTransition, TransitionTrace};
///
/// let trace = TransitionTrace::new();
/// let trace = trace.record(FiredTransition {
///     from: "idle",
///     to: "run",
///     timestamp: Utc::now(),
///     forced: false,
/// });
/// let trace = trace.record(FiredTransition {
///     from: "run",
///     to: "jump",
///     timestamp: Utc::now(),
///     forced: true,
/// });
///
/// assert_eq!(trace.path(), vec![&"idle", &"run", &"jump"]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize",
    deserialize = "S: serde::de::DeserializeOwned"
))]
pub struct TransitionTrace<S: StateId> {
    fired: Vec<FiredTransition<S>>,
}

impl<S: StateId> Default for TransitionTrace<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StateId> TransitionTrace<S> {
    /// Create an empty trace.
    pub fn new() -> Self {
        Self { fired: Vec::new() }
    }

    /// Record a completed change, returning a new trace. The original
    /// is left untouched.
    pub fn record(&self, fired: FiredTransition<S>) -> Self {
        let mut entries = self.fired.clone();
        entries.push(fired);
        Self { fired: entries }
    }

    /// All recorded changes, in firing order.
    pub fn fired(&self) -> &[FiredTransition<S>] {
        &self.fired
    }

    /// The sequence of states the machine moved through: the first
    /// recorded `from`, then each `to` in order. Empty for an empty
    /// trace.
    pub fn path(&self) -> Vec<&S> {
        let mut path = Vec::with_capacity(self.fired.len() + 1);
        if let Some(first) = self.fired.first() {
            path.push(&first.from);
        }
        for entry in &self.fired {
            path.push(&entry.to);
        }
        path
    }

    /// Wall-clock span between the first and last recorded change, or
    /// `None` for an empty trace.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.fired.first()?, self.fired.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn fired(from: &'static str, to: &'static str) -> FiredTransition<&'static str> {
        FiredTransition {
            from,
            to,
            timestamp: Utc::now(),
            forced: false,
        }
    }

    #[test]
    fn record_is_pure() {
        let trace = TransitionTrace::new();
        let recorded = trace.record(fired("idle", "run"));

        assert_eq!(trace.fired().len(), 0);
        assert_eq!(recorded.fired().len(), 1);
    }

    #[test]
    fn path_includes_the_starting_state() {
        let trace = TransitionTrace::new()
            .record(fired("idle", "run"))
            .record(fired("run", "idle"));

        assert_eq!(trace.path(), vec![&"idle", &"run", &"idle"]);
    }

    #[test]
    fn empty_trace_has_empty_path_and_no_duration() {
        let trace: TransitionTrace<&'static str> = TransitionTrace::new();

        assert!(trace.path().is_empty());
        assert!(trace.duration().is_none());
    }

    #[test]
    fn duration_spans_first_to_last() {
        let start = Utc::now();
        let trace = TransitionTrace::new()
            .record(FiredTransition {
                from: "idle",
                to: "run",
                timestamp: start,
                forced: false,
            })
            .record(FiredTransition {
                from: "run",
                to: "idle",
                timestamp: start + TimeDelta::seconds(2),
                forced: false,
            });

        assert_eq!(trace.duration(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn trace_roundtrips_through_json() {
        let trace = TransitionTrace::new().record(FiredTransition {
            from: "idle".to_string(),
            to: "run".to_string(),
            timestamp: Utc::now(),
            forced: true,
        });

        let json = serde_json::to_string(&trace).unwrap();
        let back: TransitionTrace<String> = serde_json::from_str(&json).unwrap();

        assert_eq!(back.fired().len(), 1);
        assert!(back.fired()[0].forced);
    }
}
