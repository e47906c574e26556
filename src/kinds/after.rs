//! Timed transition kind.

use crate::core::{MachineQuery, StateId, TransitionBehavior};
use chrono::{DateTime, TimeDelta, Utc};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Time source for [`After`].
///
/// Abstracting the clock keeps timed transitions testable: production
/// code uses [`UtcClock`], tests drive a [`ManualClock`].
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time via `chrono::Utc::now()`. The default clock.
pub struct UtcClock;

impl Clock for UtcClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock advanced by hand. Intended for tests.
///
/// # Example
///
/// ```rust
/// use segue::kinds::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let before = clock.now();
/// clock.advance(Duration::from_secs(3));
/// assert_eq!((clock.now() - before).num_seconds(), 3);
/// ```
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at the current wall-clock time.
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc::now()),
        }
    }

    /// Move the clock forward by `step`. Steps that overflow the
    /// representable range are ignored.
    pub fn advance(&self, step: Duration) {
        if let Ok(delta) = TimeDelta::from_std(step) {
            let mut now = self.now.lock().expect("clock lock");
            *now += delta;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

/// Transition kind that fires once a delay has elapsed in the source
/// state.
///
/// The timer restarts on every activation of the source state, so the
/// delay is measured per visit, not globally. An optional extra
/// condition can gate the elapsed check.
///
/// # Example
///
/// ```rust
/// use segue::builder::TransitionBuilder;
/// use std::time::Duration;
///
/// // Leave the splash screen after five seconds.
/// let t = TransitionBuilder::new()
///     .from("splash")
///     .to("menu")
///     .after(Duration::from_secs(5))
///     .build()
///     .unwrap();
///
/// assert_eq!(t.to(), &"menu");
/// ```
pub struct After<S: StateId> {
    // None when the requested delay does not fit a TimeDelta; the
    // transition then never fires, keeping the poll total.
    delay: Option<TimeDelta>,
    clock: Arc<dyn Clock>,
    entered_at: Option<DateTime<Utc>>,
    condition: Option<Box<dyn Fn(&dyn MachineQuery<S>) -> bool + Send + Sync>>,
    _phantom: PhantomData<S>,
}

impl<S: StateId> After<S> {
    /// Create the kind with the default wall clock.
    pub fn new(delay: Duration) -> Self {
        Self::with_clock(delay, Arc::new(UtcClock))
    }

    /// Create the kind with an explicit time source.
    pub fn with_clock(delay: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            delay: TimeDelta::from_std(delay).ok(),
            clock,
            entered_at: None,
            condition: None,
            _phantom: PhantomData,
        }
    }

    /// Additionally require `condition` to hold once the delay has
    /// elapsed.
    pub fn and_when<F>(mut self, condition: F) -> Self
    where
        F: Fn(&dyn MachineQuery<S>) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Box::new(condition));
        self
    }
}

impl<S: StateId> TransitionBehavior<S> for After<S> {
    fn on_enter(&mut self) {
        self.entered_at = Some(self.clock.now());
    }

    fn should_transition(&mut self, fsm: &dyn MachineQuery<S>) -> bool {
        let (Some(delay), Some(entered_at)) = (self.delay, self.entered_at) else {
            return false;
        };
        if self.clock.now().signed_duration_since(entered_at) < delay {
            return false;
        }
        self.condition.as_ref().is_none_or(|c| c(fsm))
    }
}
