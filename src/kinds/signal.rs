//! Event-driven transition kind.

use crate::core::{MachineQuery, StateId, TransitionBehavior};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Application-held handle that requests an [`OnSignal`] transition.
///
/// Cloning is cheap; all clones share one latch. A raise stays latched
/// until the transition actually fires, so a request made while the
/// driver suppresses the transition (reentry guard, other state
/// active) is not lost.
///
/// # Example
///
/// ```rust
/// use segue::kinds::Signal;
///
/// let jump = Signal::new();
/// let from_input_thread = jump.clone();
///
/// from_input_thread.raise();
/// assert!(jump.is_raised());
/// ```
#[derive(Clone)]
pub struct Signal {
    raised: Arc<AtomicBool>,
}

impl Signal {
    /// Create a new, unraised signal.
    pub fn new() -> Self {
        Self {
            raised: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request the transition. Idempotent until consumed.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Whether a raise is currently latched.
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

/// Transition kind that fires when its [`Signal`] has been raised.
///
/// The poll reads the latch without consuming it; the firing itself
/// (`before_transition`) clears it, once per raise.
pub struct OnSignal {
    raised: Arc<AtomicBool>,
}

impl OnSignal {
    /// Create the kind listening to `signal`.
    pub fn new(signal: &Signal) -> Self {
        Self {
            raised: Arc::clone(&signal.raised),
        }
    }
}

impl<S: StateId> TransitionBehavior<S> for OnSignal {
    fn should_transition(&mut self, _fsm: &dyn MachineQuery<S>) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    fn before_transition(&mut self) {
        self.raised.store(false, Ordering::Release);
    }
}
