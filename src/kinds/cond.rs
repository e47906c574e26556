//! Predicate-gated transition kind.

use crate::core::{MachineQuery, StateId, TransitionBehavior};

/// Transition kind gated by a condition closure.
///
/// The condition is polled on every evaluation tick while the source
/// state is active. It receives the read-only machine view, so it can
/// inspect the active state, but it cannot mutate anything.
///
/// The condition must be total: resolve internal uncertainty to
/// `false` rather than panicking, since a faulted predicate stalls the
/// owning state.
///
/// # Example
///
/// ```rust
/// use segue::builder::TransitionBuilder;
///
/// let health = 12;
/// let t = TransitionBuilder::new()
///     .from("fight")
///     .to("flee")
///     .when(move |_| health < 25)
///     .build()
///     .unwrap();
///
/// assert_eq!(t.to(), &"flee");
/// ```
pub struct Cond<S: StateId> {
    condition: Box<dyn Fn(&dyn MachineQuery<S>) -> bool + Send + Sync>,
}

impl<S: StateId> Cond<S> {
    /// Create the kind from a condition closure.
    pub fn new<F>(condition: F) -> Self
    where
        F: Fn(&dyn MachineQuery<S>) -> bool + Send + Sync + 'static,
    {
        Self {
            condition: Box::new(condition),
        }
    }
}

impl<S: StateId> TransitionBehavior<S> for Cond<S> {
    fn should_transition(&mut self, fsm: &dyn MachineQuery<S>) -> bool {
        (self.condition)(fsm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct View {
        active: &'static str,
    }

    impl MachineQuery<&'static str> for View {
        fn active_state(&self) -> Option<&&'static str> {
            Some(&self.active)
        }

        fn transition_pending(&self) -> bool {
            false
        }
    }

    #[test]
    fn condition_result_is_forwarded() {
        let flag = Arc::new(AtomicBool::new(false));
        let read = Arc::clone(&flag);
        let mut kind = Cond::new(move |_| read.load(Ordering::Relaxed));
        let view = View { active: "idle" };

        assert!(!kind.should_transition(&view));
        flag.store(true, Ordering::Relaxed);
        assert!(kind.should_transition(&view));
    }

    #[test]
    fn condition_can_read_the_active_state() {
        let mut kind = Cond::new(|fsm| fsm.active_state() == Some(&"idle"));

        assert!(kind.should_transition(&View { active: "idle" }));
        assert!(!kind.should_transition(&View { active: "run" }));
    }
}
