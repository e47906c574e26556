//! Builder API for transition declarations.
//!
//! The builder is the single construction surface for [`Transition`]
//! values. It validates the construction-time contract — endpoints are
//! present, and a self edge carries `allow_reentry` — so configuration
//! errors surface at build time, before the declaration ever reaches a
//! machine.

pub mod error;

pub use error::BuildError;

use crate::core::{Always, MachineQuery, StateId, Transition, TransitionBehavior};
use crate::kinds::{After, Cond, OnSignal, Signal};
use std::time::Duration;

/// Fluent builder for [`Transition`] declarations.
///
/// # Example
///
/// ```rust
/// use segue::builder::TransitionBuilder;
///
/// let t = TransitionBuilder::new()
///     .from("search")
///     .to("attack")
///     .when(|fsm| fsm.active_state() == Some(&"search"))
///     .build()
///     .unwrap();
///
/// assert_eq!(t.to(), &"attack");
/// ```
pub struct TransitionBuilder<S: StateId> {
    from: Option<S>,
    to: Option<S>,
    force_instantly: bool,
    allow_reentry: bool,
    behavior: Option<Box<dyn TransitionBehavior<S>>>,
}

impl<S: StateId + 'static> TransitionBuilder<S> {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            from: None,
            to: None,
            force_instantly: false,
            allow_reentry: false,
            behavior: None,
        }
    }

    /// Set the source state (required).
    pub fn from(mut self, state: S) -> Self {
        self.from = Some(state);
        self
    }

    /// Set the destination state (required).
    pub fn to(mut self, state: S) -> Self {
        self.to = Some(state);
        self
    }

    /// Skip the source state's needs-exit-time negotiation: once the
    /// poll reports true, the change happens on the same tick.
    pub fn force_instantly(mut self) -> Self {
        self.force_instantly = true;
        self
    }

    /// Permit firing into the already active state, re-running its full
    /// exit/enter cycle. Required for self edges.
    pub fn allow_reentry(mut self) -> Self {
        self.allow_reentry = true;
        self
    }

    /// Gate the transition on a condition polled each tick (optional;
    /// without one the transition always reports true).
    pub fn when<F>(self, condition: F) -> Self
    where
        F: Fn(&dyn MachineQuery<S>) -> bool + Send + Sync + 'static,
    {
        self.behavior(Cond::new(condition))
    }

    /// Fire once `delay` has elapsed in the source state, measured from
    /// each activation (optional).
    pub fn after(self, delay: Duration) -> Self {
        self.behavior(After::new(delay))
    }

    /// Fire when `signal` has been raised (optional). The raise latches
    /// until the transition actually fires.
    pub fn on_signal(self, signal: &Signal) -> Self {
        self.behavior(OnSignal::new(signal))
    }

    /// Use a custom [`TransitionBehavior`] (optional).
    pub fn behavior<B>(mut self, behavior: B) -> Self
    where
        B: TransitionBehavior<S> + 'static,
    {
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Build the declaration, validating the construction contract.
    pub fn build(self) -> Result<Transition<S>, BuildError> {
        let from = self.from.ok_or(BuildError::MissingFromState)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;
        if from == to && !self.allow_reentry {
            return Err(BuildError::SelfTransitionWithoutReentry);
        }

        let behavior = self.behavior.unwrap_or_else(|| Box::new(Always));
        Ok(Transition::from_parts(
            from,
            to,
            self.force_instantly,
            self.allow_reentry,
            behavior,
        ))
    }
}

impl<S: StateId + 'static> Default for TransitionBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Create an unconditional transition between two distinct states.
///
/// # Example
///
/// ```rust
/// use segue::builder::unconditional;
///
/// let t = unconditional("boot", "idle").unwrap();
/// assert_eq!(t.from(), &"boot");
/// ```
pub fn unconditional<S: StateId + 'static>(from: S, to: S) -> Result<Transition<S>, BuildError> {
    TransitionBuilder::new().from(from).to(to).build()
}

/// Create a condition-gated transition between two distinct states.
///
/// # Example
///
/// ```rust
/// use segue::builder::conditional;
///
/// let t = conditional("idle", "run", |fsm| !fsm.transition_pending()).unwrap();
/// assert_eq!(t.to(), &"run");
/// ```
pub fn conditional<S, F>(from: S, to: S, condition: F) -> Result<Transition<S>, BuildError>
where
    S: StateId + 'static,
    F: Fn(&dyn MachineQuery<S>) -> bool + Send + Sync + 'static,
{
    TransitionBuilder::new()
        .from(from)
        .to(to)
        .when(condition)
        .build()
}
