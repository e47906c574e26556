//! The transition declaration and its evaluation/callback protocol.
//!
//! A transition goes through two phases:
//!
//! 1. **Declaration** — [`Transition`] holds the immutable `from`/`to`
//!    edge and the two construction-time flags, plus the decision logic
//!    as a boxed [`TransitionBehavior`].
//! 2. **Bound** — [`Transition::bind`] consumes the declaration and
//!    yields a [`BoundTransition`] carrying the two driver-assigned
//!    fields: the owning machine's [`MachineHandle`] and the exit
//!    classification from [`Placement`]. Binding runs the behavior's
//!    one-time `init`, so a transition can never be evaluated while
//!    partially initialized, and neither driver-assigned field can be
//!    observed to change twice.
//!
//! The driver polls a bound transition while its `from` state is active
//! and, when the poll reports true, brackets the actual state change
//! with `before_transition`/`after_transition`. The transition never
//! changes machine state itself; it only signals intent.

use super::id::StateId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Non-owning handle identifying the machine a transition is bound to.
///
/// Handles are process-unique tokens, not references: a transition holds
/// one so a driver can verify ownership, and behaviors receive it in
/// `init`, but resolving a handle back to machine state is the driver's
/// business. This keeps the transition's lifetime strictly inside the
/// machine's without any ownership link.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MachineHandle(u64);

impl MachineHandle {
    /// Allocate a fresh, process-unique handle.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        MachineHandle(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Read-only view of the owning machine, passed to a behavior's poll.
///
/// This is the whole machine surface a transition may consume: enough to
/// implement conditions that look at where the machine currently is,
/// and nothing that mutates. The reentry guard and exit classification
/// are applied by the driver, upstream of this view.
pub trait MachineQuery<S: StateId> {
    /// Identifier of the currently active state, if the machine has
    /// been started and not exited.
    fn active_state(&self) -> Option<&S>;

    /// Whether the machine has already committed to a deferred
    /// transition this activation. While true, only the committed
    /// change can still happen, so an instant transition is not
    /// currently legal.
    fn transition_pending(&self) -> bool;
}

/// Decision logic and lifecycle hooks of a transition.
///
/// Concrete kinds (a condition closure, a timer, a raised signal)
/// override a subset of the five operations; every default is the
/// original base semantics — hooks are no-ops and the poll always
/// reports true. The driver invokes them in a fixed, synchronous order:
///
/// `init` → (`on_enter` → `should_transition`* →
/// \[`before_transition` → `after_transition`\])* → drop
///
/// `should_transition` must be total: a kind whose internal
/// precondition fails (a value source gone away, a poisoned lock)
/// resolves to `false` rather than panicking, since a faulted predicate
/// would stall the owning state indefinitely. Internal bookkeeping
/// (advancing a timer, consuming a latch) is fine; mutating machine
/// state is not.
///
/// # Example
///
/// ```rust
/// use segue::core::{MachineQuery, StateId, TransitionBehavior};
///
/// /// Fires after a fixed number of polls.
/// struct Countdown {
///     remaining: u32,
///     polls: u32,
/// }
///
/// impl<S: StateId> TransitionBehavior<S> for Countdown {
///     fn on_enter(&mut self) {
///         self.remaining = self.polls;
///     }
///
///     fn should_transition(&mut self, _fsm: &dyn MachineQuery<S>) -> bool {
///         self.remaining = self.remaining.saturating_sub(1);
///         self.remaining == 0
///     }
/// }
/// ```
pub trait TransitionBehavior<S: StateId>: Send + Sync {
    /// One-time setup, called at bind time after the machine handle is
    /// assigned. Kinds that cache references or allocate resources do
    /// it here.
    fn init(&mut self, _machine: MachineHandle) {}

    /// Called every time the machine activates the `from` state; resets
    /// per-activation state such as a timer.
    fn on_enter(&mut self) {}

    /// Whether the transition's condition currently holds. Polled any
    /// number of times per activation, including zero.
    fn should_transition(&mut self, _fsm: &dyn MachineQuery<S>) -> bool {
        true
    }

    /// Side effect that must happen before the state boundary is
    /// crossed. Called once, after the driver has committed to firing.
    fn before_transition(&mut self) {}

    /// Side effect that must happen after the destination state's enter
    /// logic has completed. Called once per firing.
    fn after_transition(&mut self) {}
}

/// Always-true behavior, used when a declaration carries no condition.
pub(crate) struct Always;

impl<S: StateId> TransitionBehavior<S> for Always {}

/// Where a transition is attached, decided by the attaching component.
///
/// The classification depends on where the edge lives, not on its
/// decision logic: a lateral transition moves between siblings, an exit
/// transition is how a child machine reports upward that it wants to
/// leave its scope.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Placement {
    /// Ordinary same-level transition.
    Lateral,
    /// Child-to-parent exit signal; the destination names a state in
    /// the enclosing scope.
    Exit,
}

/// Immutable declaration of a `from` → `to` edge.
///
/// Built with [`TransitionBuilder`](crate::builder::TransitionBuilder),
/// which validates the construction-time contract (a self edge requires
/// `allow_reentry`). The four declaration fields never change; the
/// driver-assigned fields only exist on the [`BoundTransition`] that
/// [`bind`](Transition::bind) produces.
///
/// # Example
///
/// ```rust
/// use segue::builder::TransitionBuilder;
///
/// let t = TransitionBuilder::new()
///     .from("idle")
///     .to("run")
///     .force_instantly()
///     .build()
///     .unwrap();
///
/// assert_eq!(t.from(), &"idle");
/// assert_eq!(t.to(), &"run");
/// assert!(t.force_instantly());
/// assert!(!t.allow_reentry());
/// ```
pub struct Transition<S: StateId> {
    from: S,
    to: S,
    force_instantly: bool,
    allow_reentry: bool,
    behavior: Box<dyn TransitionBehavior<S>>,
}

impl<S: StateId> Transition<S> {
    pub(crate) fn from_parts(
        from: S,
        to: S,
        force_instantly: bool,
        allow_reentry: bool,
        behavior: Box<dyn TransitionBehavior<S>>,
    ) -> Self {
        Self {
            from,
            to,
            force_instantly,
            allow_reentry,
            behavior,
        }
    }

    /// Identifier of the state this transition originates from.
    pub fn from(&self) -> &S {
        &self.from
    }

    /// Identifier of the destination state.
    pub fn to(&self) -> &S {
        &self.to
    }

    /// Whether the driver must skip the source state's needs-exit-time
    /// negotiation and change state on the same tick the poll reports
    /// true.
    pub fn force_instantly(&self) -> bool {
        self.force_instantly
    }

    /// Whether the driver's guard against firing into the already
    /// active state is lifted for this edge, permitting deliberate
    /// self-transitions.
    pub fn allow_reentry(&self) -> bool {
        self.allow_reentry
    }

    /// Attach this declaration to a machine.
    ///
    /// Consumes the declaration, assigns the owning handle and the exit
    /// classification, and runs the behavior's one-time `init`. The
    /// result is the evaluable form of the transition; there is no way
    /// back, and no way to re-bind.
    pub fn bind(mut self, machine: MachineHandle, placement: Placement) -> BoundTransition<S> {
        self.behavior.init(machine);
        BoundTransition {
            inner: self,
            machine,
            is_exit_transition: placement == Placement::Exit,
        }
    }
}

impl<S: StateId> std::fmt::Debug for Transition<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("force_instantly", &self.force_instantly)
            .field("allow_reentry", &self.allow_reentry)
            .finish_non_exhaustive()
    }
}

/// A transition attached to a machine, ready for evaluation.
///
/// Carries the two driver-assigned fields on top of the declaration:
/// the owning [`MachineHandle`] and the exit classification. Produced
/// only by [`Transition::bind`]; both fields are set exactly once,
/// there.
pub struct BoundTransition<S: StateId> {
    inner: Transition<S>,
    machine: MachineHandle,
    is_exit_transition: bool,
}

impl<S: StateId> BoundTransition<S> {
    /// Identifier of the state this transition originates from.
    pub fn from(&self) -> &S {
        &self.inner.from
    }

    /// Identifier of the destination state.
    pub fn to(&self) -> &S {
        &self.inner.to
    }

    /// See [`Transition::force_instantly`].
    pub fn force_instantly(&self) -> bool {
        self.inner.force_instantly
    }

    /// See [`Transition::allow_reentry`].
    pub fn allow_reentry(&self) -> bool {
        self.inner.allow_reentry
    }

    /// Handle of the machine this transition is bound to.
    pub fn machine(&self) -> MachineHandle {
        self.machine
    }

    /// Whether this transition was attached as a child-to-parent exit
    /// signal rather than a lateral edge.
    pub fn is_exit_transition(&self) -> bool {
        self.is_exit_transition
    }

    /// Driver-side reentry guard: true when firing must be suppressed
    /// because the destination is already active and reentry was not
    /// allowed at construction.
    pub fn reentry_blocked(&self, active: &S) -> bool {
        !self.inner.allow_reentry && self.inner.to == *active
    }

    /// Forward the per-activation reset; the driver calls this each
    /// time it activates the `from` state.
    pub fn on_enter(&mut self) {
        self.inner.behavior.on_enter();
    }

    /// Poll the decision logic. Pure signalling: a true result means
    /// the condition holds, not that the change happens — the driver
    /// still applies its guards.
    pub fn poll(&mut self, fsm: &dyn MachineQuery<S>) -> bool {
        self.inner.behavior.should_transition(fsm)
    }

    /// Hook bracketing the committed change, pre-boundary side.
    pub fn before_transition(&mut self) {
        self.inner.behavior.before_transition();
    }

    /// Hook bracketing the committed change, post-boundary side.
    pub fn after_transition(&mut self) {
        self.inner.behavior.after_transition();
    }
}

impl<S: StateId> std::fmt::Debug for BoundTransition<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundTransition")
            .field("from", &self.inner.from)
            .field("to", &self.inner.to)
            .field("machine", &self.machine)
            .field("is_exit_transition", &self.is_exit_transition)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TransitionBuilder;

    struct NoMachine;

    impl MachineQuery<&'static str> for NoMachine {
        fn active_state(&self) -> Option<&&'static str> {
            None
        }

        fn transition_pending(&self) -> bool {
            false
        }
    }

    #[test]
    fn declaration_fields_read_back_as_given() {
        let t = TransitionBuilder::new()
            .from("idle")
            .to("run")
            .build()
            .unwrap();

        assert_eq!(t.from(), &"idle");
        assert_eq!(t.to(), &"run");
        assert!(!t.force_instantly());
        assert!(!t.allow_reentry());
    }

    #[test]
    fn flags_read_back_when_set() {
        let t = TransitionBuilder::new()
            .from("idle")
            .to("idle")
            .force_instantly()
            .allow_reentry()
            .build()
            .unwrap();

        assert!(t.force_instantly());
        assert!(t.allow_reentry());
    }

    #[test]
    fn lateral_bind_is_not_an_exit_transition() {
        let handle = MachineHandle::next();
        let bound = TransitionBuilder::new()
            .from("idle")
            .to("run")
            .build()
            .unwrap()
            .bind(handle, Placement::Lateral);

        assert!(!bound.is_exit_transition());
        assert_eq!(bound.machine(), handle);
    }

    #[test]
    fn exit_bind_sets_the_classification() {
        let bound = TransitionBuilder::new()
            .from("idle")
            .to("done")
            .build()
            .unwrap()
            .bind(MachineHandle::next(), Placement::Exit);

        assert!(bound.is_exit_transition());
    }

    #[test]
    fn handles_are_unique() {
        assert_ne!(MachineHandle::next(), MachineHandle::next());
    }

    #[test]
    fn default_behavior_always_reports_true() {
        let mut bound = TransitionBuilder::new()
            .from("idle")
            .to("run")
            .build()
            .unwrap()
            .bind(MachineHandle::next(), Placement::Lateral);

        assert!(bound.poll(&NoMachine));
        assert!(bound.poll(&NoMachine));
    }

    #[test]
    fn bind_runs_init_with_the_assigned_handle() {
        struct CaptureInit {
            seen: Option<MachineHandle>,
        }

        impl TransitionBehavior<&'static str> for CaptureInit {
            fn init(&mut self, machine: MachineHandle) {
                assert!(self.seen.is_none());
                self.seen = Some(machine);
            }

            fn should_transition(&mut self, _fsm: &dyn MachineQuery<&'static str>) -> bool {
                self.seen.is_some()
            }
        }

        let handle = MachineHandle::next();
        let mut bound = TransitionBuilder::new()
            .from("idle")
            .to("run")
            .behavior(CaptureInit { seen: None })
            .build()
            .unwrap()
            .bind(handle, Placement::Lateral);

        assert!(bound.poll(&NoMachine));
    }

    #[test]
    fn reentry_guard_blocks_self_edge_without_reentry() {
        let bound = TransitionBuilder::new()
            .from("idle")
            .to("run")
            .build()
            .unwrap()
            .bind(MachineHandle::next(), Placement::Lateral);

        assert!(bound.reentry_blocked(&"run"));
        assert!(!bound.reentry_blocked(&"idle"));
    }

    #[test]
    fn reentry_guard_lifted_when_allowed() {
        let bound = TransitionBuilder::new()
            .from("idle")
            .to("idle")
            .allow_reentry()
            .build()
            .unwrap()
            .bind(MachineHandle::next(), Placement::Lateral);

        assert!(!bound.reentry_blocked(&"idle"));
    }
}
