//! The tick-loop machine driving bound transitions.

use super::error::MachineError;
use crate::core::{
    BoundTransition, FiredTransition, MachineHandle, MachineQuery, Placement, StateId, Transition,
    TransitionTrace,
};
use chrono::Utc;
use std::collections::HashMap;

/// Per-state configuration: the exit-time preference and the optional
/// enter/exit callbacks.
///
/// # Example
///
/// ```rust
/// use segue::driver::StateConfig;
///
/// let config: StateConfig<&str> = StateConfig::new()
///     .needs_exit_time()
///     .on_enter(|state| println!("entering {state}"));
/// ```
pub struct StateConfig<S: StateId> {
    needs_exit_time: bool,
    on_enter: Option<Box<dyn FnMut(&S) + Send>>,
    on_exit: Option<Box<dyn FnMut(&S) + Send>>,
}

impl<S: StateId> StateConfig<S> {
    /// Configuration with no callbacks that exits instantly.
    pub fn new() -> Self {
        Self {
            needs_exit_time: false,
            on_enter: None,
            on_exit: None,
        }
    }

    /// Ask the machine to defer non-forced transitions away from this
    /// state until [`Machine::confirm_exit`] is called.
    pub fn needs_exit_time(mut self) -> Self {
        self.needs_exit_time = true;
        self
    }

    /// Callback run when the machine enters this state.
    pub fn on_enter<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&S) + Send + 'static,
    {
        self.on_enter = Some(Box::new(callback));
        self
    }

    /// Callback run when the machine exits this state.
    pub fn on_exit<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&S) + Send + 'static,
    {
        self.on_exit = Some(Box::new(callback));
        self
    }
}

impl<S: StateId> Default for StateConfig<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// What a call to [`Machine::tick`] did.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TickOutcome {
    /// No transition reported true (or all that did were suppressed).
    Idle,
    /// A transition fired and the state changed on this tick.
    Fired,
    /// A transition was accepted but the source state needs exit time;
    /// the change waits for [`Machine::confirm_exit`].
    Deferred,
}

/// Read-only snapshot handed to behavior polls, so polling can borrow
/// the transition list mutably at the same time.
struct QueryView<'a, S: StateId> {
    active: Option<&'a S>,
    pending: bool,
}

impl<S: StateId> MachineQuery<S> for QueryView<'_, S> {
    fn active_state(&self) -> Option<&S> {
        self.active
    }

    fn transition_pending(&self) -> bool {
        self.pending
    }
}

/// A flat state machine driving bound transitions.
///
/// The machine holds states, the transitions attached to each state in
/// declaration order, and the active-state pointer. Each [`tick`]
/// (evaluation step) polls the active state's transitions; the first
/// one reporting true — declaration order is the documented, and only,
/// precedence — wins the tick, subject to the reentry guard and the
/// needs-exit-time negotiation.
///
/// [`tick`]: Machine::tick
///
/// # Example
///
/// ```rust
/// use segue::builder::TransitionBuilder;
/// use segue::driver::{Machine, StateConfig, TickOutcome};
///
/// let mut machine = Machine::new();
/// machine.add_state("idle", StateConfig::new()).unwrap();
/// machine.add_state("run", StateConfig::new()).unwrap();
///
/// let mut go = false;
/// machine
///     .add_transition(
///         TransitionBuilder::new()
///             .from("idle")
///             .to("run")
///             .when(move |_| go)
///             .build()
///             .unwrap(),
///     )
///     .unwrap();
///
/// machine.start("idle").unwrap();
/// assert_eq!(machine.tick().unwrap(), TickOutcome::Idle);
/// ```
pub struct Machine<S: StateId> {
    handle: MachineHandle,
    states: HashMap<S, StateConfig<S>>,
    transitions: HashMap<S, Vec<BoundTransition<S>>>,
    exit_transitions: Vec<BoundTransition<S>>,
    active: Option<S>,
    started: bool,
    // Index into the active state's transition list of an accepted but
    // deferred transition.
    pending: Option<usize>,
    trace: TransitionTrace<S>,
}

impl<S: StateId + 'static> Machine<S> {
    /// Create an empty machine with a fresh handle.
    pub fn new() -> Self {
        Self {
            handle: MachineHandle::next(),
            states: HashMap::new(),
            transitions: HashMap::new(),
            exit_transitions: Vec::new(),
            active: None,
            started: false,
            pending: None,
            trace: TransitionTrace::new(),
        }
    }

    /// Handle identifying this machine to its bound transitions.
    pub fn handle(&self) -> MachineHandle {
        self.handle
    }

    /// Register a state.
    pub fn add_state(&mut self, id: S, config: StateConfig<S>) -> Result<(), MachineError> {
        if self.states.contains_key(&id) {
            return Err(MachineError::DuplicateState(format!("{id:?}")));
        }
        self.states.insert(id, config);
        Ok(())
    }

    /// Attach a lateral transition. Both endpoints must name registered
    /// states; attachment binds the declaration to this machine and
    /// runs its one-time init.
    pub fn add_transition(&mut self, transition: Transition<S>) -> Result<(), MachineError> {
        self.check_known(transition.from())?;
        self.check_known(transition.to())?;
        let from = transition.from().clone();
        let bound = transition.bind(self.handle, Placement::Lateral);
        self.transitions.entry(from).or_default().push(bound);
        Ok(())
    }

    /// Attach an exit transition: the mechanism by which this machine
    /// reports upward that it wants to leave its scope. Only the source
    /// must be registered here; the destination names a state in the
    /// enclosing scope.
    pub fn add_exit_transition(&mut self, transition: Transition<S>) -> Result<(), MachineError> {
        self.check_known(transition.from())?;
        let bound = transition.bind(self.handle, Placement::Exit);
        self.exit_transitions.push(bound);
        Ok(())
    }

    /// Enter the initial state and arm its transitions.
    pub fn start(&mut self, initial: S) -> Result<(), MachineError> {
        if self.started {
            return Err(MachineError::AlreadyStarted);
        }
        self.check_known(&initial)?;
        self.started = true;
        self.enter_state(initial);
        Ok(())
    }

    /// Run one evaluation step.
    ///
    /// Polls the active state's transitions in declaration order and
    /// stops at the first acceptable true result. A transition whose
    /// destination is already active is suppressed unless it allows
    /// reentry; polling then continues with later transitions. While a
    /// deferred transition is pending, nothing is polled — the machine
    /// has committed and waits for [`confirm_exit`](Machine::confirm_exit).
    pub fn tick(&mut self) -> Result<TickOutcome, MachineError> {
        if !self.started {
            return Err(MachineError::NotStarted);
        }
        if self.pending.is_some() {
            return Ok(TickOutcome::Deferred);
        }
        let Some(active) = self.active.clone() else {
            return Ok(TickOutcome::Idle);
        };

        let view = QueryView {
            active: Some(&active),
            pending: false,
        };
        let Some(list) = self.transitions.get_mut(&active) else {
            return Ok(TickOutcome::Idle);
        };

        let mut accepted = None;
        for (idx, transition) in list.iter_mut().enumerate() {
            if !transition.poll(&view) {
                continue;
            }
            if transition.reentry_blocked(&active) {
                continue;
            }
            accepted = Some((idx, transition.force_instantly()));
            break;
        }

        let Some((idx, forced)) = accepted else {
            return Ok(TickOutcome::Idle);
        };
        let needs_exit_time = self
            .states
            .get(&active)
            .is_some_and(|config| config.needs_exit_time);

        if forced || !needs_exit_time {
            self.perform(&active, idx);
            Ok(TickOutcome::Fired)
        } else {
            self.pending = Some(idx);
            Ok(TickOutcome::Deferred)
        }
    }

    /// Signal that the active state has finished its exit work.
    ///
    /// Completes a pending deferred transition, returning whether a
    /// state change happened. A no-op (returning `false`) when nothing
    /// is pending.
    pub fn confirm_exit(&mut self) -> Result<bool, MachineError> {
        if !self.started {
            return Err(MachineError::NotStarted);
        }
        let (Some(idx), Some(active)) = (self.pending.take(), self.active.clone()) else {
            return Ok(false);
        };
        self.perform(&active, idx);
        Ok(true)
    }

    /// Poll this machine's exit transitions, as an enclosing scope
    /// would when it wants the machine to leave.
    ///
    /// When one fires, the usual hook bracket runs around exiting the
    /// active state, the machine becomes inactive, and `true` is
    /// reported upward. Deferral does not apply here: the enclosing
    /// scope polls again if the answer is `false`.
    pub fn try_exit(&mut self) -> Result<bool, MachineError> {
        if !self.started {
            return Err(MachineError::NotStarted);
        }
        let Some(active) = self.active.clone() else {
            return Ok(false);
        };

        let view = QueryView {
            active: Some(&active),
            pending: self.pending.is_some(),
        };
        let mut accepted = None;
        for (idx, transition) in self.exit_transitions.iter_mut().enumerate() {
            if transition.from() != &active {
                continue;
            }
            if transition.poll(&view) {
                accepted = Some(idx);
                break;
            }
        }
        let Some(idx) = accepted else {
            return Ok(false);
        };

        self.exit_transitions[idx].before_transition();
        self.run_exit_callback(&active);
        self.active = None;
        self.pending = None;
        let transition = &mut self.exit_transitions[idx];
        transition.after_transition();
        let record = FiredTransition {
            from: active,
            to: transition.to().clone(),
            timestamp: Utc::now(),
            forced: transition.force_instantly(),
        };
        self.trace = self.trace.record(record);
        Ok(true)
    }

    /// Identifier of the currently active state.
    pub fn active_state(&self) -> Option<&S> {
        self.active.as_ref()
    }

    /// Whether a deferred transition is waiting for
    /// [`confirm_exit`](Machine::confirm_exit).
    pub fn transition_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Trace of every completed state change.
    pub fn trace(&self) -> &TransitionTrace<S> {
        &self.trace
    }

    fn check_known(&self, id: &S) -> Result<(), MachineError> {
        if self.states.contains_key(id) {
            Ok(())
        } else {
            Err(MachineError::UnknownState(format!("{id:?}")))
        }
    }

    /// Carry out a committed state change: the hook bracket around
    /// exit, switch and enter, then the trace record.
    fn perform(&mut self, from: &S, idx: usize) {
        let (to, forced) = {
            let transition = self
                .transitions
                .get_mut(from)
                .and_then(|list| list.get_mut(idx))
                .expect("committed transition exists");
            transition.before_transition();
            (transition.to().clone(), transition.force_instantly())
        };

        self.run_exit_callback(from);
        self.enter_state(to.clone());

        if let Some(transition) = self
            .transitions
            .get_mut(from)
            .and_then(|list| list.get_mut(idx))
        {
            transition.after_transition();
        }

        let record = FiredTransition {
            from: from.clone(),
            to,
            timestamp: Utc::now(),
            forced,
        };
        self.trace = self.trace.record(record);
    }

    /// Activate `state`: run its enter callback and arm every
    /// transition attached to it, lateral and exit alike.
    fn enter_state(&mut self, state: S) {
        self.active = Some(state.clone());
        if let Some(config) = self.states.get_mut(&state) {
            if let Some(callback) = config.on_enter.as_mut() {
                callback(&state);
            }
        }
        if let Some(list) = self.transitions.get_mut(&state) {
            for transition in list.iter_mut() {
                transition.on_enter();
            }
        }
        for transition in self.exit_transitions.iter_mut() {
            if transition.from() == &state {
                transition.on_enter();
            }
        }
    }

    fn run_exit_callback(&mut self, state: &S) {
        if let Some(config) = self.states.get_mut(state) {
            if let Some(callback) = config.on_exit.as_mut() {
                callback(state);
            }
        }
    }
}

impl<S: StateId + 'static> Default for Machine<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StateId + 'static> MachineQuery<S> for Machine<S> {
    fn active_state(&self) -> Option<&S> {
        self.active.as_ref()
    }

    fn transition_pending(&self) -> bool {
        self.pending.is_some()
    }
}
