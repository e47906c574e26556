//! Segue: the transition layer of a hierarchical state machine runtime.
//!
//! A transition is a declaration of a `from` → `to` edge plus a small
//! evaluation/callback protocol. The machine driving it decides when to
//! poll and when to change state; the transition only signals intent and
//! brackets the change with hooks — "decide" stays separate from "do".
//!
//! # Core Concepts
//!
//! - **Declaration**: [`core::Transition`], built with
//!   [`builder::TransitionBuilder`], immutable once built
//! - **Binding**: attaching a declaration to a machine yields a
//!   [`core::BoundTransition`]; only bound transitions can be evaluated
//! - **Kinds**: [`kinds::Cond`], [`kinds::After`] and [`kinds::OnSignal`]
//!   cover condition-, timer- and event-driven decisions; custom kinds
//!   implement [`core::TransitionBehavior`]
//! - **Driver**: [`driver::Machine`] runs the tick loop, the reentry
//!   guard and the needs-exit-time negotiation
//!
//! # Example
//!
//! ```rust
//! use segue::builder::TransitionBuilder;
//! use segue::driver::{Machine, StateConfig, TickOutcome};
//! use segue::kinds::Signal;
//!
//! let mut machine = Machine::new();
//! machine.add_state("idle", StateConfig::new()).unwrap();
//! machine.add_state("run", StateConfig::new()).unwrap();
//!
//! let go = Signal::new();
//! machine
//!     .add_transition(
//!         TransitionBuilder::new()
//!             .from("idle")
//!             .to("run")
//!             .on_signal(&go)
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! machine.start("idle").unwrap();
//! assert_eq!(machine.tick().unwrap(), TickOutcome::Idle);
//!
//! go.raise();
//! assert_eq!(machine.tick().unwrap(), TickOutcome::Fired);
//! assert_eq!(machine.active_state(), Some(&"run"));
//! ```

pub mod builder;
pub mod core;
pub mod driver;
pub mod kinds;

// Re-export commonly used types
pub use crate::builder::{BuildError, TransitionBuilder};
pub use crate::core::{
    BoundTransition, MachineHandle, MachineQuery, Placement, StateId, Transition,
    TransitionBehavior, TransitionTrace,
};
pub use crate::driver::{Machine, MachineError, StateConfig, TickOutcome};
