//! Core transition protocol types.
//!
//! This module contains the contract between a transition and the
//! machine that drives it:
//! - State identifiers via the [`StateId`] trait
//! - The two-phase transition lifecycle: [`Transition`] declarations
//!   and the [`BoundTransition`] produced by attachment
//! - The [`TransitionBehavior`] capability a concrete kind implements
//! - The [`TransitionTrace`] of completed changes
//!
//! Everything here is driver-agnostic: the crate's own
//! [`driver`](crate::driver) consumes these types through the same
//! surface an external driver would.

mod id;
mod trace;
mod transition;

pub use id::StateId;
pub use trace::{FiredTransition, TransitionTrace};
pub use transition::{
    BoundTransition, MachineHandle, MachineQuery, Placement, Transition, TransitionBehavior,
};

pub(crate) use transition::Always;
