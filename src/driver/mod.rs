//! A minimal tick-loop driver for bound transitions.
//!
//! The [`Machine`] here discharges every driver-side obligation of the
//! transition protocol: it arms transitions when their source state
//! activates, polls them each tick in declaration order (the documented
//! precedence when several report true at once), applies the reentry
//! guard, negotiates needs-exit-time deferral, and brackets each change
//! with the before/after hooks in the fixed order
//!
//! `before_transition` → source exit → switch → destination enter →
//! `after_transition`.
//!
//! It is deliberately flat: states are leaves with optional callbacks,
//! and nesting machines inside states is left to the embedding. The
//! upward half of that composition is still present — exit transitions
//! attached via [`Machine::add_exit_transition`] and polled with
//! [`Machine::try_exit`].

mod error;
mod machine;

pub use error::MachineError;
pub use machine::{Machine, StateConfig, TickOutcome};
