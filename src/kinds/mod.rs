//! Concrete transition kinds.
//!
//! Each kind implements the [`TransitionBehavior`](crate::core::TransitionBehavior)
//! contract with a different decision source:
//! - [`Cond`]: a predicate closure, polled each tick
//! - [`After`]: a per-activation timer
//! - [`OnSignal`]: an application-raised [`Signal`]
//!
//! The driver's calling convention is identical for all of them; the
//! kind only decides when the poll reports true.

mod after;
mod cond;
mod signal;

pub use after::{After, Clock, ManualClock, UtcClock};
pub use cond::Cond;
pub use signal::{OnSignal, Signal};
