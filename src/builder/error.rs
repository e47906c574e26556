//! Build errors for transition declarations.

use thiserror::Error;

/// Errors that can occur when building a transition declaration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Transition source state not specified. Call .from(state)")]
    MissingFromState,

    #[error("Transition destination state not specified. Call .to(state)")]
    MissingToState,

    #[error(
        "Transition destination equals its source. Self-transitions require .allow_reentry()"
    )]
    SelfTransitionWithoutReentry,
}
