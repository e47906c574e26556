//! Attachment and sequencing errors of the driver.

use thiserror::Error;

/// Errors that can occur when configuring or driving a machine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MachineError {
    #[error("State {0} is not registered with this machine")]
    UnknownState(String),

    #[error("State {0} is already registered")]
    DuplicateState(String),

    #[error("Machine has not been started. Call .start(initial) first")]
    NotStarted,

    #[error("Machine is already started")]
    AlreadyStarted,
}
