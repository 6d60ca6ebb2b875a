use crate::{Label, Opcode};
use alloy_primitives::U256;
use thiserror::Error;

/// Result alias with [`Error`] as the default error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Any error returned by this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Execution failed.
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// Assembly failed.
    #[error(transparent)]
    Asm(#[from] AsmError),
}

/// An error that aborts execution.
///
/// Reverting is not an error; see [`ExecutionResult::reverted`](crate::ExecutionResult::reverted).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// An instruction needed more stack items than there were.
    #[error("stack underflow")]
    StackUnderflow,

    /// The stack grew past the configured limit.
    #[error("stack overflow, limit: {limit}")]
    StackOverflow {
        /// The configured limit.
        limit: usize,
    },

    /// The target of `JUMP` or `JUMPI` is not a `JUMPDEST`.
    #[error("invalid jump destination: {0:#x}")]
    InvalidJumpDest(U256),

    /// `INVALID` or an unassigned byte was executed.
    #[error("invalid operation: {0}")]
    InvalidOperation(Opcode),

    /// The opcode needs chain state, gas or calls.
    #[error("impure opcode: {0}")]
    Impure(Opcode),

    /// Memory grew past the configured limit, or an offset or size can't be addressed.
    #[error("memory limit exceeded")]
    MemoryLimitExceeded,

    /// The configured number of instructions was executed without halting.
    #[error("step limit reached after {0} steps")]
    StepLimitReached(u64),
}

/// An error that aborts assembly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// A jump pointer refers to a label that is never defined.
    #[error("unresolved label: {0}")]
    UnresolvedLabel(Label),

    /// A label is defined more than once.
    #[error("duplicate label: {0}")]
    DuplicateLabel(Label),

    /// The offset of a label does not fit in the jump pointer width.
    #[error("offset of label {label} ({offset:#x}) does not fit in {width} bytes")]
    LabelOutOfRange {
        /// The label.
        label: Label,
        /// The resolved offset.
        offset: usize,
        /// The jump pointer width in bytes.
        width: u8,
    },

    /// The jump pointer width is not between 1 and 32.
    #[error("invalid jump pointer width: {0}, must be between 1 and 32")]
    InvalidPointerWidth(u8),

    /// A family opcode parameter is out of range, or an `UNKNOWN` byte is actually assigned.
    #[error("invalid opcode: {0}")]
    InvalidOpcode(Opcode),
}
