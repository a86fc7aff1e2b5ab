//! Error types shared by every graph, block, instruction and ISA operation
//!
//! Every fallible operation returns its own `IrResult`. A call that fails has no
//! observable effect on the graph.

use serde::Serialize;
use thiserror::Error;

/// Result alias for IR operations
pub type IrResult<T> = Result<T, IrError>;

/// Failure of an IR operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    /// Missing or stale argument, index out of range, arity or type mismatch,
    /// immediate overflow, or an operand kind the instruction does not have
    #[error("Bad argument: {0}")]
    BadArgument(String),

    /// Entities that must share a graph (or a file) do not
    #[error("Wrong context: {0}")]
    WrongCtx(String),

    /// Operation is only valid for another ISA family
    #[error("Wrong mode: {0}")]
    WrongMode(String),

    /// Capability table requested with an unsupported version tag
    #[error("Unknown API version: {0}")]
    UnknownApiVersion(u32),
}

impl IrError {
    pub(crate) fn bad_argument(message: impl Into<String>) -> Self {
        IrError::BadArgument(message.into())
    }

    pub(crate) fn wrong_ctx(message: impl Into<String>) -> Self {
        IrError::WrongCtx(message.into())
    }

    pub(crate) fn wrong_mode(message: impl Into<String>) -> Self {
        IrError::WrongMode(message.into())
    }

    /// Status code for this error
    pub fn status(&self) -> Status {
        match self {
            IrError::BadArgument(_) => Status::BadArgument,
            IrError::WrongCtx(_) => Status::WrongCtx,
            IrError::WrongMode(_) => Status::WrongMode,
            IrError::UnknownApiVersion(_) => Status::UnknownApiVersion,
        }
    }
}

/// Flat status code, used where a result has to be reported out of band
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    /// Success
    NoError = 0,
    /// See [`IrError::BadArgument`]
    BadArgument = 1,
    /// See [`IrError::WrongCtx`]
    WrongCtx = 2,
    /// See [`IrError::WrongMode`]
    WrongMode = 3,
    /// See [`IrError::UnknownApiVersion`]
    UnknownApiVersion = 4,
}

impl Status {
    /// Status of a finished operation
    pub fn of<T>(result: &IrResult<T>) -> Status {
        match result {
            Ok(_) => Status::NoError,
            Err(e) => e.status(),
        }
    }
}
