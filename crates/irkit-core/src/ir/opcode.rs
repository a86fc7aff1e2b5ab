//! Instruction operations

use crate::isa::{DynamicOpcode, StaticOpcode};
use crate::ir::types::{BitWidth, ConstValue};
use serde::Serialize;

/// Operation performed by an instruction
///
/// Core operations are shared by both ISA families; everything else is owned by one
/// family and can only be created through that family's constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Op {
    /// Canonical constant, lives in the start block
    Constant(ConstValue),
    /// Function parameter at the given position, lives in the start block
    Parameter(u32),
    Phi,
    /// Exception value merge at the front of a catch-begin block
    CatchPhi,
    /// Marker of a try-begin block
    Try,
    Static(StaticOpcode),
    Dynamic(DynamicOpcode),
}

impl Op {
    pub fn is_constant(&self) -> bool {
        matches!(self, Op::Constant(_))
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self, Op::Parameter(_))
    }

    pub fn is_phi(&self) -> bool {
        matches!(self, Op::Phi | Op::CatchPhi)
    }

    pub fn is_call(&self) -> bool {
        match self {
            Op::Static(op) => op.is_call(),
            Op::Dynamic(op) => op.is_call(),
            _ => false,
        }
    }

    /// Whether the input list may grow through `append_input`
    pub fn is_variadic(&self) -> bool {
        match self {
            Op::Phi | Op::CatchPhi => true,
            Op::Dynamic(op) => op.is_variadic(),
            _ => false,
        }
    }

    /// Inputs ahead of the arguments when the function operand fixes the argument count
    pub fn call_receivers(&self) -> Option<usize> {
        match self {
            Op::Static(op) => op.call_receivers(),
            _ => None,
        }
    }

    /// Inputs left out of a range instruction's count immediate, and its width
    pub fn range_layout(&self) -> Option<(usize, BitWidth)> {
        match self {
            Op::Dynamic(op) => op.range_layout(),
            _ => None,
        }
    }

    /// Whether the instruction carries a condition code
    pub fn has_condition_code(&self) -> bool {
        match self {
            Op::Static(op) => op.has_condition_code(),
            Op::Dynamic(op) => op.has_condition_code(),
            _ => false,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Op::Constant(_) => "constant",
            Op::Parameter(_) => "parameter",
            Op::Phi => "phi",
            Op::CatchPhi => "catchphi",
            Op::Try => "try",
            Op::Static(op) => op.mnemonic(),
            Op::Dynamic(op) => op.mnemonic(),
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Op::Constant(value) => write!(f, "constant {}", value),
            Op::Parameter(index) => write!(f, "parameter {}", index),
            op => f.write_str(op.mnemonic()),
        }
    }
}
