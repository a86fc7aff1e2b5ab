//! irkit: a mutable IR toolkit for bytecode function bodies
//!
//! This crate models one compiled function body as a control-flow graph of basic blocks
//! and instructions, and provides the operations needed to inspect and rewrite it:
//! - **IR core**: `Graph`, basic blocks, instructions, constants and phis (`ir` module)
//! - **Analyses**: dominance and loop classification, computed on demand
//! - **ISA layers**: opcode-specific constructors for the static and dynamic
//!   instruction-set families (`isa` module)
//! - **Passes**: unreachable-block removal (`optimize` module)
//! - **Front door**: versioned capability tables (`api` module)
//! - **File**: the in-memory owner of functions, classes, strings and literal arrays
//!   that graphs are created from and committed back into (`file` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use irkit_core::{File, IsaKind, TypeId};
//!
//! let mut file = File::new(IsaKind::Static);
//! let func = file.add_function("sum", &[TypeId::I32, TypeId::I32], TypeId::I32);
//! let mut graph = file.create_graph(func)?;
//!
//! let a = graph.parameter(0)?;
//! let b = graph.parameter(1)?;
//! let add = graph.static_isa().create_add(a, b)?;
//! let ret = graph.static_isa().create_return(add)?;
//! let end = graph.end_block();
//! graph.add_instruction_back(end, add)?;
//! graph.add_instruction_back(end, ret)?;
//!
//! file.commit_graph(func, graph)?;
//! ```

#![warn(rust_2018_idioms)]
#![allow(clippy::new_without_default)]

/// Versioned capability tables
pub mod api;

/// Runtime configuration
pub mod config;

/// Error types
pub mod error;

/// In-memory owner of functions and file-scoped entities
pub mod file;

/// IR core: graph, blocks, instructions and analyses
pub mod ir;

/// Static and dynamic ISA extension layers
pub mod isa;

/// Graph transformation passes
pub mod optimize;

pub use api::ApiVersion;
pub use config::{DumpOptions, GraphOptions};
pub use error::{IrError, IrResult, Status};
pub use file::{Class, Field, File, FileId, Function, Literal, LiteralArray, StringRef};
pub use ir::{
    BitWidth, BlockFlags, BlockId, ConditionCode, ConstValue, Graph, GraphId, Imm, InstId,
    IsaKind, Op, PrettyPrint, TypeId, VerifyError,
};
pub use isa::{DynamicIsa, DynamicOpcode, StaticIsa, StaticOpcode};
