//! Graph-based IR for one function body
//!
//! A `Graph` owns every basic block and instruction of a function body. Blocks and
//! instructions live in arenas inside the graph and are addressed through small `Copy`
//! handles (`BlockId`, `InstId`) that carry the identity of their graph, so handles
//! from another graph or to removed entities are rejected at each call.
//!
//! # Structure
//!
//! - `Graph` - start/end sentinels, parameters, RPO traversal, constant interning
//! - `block` - edge mutation, instruction lists, phis, splitting
//! - `inst` - navigation, inputs/users, typed operand accessors, immediates
//! - `dominance` / `loops` - derived queries, recomputed on every call
//! - `try_catch` - protected-region wrapping
//! - `verify` / `pretty` / `snapshot` - invariant checks and dumps

mod arena;
pub mod block;
pub mod dominance;
pub mod graph;
pub mod ids;
pub mod inst;
pub mod loops;
pub mod opcode;
pub mod pretty;
pub mod snapshot;
pub mod try_catch;
pub mod types;
pub mod verify;

pub use block::BlockFlags;
pub use graph::Graph;
pub use ids::{BlockId, GraphId, InstId};
pub use inst::Operands;
pub use opcode::Op;
pub use pretty::PrettyPrint;
pub use snapshot::GraphSnapshot;
pub use types::{BitWidth, ConditionCode, ConstValue, Imm, IsaKind, TypeId};
pub use verify::VerifyError;
