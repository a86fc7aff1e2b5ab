//! Graph transformation passes

mod unreachable;

pub use unreachable::UnreachableBlockEliminator;

use crate::ir::Graph;

impl Graph {
    /// Delete every block not reachable from start; returns the number removed
    ///
    /// Idempotent. Live instructions that used an instruction of a removed block lose
    /// that input, and phis lose the inputs of removed predecessors.
    pub fn remove_unreachable_blocks(&mut self) -> usize {
        UnreachableBlockEliminator::new().eliminate(self)
    }
}
