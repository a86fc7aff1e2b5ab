//! Unreachable Block Elimination
//!
//! Removes blocks that cannot be reached from the start block, together with their
//! instructions and edges.

use crate::ir::Graph;
use crate::ir::Op;
use rustc_hash::FxHashSet;
use tracing::debug;

/// Unreachable block eliminator
///
/// The end block is kept even when unreachable, so the graph keeps its sentinels.
pub struct UnreachableBlockEliminator;

impl UnreachableBlockEliminator {
    /// Create a new pass
    pub fn new() -> Self {
        Self
    }

    /// Remove unreachable blocks; returns the number of blocks removed
    pub fn eliminate(&self, graph: &mut Graph) -> usize {
        let reachable = graph.reachable();
        let dead: Vec<u32> = graph
            .blocks
            .iter()
            .map(|(index, _)| index)
            .filter(|index| !reachable.contains(index) && *index != graph.end)
            .collect();
        if dead.is_empty() {
            return 0;
        }
        let dead_blocks: FxHashSet<u32> = dead.iter().copied().collect();

        self.detach_edges(graph, &dead_blocks);

        let dead_insts: FxHashSet<u32> = dead
            .iter()
            .flat_map(|&b| graph.blocks[b].insts.iter().copied())
            .collect();
        let removed_insts = dead_insts.len();
        self.drop_dangling_uses(graph, &dead_insts);

        for &inst in &dead_insts {
            graph.drop_inputs(inst);
        }
        for &inst in &dead_insts {
            graph.insts.remove(inst);
        }
        for &block in &dead {
            graph.blocks.remove(block);
        }

        debug!(
            graph = %graph.id(),
            blocks = dead.len(),
            instructions = removed_insts,
            "removed unreachable blocks"
        );
        graph.check_invariants("remove_unreachable_blocks");
        dead.len()
    }

    /// Remove predecessor entries from dead blocks, with the matching phi inputs
    fn detach_edges(&self, graph: &mut Graph, dead: &FxHashSet<u32>) {
        let live: Vec<u32> = graph
            .blocks
            .iter()
            .map(|(index, _)| index)
            .filter(|index| !dead.contains(index))
            .collect();

        for block in live {
            let preds = graph.blocks[block].preds.clone();
            let phis: Vec<u32> = graph.blocks[block]
                .insts
                .iter()
                .copied()
                .filter(|&i| graph.insts[i].op == Op::Phi && graph.insts[i].inputs.len() == preds.len())
                .collect();

            for pos in (0..preds.len()).rev() {
                if !dead.contains(&preds[pos]) {
                    continue;
                }
                graph.blocks[block].preds.remove(pos);
                for &phi in &phis {
                    let input = graph.insts[phi].inputs.remove(pos);
                    remove_user(graph, input, phi);
                }
            }
        }
    }

    /// Live instructions lose every input defined in a dead block
    fn drop_dangling_uses(&self, graph: &mut Graph, dead: &FxHashSet<u32>) {
        let users: Vec<u32> = graph
            .insts
            .iter()
            .filter(|(index, data)| {
                !dead.contains(index) && data.inputs.iter().any(|i| dead.contains(i))
            })
            .map(|(index, _)| index)
            .collect();

        for user in users {
            let inputs = std::mem::take(&mut graph.insts[user].inputs);
            let (gone, kept): (Vec<u32>, Vec<u32>) =
                inputs.into_iter().partition(|i| dead.contains(i));
            for input in gone {
                remove_user(graph, input, user);
            }
            graph.insts[user].inputs = kept;
        }
    }
}

fn remove_user(graph: &mut Graph, input: u32, user: u32) {
    if let Some(data) = graph.insts.get_mut(input) {
        if let Some(pos) = data.users.iter().position(|&u| u == user) {
            data.users.remove(pos);
        }
    }
}
