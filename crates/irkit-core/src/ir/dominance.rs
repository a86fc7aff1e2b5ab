//! Dominance queries
//!
//! Dominators are computed with the iterative algorithm of Cooper, Harvey and Kennedy
//! over the reverse postorder of the current graph. Nothing is cached: every query
//! recomputes the tree, so answers always reflect the current shape.

use super::graph::Graph;
use super::ids::{BlockId, InstId};
use crate::error::{IrError, IrResult};

/// Immediate-dominator tree of the blocks reachable from start
#[derive(Debug, Clone)]
pub(crate) struct DomTree {
    root: u32,
    rpo: Vec<u32>,
    order: Vec<Option<usize>>,
    idom: Vec<Option<u32>>,
}

impl DomTree {
    pub(crate) fn compute(graph: &Graph) -> Self {
        let root = graph.start;
        let rpo = graph.rpo_indices();
        let slots = graph.blocks.capacity();

        let mut order = vec![None; slots];
        for (position, &block) in rpo.iter().enumerate() {
            order[block as usize] = Some(position);
        }

        let mut idom: Vec<Option<u32>> = vec![None; slots];
        idom[root as usize] = Some(root);

        let mut changed = true;
        while changed {
            changed = false;
            for &block in rpo.iter().skip(1) {
                let mut new_idom = None;
                for &pred in &graph.blocks[block].preds {
                    if idom[pred as usize].is_none() {
                        continue;
                    }
                    new_idom = Some(match new_idom {
                        None => pred,
                        Some(current) => intersect(pred, current, &idom, &order),
                    });
                }
                if let Some(new_idom) = new_idom {
                    if idom[block as usize] != Some(new_idom) {
                        idom[block as usize] = Some(new_idom);
                        changed = true;
                    }
                }
            }
        }

        Self {
            root,
            rpo,
            order,
            idom,
        }
    }

    pub(crate) fn is_reachable(&self, block: u32) -> bool {
        self.order.get(block as usize).copied().flatten().is_some()
    }

    /// Immediate dominator; `None` for the root and unreachable blocks
    pub(crate) fn idom(&self, block: u32) -> Option<u32> {
        if block == self.root {
            return None;
        }
        self.idom.get(block as usize).copied().flatten()
    }

    /// Reflexive dominance
    pub(crate) fn dominates(&self, dom: u32, block: u32) -> bool {
        if dom == block {
            return true;
        }
        if !self.is_reachable(block) || !self.is_reachable(dom) {
            return false;
        }
        let mut current = block;
        while let Some(parent) = self.idom(current) {
            if parent == dom {
                return true;
            }
            current = parent;
        }
        false
    }

    /// Blocks whose immediate dominator is `block`, in id order
    pub(crate) fn children(&self, block: u32) -> Vec<u32> {
        let mut children: Vec<u32> = self
            .rpo
            .iter()
            .copied()
            .filter(|&b| b != self.root && self.idom(b) == Some(block))
            .collect();
        children.sort_unstable();
        children
    }
}

fn intersect(mut lhs: u32, mut rhs: u32, idom: &[Option<u32>], order: &[Option<usize>]) -> u32 {
    let position = |b: u32| order[b as usize].unwrap_or(usize::MAX);
    while lhs != rhs {
        while position(lhs) > position(rhs) {
            match idom[lhs as usize] {
                Some(parent) => lhs = parent,
                None => return rhs,
            }
        }
        while position(rhs) > position(lhs) {
            match idom[rhs as usize] {
                Some(parent) => rhs = parent,
                None => return lhs,
            }
        }
    }
    lhs
}

impl Graph {
    /// Immediate dominator of `bb`; `None` for start and unreachable blocks
    pub fn immediate_dominator(&self, bb: BlockId) -> IrResult<Option<BlockId>> {
        let block = self.check_block(bb)?;
        let tree = DomTree::compute(self);
        Ok(tree.idom(block).map(|b| self.block_handle(b)))
    }

    /// Whether every path from start to `bb` passes through `dom`; reflexive
    pub fn block_dominates(&self, dom: BlockId, bb: BlockId) -> IrResult<bool> {
        let d = self.check_block(dom)?;
        let b = self.check_block(bb)?;
        Ok(DomTree::compute(self).dominates(d, b))
    }

    /// Visit the blocks immediately dominated by `bb`; returns `false` if the callback stopped early
    pub fn visit_dominated<F>(&self, bb: BlockId, mut visit: F) -> IrResult<bool>
    where
        F: FnMut(BlockId) -> bool,
    {
        for child in self.dominated_blocks(bb)? {
            if !visit(child) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn dominated_blocks(&self, bb: BlockId) -> IrResult<Vec<BlockId>> {
        let block = self.check_block(bb)?;
        Ok(DomTree::compute(self)
            .children(block)
            .into_iter()
            .map(|b| self.block_handle(b))
            .collect())
    }

    /// Instruction dominance; within one block the earlier instruction dominates
    pub fn inst_dominates(&self, dom: InstId, inst: InstId) -> IrResult<bool> {
        let d = self.check_inst(dom)?;
        let i = self.check_inst(inst)?;
        let (Some(d_block), Some(i_block)) = (self.insts[d].block, self.insts[i].block) else {
            return Err(IrError::bad_argument(
                "dominance needs instructions linked into blocks",
            ));
        };
        if d_block == i_block {
            return Ok(self.position_in(d_block, d)? <= self.position_in(i_block, i)?);
        }
        Ok(DomTree::compute(self).dominates(d_block, i_block))
    }
}
