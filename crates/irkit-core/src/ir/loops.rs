//! Loop classification
//!
//! A loop head is the target of a back edge, an edge whose source the target
//! dominates. A prehead is the single outside entry into a loop head.

use super::dominance::DomTree;
use super::graph::Graph;
use super::ids::BlockId;
use crate::error::IrResult;

impl Graph {
    pub fn is_loop_head(&self, bb: BlockId) -> IrResult<bool> {
        let block = self.check_block(bb)?;
        let tree = DomTree::compute(self);
        Ok(self.is_head(&tree, block))
    }

    /// Whether `bb` is the only non-back-edge predecessor of a loop head it branches to
    pub fn is_loop_prehead(&self, bb: BlockId) -> IrResult<bool> {
        let block = self.check_block(bb)?;
        let tree = DomTree::compute(self);
        for &head in &self.blocks[block].succs {
            if !self.is_head(&tree, head) || tree.dominates(head, block) {
                continue;
            }
            let entries = self.blocks[head]
                .preds
                .iter()
                .filter(|&&p| !tree.dominates(head, p))
                .count();
            if entries == 1 {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn is_head(&self, tree: &DomTree, block: u32) -> bool {
        tree.is_reachable(block)
            && self.blocks[block]
                .preds
                .iter()
                .any(|&p| tree.dominates(block, p))
    }
}

#[cfg(test)]
mod tests {
    use crate::file::File;
    use crate::ir::{IsaKind, TypeId};

    #[test]
    fn test_simple_loop() {
        let mut file = File::new(IsaKind::Static);
        let f = file.add_function("f", &[], TypeId::Void);
        let mut g = file.create_graph(f).unwrap();
        let start = g.start_block();
        let end = g.end_block();

        // start -> pre -> head -> body -> head, head -> end
        let pre = g.create_empty_block();
        let head = g.create_empty_block();
        let body = g.create_empty_block();
        g.disconnect_successor(start, 0).unwrap();
        g.append_successor(start, pre).unwrap();
        g.append_successor(pre, head).unwrap();
        g.append_successor(head, body).unwrap();
        g.append_successor(head, end).unwrap();
        g.append_successor(body, head).unwrap();

        assert!(g.is_loop_head(head).unwrap());
        assert!(!g.is_loop_head(body).unwrap());
        assert!(!g.is_loop_head(pre).unwrap());
        assert!(g.is_loop_prehead(pre).unwrap());
        assert!(!g.is_loop_prehead(body).unwrap());
        assert!(!g.is_loop_prehead(start).unwrap());
    }

    #[test]
    fn test_self_loop() {
        let mut file = File::new(IsaKind::Static);
        let f = file.add_function("f", &[], TypeId::Void);
        let mut g = file.create_graph(f).unwrap();
        let start = g.start_block();
        let end = g.end_block();
        let spin = g.create_empty_block();
        g.disconnect_successor(start, 0).unwrap();
        g.append_successor(start, spin).unwrap();
        g.append_successor(spin, spin).unwrap();
        g.append_successor(spin, end).unwrap();

        assert!(g.is_loop_head(spin).unwrap());
        assert!(g.is_loop_prehead(start).unwrap());
    }
}
