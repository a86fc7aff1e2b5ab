//! Protected-region wrapping

use super::block::{BlockData, BlockFlags};
use super::graph::{Graph, NewInst};
use super::ids::BlockId;
use super::opcode::Op;
use super::types::TypeId;
use crate::error::{IrError, IrResult};
use rustc_hash::FxHashSet;
use tracing::debug;

impl Graph {
    /// Protect `[try_first, try_last]` with the handler `[catch_begin, catch_end]`
    ///
    /// A new try-begin block takes over the entries into `try_first` from outside the
    /// protected range and branches to `try_first` (normal) and `catch_begin`
    /// (exceptional). A new try-end block takes over the successors of `try_last` and
    /// also branches to `catch_begin`. A handler without successors falls through to
    /// the continuation of the protected range.
    pub fn insert_try_catch(
        &mut self,
        try_first: BlockId,
        try_last: BlockId,
        catch_begin: BlockId,
        catch_end: BlockId,
    ) -> IrResult<()> {
        let first = self.check_block(try_first)?;
        let last = self.check_block(try_last)?;
        let catch_first = self.check_block(catch_begin)?;
        let catch_last = self.check_block(catch_end)?;
        for block in [first, last, catch_first, catch_last] {
            if block == self.start || block == self.end {
                return Err(IrError::bad_argument(
                    "the start and end blocks cannot be part of a try/catch",
                ));
            }
        }
        let try_range = self.region(first, last).ok_or_else(|| {
            IrError::bad_argument(format!("{} is not reachable from {}", try_last, try_first))
        })?;
        let catch_range = self.region(catch_first, catch_last).ok_or_else(|| {
            IrError::bad_argument(format!(
                "{} is not reachable from {}",
                catch_end, catch_begin
            ))
        })?;

        let marker = self
            .create_inst(NewInst::new(Op::Try, TypeId::Void))?
            .as_u32();

        // try-begin: outside entries of try_first are redirected in place
        let try_begin = self.blocks.alloc(BlockData::new(BlockFlags::TRY_BEGIN));
        let entries: Vec<u32> = self.blocks[first]
            .preds
            .iter()
            .copied()
            .filter(|p| !try_range.contains(p))
            .collect();
        for &pred in &entries {
            self.replace_succ(pred, first, try_begin);
            self.unlink_pred(first, pred);
        }
        self.blocks[try_begin].preds = entries;
        self.blocks[try_begin].succs = vec![first, catch_first];
        self.blocks[first].preds.insert(0, try_begin);
        self.blocks[catch_first].preds.push(try_begin);

        self.blocks[try_begin].insts.push(marker);
        self.insts[marker].block = Some(try_begin);

        // try-end: takes over the successors of try_last
        let try_end = self.blocks.alloc(BlockData::new(BlockFlags::TRY_END));
        let exits = std::mem::take(&mut self.blocks[last].succs);
        for &succ in &exits {
            self.replace_pred(succ, last, try_end);
        }
        self.blocks[try_end].succs = exits;
        self.blocks[last].succs.push(try_end);
        self.blocks[try_end].preds.push(last);
        self.blocks[try_end].succs.push(catch_first);
        self.blocks[catch_first].preds.push(try_end);

        if self.blocks[catch_last].succs.is_empty() && self.blocks[try_end].succs.len() > 1 {
            let continuation = self.blocks[try_end].succs[0];
            self.blocks[catch_last].succs.push(continuation);
            self.blocks[continuation].preds.push(catch_last);
        }

        for &block in &try_range {
            self.blocks[block].flags |= BlockFlags::TRY;
        }
        for &block in &catch_range {
            self.blocks[block].flags |= BlockFlags::CATCH;
        }
        self.blocks[catch_first].flags |= BlockFlags::CATCH_BEGIN;

        debug!(
            graph = %self.id(),
            try_blocks = try_range.len(),
            catch_blocks = catch_range.len(),
            try_begin,
            try_end,
            "inserted try/catch"
        );
        self.check_invariants("insert_try_catch");
        Ok(())
    }

    /// Blocks on some path from `first` to `last`, or `None` when there is no such path
    fn region(&self, first: u32, last: u32) -> Option<FxHashSet<u32>> {
        let forward = self.walk(first, true);
        if !forward.contains(&last) {
            return None;
        }
        let backward = self.walk(last, false);
        Some(forward.intersection(&backward).copied().collect())
    }

    fn walk(&self, from: u32, forward: bool) -> FxHashSet<u32> {
        let mut seen = FxHashSet::default();
        let mut stack = vec![from];
        while let Some(block) = stack.pop() {
            if seen.insert(block) {
                let data = &self.blocks[block];
                let next = if forward { &data.succs } else { &data.preds };
                stack.extend(next.iter().copied());
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::File;
    use crate::ir::IsaKind;

    /// start -> t -> end, with an unattached handler h
    fn setup() -> (Graph, BlockId, BlockId) {
        let mut file = File::new(IsaKind::Dynamic);
        let f = file.add_function("f", &[], TypeId::Void);
        let mut g = file.create_graph(f).unwrap();
        let start = g.start_block();
        let end = g.end_block();
        let t = g.create_empty_block();
        let h = g.create_empty_block();
        g.disconnect_successor(start, 0).unwrap();
        g.append_successor(start, t).unwrap();
        g.append_successor(t, end).unwrap();
        (g, t, h)
    }

    #[test]
    fn test_wrapping_shape() {
        let (mut g, t, h) = setup();
        let start = g.start_block();
        let end = g.end_block();
        g.insert_try_catch(t, t, h, h).unwrap();

        let try_begin = g.successor(start, 0).unwrap();
        assert!(g.is_try_begin(try_begin).unwrap());
        assert_eq!(g.successors(try_begin).unwrap(), vec![t, h]);
        assert_eq!(g.instruction_count(try_begin).unwrap(), 1);

        let try_end = g.successor(t, 0).unwrap();
        assert!(g.is_try_end(try_end).unwrap());
        assert_eq!(g.successors(try_end).unwrap(), vec![end, h]);
        assert_eq!(g.successors(h).unwrap(), vec![end]);

        assert!(g.is_try(t).unwrap());
        assert!(g.is_catch_begin(h).unwrap());
        assert!(g.is_catch(h).unwrap());
        assert!(!g.is_try(h).unwrap());
        assert_eq!(g.predecessors(h).unwrap(), vec![try_begin, try_end]);
        g.verify().unwrap();
    }

    #[test]
    fn test_sentinels_rejected_without_change() {
        let (mut g, t, h) = setup();
        let before = g.block_count();
        let end = g.end_block();
        assert!(matches!(
            g.insert_try_catch(t, end, h, h),
            Err(IrError::BadArgument(_))
        ));
        assert_eq!(g.block_count(), before);
    }

    #[test]
    fn test_disconnected_range_rejected() {
        let (mut g, t, h) = setup();
        let before = g.block_count();
        assert!(matches!(
            g.insert_try_catch(h, t, t, t),
            Err(IrError::BadArgument(_))
        ));
        assert_eq!(g.block_count(), before);
    }

    #[test]
    fn test_foreign_block_rejected() {
        let (mut g, t, h) = setup();
        let (other, foreign, _) = setup();
        drop(other);
        assert!(matches!(
            g.insert_try_catch(t, t, foreign, h),
            Err(IrError::WrongCtx(_))
        ));
    }
}
