//! Basic blocks: edges, instruction lists, phis and splitting
//!
//! Successor index 0 is the true (or fallthrough) edge and index 1 the false edge.
//! Every edge is recorded on both ends, once per occurrence, so a block that branches
//! to the same target twice appears twice in that target's predecessor list.

use super::graph::{Graph, NewInst};
use super::ids::{BlockId, GraphId, InstId};
use super::opcode::Op;
use super::types::{IsaKind, TypeId};
use crate::error::{IrError, IrResult};
use bitflags::bitflags;
use tracing::debug;

bitflags! {
    /// Stored classification of a block
    ///
    /// Loop head and loop prehead are derived from the current shape instead
    /// (see `is_loop_head` / `is_loop_prehead`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BlockFlags: u16 {
        const START = 1 << 0;
        const END = 1 << 1;
        const TRY_BEGIN = 1 << 2;
        const TRY = 1 << 3;
        const TRY_END = 1 << 4;
        const CATCH_BEGIN = 1 << 5;
        const CATCH = 1 << 6;
    }
}

impl BlockFlags {
    /// Flags a block created by splitting inherits
    pub(crate) fn membership(self) -> BlockFlags {
        self & (BlockFlags::TRY | BlockFlags::CATCH)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct BlockData {
    pub insts: Vec<u32>,
    pub preds: Vec<u32>,
    pub succs: Vec<u32>,
    pub flags: BlockFlags,
}

impl BlockData {
    pub fn new(flags: BlockFlags) -> Self {
        Self {
            insts: Vec::new(),
            preds: Vec::new(),
            succs: Vec::new(),
            flags,
        }
    }
}

impl Graph {
    // ========================================================================
    // Edges
    // ========================================================================

    /// Insert `succ` at successor position `index`, shifting later successors
    pub fn insert_successor(&mut self, bb: BlockId, succ: BlockId, index: usize) -> IrResult<()> {
        let (from, to) = self.check_edge(bb, succ)?;
        let count = self.blocks[from].succs.len();
        if index > count {
            return Err(IrError::bad_argument(format!(
                "successor index {} out of range ({} successors)",
                index, count
            )));
        }
        self.blocks[from].succs.insert(index, to);
        self.blocks[to].preds.push(from);
        self.check_invariants("insert_successor");
        Ok(())
    }

    pub fn append_successor(&mut self, bb: BlockId, succ: BlockId) -> IrResult<()> {
        let (from, to) = self.check_edge(bb, succ)?;
        self.blocks[from].succs.push(to);
        self.blocks[to].preds.push(from);
        self.check_invariants("append_successor");
        Ok(())
    }

    /// Remove the successor edge at `index`, shifting later successors
    pub fn disconnect_successor(&mut self, bb: BlockId, index: usize) -> IrResult<()> {
        let from = self.check_block(bb)?;
        let count = self.blocks[from].succs.len();
        if index >= count {
            return Err(IrError::bad_argument(format!(
                "successor index {} out of range ({} successors)",
                index, count
            )));
        }
        let to = self.blocks[from].succs.remove(index);
        self.unlink_pred(to, from);
        self.check_invariants("disconnect_successor");
        Ok(())
    }

    fn check_edge(&self, bb: BlockId, succ: BlockId) -> IrResult<(u32, u32)> {
        let from = self.check_block(bb)?;
        let to = self.check_block(succ)?;
        if from == self.end {
            return Err(IrError::bad_argument("the end block cannot have successors"));
        }
        if to == self.start {
            return Err(IrError::bad_argument("the start block cannot be a successor"));
        }
        Ok((from, to))
    }

    /// Drop one occurrence of `pred` from the predecessor list of `block`
    pub(crate) fn unlink_pred(&mut self, block: u32, pred: u32) {
        let preds = &mut self.blocks[block].preds;
        if let Some(pos) = preds.iter().position(|&p| p == pred) {
            preds.remove(pos);
        }
    }

    /// Rewrite the first `old` entry of `block`'s predecessor list to `new`, keeping its position
    pub(crate) fn replace_pred(&mut self, block: u32, old: u32, new: u32) {
        if let Some(slot) = self.blocks[block].preds.iter_mut().find(|p| **p == old) {
            *slot = new;
        }
    }

    /// Rewrite the first `old` entry of `block`'s successor list to `new`, keeping its position
    pub(crate) fn replace_succ(&mut self, block: u32, old: u32, new: u32) {
        if let Some(slot) = self.blocks[block].succs.iter_mut().find(|s| **s == old) {
            *slot = new;
        }
    }

    pub fn predecessor_count(&self, bb: BlockId) -> IrResult<usize> {
        Ok(self.blocks[self.check_block(bb)?].preds.len())
    }

    pub fn successor_count(&self, bb: BlockId) -> IrResult<usize> {
        Ok(self.blocks[self.check_block(bb)?].succs.len())
    }

    pub fn predecessor(&self, bb: BlockId, index: usize) -> IrResult<BlockId> {
        let block = self.check_block(bb)?;
        self.blocks[block]
            .preds
            .get(index)
            .map(|&p| self.block_handle(p))
            .ok_or_else(|| {
                IrError::bad_argument(format!("{} has no predecessor {}", bb, index))
            })
    }

    pub fn successor(&self, bb: BlockId, index: usize) -> IrResult<BlockId> {
        let block = self.check_block(bb)?;
        self.blocks[block]
            .succs
            .get(index)
            .map(|&s| self.block_handle(s))
            .ok_or_else(|| IrError::bad_argument(format!("{} has no successor {}", bb, index)))
    }

    pub fn predecessors(&self, bb: BlockId) -> IrResult<Vec<BlockId>> {
        let block = self.check_block(bb)?;
        Ok(self.blocks[block]
            .preds
            .iter()
            .map(|&p| self.block_handle(p))
            .collect())
    }

    pub fn successors(&self, bb: BlockId) -> IrResult<Vec<BlockId>> {
        let block = self.check_block(bb)?;
        Ok(self.blocks[block]
            .succs
            .iter()
            .map(|&s| self.block_handle(s))
            .collect())
    }

    /// Visit predecessors in order; returns `false` if the callback stopped early
    pub fn visit_predecessors<F>(&self, bb: BlockId, mut visit: F) -> IrResult<bool>
    where
        F: FnMut(BlockId) -> bool,
    {
        let block = self.check_block(bb)?;
        for &p in &self.blocks[block].preds {
            if !visit(self.block_handle(p)) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Visit successors in order; returns `false` if the callback stopped early
    pub fn visit_successors<F>(&self, bb: BlockId, mut visit: F) -> IrResult<bool>
    where
        F: FnMut(BlockId) -> bool,
    {
        let block = self.check_block(bb)?;
        for &s in &self.blocks[block].succs {
            if !visit(self.block_handle(s)) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn true_branch(&self, bb: BlockId) -> IrResult<BlockId> {
        self.successor(bb, 0)
    }

    pub fn false_branch(&self, bb: BlockId) -> IrResult<BlockId> {
        self.successor(bb, 1)
    }

    // ========================================================================
    // Instructions
    // ========================================================================

    pub fn add_instruction_front(&mut self, bb: BlockId, inst: InstId) -> IrResult<()> {
        let (block, index) = self.check_insertable(bb, inst)?;
        self.blocks[block].insts.insert(0, index);
        self.insts[index].block = Some(block);
        self.check_invariants("add_instruction_front");
        Ok(())
    }

    pub fn add_instruction_back(&mut self, bb: BlockId, inst: InstId) -> IrResult<()> {
        let (block, index) = self.check_insertable(bb, inst)?;
        self.blocks[block].insts.push(index);
        self.insts[index].block = Some(block);
        self.check_invariants("add_instruction_back");
        Ok(())
    }

    fn check_insertable(&self, bb: BlockId, inst: InstId) -> IrResult<(u32, u32)> {
        let block = self.check_block(bb)?;
        let index = self.check_inst(inst)?;
        let data = &self.insts[index];
        if data.op.is_constant() {
            return Err(IrError::bad_argument("constants cannot be repositioned"));
        }
        if data.block.is_some() {
            return Err(IrError::bad_argument(format!(
                "{} is already linked into a block",
                inst
            )));
        }
        Ok((block, index))
    }

    /// Unlink and discard every instruction of `bb`
    ///
    /// Fails without change when the block holds parameters or when one of its
    /// instructions is used outside the block.
    pub fn remove_all_instructions(&mut self, bb: BlockId) -> IrResult<()> {
        let block = self.check_block(bb)?;
        let insts = self.blocks[block].insts.clone();
        for &i in &insts {
            let data = &self.insts[i];
            if data.op.is_parameter() {
                return Err(IrError::bad_argument(format!(
                    "{} holds parameter instructions",
                    bb
                )));
            }
            let outside = data
                .users
                .iter()
                .any(|&u| self.insts[u].block != Some(block));
            if outside {
                return Err(IrError::bad_argument(format!(
                    "{} is used outside {}",
                    self.inst_handle(i),
                    bb
                )));
            }
        }

        for &i in &insts {
            self.drop_inputs(i);
        }
        for &i in &insts {
            self.insts.remove(i);
        }
        self.blocks[block].insts.clear();
        self.check_invariants("remove_all_instructions");
        Ok(())
    }

    pub fn first_instruction(&self, bb: BlockId) -> IrResult<Option<InstId>> {
        let block = self.check_block(bb)?;
        Ok(self.blocks[block]
            .insts
            .first()
            .map(|&i| self.inst_handle(i)))
    }

    pub fn last_instruction(&self, bb: BlockId) -> IrResult<Option<InstId>> {
        let block = self.check_block(bb)?;
        Ok(self.blocks[block]
            .insts
            .last()
            .map(|&i| self.inst_handle(i)))
    }

    pub fn instruction_count(&self, bb: BlockId) -> IrResult<usize> {
        Ok(self.blocks[self.check_block(bb)?].insts.len())
    }

    pub fn instructions(&self, bb: BlockId) -> IrResult<Vec<InstId>> {
        let block = self.check_block(bb)?;
        Ok(self.blocks[block]
            .insts
            .iter()
            .map(|&i| self.inst_handle(i))
            .collect())
    }

    /// Visit instructions in order; returns `false` if the callback stopped early
    pub fn visit_instructions<F>(&self, bb: BlockId, mut visit: F) -> IrResult<bool>
    where
        F: FnMut(InstId) -> bool,
    {
        let block = self.check_block(bb)?;
        for &i in &self.blocks[block].insts {
            if !visit(self.inst_handle(i)) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn is_empty(&self, bb: BlockId) -> IrResult<bool> {
        Ok(self.instruction_count(bb)? == 0)
    }

    // ========================================================================
    // Splitting
    // ========================================================================

    /// Move every instruction after `inst` into a new block that takes over all successors
    ///
    /// With `make_edge`, `bb -> new` becomes the only successor of `bb`; otherwise `bb`
    /// is left without successors.
    pub fn split_block_after(
        &mut self,
        bb: BlockId,
        inst: InstId,
        make_edge: bool,
    ) -> IrResult<BlockId> {
        let block = self.check_block(bb)?;
        let index = self.check_inst(inst)?;
        if block == self.start || block == self.end {
            return Err(IrError::bad_argument(
                "the start and end blocks cannot be split",
            ));
        }
        let pos = self.blocks[block]
            .insts
            .iter()
            .position(|&i| i == index)
            .ok_or_else(|| IrError::bad_argument(format!("{} is not linked in {}", inst, bb)))?;

        let flags = self.blocks[block].flags.membership();
        let new = self.blocks.alloc(BlockData::new(flags));

        let moved = self.blocks[block].insts.split_off(pos + 1);
        for &i in &moved {
            self.insts[i].block = Some(new);
        }
        self.blocks[new].insts = moved;

        let succs = std::mem::take(&mut self.blocks[block].succs);
        for &s in &succs {
            self.replace_pred(s, block, new);
        }
        self.blocks[new].succs = succs;

        if make_edge {
            self.blocks[block].succs.push(new);
            self.blocks[new].preds.push(block);
        }

        debug!(
            graph = %self.id(),
            block = %bb,
            new_block = new,
            moved = self.blocks[new].insts.len(),
            "split block"
        );
        self.check_invariants("split_block_after");
        Ok(self.block_handle(new))
    }

    // ========================================================================
    // Classification
    // ========================================================================

    /// Graph owning a live block
    pub fn block_graph(&self, bb: BlockId) -> IrResult<GraphId> {
        self.check_block(bb)?;
        Ok(self.id())
    }

    pub fn block_flags(&self, bb: BlockId) -> IrResult<BlockFlags> {
        Ok(self.blocks[self.check_block(bb)?].flags)
    }

    pub fn is_start(&self, bb: BlockId) -> IrResult<bool> {
        self.has_flag(bb, BlockFlags::START)
    }

    pub fn is_end(&self, bb: BlockId) -> IrResult<bool> {
        self.has_flag(bb, BlockFlags::END)
    }

    pub fn is_try_begin(&self, bb: BlockId) -> IrResult<bool> {
        self.has_flag(bb, BlockFlags::TRY_BEGIN)
    }

    pub fn is_try(&self, bb: BlockId) -> IrResult<bool> {
        self.has_flag(bb, BlockFlags::TRY)
    }

    pub fn is_try_end(&self, bb: BlockId) -> IrResult<bool> {
        self.has_flag(bb, BlockFlags::TRY_END)
    }

    pub fn is_catch_begin(&self, bb: BlockId) -> IrResult<bool> {
        self.has_flag(bb, BlockFlags::CATCH_BEGIN)
    }

    pub fn is_catch(&self, bb: BlockId) -> IrResult<bool> {
        self.has_flag(bb, BlockFlags::CATCH)
    }

    fn has_flag(&self, bb: BlockId, flag: BlockFlags) -> IrResult<bool> {
        Ok(self.blocks[self.check_block(bb)?].flags.contains(flag))
    }

    // ========================================================================
    // Phis
    // ========================================================================

    /// Create a phi over `inputs`, placed after the leading phis of `bb`
    ///
    /// The number of inputs is not checked against the predecessor count.
    pub fn create_phi(&mut self, bb: BlockId, inputs: &[InstId]) -> IrResult<InstId> {
        let block = self.check_block(bb)?;
        if inputs.is_empty() {
            return Err(IrError::bad_argument("phi needs at least one input"));
        }
        let mut ty = TypeId::Any;
        for &input in inputs {
            let index = self.check_inst(input)?;
            let input_ty = self.insts[index].ty;
            if !ty.is_compatible(input_ty) {
                return Err(IrError::bad_argument(format!(
                    "phi input {} has type {}, expected {}",
                    input, input_ty, ty
                )));
            }
            if ty == TypeId::Any {
                ty = input_ty;
            }
        }

        let phi = self.create_inst(NewInst::new(Op::Phi, ty).inputs(inputs))?;
        let index = phi.as_u32();
        let pos = self.blocks[block]
            .insts
            .iter()
            .take_while(|&&i| self.insts[i].op == Op::Phi)
            .count();
        self.blocks[block].insts.insert(pos, index);
        self.insts[index].block = Some(block);
        self.check_invariants("create_phi");
        Ok(phi)
    }

    /// Create a catch-phi at the very front of `catch_begin`
    ///
    /// Zero inputs denote the thrown value itself.
    pub fn create_catch_phi(&mut self, catch_begin: BlockId, inputs: &[InstId]) -> IrResult<InstId> {
        let block = self.check_block(catch_begin)?;
        if self.isa() != IsaKind::Dynamic {
            return Err(IrError::wrong_mode(
                "catch-phi is only available for dynamic graphs",
            ));
        }
        for &input in inputs {
            self.check_inst(input)?;
        }

        let phi = self.create_inst(NewInst::new(Op::CatchPhi, TypeId::Any).inputs(inputs))?;
        let index = phi.as_u32();
        self.blocks[block].insts.insert(0, index);
        self.insts[index].block = Some(block);
        self.check_invariants("create_catch_phi");
        Ok(phi)
    }
}
