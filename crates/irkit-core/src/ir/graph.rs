//! Graph: the block and instruction arenas of one function body

use super::arena::Arena;
use super::block::{BlockData, BlockFlags};
use super::ids::{BlockId, GraphId, InstId};
use super::inst::{InstData, Operands};
use super::opcode::Op;
use super::types::{ConditionCode, ConstValue, Imm, IsaKind, TypeId};
use crate::config::GraphOptions;
use crate::error::{IrError, IrResult};
use crate::file::{FileId, Function};
use rustc_hash::FxHashSet;
use tracing::warn;

/// Control-flow graph of one function body
///
/// The graph owns its blocks and instructions. Handles (`BlockId`, `InstId`) are only
/// names; every operation checks that a handle belongs to this graph and is live.
#[derive(Debug)]
pub struct Graph {
    id: GraphId,
    file: FileId,
    function: Function,
    isa: IsaKind,
    pub(crate) blocks: Arena<BlockData>,
    pub(crate) insts: Arena<InstData>,
    pub(crate) start: u32,
    pub(crate) end: u32,
    pub(crate) params: Vec<u32>,
    options: GraphOptions,
}

/// Description of an instruction to allocate
pub(crate) struct NewInst {
    pub op: Op,
    pub ty: TypeId,
    pub inputs: Vec<InstId>,
    pub imms: Vec<Imm>,
    pub operands: Operands,
    pub cc: Option<ConditionCode>,
}

impl NewInst {
    pub fn new(op: Op, ty: TypeId) -> Self {
        Self {
            op,
            ty,
            inputs: Vec::new(),
            imms: Vec::new(),
            operands: Operands::default(),
            cc: None,
        }
    }

    pub fn inputs(mut self, inputs: &[InstId]) -> Self {
        self.inputs.extend_from_slice(inputs);
        self
    }

    pub fn imm(mut self, imm: Imm) -> Self {
        self.imms.push(imm);
        self
    }

    pub fn operands(mut self, operands: Operands) -> Self {
        self.operands = operands;
        self
    }

    pub fn cc(mut self, cc: ConditionCode) -> Self {
        self.cc = Some(cc);
        self
    }
}

impl Graph {
    /// Initial body: start block with one parameter per declared type, edge start -> end
    pub(crate) fn new_body(
        file: FileId,
        function: Function,
        isa: IsaKind,
        params: &[TypeId],
        options: GraphOptions,
    ) -> Self {
        let mut blocks = Arena::new();
        let start = blocks.alloc(BlockData::new(BlockFlags::START));
        let end = blocks.alloc(BlockData::new(BlockFlags::END));

        let mut insts = Arena::new();
        let mut param_ids = Vec::with_capacity(params.len());
        for (i, &ty) in params.iter().enumerate() {
            let mut data = InstData::new(Op::Parameter(i as u32), ty);
            data.block = Some(start);
            let index = insts.alloc(data);
            blocks[start].insts.push(index);
            param_ids.push(index);
        }

        blocks[start].succs.push(end);
        blocks[end].preds.push(start);

        Self {
            id: GraphId::fresh(),
            file,
            function,
            isa,
            blocks,
            insts,
            start,
            end,
            params: param_ids,
            options,
        }
    }

    /// Copy of this graph under a new identity
    pub(crate) fn fork(&self) -> Self {
        Self {
            id: GraphId::fresh(),
            file: self.file,
            function: self.function,
            isa: self.isa,
            blocks: self.blocks.clone(),
            insts: self.insts.clone(),
            start: self.start,
            end: self.end,
            params: self.params.clone(),
            options: self.options,
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn isa(&self) -> IsaKind {
        self.isa
    }

    /// File the graph was created from
    pub fn file(&self) -> FileId {
        self.file
    }

    /// Function the graph was created for
    pub fn function(&self) -> Function {
        self.function
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    pub fn start_block(&self) -> BlockId {
        self.block_handle(self.start)
    }

    pub fn end_block(&self) -> BlockId {
        self.block_handle(self.end)
    }

    /// Number of live blocks
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn block_by_id(&self, id: u32) -> IrResult<BlockId> {
        if self.blocks.contains(id) {
            Ok(self.block_handle(id))
        } else {
            Err(IrError::bad_argument(format!("no block with id {}", id)))
        }
    }

    /// Live blocks in id order
    pub fn blocks(&self) -> Vec<BlockId> {
        self.blocks
            .iter()
            .map(|(index, _)| self.block_handle(index))
            .collect()
    }

    pub fn parameter_count(&self) -> usize {
        self.params.len()
    }

    pub fn parameter(&self, index: usize) -> IrResult<InstId> {
        self.params
            .get(index)
            .map(|&i| self.inst_handle(i))
            .ok_or_else(|| {
                IrError::bad_argument(format!(
                    "parameter index {} out of range ({} parameters)",
                    index,
                    self.params.len()
                ))
            })
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Reachable blocks in reverse postorder from start
    pub fn rpo(&self) -> Vec<BlockId> {
        self.rpo_indices()
            .into_iter()
            .map(|i| self.block_handle(i))
            .collect()
    }

    /// Visit reachable blocks in reverse postorder; returns `false` if the callback stopped early
    pub fn visit_blocks_rpo<F>(&self, mut visit: F) -> bool
    where
        F: FnMut(BlockId) -> bool,
    {
        for index in self.rpo_indices() {
            if !visit(self.block_handle(index)) {
                return false;
            }
        }
        true
    }

    pub(crate) fn rpo_indices(&self) -> Vec<u32> {
        let mut order = Vec::new();
        let mut seen = FxHashSet::default();
        let mut stack = vec![(self.start, false)];

        while let Some((block, expanded)) = stack.pop() {
            if expanded {
                order.push(block);
                continue;
            }
            if !seen.insert(block) {
                continue;
            }
            stack.push((block, true));
            for &succ in self.blocks[block].succs.iter().rev() {
                if !seen.contains(&succ) {
                    stack.push((succ, false));
                }
            }
        }

        order.reverse();
        order
    }

    /// Indices of blocks reachable from start
    pub(crate) fn reachable(&self) -> FxHashSet<u32> {
        let mut seen = FxHashSet::default();
        let mut stack = vec![self.start];
        while let Some(block) = stack.pop() {
            if seen.insert(block) {
                stack.extend(self.blocks[block].succs.iter().copied());
            }
        }
        seen
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Create a block with no instructions and no edges
    pub fn create_empty_block(&mut self) -> BlockId {
        let index = self.blocks.alloc(BlockData::new(BlockFlags::empty()));
        self.block_handle(index)
    }

    pub fn find_or_create_constant_i32(&mut self, value: i32) -> InstId {
        self.find_or_create_constant(ConstValue::I32(value))
    }

    pub fn find_or_create_constant_i64(&mut self, value: i64) -> InstId {
        self.find_or_create_constant(ConstValue::I64(value))
    }

    pub fn find_or_create_constant_u64(&mut self, value: u64) -> InstId {
        self.find_or_create_constant(ConstValue::U64(value))
    }

    pub fn find_or_create_constant_f64(&mut self, value: f64) -> InstId {
        self.find_or_create_constant(ConstValue::F64(value))
    }

    /// Canonical constant of `value`, appended to the start block on first use
    pub fn find_or_create_constant(&mut self, value: ConstValue) -> InstId {
        let existing = self.blocks[self.start]
            .insts
            .iter()
            .copied()
            .find(|&i| self.insts[i].op == Op::Constant(value));
        if let Some(index) = existing {
            return self.inst_handle(index);
        }

        let mut data = InstData::new(Op::Constant(value), value.type_id());
        data.block = Some(self.start);
        let index = self.insts.alloc(data);
        self.blocks[self.start].insts.push(index);
        self.inst_handle(index)
    }

    /// Allocate an unlinked instruction after validating every operand
    pub(crate) fn create_inst(&mut self, new: NewInst) -> IrResult<InstId> {
        let mut inputs = Vec::with_capacity(new.inputs.len());
        for &input in &new.inputs {
            inputs.push(self.check_inst(input)?);
        }
        for imm in &new.imms {
            if !imm.width.fits(imm.value) {
                return Err(IrError::bad_argument(format!(
                    "immediate {} does not fit in {} bits",
                    imm.value,
                    imm.width.bits()
                )));
            }
        }
        self.check_operands(&new.operands)?;

        let mut data = InstData::new(new.op, new.ty);
        data.inputs = inputs.clone();
        data.imms = new.imms;
        data.operands = new.operands;
        data.cc = new.cc;
        let index = self.insts.alloc(data);
        for input in inputs {
            self.insts[input].users.push(index);
        }
        Ok(self.inst_handle(index))
    }

    // ========================================================================
    // Handle checks
    // ========================================================================

    pub(crate) fn block_handle(&self, index: u32) -> BlockId {
        BlockId::from_raw(self.id, index)
    }

    pub(crate) fn inst_handle(&self, index: u32) -> InstId {
        InstId::from_raw(self.id, index)
    }

    pub(crate) fn check_block(&self, bb: BlockId) -> IrResult<u32> {
        if bb.graph() != self.id {
            return Err(IrError::wrong_ctx(format!(
                "{} belongs to {}, not {}",
                bb,
                bb.graph(),
                self.id
            )));
        }
        if !self.blocks.contains(bb.as_u32()) {
            return Err(IrError::bad_argument(format!("{} is not a live block", bb)));
        }
        Ok(bb.as_u32())
    }

    pub(crate) fn check_inst(&self, inst: InstId) -> IrResult<u32> {
        if inst.graph() != self.id {
            return Err(IrError::wrong_ctx(format!(
                "{} belongs to {}, not {}",
                inst,
                inst.graph(),
                self.id
            )));
        }
        if !self.insts.contains(inst.as_u32()) {
            return Err(IrError::bad_argument(format!(
                "{} is not a live instruction",
                inst
            )));
        }
        Ok(inst.as_u32())
    }

    pub(crate) fn check_file(&self, owner: FileId, what: &str) -> IrResult<()> {
        if owner != self.file {
            return Err(IrError::wrong_ctx(format!(
                "{} belongs to another file",
                what
            )));
        }
        Ok(())
    }

    fn check_operands(&self, operands: &Operands) -> IrResult<()> {
        if let Some(f) = operands.function {
            self.check_file(f.file(), "function")?;
        }
        if let Some(c) = operands.class {
            self.check_file(c.file(), "class")?;
        }
        if let Some(f) = operands.field {
            self.check_file(f.file(), "field")?;
        }
        if let Some(s) = operands.string {
            self.check_file(s.file(), "string")?;
        }
        if let Some(a) = operands.literal_array {
            self.check_file(a.file(), "literal array")?;
        }
        Ok(())
    }

    /// Run the verifier when invariant checking is enabled
    pub(crate) fn check_invariants(&self, operation: &str) {
        if !self.options.check_invariants {
            return;
        }
        if let Err(e) = self.verify() {
            warn!(graph = %self.id, operation, error = %e, "graph invariants violated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::File;

    fn graph_with_params(params: &[TypeId]) -> Graph {
        let mut file = File::new(IsaKind::Static);
        let f = file.add_function("f", params, TypeId::Void);
        file.create_graph(f).unwrap()
    }

    #[test]
    fn test_initial_shape() {
        let graph = graph_with_params(&[TypeId::I32, TypeId::F64]);
        assert_eq!(graph.block_count(), 2);
        assert_eq!(graph.parameter_count(), 2);
        assert_eq!(graph.successors(graph.start_block()).unwrap(), vec![graph.end_block()]);
        assert_eq!(graph.result_type(graph.parameter(1).unwrap()).unwrap(), TypeId::F64);
        assert!(graph.parameter(2).is_err());
    }

    #[test]
    fn test_block_by_id() {
        let mut graph = graph_with_params(&[]);
        let bb = graph.create_empty_block();
        assert_eq!(graph.block_by_id(bb.as_u32()).unwrap(), bb);
        assert!(matches!(graph.block_by_id(99), Err(IrError::BadArgument(_))));
    }

    #[test]
    fn test_constants_are_canonical() {
        let mut graph = graph_with_params(&[]);
        let a = graph.find_or_create_constant_i32(5);
        let b = graph.find_or_create_constant_i32(5);
        let c = graph.find_or_create_constant_i64(5);
        let d = graph.find_or_create_constant_f64(-0.0);
        let e = graph.find_or_create_constant_f64(0.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(d, e);
        assert_eq!(graph.inst_block(a).unwrap(), Some(graph.start_block()));
        assert_eq!(graph.instruction_count(graph.start_block()).unwrap(), 4);
    }

    #[test]
    fn test_rpo_order() {
        let mut graph = graph_with_params(&[]);
        let start = graph.start_block();
        let end = graph.end_block();
        let a = graph.create_empty_block();
        let b = graph.create_empty_block();
        graph.disconnect_successor(start, 0).unwrap();
        graph.append_successor(start, a).unwrap();
        graph.append_successor(a, b).unwrap();
        graph.append_successor(a, end).unwrap();
        graph.append_successor(b, end).unwrap();

        assert_eq!(graph.rpo(), vec![start, a, b, end]);

        let mut seen = Vec::new();
        let completed = graph.visit_blocks_rpo(|bb| {
            seen.push(bb);
            seen.len() < 2
        });
        assert!(!completed);
        assert_eq!(seen, vec![start, a]);
    }

    #[test]
    fn test_foreign_handles() {
        let g1 = graph_with_params(&[TypeId::I32]);
        let g2 = graph_with_params(&[TypeId::I32]);
        let p = g1.parameter(0).unwrap();
        assert!(matches!(g2.check_inst(p), Err(IrError::WrongCtx(_))));
        assert!(matches!(
            g2.check_block(g1.start_block()),
            Err(IrError::WrongCtx(_))
        ));
    }
}
