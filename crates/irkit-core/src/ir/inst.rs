//! Instructions: placement, inputs and users, typed operands, immediates

use super::graph::Graph;
use super::ids::{BlockId, InstId};
use super::opcode::Op;
use super::types::{BitWidth, ConditionCode, ConstValue, Imm, TypeId};
use crate::error::{IrError, IrResult};
use crate::file::{Class, Field, Function, LiteralArray, StringRef};
use serde::Serialize;

/// Non-instruction operands
///
/// An instruction has an operand kind exactly when the slot is `Some`; the slot is
/// decided at construction and only its value can change afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Operands {
    pub function: Option<Function>,
    pub string: Option<StringRef>,
    pub literal_array: Option<LiteralArray>,
    pub class: Option<Class>,
    pub field: Option<Field>,
    pub target_type: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub(crate) struct InstData {
    pub op: Op,
    pub ty: TypeId,
    pub block: Option<u32>,
    pub inputs: Vec<u32>,
    /// One entry per use
    pub users: Vec<u32>,
    pub imms: Vec<Imm>,
    pub operands: Operands,
    pub cc: Option<ConditionCode>,
}

impl InstData {
    pub fn new(op: Op, ty: TypeId) -> Self {
        Self {
            op,
            ty,
            block: None,
            inputs: Vec::new(),
            users: Vec::new(),
            imms: Vec::new(),
            operands: Operands::default(),
            cc: None,
        }
    }
}

impl Graph {
    // ========================================================================
    // Placement
    // ========================================================================

    /// Id of a live instruction, unique within its graph and never reused
    pub fn inst_id(&self, inst: InstId) -> IrResult<u32> {
        self.check_inst(inst)?;
        Ok(inst.as_u32())
    }

    /// Owning block, `None` while unlinked
    pub fn inst_block(&self, inst: InstId) -> IrResult<Option<BlockId>> {
        let index = self.check_inst(inst)?;
        Ok(self.insts[index].block.map(|b| self.block_handle(b)))
    }

    pub fn next(&self, inst: InstId) -> IrResult<Option<InstId>> {
        self.neighbour(inst, 1)
    }

    pub fn prev(&self, inst: InstId) -> IrResult<Option<InstId>> {
        self.neighbour(inst, -1)
    }

    fn neighbour(&self, inst: InstId, step: isize) -> IrResult<Option<InstId>> {
        let index = self.check_inst(inst)?;
        let Some(block) = self.insts[index].block else {
            return Ok(None);
        };
        let list = &self.blocks[block].insts;
        let pos = self.position_in(block, index)? as isize + step;
        if pos < 0 {
            return Ok(None);
        }
        Ok(list.get(pos as usize).map(|&i| self.inst_handle(i)))
    }

    pub(crate) fn position_in(&self, block: u32, index: u32) -> IrResult<usize> {
        self.blocks[block]
            .insts
            .iter()
            .position(|&i| i == index)
            .ok_or_else(|| {
                IrError::bad_argument(format!(
                    "{} is not linked in {}",
                    self.inst_handle(index),
                    self.block_handle(block)
                ))
            })
    }

    pub fn insert_before(&mut self, new: InstId, reference: InstId) -> IrResult<()> {
        let (block, pos, index) = self.check_relative(new, reference)?;
        self.blocks[block].insts.insert(pos, index);
        self.insts[index].block = Some(block);
        self.check_invariants("insert_before");
        Ok(())
    }

    pub fn insert_after(&mut self, new: InstId, reference: InstId) -> IrResult<()> {
        let (block, pos, index) = self.check_relative(new, reference)?;
        self.blocks[block].insts.insert(pos + 1, index);
        self.insts[index].block = Some(block);
        self.check_invariants("insert_after");
        Ok(())
    }

    /// Validate a relative insertion; returns the reference's block and position
    fn check_relative(&self, new: InstId, reference: InstId) -> IrResult<(u32, usize, u32)> {
        let index = self.check_inst(new)?;
        let anchor = self.check_inst(reference)?;
        if self.insts[index].op.is_constant() || self.insts[anchor].op.is_constant() {
            return Err(IrError::bad_argument(
                "constants cannot be inserted or used as insertion anchors",
            ));
        }
        if self.insts[index].block.is_some() {
            return Err(IrError::bad_argument(format!(
                "{} is already linked into a block",
                new
            )));
        }
        let block = self.insts[anchor].block.ok_or_else(|| {
            IrError::bad_argument(format!("{} is not linked into a block", reference))
        })?;
        let pos = self.position_in(block, anchor)?;
        Ok((block, pos, index))
    }

    /// Unlink and discard an instruction that has no users
    pub fn remove(&mut self, inst: InstId) -> IrResult<()> {
        let index = self.check_inst(inst)?;
        let data = &self.insts[index];
        if data.op.is_parameter() {
            return Err(IrError::bad_argument("parameters cannot be removed"));
        }
        if !data.users.is_empty() {
            return Err(IrError::bad_argument(format!(
                "{} still has {} users",
                inst,
                data.users.len()
            )));
        }

        if let Some(block) = data.block {
            self.blocks[block].insts.retain(|&i| i != index);
        }
        self.drop_inputs(index);
        self.insts.remove(index);
        self.check_invariants("remove");
        Ok(())
    }

    /// Remove `index` from the user lists of all its inputs and clear its inputs
    pub(crate) fn drop_inputs(&mut self, index: u32) {
        let inputs = std::mem::take(&mut self.insts[index].inputs);
        for input in inputs {
            if let Some(data) = self.insts.get_mut(input) {
                remove_one(&mut data.users, index);
            }
        }
    }

    // ========================================================================
    // Inputs and users
    // ========================================================================

    pub fn input_count(&self, inst: InstId) -> IrResult<usize> {
        Ok(self.insts[self.check_inst(inst)?].inputs.len())
    }

    pub fn input(&self, inst: InstId, index: usize) -> IrResult<InstId> {
        let i = self.check_inst(inst)?;
        self.insts[i]
            .inputs
            .get(index)
            .map(|&v| self.inst_handle(v))
            .ok_or_else(|| IrError::bad_argument(format!("{} has no input {}", inst, index)))
    }

    pub fn inputs(&self, inst: InstId) -> IrResult<Vec<InstId>> {
        let i = self.check_inst(inst)?;
        Ok(self.insts[i]
            .inputs
            .iter()
            .map(|&v| self.inst_handle(v))
            .collect())
    }

    /// Visit inputs in order; returns `false` if the callback stopped early
    pub fn visit_inputs<F>(&self, inst: InstId, mut visit: F) -> IrResult<bool>
    where
        F: FnMut(InstId) -> bool,
    {
        let i = self.check_inst(inst)?;
        for &v in &self.insts[i].inputs {
            if !visit(self.inst_handle(v)) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn set_input(&mut self, inst: InstId, index: usize, value: InstId) -> IrResult<()> {
        let i = self.check_inst(inst)?;
        let v = self.check_inst(value)?;
        let count = self.insts[i].inputs.len();
        if index >= count {
            return Err(IrError::bad_argument(format!(
                "input index {} out of range ({} inputs)",
                index, count
            )));
        }
        let old = std::mem::replace(&mut self.insts[i].inputs[index], v);
        remove_one(&mut self.insts[old].users, i);
        self.insts[v].users.push(i);
        self.check_invariants("set_input");
        Ok(())
    }

    /// Replace the whole input list
    ///
    /// Only phis and variadic instructions may change their input count. A phi
    /// keeps at least one input and a range instruction's count immediate follows
    /// the new list.
    pub fn set_inputs(&mut self, inst: InstId, values: &[InstId]) -> IrResult<()> {
        let i = self.check_inst(inst)?;
        let mut new = Vec::with_capacity(values.len());
        for &value in values {
            new.push(self.check_inst(value)?);
        }
        let data = &self.insts[i];
        if new.len() != data.inputs.len() && !data.op.is_variadic() {
            return Err(IrError::bad_argument(format!(
                "{} takes {} inputs, got {}",
                inst,
                data.inputs.len(),
                new.len()
            )));
        }
        let count = self.input_count_immediate(inst, i, new.len())?;

        self.drop_inputs(i);
        for &v in &new {
            self.insts[v].users.push(i);
        }
        let data = &mut self.insts[i];
        data.inputs = new;
        if let Some(count) = count {
            data.imms[0] = count;
        }
        self.check_invariants("set_inputs");
        Ok(())
    }

    /// Append an input to a phi, catch-phi or variadic instruction
    pub fn append_input(&mut self, inst: InstId, value: InstId) -> IrResult<()> {
        let i = self.check_inst(inst)?;
        let v = self.check_inst(value)?;
        if !self.insts[i].op.is_variadic() {
            return Err(IrError::bad_argument(format!(
                "{} ({}) has a fixed number of inputs",
                inst,
                self.insts[i].op.mnemonic()
            )));
        }
        let count = self.input_count_immediate(inst, i, self.insts[i].inputs.len() + 1)?;
        let data = &mut self.insts[i];
        data.inputs.push(v);
        if let Some(count) = count {
            data.imms[0] = count;
        }
        self.insts[v].users.push(i);
        self.check_invariants("append_input");
        Ok(())
    }

    /// Check that `inst` may hold `count` inputs; returns the count immediate a
    /// range instruction must carry afterwards
    fn input_count_immediate(&self, inst: InstId, i: u32, count: usize) -> IrResult<Option<Imm>> {
        let data = &self.insts[i];
        if count == 0 && (data.op == Op::Phi || data.op.range_layout().is_some()) {
            return Err(IrError::bad_argument(format!(
                "{} ({}) needs at least one input",
                inst,
                data.op.mnemonic()
            )));
        }
        let Some((implicit, width)) = data.op.range_layout() else {
            return Ok(None);
        };
        let value = count.saturating_sub(implicit) as u64;
        if !width.fits(value) {
            return Err(IrError::bad_argument(format!(
                "{} argument count {} does not fit in {} bits",
                inst,
                value,
                width.bits()
            )));
        }
        Ok(Some(Imm::new(value, width)))
    }

    pub fn user_count(&self, inst: InstId) -> IrResult<usize> {
        Ok(self.insts[self.check_inst(inst)?].users.len())
    }

    /// Users, one entry per use
    pub fn users(&self, inst: InstId) -> IrResult<Vec<InstId>> {
        let i = self.check_inst(inst)?;
        Ok(self.insts[i]
            .users
            .iter()
            .map(|&u| self.inst_handle(u))
            .collect())
    }

    /// Visit users; returns `false` if the callback stopped early
    pub fn visit_users<F>(&self, inst: InstId, mut visit: F) -> IrResult<bool>
    where
        F: FnMut(InstId) -> bool,
    {
        let i = self.check_inst(inst)?;
        for &u in &self.insts[i].users {
            if !visit(self.inst_handle(u)) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    // ========================================================================
    // Typed operands
    // ========================================================================

    pub fn operands(&self, inst: InstId) -> IrResult<Operands> {
        Ok(self.insts[self.check_inst(inst)?].operands)
    }

    pub fn function_operand(&self, inst: InstId) -> IrResult<Function> {
        let i = self.check_inst(inst)?;
        self.insts[i]
            .operands
            .function
            .ok_or_else(|| no_operand(inst, "function"))
    }

    /// Replace the function operand; a call takes the new function's return type
    pub fn set_function_operand(&mut self, inst: InstId, function: Function) -> IrResult<()> {
        let i = self.check_inst(inst)?;
        if self.insts[i].operands.function.is_none() {
            return Err(no_operand(inst, "function"));
        }
        self.check_file(function.file(), "function")?;
        if let Some(receivers) = self.insts[i].op.call_receivers() {
            let count = self.insts[i].inputs.len();
            if count != function.arity() as usize + receivers {
                return Err(IrError::bad_argument(format!(
                    "{} has {} inputs, function {} takes {} arguments",
                    inst,
                    count,
                    function.index(),
                    function.arity()
                )));
            }
        }
        let data = &mut self.insts[i];
        data.operands.function = Some(function);
        if data.op.is_call() {
            data.ty = function.return_type();
        }
        Ok(())
    }

    pub fn string_operand(&self, inst: InstId) -> IrResult<StringRef> {
        let i = self.check_inst(inst)?;
        self.insts[i]
            .operands
            .string
            .ok_or_else(|| no_operand(inst, "string"))
    }

    pub fn set_string_operand(&mut self, inst: InstId, string: StringRef) -> IrResult<()> {
        let i = self.check_inst(inst)?;
        if self.insts[i].operands.string.is_none() {
            return Err(no_operand(inst, "string"));
        }
        self.check_file(string.file(), "string")?;
        self.insts[i].operands.string = Some(string);
        Ok(())
    }

    pub fn literal_array_operand(&self, inst: InstId) -> IrResult<LiteralArray> {
        let i = self.check_inst(inst)?;
        self.insts[i]
            .operands
            .literal_array
            .ok_or_else(|| no_operand(inst, "literal array"))
    }

    pub fn set_literal_array_operand(&mut self, inst: InstId, array: LiteralArray) -> IrResult<()> {
        let i = self.check_inst(inst)?;
        if self.insts[i].operands.literal_array.is_none() {
            return Err(no_operand(inst, "literal array"));
        }
        self.check_file(array.file(), "literal array")?;
        self.insts[i].operands.literal_array = Some(array);
        Ok(())
    }

    pub fn class_operand(&self, inst: InstId) -> IrResult<Class> {
        let i = self.check_inst(inst)?;
        self.insts[i]
            .operands
            .class
            .ok_or_else(|| no_operand(inst, "class"))
    }

    pub fn set_class_operand(&mut self, inst: InstId, class: Class) -> IrResult<()> {
        let i = self.check_inst(inst)?;
        if self.insts[i].operands.class.is_none() {
            return Err(no_operand(inst, "class"));
        }
        self.check_file(class.file(), "class")?;
        self.insts[i].operands.class = Some(class);
        Ok(())
    }

    pub fn field_operand(&self, inst: InstId) -> IrResult<Field> {
        let i = self.check_inst(inst)?;
        self.insts[i]
            .operands
            .field
            .ok_or_else(|| no_operand(inst, "field"))
    }

    pub fn set_field_operand(&mut self, inst: InstId, field: Field) -> IrResult<()> {
        let i = self.check_inst(inst)?;
        if self.insts[i].operands.field.is_none() {
            return Err(no_operand(inst, "field"));
        }
        self.check_file(field.file(), "field")?;
        self.insts[i].operands.field = Some(field);
        Ok(())
    }

    // ========================================================================
    // Immediates
    // ========================================================================

    pub fn immediate_count(&self, inst: InstId) -> IrResult<usize> {
        Ok(self.insts[self.check_inst(inst)?].imms.len())
    }

    pub fn immediate(&self, inst: InstId, index: usize) -> IrResult<u64> {
        Ok(self.imm_slot(inst, index)?.value)
    }

    /// Declared width of immediate `index`
    pub fn immediate_size(&self, inst: InstId, index: usize) -> IrResult<BitWidth> {
        Ok(self.imm_slot(inst, index)?.width)
    }

    /// Overwrite immediate `index`; the value must fit its declared width
    pub fn set_immediate(&mut self, inst: InstId, index: usize, value: u64) -> IrResult<()> {
        let width = self.imm_slot(inst, index)?.width;
        if !width.fits(value) {
            return Err(IrError::bad_argument(format!(
                "immediate {} does not fit in {} bits",
                value,
                width.bits()
            )));
        }
        let i = inst.as_u32();
        self.insts[i].imms[index].value = value;
        Ok(())
    }

    fn imm_slot(&self, inst: InstId, index: usize) -> IrResult<Imm> {
        let i = self.check_inst(inst)?;
        self.insts[i].imms.get(index).copied().ok_or_else(|| {
            IrError::bad_argument(format!("{} has no immediate {}", inst, index))
        })
    }

    // ========================================================================
    // Condition codes and target types
    // ========================================================================

    pub(crate) fn condition_code(&self, inst: InstId) -> IrResult<ConditionCode> {
        let i = self.check_inst(inst)?;
        self.insts[i]
            .cc
            .ok_or_else(|| IrError::bad_argument(format!("{} has no condition code", inst)))
    }

    pub(crate) fn set_condition_code(&mut self, inst: InstId, cc: ConditionCode) -> IrResult<()> {
        let i = self.check_inst(inst)?;
        match self.insts[i].cc.as_mut() {
            Some(slot) => {
                *slot = cc;
                Ok(())
            }
            None => Err(IrError::bad_argument(format!(
                "{} has no condition code",
                inst
            ))),
        }
    }

    /// Retarget a cast; the result type follows the target
    pub(crate) fn set_target_type(&mut self, inst: InstId, ty: TypeId) -> IrResult<()> {
        let i = self.check_inst(inst)?;
        let data = &mut self.insts[i];
        if data.operands.target_type.is_none() {
            return Err(no_operand(inst, "target type"));
        }
        data.operands.target_type = Some(ty);
        data.ty = ty;
        Ok(())
    }

    // ========================================================================
    // Constants
    // ========================================================================

    pub fn constant_value(&self, inst: InstId) -> IrResult<ConstValue> {
        let i = self.check_inst(inst)?;
        match self.insts[i].op {
            Op::Constant(value) => Ok(value),
            _ => Err(IrError::bad_argument(format!("{} is not a constant", inst))),
        }
    }

    pub fn constant_i32(&self, inst: InstId) -> IrResult<i32> {
        match self.constant_value(inst)? {
            ConstValue::I32(v) => Ok(v),
            other => Err(wrong_constant(inst, other, "i32")),
        }
    }

    pub fn constant_i64(&self, inst: InstId) -> IrResult<i64> {
        match self.constant_value(inst)? {
            ConstValue::I64(v) => Ok(v),
            other => Err(wrong_constant(inst, other, "i64")),
        }
    }

    pub fn constant_u64(&self, inst: InstId) -> IrResult<u64> {
        match self.constant_value(inst)? {
            ConstValue::U64(v) => Ok(v),
            other => Err(wrong_constant(inst, other, "u64")),
        }
    }

    pub fn constant_f64(&self, inst: InstId) -> IrResult<f64> {
        match self.constant_value(inst)? {
            ConstValue::F64(v) => Ok(v),
            other => Err(wrong_constant(inst, other, "f64")),
        }
    }

    // ========================================================================
    // Predicates
    // ========================================================================

    pub fn op(&self, inst: InstId) -> IrResult<Op> {
        Ok(self.insts[self.check_inst(inst)?].op)
    }

    pub fn result_type(&self, inst: InstId) -> IrResult<TypeId> {
        Ok(self.insts[self.check_inst(inst)?].ty)
    }

    pub fn is_call(&self, inst: InstId) -> IrResult<bool> {
        Ok(self.op(inst)?.is_call())
    }

    pub fn is_constant(&self, inst: InstId) -> IrResult<bool> {
        Ok(self.op(inst)?.is_constant())
    }

    pub fn is_phi(&self, inst: InstId) -> IrResult<bool> {
        Ok(self.op(inst)?.is_phi())
    }

    pub fn is_parameter(&self, inst: InstId) -> IrResult<bool> {
        Ok(self.op(inst)?.is_parameter())
    }
}

fn remove_one(list: &mut Vec<u32>, value: u32) {
    if let Some(pos) = list.iter().position(|&v| v == value) {
        list.remove(pos);
    }
}

fn no_operand(inst: InstId, kind: &str) -> IrError {
    IrError::bad_argument(format!("{} has no {} operand", inst, kind))
}

fn wrong_constant(inst: InstId, value: ConstValue, expected: &str) -> IrError {
    IrError::bad_argument(format!(
        "{} is a {} constant, not {}",
        inst,
        value.type_id(),
        expected
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::File;
    use crate::ir::IsaKind;

    fn graph() -> Graph {
        let mut file = File::new(IsaKind::Static);
        let f = file.add_function("f", &[TypeId::I32, TypeId::I32], TypeId::I32);
        file.create_graph(f).unwrap()
    }

    #[test]
    fn test_set_input_repairs_users() {
        let mut g = graph();
        let a = g.parameter(0).unwrap();
        let b = g.parameter(1).unwrap();
        let c = g.find_or_create_constant_i32(3);
        let bb = g.create_empty_block();
        let phi = g.create_phi(bb, &[a, a]).unwrap();
        assert_eq!(g.users(a).unwrap(), vec![phi, phi]);

        g.set_input(phi, 1, b).unwrap();
        assert_eq!(g.users(a).unwrap(), vec![phi]);
        assert_eq!(g.users(b).unwrap(), vec![phi]);

        g.set_inputs(phi, &[c]).unwrap();
        assert_eq!(g.inputs(phi).unwrap(), vec![c]);
        assert_eq!(g.user_count(a).unwrap(), 0);
        assert_eq!(g.user_count(b).unwrap(), 0);

        g.append_input(phi, a).unwrap();
        assert_eq!(g.input_count(phi).unwrap(), 2);
        assert!(matches!(g.set_input(phi, 2, a), Err(IrError::BadArgument(_))));
    }

    #[test]
    fn test_phi_keeps_an_input() {
        let mut g = graph();
        let a = g.parameter(0).unwrap();
        let bb = g.create_empty_block();
        let phi = g.create_phi(bb, &[a]).unwrap();

        assert!(matches!(g.set_inputs(phi, &[]), Err(IrError::BadArgument(_))));
        assert_eq!(g.inputs(phi).unwrap(), vec![a]);
        assert_eq!(g.users(a).unwrap(), vec![phi]);
        g.verify().unwrap();
    }

    #[test]
    fn test_remove_with_users_fails() {
        let mut g = graph();
        let a = g.parameter(0).unwrap();
        let c = g.find_or_create_constant_i32(1);
        let bb = g.create_empty_block();
        let phi = g.create_phi(bb, &[c]).unwrap();

        assert!(matches!(g.remove(c), Err(IrError::BadArgument(_))));
        assert!(matches!(g.remove(a), Err(IrError::BadArgument(_))));

        g.remove(phi).unwrap();
        assert_eq!(g.user_count(c).unwrap(), 0);
        assert!(matches!(g.inputs(phi), Err(IrError::BadArgument(_))));
        assert_eq!(g.instruction_count(bb).unwrap(), 0);
    }

    #[test]
    fn test_navigation() {
        let mut g = graph();
        let start = g.start_block();
        let a = g.parameter(0).unwrap();
        let b = g.parameter(1).unwrap();
        assert_eq!(g.next(a).unwrap(), Some(b));
        assert_eq!(g.prev(a).unwrap(), None);
        assert_eq!(g.prev(b).unwrap(), Some(a));
        assert_eq!(g.inst_block(b).unwrap(), Some(start));

        let c = g.find_or_create_constant_i32(9);
        assert_eq!(g.next(b).unwrap(), Some(c));
        assert_eq!(g.next(c).unwrap(), None);
    }

    #[test]
    fn test_constant_accessors() {
        let mut g = graph();
        let c = g.find_or_create_constant_i64(-5);
        assert_eq!(g.constant_i64(c).unwrap(), -5);
        assert!(matches!(g.constant_i32(c), Err(IrError::BadArgument(_))));
        let p = g.parameter(0).unwrap();
        assert!(matches!(g.constant_u64(p), Err(IrError::BadArgument(_))));
        let f = g.find_or_create_constant_f64(2.5);
        assert_eq!(g.constant_f64(f).unwrap(), 2.5);
        assert!(g.is_constant(f).unwrap());
        assert!(g.is_parameter(p).unwrap());
    }

    #[test]
    fn test_missing_operands() {
        let g = graph();
        let p = g.parameter(0).unwrap();
        assert!(matches!(g.function_operand(p), Err(IrError::BadArgument(_))));
        assert!(matches!(g.string_operand(p), Err(IrError::BadArgument(_))));
        assert!(matches!(g.immediate(p, 0), Err(IrError::BadArgument(_))));
        assert_eq!(g.immediate_count(p).unwrap(), 0);
    }
}
