//! Static-typed ISA family
//!
//! Typed arithmetic, class/array/object access and calls whose result type comes
//! from the callee.

use crate::error::{IrError, IrResult};
use crate::file::{Class, Field, Function, LiteralArray, StringRef};
use crate::ir::graph::NewInst;
use crate::ir::{BitWidth, ConditionCode, Graph, Imm, InstId, IsaKind, Op, Operands, TypeId};

opcodes! {
    /// Opcodes of the static family, including the core operations as reported by `opcode`
    StaticOpcode {
        Constant => "constant",
        Parameter => "parameter",
        Phi => "phi",
        Try => "try",
        LoadString => "loadstring",
        Cmp => "cmp",
        If => "if",
        Return => "return",
        ReturnVoid => "return.void",
        Throw => "throw",
        Neg => "neg",
        Not => "not",
        Add => "add",
        Sub => "sub",
        Mul => "mul",
        Div => "div",
        Mod => "mod",
        Shl => "shl",
        Shr => "shr",
        AShr => "ashr",
        And => "and",
        Or => "or",
        Xor => "xor",
        AddI => "addi",
        SubI => "subi",
        MulI => "muli",
        DivI => "divi",
        ModI => "modi",
        ShlI => "shli",
        ShrI => "shri",
        AShrI => "ashri",
        AndI => "andi",
        OrI => "ori",
        XorI => "xori",
        Cast => "cast",
        IsInstance => "isinstance",
        CheckCast => "checkcast",
        NullPtr => "nullptr",
        NewArray => "newarray",
        NewObject => "newobject",
        InitObject => "initobject",
        LoadArray => "loadarray",
        StoreArray => "storearray",
        LenArray => "lenarray",
        LoadConstArray => "loadconstarray",
        LoadObject => "loadobject",
        StoreObject => "storeobject",
        LoadStatic => "loadstatic",
        StoreStatic => "storestatic",
        CallStatic => "call.static",
        CallVirtual => "call.virtual",
        Equals => "equals",
        LoadUndefined => "loadundefined",
        IsUndefined => "isundefined",
    }
}

impl StaticOpcode {
    pub fn is_call(self) -> bool {
        matches!(self, StaticOpcode::CallStatic | StaticOpcode::CallVirtual)
    }

    /// Inputs ahead of the arguments, for instructions whose argument count is
    /// fixed by their function operand
    pub fn call_receivers(self) -> Option<usize> {
        match self {
            StaticOpcode::CallStatic | StaticOpcode::InitObject => Some(0),
            StaticOpcode::CallVirtual => Some(1),
            _ => None,
        }
    }

    pub fn has_condition_code(self) -> bool {
        self == StaticOpcode::If
    }
}

/// Static-family view of a graph
pub struct StaticIsa<'g> {
    graph: &'g mut Graph,
}

macro_rules! binary_ops {
    ($($name:ident => $op:ident),* $(,)?) => {
        $(
            pub fn $name(&mut self, lhs: InstId, rhs: InstId) -> IrResult<InstId> {
                self.binary(StaticOpcode::$op, lhs, rhs)
            }
        )*
    };
}

macro_rules! immediate_ops {
    ($($name:ident => $op:ident),* $(,)?) => {
        $(
            /// Operation with a 32-bit immediate right-hand side
            pub fn $name(&mut self, input: InstId, imm: u64) -> IrResult<InstId> {
                self.with_immediate(StaticOpcode::$op, input, imm)
            }
        )*
    };
}

impl<'g> StaticIsa<'g> {
    pub(crate) fn new(graph: &'g mut Graph) -> Self {
        Self { graph }
    }

    fn build(&mut self, new: NewInst) -> IrResult<InstId> {
        self.graph.check_mode(IsaKind::Static)?;
        self.graph.create_inst(new)
    }

    fn op(op: StaticOpcode, ty: TypeId) -> NewInst {
        NewInst::new(Op::Static(op), ty)
    }

    /// Result type of an operand, after mode and ownership checks
    fn operand_type(&self, inst: InstId) -> IrResult<TypeId> {
        self.graph.check_mode(IsaKind::Static)?;
        self.graph.result_type(inst)
    }

    fn expect_compatible(&self, expected: TypeId, value: InstId) -> IrResult<()> {
        let actual = self.operand_type(value)?;
        if !expected.is_compatible(actual) {
            return Err(IrError::bad_argument(format!(
                "{} has type {}, expected {}",
                value, actual, expected
            )));
        }
        Ok(())
    }

    fn binary(&mut self, op: StaticOpcode, lhs: InstId, rhs: InstId) -> IrResult<InstId> {
        let ty = self.operand_type(lhs)?;
        self.expect_compatible(ty, rhs)?;
        self.build(Self::op(op, ty).inputs(&[lhs, rhs]))
    }

    fn unary(&mut self, op: StaticOpcode, input: InstId) -> IrResult<InstId> {
        let ty = self.operand_type(input)?;
        self.build(Self::op(op, ty).inputs(&[input]))
    }

    fn with_immediate(&mut self, op: StaticOpcode, input: InstId, imm: u64) -> IrResult<InstId> {
        let ty = self.operand_type(input)?;
        self.build(
            Self::op(op, ty)
                .inputs(&[input])
                .imm(Imm::new(imm, BitWidth::W32)),
        )
    }

    fn check_arity(function: Function, args: &[InstId]) -> IrResult<()> {
        if args.len() != function.arity() as usize {
            return Err(IrError::bad_argument(format!(
                "function takes {} arguments, got {}",
                function.arity(),
                args.len()
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn opcode(&self, inst: InstId) -> IrResult<StaticOpcode> {
        self.graph.check_mode(IsaKind::Static)?;
        match self.graph.op(inst)? {
            Op::Static(op) => Ok(op),
            Op::Constant(_) => Ok(StaticOpcode::Constant),
            Op::Parameter(_) => Ok(StaticOpcode::Parameter),
            Op::Phi => Ok(StaticOpcode::Phi),
            Op::Try => Ok(StaticOpcode::Try),
            other => Err(IrError::wrong_mode(format!(
                "{} is not a static instruction",
                other.mnemonic()
            ))),
        }
    }

    pub fn condition_code(&self, inst: InstId) -> IrResult<ConditionCode> {
        self.graph.check_mode(IsaKind::Static)?;
        self.graph.condition_code(inst)
    }

    pub fn set_condition_code(&mut self, inst: InstId, cc: ConditionCode) -> IrResult<()> {
        self.graph.check_mode(IsaKind::Static)?;
        if cc == ConditionCode::None {
            return Err(IrError::bad_argument("condition code must not be none"));
        }
        self.graph.set_condition_code(inst, cc)
    }

    /// Result type
    pub fn type_id(&self, inst: InstId) -> IrResult<TypeId> {
        self.operand_type(inst)
    }

    /// Target type of a cast
    pub fn target_type(&self, inst: InstId) -> IrResult<TypeId> {
        self.graph.check_mode(IsaKind::Static)?;
        self.graph
            .operands(inst)?
            .target_type
            .ok_or_else(|| IrError::bad_argument(format!("{} has no target type", inst)))
    }

    /// Change the target (and result) type of a cast
    pub fn set_target_type(&mut self, inst: InstId, ty: TypeId) -> IrResult<()> {
        self.graph.check_mode(IsaKind::Static)?;
        if ty == TypeId::Invalid {
            return Err(IrError::bad_argument("invalid target type"));
        }
        self.graph.set_target_type(inst, ty)
    }

    // ========================================================================
    // Constructors
    // ========================================================================

    pub fn create_load_string(&mut self, string: StringRef) -> IrResult<InstId> {
        let operands = Operands {
            string: Some(string),
            ..Operands::default()
        };
        self.build(Self::op(StaticOpcode::LoadString, TypeId::String).operands(operands))
    }

    /// Three-way compare: -1, 0 or 1
    pub fn create_cmp(&mut self, lhs: InstId, rhs: InstId) -> IrResult<InstId> {
        let ty = self.operand_type(lhs)?;
        self.expect_compatible(ty, rhs)?;
        self.build(Self::op(StaticOpcode::Cmp, TypeId::I32).inputs(&[lhs, rhs]))
    }

    /// Branch on `lhs <cc> rhs`
    pub fn create_if(&mut self, lhs: InstId, rhs: InstId, cc: ConditionCode) -> IrResult<InstId> {
        if cc == ConditionCode::None {
            self.graph.check_mode(IsaKind::Static)?;
            return Err(IrError::bad_argument("condition code must not be none"));
        }
        let ty = self.operand_type(lhs)?;
        self.expect_compatible(ty, rhs)?;
        self.build(
            Self::op(StaticOpcode::If, TypeId::Void)
                .inputs(&[lhs, rhs])
                .cc(cc),
        )
    }

    pub fn create_return(&mut self, value: InstId) -> IrResult<InstId> {
        self.operand_type(value)?;
        self.build(Self::op(StaticOpcode::Return, TypeId::Void).inputs(&[value]))
    }

    pub fn create_return_void(&mut self) -> IrResult<InstId> {
        self.build(Self::op(StaticOpcode::ReturnVoid, TypeId::Void))
    }

    pub fn create_throw(&mut self, exception: InstId) -> IrResult<InstId> {
        self.operand_type(exception)?;
        self.build(Self::op(StaticOpcode::Throw, TypeId::Void).inputs(&[exception]))
    }

    pub fn create_neg(&mut self, input: InstId) -> IrResult<InstId> {
        self.unary(StaticOpcode::Neg, input)
    }

    pub fn create_not(&mut self, input: InstId) -> IrResult<InstId> {
        self.unary(StaticOpcode::Not, input)
    }

    binary_ops! {
        create_add => Add,
        create_sub => Sub,
        create_mul => Mul,
        create_div => Div,
        create_mod => Mod,
        create_shl => Shl,
        create_shr => Shr,
        create_ashr => AShr,
        create_and => And,
        create_or => Or,
        create_xor => Xor,
    }

    immediate_ops! {
        create_add_i => AddI,
        create_sub_i => SubI,
        create_mul_i => MulI,
        create_div_i => DivI,
        create_mod_i => ModI,
        create_shl_i => ShlI,
        create_shr_i => ShrI,
        create_ashr_i => AShrI,
        create_and_i => AndI,
        create_or_i => OrI,
        create_xor_i => XorI,
    }

    pub fn create_cast(&mut self, input: InstId, target: TypeId) -> IrResult<InstId> {
        self.operand_type(input)?;
        if target == TypeId::Invalid {
            return Err(IrError::bad_argument("invalid target type"));
        }
        let operands = Operands {
            target_type: Some(target),
            ..Operands::default()
        };
        self.build(
            Self::op(StaticOpcode::Cast, target)
                .inputs(&[input])
                .operands(operands),
        )
    }

    pub fn create_is_instance(&mut self, object: InstId, class: Class) -> IrResult<InstId> {
        let operands = Operands {
            class: Some(class),
            ..Operands::default()
        };
        self.build(
            Self::op(StaticOpcode::IsInstance, TypeId::U1)
                .inputs(&[object])
                .operands(operands),
        )
    }

    pub fn create_check_cast(&mut self, object: InstId, class: Class) -> IrResult<InstId> {
        let operands = Operands {
            class: Some(class),
            ..Operands::default()
        };
        self.build(
            Self::op(StaticOpcode::CheckCast, TypeId::Reference)
                .inputs(&[object])
                .operands(operands),
        )
    }

    pub fn create_null_ptr(&mut self) -> IrResult<InstId> {
        self.build(Self::op(StaticOpcode::NullPtr, TypeId::Reference))
    }

    /// Array of `length` elements of class `element`
    pub fn create_new_array(&mut self, element: Class, length: InstId) -> IrResult<InstId> {
        let operands = Operands {
            class: Some(element),
            ..Operands::default()
        };
        self.build(
            Self::op(StaticOpcode::NewArray, TypeId::Reference)
                .inputs(&[length])
                .operands(operands),
        )
    }

    /// Allocate an object without running a constructor
    pub fn create_new_object(&mut self, class: Class) -> IrResult<InstId> {
        let operands = Operands {
            class: Some(class),
            ..Operands::default()
        };
        self.build(Self::op(StaticOpcode::NewObject, TypeId::Reference).operands(operands))
    }

    /// Allocate an object and run `constructor` with `args`
    pub fn create_init_object(&mut self, constructor: Function, args: &[InstId]) -> IrResult<InstId> {
        self.graph.check_mode(IsaKind::Static)?;
        Self::check_arity(constructor, args)?;
        let operands = Operands {
            function: Some(constructor),
            ..Operands::default()
        };
        self.build(
            Self::op(StaticOpcode::InitObject, TypeId::Reference)
                .inputs(args)
                .operands(operands),
        )
    }

    pub fn create_load_array(
        &mut self,
        array: InstId,
        index: InstId,
        element: TypeId,
    ) -> IrResult<InstId> {
        self.build(Self::op(StaticOpcode::LoadArray, element).inputs(&[array, index]))
    }

    pub fn create_store_array(
        &mut self,
        array: InstId,
        index: InstId,
        value: InstId,
        element: TypeId,
    ) -> IrResult<InstId> {
        self.operand_type(array)?;
        self.operand_type(index)?;
        self.expect_compatible(element, value)?;
        self.build(Self::op(StaticOpcode::StoreArray, TypeId::Void).inputs(&[array, index, value]))
    }

    pub fn create_len_array(&mut self, array: InstId) -> IrResult<InstId> {
        self.build(Self::op(StaticOpcode::LenArray, TypeId::I32).inputs(&[array]))
    }

    pub fn create_load_const_array(&mut self, literals: LiteralArray) -> IrResult<InstId> {
        let operands = Operands {
            literal_array: Some(literals),
            ..Operands::default()
        };
        self.build(Self::op(StaticOpcode::LoadConstArray, TypeId::Reference).operands(operands))
    }

    pub fn create_load_object(&mut self, object: InstId, field: Field) -> IrResult<InstId> {
        let operands = Operands {
            field: Some(field),
            ..Operands::default()
        };
        self.build(
            Self::op(StaticOpcode::LoadObject, field.value_type())
                .inputs(&[object])
                .operands(operands),
        )
    }

    pub fn create_store_object(
        &mut self,
        object: InstId,
        field: Field,
        value: InstId,
    ) -> IrResult<InstId> {
        self.operand_type(object)?;
        self.expect_compatible(field.value_type(), value)?;
        let operands = Operands {
            field: Some(field),
            ..Operands::default()
        };
        self.build(
            Self::op(StaticOpcode::StoreObject, TypeId::Void)
                .inputs(&[object, value])
                .operands(operands),
        )
    }

    pub fn create_load_static(&mut self, field: Field) -> IrResult<InstId> {
        let operands = Operands {
            field: Some(field),
            ..Operands::default()
        };
        self.build(Self::op(StaticOpcode::LoadStatic, field.value_type()).operands(operands))
    }

    pub fn create_store_static(&mut self, field: Field, value: InstId) -> IrResult<InstId> {
        self.expect_compatible(field.value_type(), value)?;
        let operands = Operands {
            field: Some(field),
            ..Operands::default()
        };
        self.build(
            Self::op(StaticOpcode::StoreStatic, TypeId::Void)
                .inputs(&[value])
                .operands(operands),
        )
    }

    /// Call `function`; the result type is its return type
    pub fn create_call_static(&mut self, function: Function, args: &[InstId]) -> IrResult<InstId> {
        self.graph.check_mode(IsaKind::Static)?;
        Self::check_arity(function, args)?;
        let operands = Operands {
            function: Some(function),
            ..Operands::default()
        };
        self.build(
            Self::op(StaticOpcode::CallStatic, function.return_type())
                .inputs(args)
                .operands(operands),
        )
    }

    /// Virtual call of `function` on `receiver`
    pub fn create_call_virtual(
        &mut self,
        function: Function,
        receiver: InstId,
        args: &[InstId],
    ) -> IrResult<InstId> {
        self.graph.check_mode(IsaKind::Static)?;
        Self::check_arity(function, args)?;
        let mut inputs = Vec::with_capacity(args.len() + 1);
        inputs.push(receiver);
        inputs.extend_from_slice(args);
        let operands = Operands {
            function: Some(function),
            ..Operands::default()
        };
        self.build(
            Self::op(StaticOpcode::CallVirtual, function.return_type())
                .inputs(&inputs)
                .operands(operands),
        )
    }

    pub fn create_equals(&mut self, lhs: InstId, rhs: InstId) -> IrResult<InstId> {
        self.build(Self::op(StaticOpcode::Equals, TypeId::U1).inputs(&[lhs, rhs]))
    }

    pub fn create_load_undefined(&mut self) -> IrResult<InstId> {
        self.build(Self::op(StaticOpcode::LoadUndefined, TypeId::Reference))
    }

    pub fn create_is_undefined(&mut self, input: InstId) -> IrResult<InstId> {
        self.build(Self::op(StaticOpcode::IsUndefined, TypeId::U1).inputs(&[input]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::File;

    fn static_graph() -> (File, Graph) {
        let mut file = File::new(IsaKind::Static);
        let f = file.add_function("f", &[TypeId::I32, TypeId::I64], TypeId::I32);
        let graph = file.create_graph(f).unwrap();
        (file, graph)
    }

    #[test]
    fn test_binary_type_check() {
        let (_file, mut g) = static_graph();
        let a = g.parameter(0).unwrap();
        let b = g.parameter(1).unwrap();
        assert!(matches!(
            g.static_isa().create_add(a, b),
            Err(IrError::BadArgument(_))
        ));
        let c = g.find_or_create_constant_i32(1);
        let add = g.static_isa().create_add(a, c).unwrap();
        assert_eq!(g.static_isa().opcode(add).unwrap(), StaticOpcode::Add);
        assert_eq!(g.static_isa().type_id(add).unwrap(), TypeId::I32);
        assert_eq!(g.inst_block(add).unwrap(), None);
    }

    #[test]
    fn test_immediate_width() {
        let (_file, mut g) = static_graph();
        let a = g.parameter(0).unwrap();
        let ok = g.static_isa().create_add_i(a, u32::MAX as u64).unwrap();
        assert_eq!(g.immediate_size(ok, 0).unwrap(), BitWidth::W32);
        assert!(matches!(
            g.static_isa().create_add_i(a, 1 << 32),
            Err(IrError::BadArgument(_))
        ));
        assert!(matches!(
            g.set_immediate(ok, 0, 1 << 32),
            Err(IrError::BadArgument(_))
        ));
    }

    #[test]
    fn test_if_condition_codes() {
        let (_file, mut g) = static_graph();
        let a = g.parameter(0).unwrap();
        let c = g.find_or_create_constant_i32(0);
        let br = g.static_isa().create_if(a, c, ConditionCode::Lt).unwrap();
        assert_eq!(g.static_isa().condition_code(br).unwrap(), ConditionCode::Lt);

        g.static_isa().set_condition_code(br, ConditionCode::Ae).unwrap();
        assert_eq!(g.static_isa().condition_code(br).unwrap(), ConditionCode::Ae);
        assert!(matches!(
            g.static_isa().set_condition_code(br, ConditionCode::None),
            Err(IrError::BadArgument(_))
        ));
        assert!(matches!(
            g.static_isa().condition_code(a),
            Err(IrError::BadArgument(_))
        ));
    }

    #[test]
    fn test_call_result_type_and_arity() {
        let (mut file, mut g) = static_graph();
        let callee = file.add_function("callee", &[TypeId::I32], TypeId::F64);
        let a = g.parameter(0).unwrap();
        let call = g.static_isa().create_call_static(callee, &[a]).unwrap();
        assert_eq!(g.result_type(call).unwrap(), TypeId::F64);
        assert!(g.is_call(call).unwrap());
        assert_eq!(g.function_operand(call).unwrap(), callee);
        assert!(matches!(
            g.static_isa().create_call_static(callee, &[]),
            Err(IrError::BadArgument(_))
        ));

        assert!(matches!(g.append_input(call, a), Err(IrError::BadArgument(_))));
        assert!(matches!(g.set_inputs(call, &[a, a]), Err(IrError::BadArgument(_))));
        assert_eq!(g.input_count(call).unwrap(), 1);
        g.verify().unwrap();
    }

    #[test]
    fn test_retarget_keeps_arity() {
        let (mut file, mut g) = static_graph();
        let unary = file.add_function("unary", &[TypeId::I32], TypeId::I32);
        let other = file.add_function("other", &[TypeId::I64], TypeId::I64);
        let binary = file.add_function("binary", &[TypeId::I32, TypeId::I32], TypeId::I32);
        let a = g.parameter(0).unwrap();

        let call = g.static_isa().create_call_static(unary, &[a]).unwrap();
        assert!(matches!(
            g.set_function_operand(call, binary),
            Err(IrError::BadArgument(_))
        ));
        assert_eq!(g.function_operand(call).unwrap(), unary);
        g.set_function_operand(call, other).unwrap();
        assert_eq!(g.result_type(call).unwrap(), TypeId::I64);

        let virt = g.static_isa().create_call_virtual(unary, a, &[a]).unwrap();
        assert_eq!(g.input_count(virt).unwrap(), 2);
        assert!(matches!(
            g.set_function_operand(virt, binary),
            Err(IrError::BadArgument(_))
        ));
        g.set_function_operand(virt, other).unwrap();
        g.verify().unwrap();
    }

    #[test]
    fn test_foreign_file_operand() {
        let (_file, mut g) = static_graph();
        let mut other = File::new(IsaKind::Static);
        let s = other.create_string("hello");
        assert!(matches!(
            g.static_isa().create_load_string(s),
            Err(IrError::WrongCtx(_))
        ));
    }

    #[test]
    fn test_wrong_mode() {
        let mut file = File::new(IsaKind::Dynamic);
        let f = file.add_function("f", &[], TypeId::Void);
        let mut g = file.create_graph(f).unwrap();
        assert!(matches!(
            g.static_isa().create_return_void(),
            Err(IrError::WrongMode(_))
        ));
        assert!(matches!(
            g.static_isa().create_null_ptr(),
            Err(IrError::WrongMode(_))
        ));
    }

    #[test]
    fn test_cast_target_type() {
        let (_file, mut g) = static_graph();
        let a = g.parameter(0).unwrap();
        let cast = g.static_isa().create_cast(a, TypeId::F64).unwrap();
        assert_eq!(g.static_isa().target_type(cast).unwrap(), TypeId::F64);
        g.static_isa().set_target_type(cast, TypeId::I64).unwrap();
        assert_eq!(g.result_type(cast).unwrap(), TypeId::I64);
        assert!(matches!(
            g.static_isa().target_type(a),
            Err(IrError::BadArgument(_))
        ));
    }

    #[test]
    fn test_object_access() {
        let (mut file, mut g) = static_graph();
        let class = file.add_class("Point");
        let x = file.add_field(class, "x", TypeId::I32).unwrap();
        let obj = g.static_isa().create_new_object(class).unwrap();
        let load = g.static_isa().create_load_object(obj, x).unwrap();
        assert_eq!(g.result_type(load).unwrap(), TypeId::I32);
        assert_eq!(g.field_operand(load).unwrap(), x);

        let wide = g.parameter(1).unwrap();
        assert!(matches!(
            g.static_isa().create_store_object(obj, x, wide),
            Err(IrError::BadArgument(_))
        ));
        let store = g.static_isa().create_store_object(obj, x, load).unwrap();
        assert_eq!(g.users(obj).unwrap(), vec![load, store]);
    }
}
