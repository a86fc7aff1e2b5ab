//! Dynamic-typed ISA family
//!
//! Accumulator-style bytecode where every value is `any`. Lexical variables, property
//! access by index and range calls come in a short and a wide encoding; the encoding
//! decides the declared width of the immediates.

use crate::error::{IrError, IrResult};
use crate::file::{Function, LiteralArray, StringRef};
use crate::ir::graph::NewInst;
use crate::ir::{BitWidth, ConditionCode, Graph, Imm, InstId, IsaKind, Op, Operands, TypeId};

opcodes! {
    /// Opcodes of the dynamic family, including the core operations as reported by `opcode`
    DynamicOpcode {
        Constant => "constant",
        Parameter => "parameter",
        Phi => "phi",
        CatchPhi => "catchphi",
        Try => "try",
        LoadString => "loadstring",
        Ldnan => "ldnan",
        Ldinfinity => "ldinfinity",
        Ldundefined => "ldundefined",
        Ldnull => "ldnull",
        Ldsymbol => "ldsymbol",
        Ldglobal => "ldglobal",
        Ldtrue => "ldtrue",
        Ldfalse => "ldfalse",
        Ldhole => "ldhole",
        Ldnewtarget => "ldnewtarget",
        Ldthis => "ldthis",
        Ldfunction => "ldfunction",
        Poplexenv => "poplexenv",
        Getunmappedargs => "getunmappedargs",
        Debugger => "debugger",
        Createemptyobject => "createemptyobject",
        Createemptyarray => "createemptyarray",
        Creategeneratorobj => "creategeneratorobj",
        Createarraywithbuffer => "createarraywithbuffer",
        Createobjectwithbuffer => "createobjectwithbuffer",
        Newlexenv => "newlexenv",
        WideNewlexenv => "wide.newlexenv",
        Newobjrange => "newobjrange",
        WideNewobjrange => "wide.newobjrange",
        Add2 => "add2",
        Sub2 => "sub2",
        Mul2 => "mul2",
        Div2 => "div2",
        Mod2 => "mod2",
        Eq => "eq",
        Noteq => "noteq",
        Less => "less",
        Lesseq => "lesseq",
        Greater => "greater",
        Greatereq => "greatereq",
        Shl2 => "shl2",
        Shr2 => "shr2",
        Ashr2 => "ashr2",
        And2 => "and2",
        Or2 => "or2",
        Xor2 => "xor2",
        Exp => "exp",
        Isin => "isin",
        Instanceof => "instanceof",
        Stricteq => "stricteq",
        Strictnoteq => "strictnoteq",
        Typeof => "typeof",
        Tonumber => "tonumber",
        Tonumeric => "tonumeric",
        Neg => "neg",
        Not => "not",
        Inc => "inc",
        Dec => "dec",
        Istrue => "istrue",
        Isfalse => "isfalse",
        Getpropiterator => "getpropiterator",
        Getiterator => "getiterator",
        Getasynciterator => "getasynciterator",
        Throw => "throw",
        ThrowIfnotobject => "throw.ifnotobject",
        Callarg0 => "callarg0",
        Callarg1 => "callarg1",
        Callargs2 => "callargs2",
        Callargs3 => "callargs3",
        Callthis0 => "callthis0",
        Callthis1 => "callthis1",
        Callthis2 => "callthis2",
        Callthis3 => "callthis3",
        Callrange => "callrange",
        WideCallrange => "wide.callrange",
        Definefunc => "definefunc",
        Defineclasswithbuffer => "defineclasswithbuffer",
        Delobjprop => "delobjprop",
        Ldobjbyvalue => "ldobjbyvalue",
        Stobjbyvalue => "stobjbyvalue",
        Ldobjbyindex => "ldobjbyindex",
        WideLdobjbyindex => "wide.ldobjbyindex",
        Stobjbyindex => "stobjbyindex",
        WideStobjbyindex => "wide.stobjbyindex",
        Copyrestargs => "copyrestargs",
        WideCopyrestargs => "wide.copyrestargs",
        Ldlexvar => "ldlexvar",
        WideLdlexvar => "wide.ldlexvar",
        Stlexvar => "stlexvar",
        WideStlexvar => "wide.stlexvar",
        Ldexternalmodulevar => "ldexternalmodulevar",
        WideLdexternalmodulevar => "wide.ldexternalmodulevar",
        Tryldglobalbyname => "tryldglobalbyname",
        Trystglobalbyname => "trystglobalbyname",
        Ldglobalvar => "ldglobalvar",
        Stglobalvar => "stglobalvar",
        Ldobjbyname => "ldobjbyname",
        Stobjbyname => "stobjbyname",
        Return => "return",
        Returnundefined => "returnundefined",
        If => "if",
    }
}

impl DynamicOpcode {
    pub fn is_call(self) -> bool {
        matches!(
            self,
            DynamicOpcode::Callarg0
                | DynamicOpcode::Callarg1
                | DynamicOpcode::Callargs2
                | DynamicOpcode::Callargs3
                | DynamicOpcode::Callthis0
                | DynamicOpcode::Callthis1
                | DynamicOpcode::Callthis2
                | DynamicOpcode::Callthis3
                | DynamicOpcode::Callrange
                | DynamicOpcode::WideCallrange
        )
    }

    pub fn is_variadic(self) -> bool {
        self.range_layout().is_some()
    }

    /// Range instructions: inputs left out of the count immediate, and its width
    pub fn range_layout(self) -> Option<(usize, BitWidth)> {
        match self {
            DynamicOpcode::Callrange => Some((1, BitWidth::W8)),
            DynamicOpcode::WideCallrange => Some((1, BitWidth::W16)),
            DynamicOpcode::Newobjrange => Some((0, BitWidth::W8)),
            DynamicOpcode::WideNewobjrange => Some((0, BitWidth::W16)),
            _ => None,
        }
    }

    pub fn has_condition_code(self) -> bool {
        self == DynamicOpcode::If
    }
}

/// Dynamic-family view of a graph
pub struct DynamicIsa<'g> {
    graph: &'g mut Graph,
}

macro_rules! nullary_ops {
    ($($name:ident => $op:ident : $ty:ident),* $(,)?) => {
        $(
            pub fn $name(&mut self) -> IrResult<InstId> {
                self.build(Self::op(DynamicOpcode::$op, TypeId::$ty))
            }
        )*
    };
}

macro_rules! unary_ops {
    ($($name:ident => $op:ident : $ty:ident),* $(,)?) => {
        $(
            pub fn $name(&mut self, acc: InstId) -> IrResult<InstId> {
                self.build(Self::op(DynamicOpcode::$op, TypeId::$ty).inputs(&[acc]))
            }
        )*
    };
}

macro_rules! binary_ops {
    ($($name:ident => $op:ident : $ty:ident),* $(,)?) => {
        $(
            pub fn $name(&mut self, acc: InstId, input: InstId) -> IrResult<InstId> {
                self.build(Self::op(DynamicOpcode::$op, TypeId::$ty).inputs(&[acc, input]))
            }
        )*
    };
}

macro_rules! string_ops {
    ($($name:ident => $op:ident : $ty:ident),* $(,)?) => {
        $(
            pub fn $name(&mut self, acc: InstId, string: StringRef) -> IrResult<InstId> {
                self.build(
                    Self::op(DynamicOpcode::$op, TypeId::$ty)
                        .inputs(&[acc])
                        .operands(Self::string(string)),
                )
            }
        )*
    };
}

impl<'g> DynamicIsa<'g> {
    pub(crate) fn new(graph: &'g mut Graph) -> Self {
        Self { graph }
    }

    fn mode(&self) -> IrResult<()> {
        self.graph.check_mode(IsaKind::Dynamic)
    }

    fn build(&mut self, new: NewInst) -> IrResult<InstId> {
        self.mode()?;
        self.graph.create_inst(new)
    }

    fn op(op: DynamicOpcode, ty: TypeId) -> NewInst {
        NewInst::new(Op::Dynamic(op), ty)
    }

    fn string(string: StringRef) -> Operands {
        Operands {
            string: Some(string),
            ..Operands::default()
        }
    }

    fn literals(array: LiteralArray) -> Operands {
        Operands {
            literal_array: Some(array),
            ..Operands::default()
        }
    }

    /// Immediate of the given width, rejected up front when the value does not fit
    fn imm(value: u64, width: BitWidth) -> IrResult<Imm> {
        if !width.fits(value) {
            return Err(IrError::bad_argument(format!(
                "immediate {} does not fit in {} bits",
                value,
                width.bits()
            )));
        }
        Ok(Imm::new(value, width))
    }

    /// Short lexical-variable encoding: 4 bits when both fit, else 8 bits
    fn lexvar_width(level: u64, slot: u64) -> IrResult<BitWidth> {
        if BitWidth::W4.fits(level) && BitWidth::W4.fits(slot) {
            Ok(BitWidth::W4)
        } else if BitWidth::W8.fits(level) && BitWidth::W8.fits(slot) {
            Ok(BitWidth::W8)
        } else {
            Err(IrError::bad_argument(format!(
                "lexical variable ({}, {}) needs the wide encoding",
                level, slot
            )))
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn opcode(&self, inst: InstId) -> IrResult<DynamicOpcode> {
        self.mode()?;
        match self.graph.op(inst)? {
            Op::Dynamic(op) => Ok(op),
            Op::Constant(_) => Ok(DynamicOpcode::Constant),
            Op::Parameter(_) => Ok(DynamicOpcode::Parameter),
            Op::Phi => Ok(DynamicOpcode::Phi),
            Op::CatchPhi => Ok(DynamicOpcode::CatchPhi),
            Op::Try => Ok(DynamicOpcode::Try),
            other => Err(IrError::wrong_mode(format!(
                "{} is not a dynamic instruction",
                other.mnemonic()
            ))),
        }
    }

    pub fn condition_code(&self, inst: InstId) -> IrResult<ConditionCode> {
        self.mode()?;
        self.graph.condition_code(inst)
    }

    /// Only `Eq` and `Ne` are encodable
    pub fn set_condition_code(&mut self, inst: InstId, cc: ConditionCode) -> IrResult<()> {
        self.mode()?;
        check_cc(cc)?;
        self.graph.set_condition_code(inst, cc)
    }

    // ========================================================================
    // Loads and constants
    // ========================================================================

    pub fn create_load_string(&mut self, string: StringRef) -> IrResult<InstId> {
        self.build(Self::op(DynamicOpcode::LoadString, TypeId::Any).operands(Self::string(string)))
    }

    nullary_ops! {
        create_ldnan => Ldnan: Any,
        create_ldinfinity => Ldinfinity: Any,
        create_ldundefined => Ldundefined: Any,
        create_ldnull => Ldnull: Any,
        create_ldsymbol => Ldsymbol: Any,
        create_ldglobal => Ldglobal: Any,
        create_ldtrue => Ldtrue: Any,
        create_ldfalse => Ldfalse: Any,
        create_ldhole => Ldhole: Any,
        create_ldnewtarget => Ldnewtarget: Any,
        create_ldthis => Ldthis: Any,
        create_ldfunction => Ldfunction: Any,
        create_poplexenv => Poplexenv: Void,
        create_getunmappedargs => Getunmappedargs: Any,
        create_debugger => Debugger: Void,
        create_createemptyobject => Createemptyobject: Any,
        create_createemptyarray => Createemptyarray: Any,
        create_returnundefined => Returnundefined: Void,
    }

    // ========================================================================
    // Arithmetic and conversions
    // ========================================================================

    binary_ops! {
        create_add2 => Add2: Any,
        create_sub2 => Sub2: Any,
        create_mul2 => Mul2: Any,
        create_div2 => Div2: Any,
        create_mod2 => Mod2: Any,
        create_eq => Eq: Any,
        create_noteq => Noteq: Any,
        create_less => Less: Any,
        create_lesseq => Lesseq: Any,
        create_greater => Greater: Any,
        create_greatereq => Greatereq: Any,
        create_shl2 => Shl2: Any,
        create_shr2 => Shr2: Any,
        create_ashr2 => Ashr2: Any,
        create_and2 => And2: Any,
        create_or2 => Or2: Any,
        create_xor2 => Xor2: Any,
        create_exp => Exp: Any,
        create_isin => Isin: Any,
        create_instanceof => Instanceof: Any,
        create_stricteq => Stricteq: Any,
        create_strictnoteq => Strictnoteq: Any,
        create_delobjprop => Delobjprop: Any,
        create_ldobjbyvalue => Ldobjbyvalue: Any,
    }

    unary_ops! {
        create_typeof => Typeof: Any,
        create_tonumber => Tonumber: Any,
        create_tonumeric => Tonumeric: Any,
        create_neg => Neg: Any,
        create_not => Not: Any,
        create_inc => Inc: Any,
        create_dec => Dec: Any,
        create_istrue => Istrue: Any,
        create_isfalse => Isfalse: Any,
        create_getpropiterator => Getpropiterator: Any,
        create_getiterator => Getiterator: Any,
        create_getasynciterator => Getasynciterator: Any,
        create_creategeneratorobj => Creategeneratorobj: Any,
        create_throw => Throw: Void,
        create_throw_ifnotobject => ThrowIfnotobject: Void,
        create_return => Return: Void,
    }

    /// Store `acc` into `object[key]`
    pub fn create_stobjbyvalue(
        &mut self,
        acc: InstId,
        object: InstId,
        key: InstId,
    ) -> IrResult<InstId> {
        self.build(
            Self::op(DynamicOpcode::Stobjbyvalue, TypeId::Void).inputs(&[acc, object, key]),
        )
    }

    // ========================================================================
    // Lexical environments
    // ========================================================================

    pub fn create_newlexenv(&mut self, slots: u64) -> IrResult<InstId> {
        self.mode()?;
        let imm = Self::imm(slots, BitWidth::W8)?;
        self.build(Self::op(DynamicOpcode::Newlexenv, TypeId::Any).imm(imm))
    }

    pub fn create_wide_newlexenv(&mut self, slots: u64) -> IrResult<InstId> {
        self.mode()?;
        let imm = Self::imm(slots, BitWidth::W16)?;
        self.build(Self::op(DynamicOpcode::WideNewlexenv, TypeId::Any).imm(imm))
    }

    /// Load slot `slot` of the environment `level` levels up
    pub fn create_ldlexvar(&mut self, level: u64, slot: u64) -> IrResult<InstId> {
        self.mode()?;
        let width = Self::lexvar_width(level, slot)?;
        self.build(
            Self::op(DynamicOpcode::Ldlexvar, TypeId::Any)
                .imm(Imm::new(level, width))
                .imm(Imm::new(slot, width)),
        )
    }

    pub fn create_wide_ldlexvar(&mut self, level: u64, slot: u64) -> IrResult<InstId> {
        self.mode()?;
        let level = Self::imm(level, BitWidth::W16)?;
        let slot = Self::imm(slot, BitWidth::W16)?;
        self.build(
            Self::op(DynamicOpcode::WideLdlexvar, TypeId::Any)
                .imm(level)
                .imm(slot),
        )
    }

    pub fn create_stlexvar(&mut self, acc: InstId, level: u64, slot: u64) -> IrResult<InstId> {
        self.mode()?;
        let width = Self::lexvar_width(level, slot)?;
        self.build(
            Self::op(DynamicOpcode::Stlexvar, TypeId::Void)
                .inputs(&[acc])
                .imm(Imm::new(level, width))
                .imm(Imm::new(slot, width)),
        )
    }

    pub fn create_wide_stlexvar(&mut self, acc: InstId, level: u64, slot: u64) -> IrResult<InstId> {
        self.mode()?;
        let level = Self::imm(level, BitWidth::W16)?;
        let slot = Self::imm(slot, BitWidth::W16)?;
        self.build(
            Self::op(DynamicOpcode::WideStlexvar, TypeId::Void)
                .inputs(&[acc])
                .imm(level)
                .imm(slot),
        )
    }

    pub fn create_copyrestargs(&mut self, first: u64) -> IrResult<InstId> {
        self.mode()?;
        let imm = Self::imm(first, BitWidth::W8)?;
        self.build(Self::op(DynamicOpcode::Copyrestargs, TypeId::Any).imm(imm))
    }

    pub fn create_wide_copyrestargs(&mut self, first: u64) -> IrResult<InstId> {
        self.mode()?;
        let imm = Self::imm(first, BitWidth::W16)?;
        self.build(Self::op(DynamicOpcode::WideCopyrestargs, TypeId::Any).imm(imm))
    }

    /// Load external module variable number `index`
    pub fn create_ldexternalmodulevar(&mut self, index: u64) -> IrResult<InstId> {
        self.mode()?;
        let imm = Self::imm(index, BitWidth::W8)?;
        self.build(Self::op(DynamicOpcode::Ldexternalmodulevar, TypeId::Any).imm(imm))
    }

    pub fn create_wide_ldexternalmodulevar(&mut self, index: u64) -> IrResult<InstId> {
        self.mode()?;
        let imm = Self::imm(index, BitWidth::W16)?;
        self.build(Self::op(DynamicOpcode::WideLdexternalmodulevar, TypeId::Any).imm(imm))
    }

    // ========================================================================
    // Property access
    // ========================================================================

    pub fn create_ldobjbyindex(&mut self, acc: InstId, index: u64) -> IrResult<InstId> {
        self.by_index(DynamicOpcode::Ldobjbyindex, TypeId::Any, &[acc], index, BitWidth::W16)
    }

    pub fn create_wide_ldobjbyindex(&mut self, acc: InstId, index: u64) -> IrResult<InstId> {
        self.by_index(DynamicOpcode::WideLdobjbyindex, TypeId::Any, &[acc], index, BitWidth::W32)
    }

    /// Store `acc` into `object[index]`
    pub fn create_stobjbyindex(
        &mut self,
        acc: InstId,
        object: InstId,
        index: u64,
    ) -> IrResult<InstId> {
        self.by_index(DynamicOpcode::Stobjbyindex, TypeId::Void, &[acc, object], index, BitWidth::W16)
    }

    pub fn create_wide_stobjbyindex(
        &mut self,
        acc: InstId,
        object: InstId,
        index: u64,
    ) -> IrResult<InstId> {
        self.by_index(
            DynamicOpcode::WideStobjbyindex,
            TypeId::Void,
            &[acc, object],
            index,
            BitWidth::W32,
        )
    }

    fn by_index(
        &mut self,
        op: DynamicOpcode,
        ty: TypeId,
        inputs: &[InstId],
        index: u64,
        width: BitWidth,
    ) -> IrResult<InstId> {
        self.mode()?;
        let imm = Self::imm(index, width)?;
        self.build(Self::op(op, ty).inputs(inputs).imm(imm))
    }

    pub fn create_tryldglobalbyname(&mut self, name: StringRef) -> IrResult<InstId> {
        self.build(
            Self::op(DynamicOpcode::Tryldglobalbyname, TypeId::Any).operands(Self::string(name)),
        )
    }

    pub fn create_ldglobalvar(&mut self, name: StringRef) -> IrResult<InstId> {
        self.build(Self::op(DynamicOpcode::Ldglobalvar, TypeId::Any).operands(Self::string(name)))
    }

    string_ops! {
        create_trystglobalbyname => Trystglobalbyname: Void,
        create_stglobalvar => Stglobalvar: Void,
        create_ldobjbyname => Ldobjbyname: Any,
    }

    /// Store `acc` into `object.name`
    pub fn create_stobjbyname(
        &mut self,
        acc: InstId,
        name: StringRef,
        object: InstId,
    ) -> IrResult<InstId> {
        self.build(
            Self::op(DynamicOpcode::Stobjbyname, TypeId::Void)
                .inputs(&[acc, object])
                .operands(Self::string(name)),
        )
    }

    // ========================================================================
    // Literal buffers and definitions
    // ========================================================================

    pub fn create_createarraywithbuffer(&mut self, literals: LiteralArray) -> IrResult<InstId> {
        self.build(
            Self::op(DynamicOpcode::Createarraywithbuffer, TypeId::Any)
                .operands(Self::literals(literals)),
        )
    }

    pub fn create_createobjectwithbuffer(&mut self, literals: LiteralArray) -> IrResult<InstId> {
        self.build(
            Self::op(DynamicOpcode::Createobjectwithbuffer, TypeId::Any)
                .operands(Self::literals(literals)),
        )
    }

    /// Closure over `function` taking `params` parameters
    pub fn create_definefunc(&mut self, function: Function, params: u64) -> IrResult<InstId> {
        self.mode()?;
        let imm = Self::imm(params, BitWidth::W8)?;
        let operands = Operands {
            function: Some(function),
            ..Operands::default()
        };
        self.build(
            Self::op(DynamicOpcode::Definefunc, TypeId::Any)
                .imm(imm)
                .operands(operands),
        )
    }

    /// Class with constructor `function`, members from `literals`, extending `parent`
    pub fn create_defineclasswithbuffer(
        &mut self,
        function: Function,
        literals: LiteralArray,
        params: u64,
        parent: InstId,
    ) -> IrResult<InstId> {
        self.mode()?;
        let imm = Self::imm(params, BitWidth::W16)?;
        let operands = Operands {
            function: Some(function),
            literal_array: Some(literals),
            ..Operands::default()
        };
        self.build(
            Self::op(DynamicOpcode::Defineclasswithbuffer, TypeId::Any)
                .inputs(&[parent])
                .imm(imm)
                .operands(operands),
        )
    }

    // ========================================================================
    // Calls
    // ========================================================================

    pub fn create_callarg0(&mut self, callee: InstId) -> IrResult<InstId> {
        self.call(DynamicOpcode::Callarg0, &[callee])
    }

    pub fn create_callarg1(&mut self, callee: InstId, arg: InstId) -> IrResult<InstId> {
        self.call(DynamicOpcode::Callarg1, &[callee, arg])
    }

    pub fn create_callargs2(&mut self, callee: InstId, a: InstId, b: InstId) -> IrResult<InstId> {
        self.call(DynamicOpcode::Callargs2, &[callee, a, b])
    }

    pub fn create_callargs3(
        &mut self,
        callee: InstId,
        a: InstId,
        b: InstId,
        c: InstId,
    ) -> IrResult<InstId> {
        self.call(DynamicOpcode::Callargs3, &[callee, a, b, c])
    }

    pub fn create_callthis0(&mut self, callee: InstId, this: InstId) -> IrResult<InstId> {
        self.call(DynamicOpcode::Callthis0, &[callee, this])
    }

    pub fn create_callthis1(&mut self, callee: InstId, this: InstId, a: InstId) -> IrResult<InstId> {
        self.call(DynamicOpcode::Callthis1, &[callee, this, a])
    }

    pub fn create_callthis2(
        &mut self,
        callee: InstId,
        this: InstId,
        a: InstId,
        b: InstId,
    ) -> IrResult<InstId> {
        self.call(DynamicOpcode::Callthis2, &[callee, this, a, b])
    }

    pub fn create_callthis3(
        &mut self,
        callee: InstId,
        this: InstId,
        a: InstId,
        b: InstId,
        c: InstId,
    ) -> IrResult<InstId> {
        self.call(DynamicOpcode::Callthis3, &[callee, this, a, b, c])
    }

    /// Call `callee` with `args`; the argument count is encoded in 8 bits
    pub fn create_callrange(&mut self, callee: InstId, args: &[InstId]) -> IrResult<InstId> {
        self.range(DynamicOpcode::Callrange, Some(callee), args, BitWidth::W8)
    }

    pub fn create_wide_callrange(&mut self, callee: InstId, args: &[InstId]) -> IrResult<InstId> {
        self.range(DynamicOpcode::WideCallrange, Some(callee), args, BitWidth::W16)
    }

    /// Construct `inputs[0]` with the remaining inputs as arguments
    pub fn create_newobjrange(&mut self, inputs: &[InstId]) -> IrResult<InstId> {
        self.range(DynamicOpcode::Newobjrange, None, inputs, BitWidth::W8)
    }

    pub fn create_wide_newobjrange(&mut self, inputs: &[InstId]) -> IrResult<InstId> {
        self.range(DynamicOpcode::WideNewobjrange, None, inputs, BitWidth::W16)
    }

    fn call(&mut self, op: DynamicOpcode, inputs: &[InstId]) -> IrResult<InstId> {
        self.build(Self::op(op, TypeId::Any).inputs(inputs))
    }

    fn range(
        &mut self,
        op: DynamicOpcode,
        callee: Option<InstId>,
        args: &[InstId],
        width: BitWidth,
    ) -> IrResult<InstId> {
        self.mode()?;
        if callee.is_none() && args.is_empty() {
            return Err(IrError::bad_argument("range needs at least a constructor"));
        }
        let count = Self::imm(args.len() as u64, width)?;
        let mut inputs = Vec::with_capacity(args.len() + 1);
        inputs.extend(callee);
        inputs.extend_from_slice(args);
        self.build(Self::op(op, TypeId::Any).inputs(&inputs).imm(count))
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    /// Branch on `input <cc> false`; only `Eq` and `Ne` are encodable
    pub fn create_if(&mut self, input: InstId, cc: ConditionCode) -> IrResult<InstId> {
        self.mode()?;
        check_cc(cc)?;
        self.build(
            Self::op(DynamicOpcode::If, TypeId::Void)
                .inputs(&[input])
                .cc(cc),
        )
    }
}

fn check_cc(cc: ConditionCode) -> IrResult<()> {
    match cc {
        ConditionCode::Eq | ConditionCode::Ne => Ok(()),
        other => Err(IrError::bad_argument(format!(
            "condition code {} is not supported by the dynamic if",
            other.name()
        ))),
    }
}
