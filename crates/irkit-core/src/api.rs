//! Versioned capability tables
//!
//! Each table groups the operations of one area (graph, block, instruction, one ISA
//! family) as plain function pointers. A table is obtained once per version tag and
//! lives for the whole program; an unknown tag yields `UnknownApiVersion`.

use crate::error::{IrError, IrResult};
use crate::file::{Class, Field, Function, LiteralArray, StringRef};
use crate::ir::{
    BitWidth, BlockFlags, BlockId, ConditionCode, Graph, InstId, IsaKind, Op, TypeId,
    VerifyError,
};
use crate::isa::{DynamicOpcode, StaticOpcode};
use std::io;
use tracing::trace;

/// Capability table version tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ApiVersion {
    V1 = 1,
}

impl ApiVersion {
    pub const LATEST: ApiVersion = ApiVersion::V1;

    pub fn from_tag(tag: u32) -> IrResult<Self> {
        match tag {
            1 => Ok(ApiVersion::V1),
            other => Err(IrError::UnknownApiVersion(other)),
        }
    }

    pub fn tag(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for ApiVersion {
    type Error = IrError;

    fn try_from(tag: u32) -> IrResult<Self> {
        ApiVersion::from_tag(tag)
    }
}

// ============================================================================
// Graph
// ============================================================================

/// Graph-level operations
pub struct GraphApi {
    pub isa: fn(&Graph) -> IsaKind,
    pub start_block: fn(&Graph) -> BlockId,
    pub end_block: fn(&Graph) -> BlockId,
    pub block_count: fn(&Graph) -> usize,
    pub block_by_id: fn(&Graph, u32) -> IrResult<BlockId>,
    pub parameter_count: fn(&Graph) -> usize,
    pub parameter: fn(&Graph, usize) -> IrResult<InstId>,
    pub visit_blocks_rpo: fn(&Graph, &mut dyn FnMut(BlockId) -> bool) -> bool,
    pub create_empty_block: fn(&mut Graph) -> BlockId,
    pub find_or_create_constant_i32: fn(&mut Graph, i32) -> InstId,
    pub find_or_create_constant_i64: fn(&mut Graph, i64) -> InstId,
    pub find_or_create_constant_u64: fn(&mut Graph, u64) -> InstId,
    pub find_or_create_constant_f64: fn(&mut Graph, f64) -> InstId,
    pub insert_try_catch: fn(&mut Graph, BlockId, BlockId, BlockId, BlockId) -> IrResult<()>,
    pub remove_unreachable_blocks: fn(&mut Graph) -> usize,
    pub verify: fn(&Graph) -> Result<(), VerifyError>,
    pub render: fn(&Graph) -> String,
    pub dump: fn(&Graph, &mut dyn io::Write) -> io::Result<()>,
}

static GRAPH_API_V1: GraphApi = GraphApi {
    isa: |g| g.isa(),
    start_block: |g| g.start_block(),
    end_block: |g| g.end_block(),
    block_count: |g| g.block_count(),
    block_by_id: |g, id| g.block_by_id(id),
    parameter_count: |g| g.parameter_count(),
    parameter: |g, index| g.parameter(index),
    visit_blocks_rpo: |g, visit| g.visit_blocks_rpo(visit),
    create_empty_block: |g| g.create_empty_block(),
    find_or_create_constant_i32: |g, v| g.find_or_create_constant_i32(v),
    find_or_create_constant_i64: |g, v| g.find_or_create_constant_i64(v),
    find_or_create_constant_u64: |g, v| g.find_or_create_constant_u64(v),
    find_or_create_constant_f64: |g, v| g.find_or_create_constant_f64(v),
    insert_try_catch: |g, first, last, catch_begin, catch_end| {
        g.insert_try_catch(first, last, catch_begin, catch_end)
    },
    remove_unreachable_blocks: |g| g.remove_unreachable_blocks(),
    verify: |g| g.verify(),
    render: |g| g.render(Default::default()),
    dump: |g, sink| g.dump(sink),
};

pub fn graph_api(tag: u32) -> IrResult<&'static GraphApi> {
    match ApiVersion::from_tag(tag)? {
        ApiVersion::V1 => {
            trace!(tag, "graph api");
            Ok(&GRAPH_API_V1)
        }
    }
}

// ============================================================================
// Block
// ============================================================================

/// Basic block operations
pub struct BlockApi {
    pub successor_count: fn(&Graph, BlockId) -> IrResult<usize>,
    pub successor: fn(&Graph, BlockId, usize) -> IrResult<BlockId>,
    pub predecessor_count: fn(&Graph, BlockId) -> IrResult<usize>,
    pub predecessor: fn(&Graph, BlockId, usize) -> IrResult<BlockId>,
    pub visit_successors: fn(&Graph, BlockId, &mut dyn FnMut(BlockId) -> bool) -> IrResult<bool>,
    pub visit_predecessors: fn(&Graph, BlockId, &mut dyn FnMut(BlockId) -> bool) -> IrResult<bool>,
    pub insert_successor: fn(&mut Graph, BlockId, BlockId, usize) -> IrResult<()>,
    pub append_successor: fn(&mut Graph, BlockId, BlockId) -> IrResult<()>,
    pub disconnect_successor: fn(&mut Graph, BlockId, usize) -> IrResult<()>,
    pub true_branch: fn(&Graph, BlockId) -> IrResult<BlockId>,
    pub false_branch: fn(&Graph, BlockId) -> IrResult<BlockId>,
    pub add_instruction_front: fn(&mut Graph, BlockId, InstId) -> IrResult<()>,
    pub add_instruction_back: fn(&mut Graph, BlockId, InstId) -> IrResult<()>,
    pub remove_all_instructions: fn(&mut Graph, BlockId) -> IrResult<()>,
    pub first_instruction: fn(&Graph, BlockId) -> IrResult<Option<InstId>>,
    pub last_instruction: fn(&Graph, BlockId) -> IrResult<Option<InstId>>,
    pub instruction_count: fn(&Graph, BlockId) -> IrResult<usize>,
    pub visit_instructions: fn(&Graph, BlockId, &mut dyn FnMut(InstId) -> bool) -> IrResult<bool>,
    pub split_block_after: fn(&mut Graph, BlockId, InstId, bool) -> IrResult<BlockId>,
    pub immediate_dominator: fn(&Graph, BlockId) -> IrResult<Option<BlockId>>,
    pub dominates: fn(&Graph, BlockId, BlockId) -> IrResult<bool>,
    pub visit_dominated: fn(&Graph, BlockId, &mut dyn FnMut(BlockId) -> bool) -> IrResult<bool>,
    pub is_loop_head: fn(&Graph, BlockId) -> IrResult<bool>,
    pub is_loop_prehead: fn(&Graph, BlockId) -> IrResult<bool>,
    pub flags: fn(&Graph, BlockId) -> IrResult<BlockFlags>,
    pub create_phi: fn(&mut Graph, BlockId, &[InstId]) -> IrResult<InstId>,
    pub create_catch_phi: fn(&mut Graph, BlockId, &[InstId]) -> IrResult<InstId>,
}

static BLOCK_API_V1: BlockApi = BlockApi {
    successor_count: |g, bb| g.successor_count(bb),
    successor: |g, bb, i| g.successor(bb, i),
    predecessor_count: |g, bb| g.predecessor_count(bb),
    predecessor: |g, bb, i| g.predecessor(bb, i),
    visit_successors: |g, bb, visit| g.visit_successors(bb, visit),
    visit_predecessors: |g, bb, visit| g.visit_predecessors(bb, visit),
    insert_successor: |g, bb, succ, i| g.insert_successor(bb, succ, i),
    append_successor: |g, bb, succ| g.append_successor(bb, succ),
    disconnect_successor: |g, bb, i| g.disconnect_successor(bb, i),
    true_branch: |g, bb| g.true_branch(bb),
    false_branch: |g, bb| g.false_branch(bb),
    add_instruction_front: |g, bb, inst| g.add_instruction_front(bb, inst),
    add_instruction_back: |g, bb, inst| g.add_instruction_back(bb, inst),
    remove_all_instructions: |g, bb| g.remove_all_instructions(bb),
    first_instruction: |g, bb| g.first_instruction(bb),
    last_instruction: |g, bb| g.last_instruction(bb),
    instruction_count: |g, bb| g.instruction_count(bb),
    visit_instructions: |g, bb, visit| g.visit_instructions(bb, visit),
    split_block_after: |g, bb, inst, make_edge| g.split_block_after(bb, inst, make_edge),
    immediate_dominator: |g, bb| g.immediate_dominator(bb),
    dominates: |g, dom, bb| g.block_dominates(dom, bb),
    visit_dominated: |g, bb, visit| g.visit_dominated(bb, visit),
    is_loop_head: |g, bb| g.is_loop_head(bb),
    is_loop_prehead: |g, bb| g.is_loop_prehead(bb),
    flags: |g, bb| g.block_flags(bb),
    create_phi: |g, bb, inputs| g.create_phi(bb, inputs),
    create_catch_phi: |g, bb, inputs| g.create_catch_phi(bb, inputs),
};

pub fn block_api(tag: u32) -> IrResult<&'static BlockApi> {
    match ApiVersion::from_tag(tag)? {
        ApiVersion::V1 => {
            trace!(tag, "block api");
            Ok(&BLOCK_API_V1)
        }
    }
}

// ============================================================================
// Instruction
// ============================================================================

/// Instruction operations shared by both families
pub struct InstApi {
    pub block: fn(&Graph, InstId) -> IrResult<Option<BlockId>>,
    pub next: fn(&Graph, InstId) -> IrResult<Option<InstId>>,
    pub prev: fn(&Graph, InstId) -> IrResult<Option<InstId>>,
    pub insert_before: fn(&mut Graph, InstId, InstId) -> IrResult<()>,
    pub insert_after: fn(&mut Graph, InstId, InstId) -> IrResult<()>,
    pub remove: fn(&mut Graph, InstId) -> IrResult<()>,
    pub op: fn(&Graph, InstId) -> IrResult<Op>,
    pub result_type: fn(&Graph, InstId) -> IrResult<TypeId>,
    pub input_count: fn(&Graph, InstId) -> IrResult<usize>,
    pub input: fn(&Graph, InstId, usize) -> IrResult<InstId>,
    pub set_input: fn(&mut Graph, InstId, usize, InstId) -> IrResult<()>,
    pub set_inputs: fn(&mut Graph, InstId, &[InstId]) -> IrResult<()>,
    pub append_input: fn(&mut Graph, InstId, InstId) -> IrResult<()>,
    pub visit_inputs: fn(&Graph, InstId, &mut dyn FnMut(InstId) -> bool) -> IrResult<bool>,
    pub user_count: fn(&Graph, InstId) -> IrResult<usize>,
    pub visit_users: fn(&Graph, InstId, &mut dyn FnMut(InstId) -> bool) -> IrResult<bool>,
    pub function: fn(&Graph, InstId) -> IrResult<Function>,
    pub set_function: fn(&mut Graph, InstId, Function) -> IrResult<()>,
    pub string: fn(&Graph, InstId) -> IrResult<StringRef>,
    pub set_string: fn(&mut Graph, InstId, StringRef) -> IrResult<()>,
    pub literal_array: fn(&Graph, InstId) -> IrResult<LiteralArray>,
    pub set_literal_array: fn(&mut Graph, InstId, LiteralArray) -> IrResult<()>,
    pub class: fn(&Graph, InstId) -> IrResult<Class>,
    pub set_class: fn(&mut Graph, InstId, Class) -> IrResult<()>,
    pub field: fn(&Graph, InstId) -> IrResult<Field>,
    pub set_field: fn(&mut Graph, InstId, Field) -> IrResult<()>,
    pub immediate_count: fn(&Graph, InstId) -> IrResult<usize>,
    pub immediate: fn(&Graph, InstId, usize) -> IrResult<u64>,
    pub immediate_size: fn(&Graph, InstId, usize) -> IrResult<BitWidth>,
    pub set_immediate: fn(&mut Graph, InstId, usize, u64) -> IrResult<()>,
    pub constant_i32: fn(&Graph, InstId) -> IrResult<i32>,
    pub constant_i64: fn(&Graph, InstId) -> IrResult<i64>,
    pub constant_u64: fn(&Graph, InstId) -> IrResult<u64>,
    pub constant_f64: fn(&Graph, InstId) -> IrResult<f64>,
    pub is_call: fn(&Graph, InstId) -> IrResult<bool>,
    pub dominates: fn(&Graph, InstId, InstId) -> IrResult<bool>,
}

static INST_API_V1: InstApi = InstApi {
    block: |g, i| g.inst_block(i),
    next: |g, i| g.next(i),
    prev: |g, i| g.prev(i),
    insert_before: |g, new, reference| g.insert_before(new, reference),
    insert_after: |g, new, reference| g.insert_after(new, reference),
    remove: |g, i| g.remove(i),
    op: |g, i| g.op(i),
    result_type: |g, i| g.result_type(i),
    input_count: |g, i| g.input_count(i),
    input: |g, i, index| g.input(i, index),
    set_input: |g, i, index, value| g.set_input(i, index, value),
    set_inputs: |g, i, values| g.set_inputs(i, values),
    append_input: |g, i, value| g.append_input(i, value),
    visit_inputs: |g, i, visit| g.visit_inputs(i, visit),
    user_count: |g, i| g.user_count(i),
    visit_users: |g, i, visit| g.visit_users(i, visit),
    function: |g, i| g.function_operand(i),
    set_function: |g, i, f| g.set_function_operand(i, f),
    string: |g, i| g.string_operand(i),
    set_string: |g, i, s| g.set_string_operand(i, s),
    literal_array: |g, i| g.literal_array_operand(i),
    set_literal_array: |g, i, a| g.set_literal_array_operand(i, a),
    class: |g, i| g.class_operand(i),
    set_class: |g, i, c| g.set_class_operand(i, c),
    field: |g, i| g.field_operand(i),
    set_field: |g, i, f| g.set_field_operand(i, f),
    immediate_count: |g, i| g.immediate_count(i),
    immediate: |g, i, index| g.immediate(i, index),
    immediate_size: |g, i, index| g.immediate_size(i, index),
    set_immediate: |g, i, index, value| g.set_immediate(i, index, value),
    constant_i32: |g, i| g.constant_i32(i),
    constant_i64: |g, i| g.constant_i64(i),
    constant_u64: |g, i| g.constant_u64(i),
    constant_f64: |g, i| g.constant_f64(i),
    is_call: |g, i| g.is_call(i),
    dominates: |g, dom, i| g.inst_dominates(dom, i),
};

pub fn inst_api(tag: u32) -> IrResult<&'static InstApi> {
    match ApiVersion::from_tag(tag)? {
        ApiVersion::V1 => {
            trace!(tag, "instruction api");
            Ok(&INST_API_V1)
        }
    }
}

// ============================================================================
// ISA families
// ============================================================================

type Binary = fn(&mut Graph, InstId, InstId) -> IrResult<InstId>;
type Unary = fn(&mut Graph, InstId) -> IrResult<InstId>;
type Nullary = fn(&mut Graph) -> IrResult<InstId>;
type Ternary = fn(&mut Graph, InstId, InstId, InstId) -> IrResult<InstId>;
type Immediate = fn(&mut Graph, u64) -> IrResult<InstId>;

/// Static-family operations
pub struct StaticIsaApi {
    pub opcode: fn(&mut Graph, InstId) -> IrResult<StaticOpcode>,
    pub condition_code: fn(&mut Graph, InstId) -> IrResult<ConditionCode>,
    pub set_condition_code: fn(&mut Graph, InstId, ConditionCode) -> IrResult<()>,
    pub type_id: fn(&mut Graph, InstId) -> IrResult<TypeId>,
    pub target_type: fn(&mut Graph, InstId) -> IrResult<TypeId>,
    pub set_target_type: fn(&mut Graph, InstId, TypeId) -> IrResult<()>,
    pub create_load_string: fn(&mut Graph, StringRef) -> IrResult<InstId>,
    pub create_cmp: Binary,
    pub create_if: fn(&mut Graph, InstId, InstId, ConditionCode) -> IrResult<InstId>,
    pub create_return: Unary,
    pub create_return_void: Nullary,
    pub create_throw: Unary,
    pub create_neg: Unary,
    pub create_not: Unary,
    pub create_add: Binary,
    pub create_sub: Binary,
    pub create_mul: Binary,
    pub create_div: Binary,
    pub create_mod: Binary,
    pub create_shl: Binary,
    pub create_shr: Binary,
    pub create_ashr: Binary,
    pub create_and: Binary,
    pub create_or: Binary,
    pub create_xor: Binary,
    pub create_add_i: fn(&mut Graph, InstId, u64) -> IrResult<InstId>,
    pub create_sub_i: fn(&mut Graph, InstId, u64) -> IrResult<InstId>,
    pub create_mul_i: fn(&mut Graph, InstId, u64) -> IrResult<InstId>,
    pub create_cast: fn(&mut Graph, InstId, TypeId) -> IrResult<InstId>,
    pub create_is_instance: fn(&mut Graph, InstId, Class) -> IrResult<InstId>,
    pub create_check_cast: fn(&mut Graph, InstId, Class) -> IrResult<InstId>,
    pub create_null_ptr: Nullary,
    pub create_new_array: fn(&mut Graph, Class, InstId) -> IrResult<InstId>,
    pub create_new_object: fn(&mut Graph, Class) -> IrResult<InstId>,
    pub create_init_object: fn(&mut Graph, Function, &[InstId]) -> IrResult<InstId>,
    pub create_load_array: fn(&mut Graph, InstId, InstId, TypeId) -> IrResult<InstId>,
    pub create_store_array: fn(&mut Graph, InstId, InstId, InstId, TypeId) -> IrResult<InstId>,
    pub create_len_array: Unary,
    pub create_load_const_array: fn(&mut Graph, LiteralArray) -> IrResult<InstId>,
    pub create_load_object: fn(&mut Graph, InstId, Field) -> IrResult<InstId>,
    pub create_store_object: fn(&mut Graph, InstId, Field, InstId) -> IrResult<InstId>,
    pub create_load_static: fn(&mut Graph, Field) -> IrResult<InstId>,
    pub create_store_static: fn(&mut Graph, Field, InstId) -> IrResult<InstId>,
    pub create_call_static: fn(&mut Graph, Function, &[InstId]) -> IrResult<InstId>,
    pub create_call_virtual: fn(&mut Graph, Function, InstId, &[InstId]) -> IrResult<InstId>,
    pub create_equals: Binary,
    pub create_load_undefined: Nullary,
    pub create_is_undefined: Unary,
}

static STATIC_ISA_API_V1: StaticIsaApi = StaticIsaApi {
    opcode: |g, i| g.static_isa().opcode(i),
    condition_code: |g, i| g.static_isa().condition_code(i),
    set_condition_code: |g, i, cc| g.static_isa().set_condition_code(i, cc),
    type_id: |g, i| g.static_isa().type_id(i),
    target_type: |g, i| g.static_isa().target_type(i),
    set_target_type: |g, i, ty| g.static_isa().set_target_type(i, ty),
    create_load_string: |g, s| g.static_isa().create_load_string(s),
    create_cmp: |g, a, b| g.static_isa().create_cmp(a, b),
    create_if: |g, a, b, cc| g.static_isa().create_if(a, b, cc),
    create_return: |g, v| g.static_isa().create_return(v),
    create_return_void: |g| g.static_isa().create_return_void(),
    create_throw: |g, v| g.static_isa().create_throw(v),
    create_neg: |g, v| g.static_isa().create_neg(v),
    create_not: |g, v| g.static_isa().create_not(v),
    create_add: |g, a, b| g.static_isa().create_add(a, b),
    create_sub: |g, a, b| g.static_isa().create_sub(a, b),
    create_mul: |g, a, b| g.static_isa().create_mul(a, b),
    create_div: |g, a, b| g.static_isa().create_div(a, b),
    create_mod: |g, a, b| g.static_isa().create_mod(a, b),
    create_shl: |g, a, b| g.static_isa().create_shl(a, b),
    create_shr: |g, a, b| g.static_isa().create_shr(a, b),
    create_ashr: |g, a, b| g.static_isa().create_ashr(a, b),
    create_and: |g, a, b| g.static_isa().create_and(a, b),
    create_or: |g, a, b| g.static_isa().create_or(a, b),
    create_xor: |g, a, b| g.static_isa().create_xor(a, b),
    create_add_i: |g, v, imm| g.static_isa().create_add_i(v, imm),
    create_sub_i: |g, v, imm| g.static_isa().create_sub_i(v, imm),
    create_mul_i: |g, v, imm| g.static_isa().create_mul_i(v, imm),
    create_cast: |g, v, ty| g.static_isa().create_cast(v, ty),
    create_is_instance: |g, v, c| g.static_isa().create_is_instance(v, c),
    create_check_cast: |g, v, c| g.static_isa().create_check_cast(v, c),
    create_null_ptr: |g| g.static_isa().create_null_ptr(),
    create_new_array: |g, c, len| g.static_isa().create_new_array(c, len),
    create_new_object: |g, c| g.static_isa().create_new_object(c),
    create_init_object: |g, f, args| g.static_isa().create_init_object(f, args),
    create_load_array: |g, a, i, ty| g.static_isa().create_load_array(a, i, ty),
    create_store_array: |g, a, i, v, ty| g.static_isa().create_store_array(a, i, v, ty),
    create_len_array: |g, a| g.static_isa().create_len_array(a),
    create_load_const_array: |g, lit| g.static_isa().create_load_const_array(lit),
    create_load_object: |g, o, f| g.static_isa().create_load_object(o, f),
    create_store_object: |g, o, f, v| g.static_isa().create_store_object(o, f, v),
    create_load_static: |g, f| g.static_isa().create_load_static(f),
    create_store_static: |g, f, v| g.static_isa().create_store_static(f, v),
    create_call_static: |g, f, args| g.static_isa().create_call_static(f, args),
    create_call_virtual: |g, f, recv, args| g.static_isa().create_call_virtual(f, recv, args),
    create_equals: |g, a, b| g.static_isa().create_equals(a, b),
    create_load_undefined: |g| g.static_isa().create_load_undefined(),
    create_is_undefined: |g, v| g.static_isa().create_is_undefined(v),
};

pub fn static_isa_api(tag: u32) -> IrResult<&'static StaticIsaApi> {
    match ApiVersion::from_tag(tag)? {
        ApiVersion::V1 => {
            trace!(tag, "static isa api");
            Ok(&STATIC_ISA_API_V1)
        }
    }
}

/// Dynamic-family operations
pub struct DynamicIsaApi {
    pub opcode: fn(&mut Graph, InstId) -> IrResult<DynamicOpcode>,
    pub condition_code: fn(&mut Graph, InstId) -> IrResult<ConditionCode>,
    pub set_condition_code: fn(&mut Graph, InstId, ConditionCode) -> IrResult<()>,
    pub create_load_string: fn(&mut Graph, StringRef) -> IrResult<InstId>,
    pub create_ldnan: Nullary,
    pub create_ldinfinity: Nullary,
    pub create_ldundefined: Nullary,
    pub create_ldnull: Nullary,
    pub create_ldsymbol: Nullary,
    pub create_ldglobal: Nullary,
    pub create_ldtrue: Nullary,
    pub create_ldfalse: Nullary,
    pub create_ldhole: Nullary,
    pub create_ldnewtarget: Nullary,
    pub create_ldthis: Nullary,
    pub create_ldfunction: Nullary,
    pub create_poplexenv: Nullary,
    pub create_getunmappedargs: Nullary,
    pub create_debugger: Nullary,
    pub create_createemptyobject: Nullary,
    pub create_createemptyarray: Nullary,
    pub create_returnundefined: Nullary,
    pub create_add2: Binary,
    pub create_sub2: Binary,
    pub create_mul2: Binary,
    pub create_div2: Binary,
    pub create_mod2: Binary,
    pub create_eq: Binary,
    pub create_noteq: Binary,
    pub create_less: Binary,
    pub create_lesseq: Binary,
    pub create_greater: Binary,
    pub create_greatereq: Binary,
    pub create_shl2: Binary,
    pub create_shr2: Binary,
    pub create_ashr2: Binary,
    pub create_and2: Binary,
    pub create_or2: Binary,
    pub create_xor2: Binary,
    pub create_exp: Binary,
    pub create_isin: Binary,
    pub create_instanceof: Binary,
    pub create_stricteq: Binary,
    pub create_strictnoteq: Binary,
    pub create_delobjprop: Binary,
    pub create_ldobjbyvalue: Binary,
    pub create_typeof: Unary,
    pub create_tonumber: Unary,
    pub create_tonumeric: Unary,
    pub create_neg: Unary,
    pub create_not: Unary,
    pub create_inc: Unary,
    pub create_dec: Unary,
    pub create_istrue: Unary,
    pub create_isfalse: Unary,
    pub create_getpropiterator: Unary,
    pub create_getiterator: Unary,
    pub create_getasynciterator: Unary,
    pub create_creategeneratorobj: Unary,
    pub create_throw: Unary,
    pub create_throw_ifnotobject: Unary,
    pub create_return: Unary,
    pub create_stobjbyvalue: Ternary,
    pub create_newlexenv: Immediate,
    pub create_wide_newlexenv: Immediate,
    pub create_ldlexvar: fn(&mut Graph, u64, u64) -> IrResult<InstId>,
    pub create_wide_ldlexvar: fn(&mut Graph, u64, u64) -> IrResult<InstId>,
    pub create_stlexvar: fn(&mut Graph, InstId, u64, u64) -> IrResult<InstId>,
    pub create_wide_stlexvar: fn(&mut Graph, InstId, u64, u64) -> IrResult<InstId>,
    pub create_copyrestargs: Immediate,
    pub create_wide_copyrestargs: Immediate,
    pub create_ldexternalmodulevar: Immediate,
    pub create_wide_ldexternalmodulevar: Immediate,
    pub create_ldobjbyindex: fn(&mut Graph, InstId, u64) -> IrResult<InstId>,
    pub create_wide_ldobjbyindex: fn(&mut Graph, InstId, u64) -> IrResult<InstId>,
    pub create_stobjbyindex: fn(&mut Graph, InstId, InstId, u64) -> IrResult<InstId>,
    pub create_wide_stobjbyindex: fn(&mut Graph, InstId, InstId, u64) -> IrResult<InstId>,
    pub create_tryldglobalbyname: fn(&mut Graph, StringRef) -> IrResult<InstId>,
    pub create_ldglobalvar: fn(&mut Graph, StringRef) -> IrResult<InstId>,
    pub create_trystglobalbyname: fn(&mut Graph, InstId, StringRef) -> IrResult<InstId>,
    pub create_stglobalvar: fn(&mut Graph, InstId, StringRef) -> IrResult<InstId>,
    pub create_ldobjbyname: fn(&mut Graph, InstId, StringRef) -> IrResult<InstId>,
    pub create_stobjbyname: fn(&mut Graph, InstId, StringRef, InstId) -> IrResult<InstId>,
    pub create_createarraywithbuffer: fn(&mut Graph, LiteralArray) -> IrResult<InstId>,
    pub create_createobjectwithbuffer: fn(&mut Graph, LiteralArray) -> IrResult<InstId>,
    pub create_definefunc: fn(&mut Graph, Function, u64) -> IrResult<InstId>,
    pub create_defineclasswithbuffer:
        fn(&mut Graph, Function, LiteralArray, u64, InstId) -> IrResult<InstId>,
    pub create_callarg0: Unary,
    pub create_callarg1: Binary,
    pub create_callargs2: Ternary,
    pub create_callargs3: fn(&mut Graph, InstId, InstId, InstId, InstId) -> IrResult<InstId>,
    pub create_callthis0: Binary,
    pub create_callthis1: Ternary,
    pub create_callthis2: fn(&mut Graph, InstId, InstId, InstId, InstId) -> IrResult<InstId>,
    pub create_callthis3:
        fn(&mut Graph, InstId, InstId, InstId, InstId, InstId) -> IrResult<InstId>,
    pub create_callrange: fn(&mut Graph, InstId, &[InstId]) -> IrResult<InstId>,
    pub create_wide_callrange: fn(&mut Graph, InstId, &[InstId]) -> IrResult<InstId>,
    pub create_newobjrange: fn(&mut Graph, &[InstId]) -> IrResult<InstId>,
    pub create_wide_newobjrange: fn(&mut Graph, &[InstId]) -> IrResult<InstId>,
    pub create_if: fn(&mut Graph, InstId, ConditionCode) -> IrResult<InstId>,
}

static DYNAMIC_ISA_API_V1: DynamicIsaApi = DynamicIsaApi {
    opcode: |g, i| g.dynamic_isa().opcode(i),
    condition_code: |g, i| g.dynamic_isa().condition_code(i),
    set_condition_code: |g, i, cc| g.dynamic_isa().set_condition_code(i, cc),
    create_load_string: |g, s| g.dynamic_isa().create_load_string(s),
    create_ldnan: |g| g.dynamic_isa().create_ldnan(),
    create_ldinfinity: |g| g.dynamic_isa().create_ldinfinity(),
    create_ldundefined: |g| g.dynamic_isa().create_ldundefined(),
    create_ldnull: |g| g.dynamic_isa().create_ldnull(),
    create_ldsymbol: |g| g.dynamic_isa().create_ldsymbol(),
    create_ldglobal: |g| g.dynamic_isa().create_ldglobal(),
    create_ldtrue: |g| g.dynamic_isa().create_ldtrue(),
    create_ldfalse: |g| g.dynamic_isa().create_ldfalse(),
    create_ldhole: |g| g.dynamic_isa().create_ldhole(),
    create_ldnewtarget: |g| g.dynamic_isa().create_ldnewtarget(),
    create_ldthis: |g| g.dynamic_isa().create_ldthis(),
    create_ldfunction: |g| g.dynamic_isa().create_ldfunction(),
    create_poplexenv: |g| g.dynamic_isa().create_poplexenv(),
    create_getunmappedargs: |g| g.dynamic_isa().create_getunmappedargs(),
    create_debugger: |g| g.dynamic_isa().create_debugger(),
    create_createemptyobject: |g| g.dynamic_isa().create_createemptyobject(),
    create_createemptyarray: |g| g.dynamic_isa().create_createemptyarray(),
    create_returnundefined: |g| g.dynamic_isa().create_returnundefined(),
    create_add2: |g, a, b| g.dynamic_isa().create_add2(a, b),
    create_sub2: |g, a, b| g.dynamic_isa().create_sub2(a, b),
    create_mul2: |g, a, b| g.dynamic_isa().create_mul2(a, b),
    create_div2: |g, a, b| g.dynamic_isa().create_div2(a, b),
    create_mod2: |g, a, b| g.dynamic_isa().create_mod2(a, b),
    create_eq: |g, a, b| g.dynamic_isa().create_eq(a, b),
    create_noteq: |g, a, b| g.dynamic_isa().create_noteq(a, b),
    create_less: |g, a, b| g.dynamic_isa().create_less(a, b),
    create_lesseq: |g, a, b| g.dynamic_isa().create_lesseq(a, b),
    create_greater: |g, a, b| g.dynamic_isa().create_greater(a, b),
    create_greatereq: |g, a, b| g.dynamic_isa().create_greatereq(a, b),
    create_shl2: |g, a, b| g.dynamic_isa().create_shl2(a, b),
    create_shr2: |g, a, b| g.dynamic_isa().create_shr2(a, b),
    create_ashr2: |g, a, b| g.dynamic_isa().create_ashr2(a, b),
    create_and2: |g, a, b| g.dynamic_isa().create_and2(a, b),
    create_or2: |g, a, b| g.dynamic_isa().create_or2(a, b),
    create_xor2: |g, a, b| g.dynamic_isa().create_xor2(a, b),
    create_exp: |g, a, b| g.dynamic_isa().create_exp(a, b),
    create_isin: |g, a, b| g.dynamic_isa().create_isin(a, b),
    create_instanceof: |g, a, b| g.dynamic_isa().create_instanceof(a, b),
    create_stricteq: |g, a, b| g.dynamic_isa().create_stricteq(a, b),
    create_strictnoteq: |g, a, b| g.dynamic_isa().create_strictnoteq(a, b),
    create_delobjprop: |g, a, b| g.dynamic_isa().create_delobjprop(a, b),
    create_ldobjbyvalue: |g, a, b| g.dynamic_isa().create_ldobjbyvalue(a, b),
    create_typeof: |g, v| g.dynamic_isa().create_typeof(v),
    create_tonumber: |g, v| g.dynamic_isa().create_tonumber(v),
    create_tonumeric: |g, v| g.dynamic_isa().create_tonumeric(v),
    create_neg: |g, v| g.dynamic_isa().create_neg(v),
    create_not: |g, v| g.dynamic_isa().create_not(v),
    create_inc: |g, v| g.dynamic_isa().create_inc(v),
    create_dec: |g, v| g.dynamic_isa().create_dec(v),
    create_istrue: |g, v| g.dynamic_isa().create_istrue(v),
    create_isfalse: |g, v| g.dynamic_isa().create_isfalse(v),
    create_getpropiterator: |g, v| g.dynamic_isa().create_getpropiterator(v),
    create_getiterator: |g, v| g.dynamic_isa().create_getiterator(v),
    create_getasynciterator: |g, v| g.dynamic_isa().create_getasynciterator(v),
    create_creategeneratorobj: |g, v| g.dynamic_isa().create_creategeneratorobj(v),
    create_throw: |g, v| g.dynamic_isa().create_throw(v),
    create_throw_ifnotobject: |g, v| g.dynamic_isa().create_throw_ifnotobject(v),
    create_return: |g, v| g.dynamic_isa().create_return(v),
    create_stobjbyvalue: |g, acc, obj, key| g.dynamic_isa().create_stobjbyvalue(acc, obj, key),
    create_newlexenv: |g, n| g.dynamic_isa().create_newlexenv(n),
    create_wide_newlexenv: |g, n| g.dynamic_isa().create_wide_newlexenv(n),
    create_ldlexvar: |g, level, slot| g.dynamic_isa().create_ldlexvar(level, slot),
    create_wide_ldlexvar: |g, level, slot| g.dynamic_isa().create_wide_ldlexvar(level, slot),
    create_stlexvar: |g, acc, level, slot| g.dynamic_isa().create_stlexvar(acc, level, slot),
    create_wide_stlexvar: |g, acc, level, slot| {
        g.dynamic_isa().create_wide_stlexvar(acc, level, slot)
    },
    create_copyrestargs: |g, first| g.dynamic_isa().create_copyrestargs(first),
    create_wide_copyrestargs: |g, first| g.dynamic_isa().create_wide_copyrestargs(first),
    create_ldexternalmodulevar: |g, index| g.dynamic_isa().create_ldexternalmodulevar(index),
    create_wide_ldexternalmodulevar: |g, index| {
        g.dynamic_isa().create_wide_ldexternalmodulevar(index)
    },
    create_ldobjbyindex: |g, acc, index| g.dynamic_isa().create_ldobjbyindex(acc, index),
    create_wide_ldobjbyindex: |g, acc, index| {
        g.dynamic_isa().create_wide_ldobjbyindex(acc, index)
    },
    create_stobjbyindex: |g, acc, obj, index| {
        g.dynamic_isa().create_stobjbyindex(acc, obj, index)
    },
    create_wide_stobjbyindex: |g, acc, obj, index| {
        g.dynamic_isa().create_wide_stobjbyindex(acc, obj, index)
    },
    create_tryldglobalbyname: |g, s| g.dynamic_isa().create_tryldglobalbyname(s),
    create_ldglobalvar: |g, s| g.dynamic_isa().create_ldglobalvar(s),
    create_trystglobalbyname: |g, acc, s| g.dynamic_isa().create_trystglobalbyname(acc, s),
    create_stglobalvar: |g, acc, s| g.dynamic_isa().create_stglobalvar(acc, s),
    create_ldobjbyname: |g, acc, s| g.dynamic_isa().create_ldobjbyname(acc, s),
    create_stobjbyname: |g, acc, s, obj| g.dynamic_isa().create_stobjbyname(acc, s, obj),
    create_createarraywithbuffer: |g, lit| g.dynamic_isa().create_createarraywithbuffer(lit),
    create_createobjectwithbuffer: |g, lit| g.dynamic_isa().create_createobjectwithbuffer(lit),
    create_definefunc: |g, f, n| g.dynamic_isa().create_definefunc(f, n),
    create_defineclasswithbuffer: |g, f, lit, n, parent| {
        g.dynamic_isa().create_defineclasswithbuffer(f, lit, n, parent)
    },
    create_callarg0: |g, callee| g.dynamic_isa().create_callarg0(callee),
    create_callarg1: |g, callee, a| g.dynamic_isa().create_callarg1(callee, a),
    create_callargs2: |g, callee, a, b| g.dynamic_isa().create_callargs2(callee, a, b),
    create_callargs3: |g, callee, a, b, c| {
        g.dynamic_isa().create_callargs3(callee, a, b, c)
    },
    create_callthis0: |g, callee, this| g.dynamic_isa().create_callthis0(callee, this),
    create_callthis1: |g, callee, this, a| g.dynamic_isa().create_callthis1(callee, this, a),
    create_callthis2: |g, callee, this, a, b| {
        g.dynamic_isa().create_callthis2(callee, this, a, b)
    },
    create_callthis3: |g, callee, this, a, b, c| {
        g.dynamic_isa().create_callthis3(callee, this, a, b, c)
    },
    create_callrange: |g, callee, args| g.dynamic_isa().create_callrange(callee, args),
    create_wide_callrange: |g, callee, args| g.dynamic_isa().create_wide_callrange(callee, args),
    create_newobjrange: |g, inputs| g.dynamic_isa().create_newobjrange(inputs),
    create_wide_newobjrange: |g, inputs| g.dynamic_isa().create_wide_newobjrange(inputs),
    create_if: |g, v, cc| g.dynamic_isa().create_if(v, cc),
};

pub fn dynamic_isa_api(tag: u32) -> IrResult<&'static DynamicIsaApi> {
    match ApiVersion::from_tag(tag)? {
        ApiVersion::V1 => {
            trace!(tag, "dynamic isa api");
            Ok(&DYNAMIC_ISA_API_V1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Status;
    use crate::file::File;
    use crate::ir::IsaKind;

    #[test]
    fn test_unknown_version() {
        assert!(matches!(graph_api(0), Err(IrError::UnknownApiVersion(0))));
        assert!(matches!(block_api(2), Err(IrError::UnknownApiVersion(2))));
        assert!(matches!(inst_api(99), Err(IrError::UnknownApiVersion(99))));
        assert!(static_isa_api(7).is_err());
        assert_eq!(
            Status::of(&dynamic_isa_api(7)),
            Status::UnknownApiVersion
        );
        assert_eq!(ApiVersion::try_from(1).unwrap(), ApiVersion::V1);
        assert_eq!(ApiVersion::LATEST.tag(), 1);
    }

    #[test]
    fn test_tables_drive_a_graph() {
        let graph_ops = graph_api(1).unwrap();
        let block_ops = block_api(1).unwrap();
        let inst_ops = inst_api(1).unwrap();
        let isa = static_isa_api(1).unwrap();

        let mut file = File::new(IsaKind::Static);
        let f = file.add_function("f", &[], TypeId::I32);
        let mut g = file.create_graph(f).unwrap();

        let c5 = (graph_ops.find_or_create_constant_i32)(&mut g, 5);
        let c7 = (graph_ops.find_or_create_constant_i32)(&mut g, 7);
        let add = (isa.create_add)(&mut g, c5, c7).unwrap();
        let start = (graph_ops.start_block)(&g);
        (block_ops.add_instruction_back)(&mut g, start, add).unwrap();

        assert_eq!((inst_ops.input_count)(&g, add).unwrap(), 2);
        assert_eq!((inst_ops.block)(&g, add).unwrap(), Some(start));
        assert_eq!((isa.opcode)(&mut g, add).unwrap(), StaticOpcode::Add);
        let end = (graph_ops.end_block)(&g);
        assert!((block_ops.dominates)(&g, start, end).unwrap());

        let mut seen = 0;
        assert!((graph_ops.visit_blocks_rpo)(&g, &mut |_: BlockId| {
            seen += 1;
            true
        }));
        assert_eq!(seen, 2);
        assert!((graph_ops.verify)(&g).is_ok());
    }

    #[test]
    fn test_isa_tables_check_mode() {
        let dynamic = dynamic_isa_api(1).unwrap();
        let mut file = File::new(IsaKind::Static);
        let f = file.add_function("f", &[], TypeId::Void);
        let mut g = file.create_graph(f).unwrap();
        assert!(matches!(
            (dynamic.create_ldundefined)(&mut g),
            Err(IrError::WrongMode(_))
        ));
    }

    #[test]
    fn test_graph_table_reports_isa_and_dumps() {
        let graph_ops = graph_api(1).unwrap();
        let mut file = File::new(IsaKind::Dynamic);
        let f = file.add_function("f", &[TypeId::Any], TypeId::Any);
        let g = file.create_graph(f).unwrap();
        assert_eq!((graph_ops.isa)(&g), IsaKind::Dynamic);

        let mut sink = Vec::new();
        (graph_ops.dump)(&g, &mut sink).unwrap();
        let text = String::from_utf8(sink).unwrap();
        assert_eq!(text, (graph_ops.render)(&g));
    }

    #[test]
    fn test_dynamic_table_covers_every_family() {
        let dynamic = dynamic_isa_api(1).unwrap();
        let mut file = File::new(IsaKind::Dynamic);
        let name = file.create_string("x");
        let f = file.add_function("f", &[TypeId::Any, TypeId::Any], TypeId::Any);
        let mut g = file.create_graph(f).unwrap();
        let a = g.parameter(0).unwrap();
        let b = g.parameter(1).unwrap();

        let nan = (dynamic.create_ldnan)(&mut g).unwrap();
        assert_eq!((dynamic.opcode)(&mut g, nan).unwrap(), DynamicOpcode::Ldnan);
        let exp = (dynamic.create_exp)(&mut g, a, b).unwrap();
        assert_eq!((dynamic.opcode)(&mut g, exp).unwrap(), DynamicOpcode::Exp);
        let it = (dynamic.create_getiterator)(&mut g, a).unwrap();
        assert_eq!((dynamic.opcode)(&mut g, it).unwrap(), DynamicOpcode::Getiterator);
        let store = (dynamic.create_stobjbyvalue)(&mut g, a, b, a).unwrap();
        assert_eq!(g.input_count(store).unwrap(), 3);
        let rest = (dynamic.create_wide_copyrestargs)(&mut g, 300).unwrap();
        assert_eq!(g.immediate(rest, 0).unwrap(), 300);
        let global = (dynamic.create_stglobalvar)(&mut g, a, name).unwrap();
        assert_eq!(g.string_operand(global).unwrap(), name);
        let call = (dynamic.create_callthis3)(&mut g, a, b, a, b, a).unwrap();
        assert_eq!(g.input_count(call).unwrap(), 5);
        let new = (dynamic.create_wide_newobjrange)(&mut g, &[a, b]).unwrap();
        assert_eq!(g.immediate(new, 0).unwrap(), 2);
        assert_eq!(g.immediate_size(new, 0).unwrap(), BitWidth::W16);
    }
}
