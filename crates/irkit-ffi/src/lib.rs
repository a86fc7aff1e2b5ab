//! C FFI bindings for irkit
//!
//! Exposes files, graphs and the versioned capability tables over a C ABI:
//! - Opaque pointers for files and graphs, freed by the caller
//! - Blocks and instructions as small by-value handles; a zero `graph` field is the
//!   NULL handle
//! - Errors via `IrkitError` out-parameters; no global error state
//! - Types, condition codes and opcodes as `u32` tags (declaration order of the
//!   corresponding Rust enums)

use irkit_core::{
    ApiVersion, BlockId, ConditionCode, DumpOptions, DynamicOpcode, File, Function, Graph,
    InstId, IrError, IrResult, IsaKind, StaticOpcode, Status, TypeId,
};
use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use tracing::debug;

// ============================================================================
// Opaque Types
// ============================================================================

/// Opaque handle to a file
#[repr(C)]
pub struct IrkitFile {
    _private: [u8; 0],
}

/// Opaque handle to a graph
#[repr(C)]
pub struct IrkitGraph {
    _private: [u8; 0],
}

/// Error information
#[repr(C)]
pub struct IrkitError {
    status: Status,
    message: *mut c_char,
}

/// Basic block handle
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrkitBlock {
    pub graph: u32,
    pub index: u32,
}

/// Instruction handle
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrkitInst {
    pub graph: u32,
    pub index: u32,
}

/// Returned where a function index or tag is expected but the call failed
pub const IRKIT_INVALID: u32 = u32::MAX;

/// Block visitor; return `false` to stop
pub type IrkitBlockVisitor = unsafe extern "C" fn(block: IrkitBlock, data: *mut c_void) -> bool;

/// Instruction visitor; return `false` to stop
pub type IrkitInstVisitor = unsafe extern "C" fn(inst: IrkitInst, data: *mut c_void) -> bool;

// Internal representation of File (not exposed to C)
struct FileHandle {
    file: File,
}

// Internal representation of Graph (not exposed to C)
struct GraphHandle {
    graph: Graph,
}

impl IrkitBlock {
    pub const NULL: IrkitBlock = IrkitBlock { graph: 0, index: 0 };

    fn from_id(id: BlockId) -> Self {
        Self {
            graph: id.graph().as_u32(),
            index: id.as_u32(),
        }
    }

    fn resolve(self, graph: &Graph) -> IrResult<BlockId> {
        if self.graph == 0 {
            return Err(IrError::BadArgument("null block handle".to_string()));
        }
        if self.graph != graph.id().as_u32() {
            return Err(IrError::WrongCtx(format!(
                "block of graph{} used with {}",
                self.graph,
                graph.id()
            )));
        }
        Ok(BlockId::from_raw(graph.id(), self.index))
    }
}

impl IrkitInst {
    pub const NULL: IrkitInst = IrkitInst { graph: 0, index: 0 };

    fn from_id(id: InstId) -> Self {
        Self {
            graph: id.graph().as_u32(),
            index: id.as_u32(),
        }
    }

    fn resolve(self, graph: &Graph) -> IrResult<InstId> {
        if self.graph == 0 {
            return Err(IrError::BadArgument("null instruction handle".to_string()));
        }
        if self.graph != graph.id().as_u32() {
            return Err(IrError::WrongCtx(format!(
                "instruction of graph{} used with {}",
                self.graph,
                graph.id()
            )));
        }
        Ok(InstId::from_raw(graph.id(), self.index))
    }
}

// ============================================================================
// Tags
// ============================================================================

const TYPES: [TypeId; 16] = [
    TypeId::Invalid,
    TypeId::Void,
    TypeId::U1,
    TypeId::I8,
    TypeId::U8,
    TypeId::I16,
    TypeId::U16,
    TypeId::I32,
    TypeId::U32,
    TypeId::I64,
    TypeId::U64,
    TypeId::F32,
    TypeId::F64,
    TypeId::String,
    TypeId::Reference,
    TypeId::Any,
];

const CONDITION_CODES: [ConditionCode; 13] = [
    ConditionCode::None,
    ConditionCode::Eq,
    ConditionCode::Ne,
    ConditionCode::Lt,
    ConditionCode::Le,
    ConditionCode::Gt,
    ConditionCode::Ge,
    ConditionCode::B,
    ConditionCode::Be,
    ConditionCode::A,
    ConditionCode::Ae,
    ConditionCode::TstEq,
    ConditionCode::TstNe,
];

fn tag_of<T: PartialEq + Copy>(all: &[T], value: T) -> u32 {
    all.iter()
        .position(|&v| v == value)
        .map_or(IRKIT_INVALID, |i| i as u32)
}

fn from_tag<T: Copy>(all: &[T], tag: u32, what: &str) -> IrResult<T> {
    all.get(tag as usize)
        .copied()
        .ok_or_else(|| IrError::BadArgument(format!("unknown {} tag {}", what, tag)))
}

const ISAS: [IsaKind; 3] = [IsaKind::Unsupported, IsaKind::Static, IsaKind::Dynamic];

fn isa_from_tag(tag: u32) -> IrResult<IsaKind> {
    from_tag(&ISAS, tag, "isa")
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert Rust string to C string (caller must free)
fn rust_to_c_string(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Set error out-parameter
unsafe fn set_error(error_out: *mut *mut IrkitError, error: &IrError) {
    if !error_out.is_null() {
        let err = Box::new(IrkitError {
            status: error.status(),
            message: rust_to_c_string(&error.to_string()),
        });
        *error_out = Box::into_raw(err);
    }
}

/// Unwrap a result for C, reporting the failure through `error`
unsafe fn report<T>(result: IrResult<T>, error: *mut *mut IrkitError, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            debug!(status = ?e.status(), "irkit call failed: {}", e);
            set_error(error, &e);
            fallback
        }
    }
}

unsafe fn with_graph<T>(
    graph: *const IrkitGraph,
    error: *mut *mut IrkitError,
    fallback: T,
    f: impl FnOnce(&Graph) -> IrResult<T>,
) -> T {
    let result = if graph.is_null() {
        Err(IrError::BadArgument("null graph".to_string()))
    } else {
        f(&(*(graph as *const GraphHandle)).graph)
    };
    report(result, error, fallback)
}

unsafe fn with_graph_mut<T>(
    graph: *mut IrkitGraph,
    error: *mut *mut IrkitError,
    fallback: T,
    f: impl FnOnce(&mut Graph) -> IrResult<T>,
) -> T {
    let result = if graph.is_null() {
        Err(IrError::BadArgument("null graph".to_string()))
    } else {
        f(&mut (*(graph as *mut GraphHandle)).graph)
    };
    report(result, error, fallback)
}

unsafe fn with_file<T>(
    file: *mut IrkitFile,
    error: *mut *mut IrkitError,
    fallback: T,
    f: impl FnOnce(&mut File) -> IrResult<T>,
) -> T {
    let result = if file.is_null() {
        Err(IrError::BadArgument("null file".to_string()))
    } else {
        f(&mut (*(file as *mut FileHandle)).file)
    };
    report(result, error, fallback)
}

/// Resolve `count` instruction handles starting at `insts`
unsafe fn inst_slice(graph: &Graph, insts: *const IrkitInst, count: usize) -> IrResult<Vec<InstId>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    if insts.is_null() {
        return Err(IrError::BadArgument("null instruction array".to_string()));
    }
    std::slice::from_raw_parts(insts, count)
        .iter()
        .map(|inst| inst.resolve(graph))
        .collect()
}

fn function_at(file: &File, index: u32) -> IrResult<Function> {
    file.functions()
        .nth(index as usize)
        .ok_or_else(|| IrError::BadArgument(format!("no function with index {}", index)))
}

// ============================================================================
// File Functions
// ============================================================================

/// Create an empty file
///
/// # Arguments
/// * `isa` - 0 unsupported, 1 static, 2 dynamic
/// * `error` - Optional pointer to receive error information
///
/// # Returns
/// * Non-null pointer to IrkitFile on success
/// * NULL on failure (check error parameter)
///
/// # Safety
/// The returned file must be freed with `irkit_file_free()`
#[no_mangle]
pub unsafe extern "C" fn irkit_file_new(isa: u32, error: *mut *mut IrkitError) -> *mut IrkitFile {
    match isa_from_tag(isa) {
        Ok(kind) => {
            let handle = Box::new(FileHandle {
                file: File::new(kind),
            });
            Box::into_raw(handle) as *mut IrkitFile
        }
        Err(e) => {
            set_error(error, &e);
            ptr::null_mut()
        }
    }
}

/// Free a file
///
/// # Safety
/// - File pointer must be valid (created by `irkit_file_new()`) or NULL
/// - Graphs created from the file stay valid and must be freed separately
#[no_mangle]
pub unsafe extern "C" fn irkit_file_free(file: *mut IrkitFile) {
    if file.is_null() {
        return;
    }
    let _ = Box::from_raw(file as *mut FileHandle);
}

/// Declare a function
///
/// # Arguments
/// * `name` - Null-terminated UTF-8 name
/// * `params` - Array of `param_count` type tags (may be NULL when empty)
/// * `ret` - Return type tag
///
/// # Returns
/// * Index of the new function
/// * `IRKIT_INVALID` on failure (check error parameter)
///
/// # Safety
/// `name` must be a valid C string and `params` must hold `param_count` tags
#[no_mangle]
pub unsafe extern "C" fn irkit_file_add_function(
    file: *mut IrkitFile,
    name: *const c_char,
    params: *const u32,
    param_count: usize,
    ret: u32,
    error: *mut *mut IrkitError,
) -> u32 {
    with_file(file, error, IRKIT_INVALID, |file| {
        if name.is_null() || (param_count > 0 && params.is_null()) {
            return Err(IrError::BadArgument(
                "Invalid arguments (null pointer)".to_string(),
            ));
        }
        let name = CStr::from_ptr(name)
            .to_str()
            .map_err(|_| IrError::BadArgument("function name is not UTF-8".to_string()))?;
        let params = if param_count == 0 {
            Vec::new()
        } else {
            std::slice::from_raw_parts(params, param_count)
                .iter()
                .map(|&tag| from_tag(&TYPES, tag, "type"))
                .collect::<IrResult<Vec<_>>>()?
        };
        let ret = from_tag(&TYPES, ret, "type")?;
        Ok(file.add_function(name, &params, ret).index())
    })
}

/// Create a graph holding a copy of a function's body
///
/// # Returns
/// * Non-null pointer to IrkitGraph on success
/// * NULL on failure (check error parameter)
///
/// # Safety
/// The returned graph must be freed with `irkit_graph_free()` or handed back with
/// `irkit_file_commit_graph()`
#[no_mangle]
pub unsafe extern "C" fn irkit_file_create_graph(
    file: *mut IrkitFile,
    function: u32,
    error: *mut *mut IrkitError,
) -> *mut IrkitGraph {
    with_file(file, error, ptr::null_mut(), |file| {
        let graph = file.create_graph(function_at(file, function)?)?;
        Ok(Box::into_raw(Box::new(GraphHandle { graph })) as *mut IrkitGraph)
    })
}

/// Replace a function's body with a graph
///
/// # Returns
/// * `true` on success
/// * `false` on failure (check error parameter)
///
/// # Safety
/// - The graph is consumed whether or not the commit succeeds
/// - Graph pointer must not be used after this call
#[no_mangle]
pub unsafe extern "C" fn irkit_file_commit_graph(
    file: *mut IrkitFile,
    function: u32,
    graph: *mut IrkitGraph,
    error: *mut *mut IrkitError,
) -> bool {
    if graph.is_null() {
        set_error(error, &IrError::BadArgument("null graph".to_string()));
        return false;
    }
    let handle = Box::from_raw(graph as *mut GraphHandle);
    with_file(file, error, false, |file| {
        let function = function_at(file, function)?;
        file.commit_graph(function, handle.graph)?;
        Ok(true)
    })
}

// ============================================================================
// Graph Functions
// ============================================================================

/// Free a graph
///
/// # Safety
/// - Graph pointer must be valid (created by `irkit_file_create_graph()`) or NULL
/// - Block and instruction handles of the graph must not be used afterwards
#[no_mangle]
pub unsafe extern "C" fn irkit_graph_free(graph: *mut IrkitGraph) {
    if graph.is_null() {
        return;
    }
    let _ = Box::from_raw(graph as *mut GraphHandle);
}

/// Render a graph as text
///
/// # Returns
/// * Null-terminated listing, to be freed with `irkit_string_free()`
/// * NULL if graph is NULL
///
/// # Safety
/// Graph pointer must be valid or NULL
#[no_mangle]
pub unsafe extern "C" fn irkit_graph_dump(graph: *const IrkitGraph) -> *mut c_char {
    if graph.is_null() {
        return ptr::null_mut();
    }
    let handle = &*(graph as *const GraphHandle);
    rust_to_c_string(&handle.graph.render(DumpOptions::default()))
}

/// Free a string returned by the irkit API
///
/// # Safety
/// The string must come from an irkit function and must not be used afterwards
#[no_mangle]
pub unsafe extern "C" fn irkit_string_free(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    let _ = CString::from_raw(s);
}

// ============================================================================
// Error Handling Functions
// ============================================================================

/// Get the status code of an error
///
/// # Returns
/// * Status code, `NoError` if error is NULL
///
/// # Safety
/// Error pointer must be valid or NULL
#[no_mangle]
pub unsafe extern "C" fn irkit_error_status(error: *const IrkitError) -> Status {
    if error.is_null() {
        return Status::NoError;
    }
    (*error).status
}

/// Get the error message
///
/// # Returns
/// * Null-terminated error message string
/// * NULL if error is NULL
///
/// # Safety
/// - Error pointer must be valid
/// - Returned string is valid until `irkit_error_free()` is called
#[no_mangle]
pub unsafe extern "C" fn irkit_error_message(error: *const IrkitError) -> *const c_char {
    if error.is_null() {
        return ptr::null();
    }
    (*error).message
}

/// Free an error
///
/// # Safety
/// - Error pointer must be valid (created by irkit API) or NULL
/// - Error must not be used after this call
#[no_mangle]
pub unsafe extern "C" fn irkit_error_free(error: *mut IrkitError) {
    if error.is_null() {
        return;
    }
    if !(*error).message.is_null() {
        let _ = CString::from_raw((*error).message);
    }
    let _ = Box::from_raw(error);
}

// ============================================================================
// Graph Table
// ============================================================================

/// Graph-level capabilities
#[repr(C)]
pub struct IrkitGraphApi {
    pub isa: unsafe extern "C" fn(*const IrkitGraph) -> u32,
    pub start_block: unsafe extern "C" fn(*const IrkitGraph) -> IrkitBlock,
    pub end_block: unsafe extern "C" fn(*const IrkitGraph) -> IrkitBlock,
    pub block_count: unsafe extern "C" fn(*const IrkitGraph) -> usize,
    pub block_by_id:
        unsafe extern "C" fn(*const IrkitGraph, u32, *mut *mut IrkitError) -> IrkitBlock,
    pub parameter_count: unsafe extern "C" fn(*const IrkitGraph) -> usize,
    pub parameter:
        unsafe extern "C" fn(*const IrkitGraph, usize, *mut *mut IrkitError) -> IrkitInst,
    pub create_empty_block: unsafe extern "C" fn(*mut IrkitGraph) -> IrkitBlock,
    pub find_or_create_constant_i32: unsafe extern "C" fn(*mut IrkitGraph, i32) -> IrkitInst,
    pub find_or_create_constant_i64: unsafe extern "C" fn(*mut IrkitGraph, i64) -> IrkitInst,
    pub find_or_create_constant_u64: unsafe extern "C" fn(*mut IrkitGraph, u64) -> IrkitInst,
    pub find_or_create_constant_f64: unsafe extern "C" fn(*mut IrkitGraph, f64) -> IrkitInst,
    pub visit_blocks_rpo: unsafe extern "C" fn(
        *const IrkitGraph,
        Option<IrkitBlockVisitor>,
        *mut c_void,
        *mut *mut IrkitError,
    ) -> bool,
    pub insert_try_catch: unsafe extern "C" fn(
        *mut IrkitGraph,
        IrkitBlock,
        IrkitBlock,
        IrkitBlock,
        IrkitBlock,
        *mut *mut IrkitError,
    ) -> bool,
    pub remove_unreachable_blocks: unsafe extern "C" fn(*mut IrkitGraph) -> usize,
    pub verify: unsafe extern "C" fn(*const IrkitGraph, *mut *mut IrkitError) -> bool,
}

/// Isa tag of the graph, `IRKIT_INVALID` for a null graph
unsafe extern "C" fn graph_isa(graph: *const IrkitGraph) -> u32 {
    with_graph(graph, ptr::null_mut(), IRKIT_INVALID, |g| Ok(tag_of(&ISAS, g.isa())))
}

unsafe extern "C" fn graph_start_block(graph: *const IrkitGraph) -> IrkitBlock {
    with_graph(graph, ptr::null_mut(), IrkitBlock::NULL, |g| {
        Ok(IrkitBlock::from_id(g.start_block()))
    })
}

unsafe extern "C" fn graph_end_block(graph: *const IrkitGraph) -> IrkitBlock {
    with_graph(graph, ptr::null_mut(), IrkitBlock::NULL, |g| {
        Ok(IrkitBlock::from_id(g.end_block()))
    })
}

unsafe extern "C" fn graph_block_count(graph: *const IrkitGraph) -> usize {
    with_graph(graph, ptr::null_mut(), 0, |g| Ok(g.block_count()))
}

unsafe extern "C" fn graph_block_by_id(
    graph: *const IrkitGraph,
    id: u32,
    error: *mut *mut IrkitError,
) -> IrkitBlock {
    with_graph(graph, error, IrkitBlock::NULL, |g| {
        g.block_by_id(id).map(IrkitBlock::from_id)
    })
}

unsafe extern "C" fn graph_parameter_count(graph: *const IrkitGraph) -> usize {
    with_graph(graph, ptr::null_mut(), 0, |g| Ok(g.parameter_count()))
}

unsafe extern "C" fn graph_parameter(
    graph: *const IrkitGraph,
    index: usize,
    error: *mut *mut IrkitError,
) -> IrkitInst {
    with_graph(graph, error, IrkitInst::NULL, |g| {
        g.parameter(index).map(IrkitInst::from_id)
    })
}

unsafe extern "C" fn graph_create_empty_block(graph: *mut IrkitGraph) -> IrkitBlock {
    with_graph_mut(graph, ptr::null_mut(), IrkitBlock::NULL, |g| {
        Ok(IrkitBlock::from_id(g.create_empty_block()))
    })
}

macro_rules! constant_entries {
    ($($entry:ident => $method:ident: $ty:ty),* $(,)?) => {
        $(
            unsafe extern "C" fn $entry(graph: *mut IrkitGraph, value: $ty) -> IrkitInst {
                with_graph_mut(graph, ptr::null_mut(), IrkitInst::NULL, |g| {
                    Ok(IrkitInst::from_id(g.$method(value)))
                })
            }
        )*
    };
}

constant_entries! {
    graph_constant_i32 => find_or_create_constant_i32: i32,
    graph_constant_i64 => find_or_create_constant_i64: i64,
    graph_constant_u64 => find_or_create_constant_u64: u64,
    graph_constant_f64 => find_or_create_constant_f64: f64,
}

unsafe extern "C" fn graph_visit_blocks_rpo(
    graph: *const IrkitGraph,
    visitor: Option<IrkitBlockVisitor>,
    data: *mut c_void,
    error: *mut *mut IrkitError,
) -> bool {
    with_graph(graph, error, false, |g| {
        let visit =
            visitor.ok_or_else(|| IrError::BadArgument("null visitor".to_string()))?;
        Ok(g.visit_blocks_rpo(|bb| visit(IrkitBlock::from_id(bb), data)))
    })
}

unsafe extern "C" fn graph_insert_try_catch(
    graph: *mut IrkitGraph,
    try_first: IrkitBlock,
    try_last: IrkitBlock,
    catch_begin: IrkitBlock,
    catch_end: IrkitBlock,
    error: *mut *mut IrkitError,
) -> bool {
    with_graph_mut(graph, error, false, |g| {
        let try_first = try_first.resolve(g)?;
        let try_last = try_last.resolve(g)?;
        let catch_begin = catch_begin.resolve(g)?;
        let catch_end = catch_end.resolve(g)?;
        g.insert_try_catch(try_first, try_last, catch_begin, catch_end)?;
        Ok(true)
    })
}

unsafe extern "C" fn graph_remove_unreachable_blocks(graph: *mut IrkitGraph) -> usize {
    with_graph_mut(graph, ptr::null_mut(), 0, |g| Ok(g.remove_unreachable_blocks()))
}

unsafe extern "C" fn graph_verify(graph: *const IrkitGraph, error: *mut *mut IrkitError) -> bool {
    with_graph(graph, error, false, |g| {
        g.verify()
            .map(|()| true)
            .map_err(|e| IrError::BadArgument(format!("graph failed verification: {}", e)))
    })
}

static GRAPH_API_V1: IrkitGraphApi = IrkitGraphApi {
    isa: graph_isa,
    start_block: graph_start_block,
    end_block: graph_end_block,
    block_count: graph_block_count,
    block_by_id: graph_block_by_id,
    parameter_count: graph_parameter_count,
    parameter: graph_parameter,
    create_empty_block: graph_create_empty_block,
    find_or_create_constant_i32: graph_constant_i32,
    find_or_create_constant_i64: graph_constant_i64,
    find_or_create_constant_u64: graph_constant_u64,
    find_or_create_constant_f64: graph_constant_f64,
    visit_blocks_rpo: graph_visit_blocks_rpo,
    insert_try_catch: graph_insert_try_catch,
    remove_unreachable_blocks: graph_remove_unreachable_blocks,
    verify: graph_verify,
};

// ============================================================================
// Block Table
// ============================================================================

type BlockCount = unsafe extern "C" fn(*const IrkitGraph, IrkitBlock, *mut *mut IrkitError) -> usize;
type BlockAt =
    unsafe extern "C" fn(*const IrkitGraph, IrkitBlock, usize, *mut *mut IrkitError) -> IrkitBlock;
type BlockQuery = unsafe extern "C" fn(*const IrkitGraph, IrkitBlock, *mut *mut IrkitError) -> bool;
type BlockToBlock =
    unsafe extern "C" fn(*const IrkitGraph, IrkitBlock, *mut *mut IrkitError) -> IrkitBlock;
type BlockToInst =
    unsafe extern "C" fn(*const IrkitGraph, IrkitBlock, *mut *mut IrkitError) -> IrkitInst;
type BlockPlace =
    unsafe extern "C" fn(*mut IrkitGraph, IrkitBlock, IrkitInst, *mut *mut IrkitError) -> bool;
type BlockPhi = unsafe extern "C" fn(
    *mut IrkitGraph,
    IrkitBlock,
    *const IrkitInst,
    usize,
    *mut *mut IrkitError,
) -> IrkitInst;
type BlockVisit = unsafe extern "C" fn(
    *const IrkitGraph,
    IrkitBlock,
    Option<IrkitBlockVisitor>,
    *mut c_void,
    *mut *mut IrkitError,
) -> bool;

/// Basic-block capabilities
#[repr(C)]
pub struct IrkitBlockApi {
    pub predecessor_count: BlockCount,
    pub successor_count: BlockCount,
    pub predecessor: BlockAt,
    pub successor: BlockAt,
    pub visit_predecessors: BlockVisit,
    pub visit_successors: BlockVisit,
    pub true_branch: BlockToBlock,
    pub false_branch: BlockToBlock,
    pub append_successor:
        unsafe extern "C" fn(*mut IrkitGraph, IrkitBlock, IrkitBlock, *mut *mut IrkitError) -> bool,
    pub insert_successor: unsafe extern "C" fn(
        *mut IrkitGraph,
        IrkitBlock,
        IrkitBlock,
        usize,
        *mut *mut IrkitError,
    ) -> bool,
    pub disconnect_successor:
        unsafe extern "C" fn(*mut IrkitGraph, IrkitBlock, usize, *mut *mut IrkitError) -> bool,
    pub add_instruction_front: BlockPlace,
    pub add_instruction_back: BlockPlace,
    pub remove_all_instructions:
        unsafe extern "C" fn(*mut IrkitGraph, IrkitBlock, *mut *mut IrkitError) -> bool,
    pub first_instruction: BlockToInst,
    pub last_instruction: BlockToInst,
    pub instruction_count: BlockCount,
    pub split_block_after: unsafe extern "C" fn(
        *mut IrkitGraph,
        IrkitBlock,
        IrkitInst,
        bool,
        *mut *mut IrkitError,
    ) -> IrkitBlock,
    pub dominates:
        unsafe extern "C" fn(*const IrkitGraph, IrkitBlock, IrkitBlock, *mut *mut IrkitError) -> bool,
    pub immediate_dominator: BlockToBlock,
    pub visit_dominated: BlockVisit,
    pub is_start: BlockQuery,
    pub is_end: BlockQuery,
    pub is_try_begin: BlockQuery,
    pub is_try: BlockQuery,
    pub is_try_end: BlockQuery,
    pub is_catch_begin: BlockQuery,
    pub is_catch: BlockQuery,
    pub is_loop_head: BlockQuery,
    pub is_loop_prehead: BlockQuery,
    pub create_phi: BlockPhi,
    pub create_catch_phi: BlockPhi,
}

macro_rules! block_count_entries {
    ($($entry:ident => $method:ident),* $(,)?) => {
        $(
            unsafe extern "C" fn $entry(
                graph: *const IrkitGraph,
                bb: IrkitBlock,
                error: *mut *mut IrkitError,
            ) -> usize {
                with_graph(graph, error, 0, |g| g.$method(bb.resolve(g)?))
            }
        )*
    };
}

block_count_entries! {
    block_predecessor_count => predecessor_count,
    block_successor_count => successor_count,
    block_instruction_count => instruction_count,
}

macro_rules! block_at_entries {
    ($($entry:ident => $method:ident),* $(,)?) => {
        $(
            unsafe extern "C" fn $entry(
                graph: *const IrkitGraph,
                bb: IrkitBlock,
                index: usize,
                error: *mut *mut IrkitError,
            ) -> IrkitBlock {
                with_graph(graph, error, IrkitBlock::NULL, |g| {
                    g.$method(bb.resolve(g)?, index).map(IrkitBlock::from_id)
                })
            }
        )*
    };
}

block_at_entries! {
    block_predecessor => predecessor,
    block_successor => successor,
}

macro_rules! block_query_entries {
    ($($entry:ident => $method:ident),* $(,)?) => {
        $(
            unsafe extern "C" fn $entry(
                graph: *const IrkitGraph,
                bb: IrkitBlock,
                error: *mut *mut IrkitError,
            ) -> bool {
                with_graph(graph, error, false, |g| g.$method(bb.resolve(g)?))
            }
        )*
    };
}

block_query_entries! {
    block_is_start => is_start,
    block_is_end => is_end,
    block_is_try_begin => is_try_begin,
    block_is_try => is_try,
    block_is_try_end => is_try_end,
    block_is_catch_begin => is_catch_begin,
    block_is_catch => is_catch,
    block_is_loop_head => is_loop_head,
    block_is_loop_prehead => is_loop_prehead,
}

macro_rules! block_visit_entries {
    ($($entry:ident => $method:ident),* $(,)?) => {
        $(
            unsafe extern "C" fn $entry(
                graph: *const IrkitGraph,
                bb: IrkitBlock,
                visitor: Option<IrkitBlockVisitor>,
                data: *mut c_void,
                error: *mut *mut IrkitError,
            ) -> bool {
                with_graph(graph, error, false, |g| {
                    let visit = visitor
                        .ok_or_else(|| IrError::BadArgument("null visitor".to_string()))?;
                    g.$method(bb.resolve(g)?, |b| visit(IrkitBlock::from_id(b), data))
                })
            }
        )*
    };
}

block_visit_entries! {
    block_visit_predecessors => visit_predecessors,
    block_visit_successors => visit_successors,
    block_visit_dominated => visit_dominated,
}

macro_rules! block_place_entries {
    ($($entry:ident => $method:ident),* $(,)?) => {
        $(
            unsafe extern "C" fn $entry(
                graph: *mut IrkitGraph,
                bb: IrkitBlock,
                inst: IrkitInst,
                error: *mut *mut IrkitError,
            ) -> bool {
                with_graph_mut(graph, error, false, |g| {
                    let bb = bb.resolve(g)?;
                    let inst = inst.resolve(g)?;
                    g.$method(bb, inst)?;
                    Ok(true)
                })
            }
        )*
    };
}

block_place_entries! {
    block_add_instruction_front => add_instruction_front,
    block_add_instruction_back => add_instruction_back,
}

macro_rules! block_phi_entries {
    ($($entry:ident => $method:ident),* $(,)?) => {
        $(
            unsafe extern "C" fn $entry(
                graph: *mut IrkitGraph,
                bb: IrkitBlock,
                inputs: *const IrkitInst,
                count: usize,
                error: *mut *mut IrkitError,
            ) -> IrkitInst {
                with_graph_mut(graph, error, IrkitInst::NULL, |g| {
                    let bb = bb.resolve(g)?;
                    let inputs = inst_slice(g, inputs, count)?;
                    g.$method(bb, &inputs).map(IrkitInst::from_id)
                })
            }
        )*
    };
}

block_phi_entries! {
    block_create_phi => create_phi,
    block_create_catch_phi => create_catch_phi,
}

unsafe extern "C" fn block_true_branch(
    graph: *const IrkitGraph,
    bb: IrkitBlock,
    error: *mut *mut IrkitError,
) -> IrkitBlock {
    with_graph(graph, error, IrkitBlock::NULL, |g| {
        g.true_branch(bb.resolve(g)?).map(IrkitBlock::from_id)
    })
}

unsafe extern "C" fn block_false_branch(
    graph: *const IrkitGraph,
    bb: IrkitBlock,
    error: *mut *mut IrkitError,
) -> IrkitBlock {
    with_graph(graph, error, IrkitBlock::NULL, |g| {
        g.false_branch(bb.resolve(g)?).map(IrkitBlock::from_id)
    })
}

unsafe extern "C" fn block_append_successor(
    graph: *mut IrkitGraph,
    bb: IrkitBlock,
    succ: IrkitBlock,
    error: *mut *mut IrkitError,
) -> bool {
    with_graph_mut(graph, error, false, |g| {
        let bb = bb.resolve(g)?;
        let succ = succ.resolve(g)?;
        g.append_successor(bb, succ)?;
        Ok(true)
    })
}

unsafe extern "C" fn block_insert_successor(
    graph: *mut IrkitGraph,
    bb: IrkitBlock,
    succ: IrkitBlock,
    index: usize,
    error: *mut *mut IrkitError,
) -> bool {
    with_graph_mut(graph, error, false, |g| {
        let bb = bb.resolve(g)?;
        let succ = succ.resolve(g)?;
        g.insert_successor(bb, succ, index)?;
        Ok(true)
    })
}

unsafe extern "C" fn block_disconnect_successor(
    graph: *mut IrkitGraph,
    bb: IrkitBlock,
    index: usize,
    error: *mut *mut IrkitError,
) -> bool {
    with_graph_mut(graph, error, false, |g| {
        let bb = bb.resolve(g)?;
        g.disconnect_successor(bb, index)?;
        Ok(true)
    })
}

unsafe extern "C" fn block_remove_all_instructions(
    graph: *mut IrkitGraph,
    bb: IrkitBlock,
    error: *mut *mut IrkitError,
) -> bool {
    with_graph_mut(graph, error, false, |g| {
        let bb = bb.resolve(g)?;
        g.remove_all_instructions(bb)?;
        Ok(true)
    })
}

unsafe extern "C" fn block_first_instruction(
    graph: *const IrkitGraph,
    bb: IrkitBlock,
    error: *mut *mut IrkitError,
) -> IrkitInst {
    with_graph(graph, error, IrkitInst::NULL, |g| {
        let first = g.first_instruction(bb.resolve(g)?)?;
        Ok(first.map_or(IrkitInst::NULL, IrkitInst::from_id))
    })
}

unsafe extern "C" fn block_last_instruction(
    graph: *const IrkitGraph,
    bb: IrkitBlock,
    error: *mut *mut IrkitError,
) -> IrkitInst {
    with_graph(graph, error, IrkitInst::NULL, |g| {
        let last = g.last_instruction(bb.resolve(g)?)?;
        Ok(last.map_or(IrkitInst::NULL, IrkitInst::from_id))
    })
}

unsafe extern "C" fn block_split_after(
    graph: *mut IrkitGraph,
    bb: IrkitBlock,
    inst: IrkitInst,
    make_edge: bool,
    error: *mut *mut IrkitError,
) -> IrkitBlock {
    with_graph_mut(graph, error, IrkitBlock::NULL, |g| {
        let bb = bb.resolve(g)?;
        let inst = inst.resolve(g)?;
        g.split_block_after(bb, inst, make_edge)
            .map(IrkitBlock::from_id)
    })
}

unsafe extern "C" fn block_dominates(
    graph: *const IrkitGraph,
    dom: IrkitBlock,
    bb: IrkitBlock,
    error: *mut *mut IrkitError,
) -> bool {
    with_graph(graph, error, false, |g| {
        g.block_dominates(dom.resolve(g)?, bb.resolve(g)?)
    })
}

unsafe extern "C" fn block_immediate_dominator(
    graph: *const IrkitGraph,
    bb: IrkitBlock,
    error: *mut *mut IrkitError,
) -> IrkitBlock {
    with_graph(graph, error, IrkitBlock::NULL, |g| {
        let idom = g.immediate_dominator(bb.resolve(g)?)?;
        Ok(idom.map_or(IrkitBlock::NULL, IrkitBlock::from_id))
    })
}

static BLOCK_API_V1: IrkitBlockApi = IrkitBlockApi {
    predecessor_count: block_predecessor_count,
    successor_count: block_successor_count,
    predecessor: block_predecessor,
    successor: block_successor,
    visit_predecessors: block_visit_predecessors,
    visit_successors: block_visit_successors,
    true_branch: block_true_branch,
    false_branch: block_false_branch,
    append_successor: block_append_successor,
    insert_successor: block_insert_successor,
    disconnect_successor: block_disconnect_successor,
    add_instruction_front: block_add_instruction_front,
    add_instruction_back: block_add_instruction_back,
    remove_all_instructions: block_remove_all_instructions,
    first_instruction: block_first_instruction,
    last_instruction: block_last_instruction,
    instruction_count: block_instruction_count,
    split_block_after: block_split_after,
    dominates: block_dominates,
    immediate_dominator: block_immediate_dominator,
    visit_dominated: block_visit_dominated,
    is_start: block_is_start,
    is_end: block_is_end,
    is_try_begin: block_is_try_begin,
    is_try: block_is_try,
    is_try_end: block_is_try_end,
    is_catch_begin: block_is_catch_begin,
    is_catch: block_is_catch,
    is_loop_head: block_is_loop_head,
    is_loop_prehead: block_is_loop_prehead,
    create_phi: block_create_phi,
    create_catch_phi: block_create_catch_phi,
};

// ============================================================================
// Instruction Table
// ============================================================================

type InstCount = unsafe extern "C" fn(*const IrkitGraph, IrkitInst, *mut *mut IrkitError) -> usize;
type InstQuery = unsafe extern "C" fn(*const IrkitGraph, IrkitInst, *mut *mut IrkitError) -> bool;
type InstToInst =
    unsafe extern "C" fn(*const IrkitGraph, IrkitInst, *mut *mut IrkitError) -> IrkitInst;
type InstPlace =
    unsafe extern "C" fn(*mut IrkitGraph, IrkitInst, IrkitInst, *mut *mut IrkitError) -> bool;
type InstIndex = unsafe extern "C" fn(*const IrkitGraph, IrkitInst, *mut *mut IrkitError) -> u32;
type InstVisit = unsafe extern "C" fn(
    *const IrkitGraph,
    IrkitInst,
    Option<IrkitInstVisitor>,
    *mut c_void,
    *mut *mut IrkitError,
) -> bool;

/// Instruction capabilities
#[repr(C)]
pub struct IrkitInstApi {
    pub block: unsafe extern "C" fn(*const IrkitGraph, IrkitInst, *mut *mut IrkitError) -> IrkitBlock,
    pub next: InstToInst,
    pub prev: InstToInst,
    pub insert_before: InstPlace,
    pub insert_after: InstPlace,
    pub remove: unsafe extern "C" fn(*mut IrkitGraph, IrkitInst, *mut *mut IrkitError) -> bool,
    pub input_count: InstCount,
    pub input:
        unsafe extern "C" fn(*const IrkitGraph, IrkitInst, usize, *mut *mut IrkitError) -> IrkitInst,
    pub set_input: unsafe extern "C" fn(
        *mut IrkitGraph,
        IrkitInst,
        usize,
        IrkitInst,
        *mut *mut IrkitError,
    ) -> bool,
    pub set_inputs: unsafe extern "C" fn(
        *mut IrkitGraph,
        IrkitInst,
        *const IrkitInst,
        usize,
        *mut *mut IrkitError,
    ) -> bool,
    pub append_input: InstPlace,
    pub visit_inputs: InstVisit,
    pub user_count: InstCount,
    pub visit_users: InstVisit,
    pub result_type: InstIndex,
    pub function: InstIndex,
    pub string: InstIndex,
    pub literal_array: InstIndex,
    pub class: InstIndex,
    pub field: InstIndex,
    pub immediate_count: InstCount,
    pub immediate:
        unsafe extern "C" fn(*const IrkitGraph, IrkitInst, usize, *mut *mut IrkitError) -> u64,
    pub set_immediate:
        unsafe extern "C" fn(*mut IrkitGraph, IrkitInst, usize, u64, *mut *mut IrkitError) -> bool,
    pub constant_i32: unsafe extern "C" fn(*const IrkitGraph, IrkitInst, *mut *mut IrkitError) -> i32,
    pub constant_i64: unsafe extern "C" fn(*const IrkitGraph, IrkitInst, *mut *mut IrkitError) -> i64,
    pub constant_u64: unsafe extern "C" fn(*const IrkitGraph, IrkitInst, *mut *mut IrkitError) -> u64,
    pub constant_f64: unsafe extern "C" fn(*const IrkitGraph, IrkitInst, *mut *mut IrkitError) -> f64,
    pub is_call: InstQuery,
    pub is_constant: InstQuery,
    pub is_phi: InstQuery,
    pub is_parameter: InstQuery,
    pub dominates:
        unsafe extern "C" fn(*const IrkitGraph, IrkitInst, IrkitInst, *mut *mut IrkitError) -> bool,
}

macro_rules! inst_count_entries {
    ($($entry:ident => $method:ident),* $(,)?) => {
        $(
            unsafe extern "C" fn $entry(
                graph: *const IrkitGraph,
                inst: IrkitInst,
                error: *mut *mut IrkitError,
            ) -> usize {
                with_graph(graph, error, 0, |g| g.$method(inst.resolve(g)?))
            }
        )*
    };
}

inst_count_entries! {
    inst_input_count => input_count,
    inst_user_count => user_count,
    inst_immediate_count => immediate_count,
}

macro_rules! inst_query_entries {
    ($($entry:ident => $method:ident),* $(,)?) => {
        $(
            unsafe extern "C" fn $entry(
                graph: *const IrkitGraph,
                inst: IrkitInst,
                error: *mut *mut IrkitError,
            ) -> bool {
                with_graph(graph, error, false, |g| g.$method(inst.resolve(g)?))
            }
        )*
    };
}

inst_query_entries! {
    inst_is_call => is_call,
    inst_is_constant => is_constant,
    inst_is_phi => is_phi,
    inst_is_parameter => is_parameter,
}

macro_rules! inst_neighbor_entries {
    ($($entry:ident => $method:ident),* $(,)?) => {
        $(
            unsafe extern "C" fn $entry(
                graph: *const IrkitGraph,
                inst: IrkitInst,
                error: *mut *mut IrkitError,
            ) -> IrkitInst {
                with_graph(graph, error, IrkitInst::NULL, |g| {
                    let neighbor = g.$method(inst.resolve(g)?)?;
                    Ok(neighbor.map_or(IrkitInst::NULL, IrkitInst::from_id))
                })
            }
        )*
    };
}

inst_neighbor_entries! {
    inst_next => next,
    inst_prev => prev,
}

macro_rules! inst_pair_entries {
    ($($entry:ident => $method:ident),* $(,)?) => {
        $(
            unsafe extern "C" fn $entry(
                graph: *mut IrkitGraph,
                first: IrkitInst,
                second: IrkitInst,
                error: *mut *mut IrkitError,
            ) -> bool {
                with_graph_mut(graph, error, false, |g| {
                    let first = first.resolve(g)?;
                    let second = second.resolve(g)?;
                    g.$method(first, second)?;
                    Ok(true)
                })
            }
        )*
    };
}

inst_pair_entries! {
    inst_insert_before => insert_before,
    inst_insert_after => insert_after,
    inst_append_input => append_input,
}

unsafe extern "C" fn inst_block(
    graph: *const IrkitGraph,
    inst: IrkitInst,
    error: *mut *mut IrkitError,
) -> IrkitBlock {
    with_graph(graph, error, IrkitBlock::NULL, |g| {
        let bb = g.inst_block(inst.resolve(g)?)?;
        Ok(bb.map_or(IrkitBlock::NULL, IrkitBlock::from_id))
    })
}

unsafe extern "C" fn inst_remove(
    graph: *mut IrkitGraph,
    inst: IrkitInst,
    error: *mut *mut IrkitError,
) -> bool {
    with_graph_mut(graph, error, false, |g| {
        let inst = inst.resolve(g)?;
        g.remove(inst)?;
        Ok(true)
    })
}

unsafe extern "C" fn inst_input(
    graph: *const IrkitGraph,
    inst: IrkitInst,
    index: usize,
    error: *mut *mut IrkitError,
) -> IrkitInst {
    with_graph(graph, error, IrkitInst::NULL, |g| {
        g.input(inst.resolve(g)?, index).map(IrkitInst::from_id)
    })
}

unsafe extern "C" fn inst_set_input(
    graph: *mut IrkitGraph,
    inst: IrkitInst,
    index: usize,
    value: IrkitInst,
    error: *mut *mut IrkitError,
) -> bool {
    with_graph_mut(graph, error, false, |g| {
        let inst = inst.resolve(g)?;
        let value = value.resolve(g)?;
        g.set_input(inst, index, value)?;
        Ok(true)
    })
}

unsafe extern "C" fn inst_set_inputs(
    graph: *mut IrkitGraph,
    inst: IrkitInst,
    inputs: *const IrkitInst,
    count: usize,
    error: *mut *mut IrkitError,
) -> bool {
    with_graph_mut(graph, error, false, |g| {
        let inst = inst.resolve(g)?;
        let inputs = inst_slice(g, inputs, count)?;
        g.set_inputs(inst, &inputs)?;
        Ok(true)
    })
}

macro_rules! inst_visit_entries {
    ($($entry:ident => $method:ident),* $(,)?) => {
        $(
            unsafe extern "C" fn $entry(
                graph: *const IrkitGraph,
                inst: IrkitInst,
                visitor: Option<IrkitInstVisitor>,
                data: *mut c_void,
                error: *mut *mut IrkitError,
            ) -> bool {
                with_graph(graph, error, false, |g| {
                    let visit = visitor
                        .ok_or_else(|| IrError::BadArgument("null visitor".to_string()))?;
                    g.$method(inst.resolve(g)?, |i| visit(IrkitInst::from_id(i), data))
                })
            }
        )*
    };
}

inst_visit_entries! {
    inst_visit_inputs => visit_inputs,
    inst_visit_users => visit_users,
}

/// Operand getters return the operand's index in the file, `IRKIT_INVALID` on failure
macro_rules! inst_operand_entries {
    ($($entry:ident => $method:ident),* $(,)?) => {
        $(
            unsafe extern "C" fn $entry(
                graph: *const IrkitGraph,
                inst: IrkitInst,
                error: *mut *mut IrkitError,
            ) -> u32 {
                with_graph(graph, error, IRKIT_INVALID, |g| {
                    g.$method(inst.resolve(g)?).map(|operand| operand.index())
                })
            }
        )*
    };
}

inst_operand_entries! {
    inst_function => function_operand,
    inst_string => string_operand,
    inst_literal_array => literal_array_operand,
    inst_class => class_operand,
    inst_field => field_operand,
}

unsafe extern "C" fn inst_result_type(
    graph: *const IrkitGraph,
    inst: IrkitInst,
    error: *mut *mut IrkitError,
) -> u32 {
    with_graph(graph, error, IRKIT_INVALID, |g| {
        Ok(tag_of(&TYPES, g.result_type(inst.resolve(g)?)?))
    })
}

unsafe extern "C" fn inst_immediate(
    graph: *const IrkitGraph,
    inst: IrkitInst,
    index: usize,
    error: *mut *mut IrkitError,
) -> u64 {
    with_graph(graph, error, 0, |g| g.immediate(inst.resolve(g)?, index))
}

unsafe extern "C" fn inst_set_immediate(
    graph: *mut IrkitGraph,
    inst: IrkitInst,
    index: usize,
    value: u64,
    error: *mut *mut IrkitError,
) -> bool {
    with_graph_mut(graph, error, false, |g| {
        let inst = inst.resolve(g)?;
        g.set_immediate(inst, index, value)?;
        Ok(true)
    })
}

macro_rules! inst_constant_entries {
    ($($entry:ident => $method:ident: $ty:ty = $fallback:expr),* $(,)?) => {
        $(
            unsafe extern "C" fn $entry(
                graph: *const IrkitGraph,
                inst: IrkitInst,
                error: *mut *mut IrkitError,
            ) -> $ty {
                with_graph(graph, error, $fallback, |g| g.$method(inst.resolve(g)?))
            }
        )*
    };
}

inst_constant_entries! {
    inst_constant_i32 => constant_i32: i32 = 0,
    inst_constant_i64 => constant_i64: i64 = 0,
    inst_constant_u64 => constant_u64: u64 = 0,
    inst_constant_f64 => constant_f64: f64 = 0.0,
}

unsafe extern "C" fn inst_dominates(
    graph: *const IrkitGraph,
    dom: IrkitInst,
    inst: IrkitInst,
    error: *mut *mut IrkitError,
) -> bool {
    with_graph(graph, error, false, |g| {
        g.inst_dominates(dom.resolve(g)?, inst.resolve(g)?)
    })
}

static INST_API_V1: IrkitInstApi = IrkitInstApi {
    block: inst_block,
    next: inst_next,
    prev: inst_prev,
    insert_before: inst_insert_before,
    insert_after: inst_insert_after,
    remove: inst_remove,
    input_count: inst_input_count,
    input: inst_input,
    set_input: inst_set_input,
    set_inputs: inst_set_inputs,
    append_input: inst_append_input,
    visit_inputs: inst_visit_inputs,
    user_count: inst_user_count,
    visit_users: inst_visit_users,
    result_type: inst_result_type,
    function: inst_function,
    string: inst_string,
    literal_array: inst_literal_array,
    class: inst_class,
    field: inst_field,
    immediate_count: inst_immediate_count,
    immediate: inst_immediate,
    set_immediate: inst_set_immediate,
    constant_i32: inst_constant_i32,
    constant_i64: inst_constant_i64,
    constant_u64: inst_constant_u64,
    constant_f64: inst_constant_f64,
    is_call: inst_is_call,
    is_constant: inst_is_constant,
    is_phi: inst_is_phi,
    is_parameter: inst_is_parameter,
    dominates: inst_dominates,
};

// ============================================================================
// ISA Tables
// ============================================================================

type Nullary = unsafe extern "C" fn(*mut IrkitGraph, *mut *mut IrkitError) -> IrkitInst;
type Unary = unsafe extern "C" fn(*mut IrkitGraph, IrkitInst, *mut *mut IrkitError) -> IrkitInst;
type Binary =
    unsafe extern "C" fn(*mut IrkitGraph, IrkitInst, IrkitInst, *mut *mut IrkitError) -> IrkitInst;
type WithImmediate =
    unsafe extern "C" fn(*mut IrkitGraph, IrkitInst, u64, *mut *mut IrkitError) -> IrkitInst;
type InstTag = unsafe extern "C" fn(*mut IrkitGraph, IrkitInst, *mut *mut IrkitError) -> u32;
type SetTag = unsafe extern "C" fn(*mut IrkitGraph, IrkitInst, u32, *mut *mut IrkitError) -> bool;

macro_rules! isa_entries {
    ($isa:ident: nullary { $($n_entry:ident => $n_method:ident),* $(,)? }
     unary { $($u_entry:ident => $u_method:ident),* $(,)? }
     binary { $($b_entry:ident => $b_method:ident),* $(,)? }) => {
        $(
            unsafe extern "C" fn $n_entry(
                graph: *mut IrkitGraph,
                error: *mut *mut IrkitError,
            ) -> IrkitInst {
                with_graph_mut(graph, error, IrkitInst::NULL, |g| {
                    g.$isa().$n_method().map(IrkitInst::from_id)
                })
            }
        )*
        $(
            unsafe extern "C" fn $u_entry(
                graph: *mut IrkitGraph,
                input: IrkitInst,
                error: *mut *mut IrkitError,
            ) -> IrkitInst {
                with_graph_mut(graph, error, IrkitInst::NULL, |g| {
                    let input = input.resolve(g)?;
                    g.$isa().$u_method(input).map(IrkitInst::from_id)
                })
            }
        )*
        $(
            unsafe extern "C" fn $b_entry(
                graph: *mut IrkitGraph,
                lhs: IrkitInst,
                rhs: IrkitInst,
                error: *mut *mut IrkitError,
            ) -> IrkitInst {
                with_graph_mut(graph, error, IrkitInst::NULL, |g| {
                    let lhs = lhs.resolve(g)?;
                    let rhs = rhs.resolve(g)?;
                    g.$isa().$b_method(lhs, rhs).map(IrkitInst::from_id)
                })
            }
        )*
    };
}

/// Static-family capabilities
#[repr(C)]
pub struct IrkitStaticIsaApi {
    /// Position of the opcode in `StaticOpcode::ALL`
    pub opcode: InstTag,
    pub condition_code: InstTag,
    pub set_condition_code: SetTag,
    pub create_return_void: Nullary,
    pub create_null_ptr: Nullary,
    pub create_return: Unary,
    pub create_neg: Unary,
    pub create_not: Unary,
    pub create_len_array: Unary,
    pub create_add: Binary,
    pub create_sub: Binary,
    pub create_mul: Binary,
    pub create_div: Binary,
    pub create_mod: Binary,
    pub create_and: Binary,
    pub create_or: Binary,
    pub create_xor: Binary,
    pub create_cmp: Binary,
    pub create_add_i: WithImmediate,
    pub create_sub_i: WithImmediate,
    pub create_cast:
        unsafe extern "C" fn(*mut IrkitGraph, IrkitInst, u32, *mut *mut IrkitError) -> IrkitInst,
    pub create_if: unsafe extern "C" fn(
        *mut IrkitGraph,
        IrkitInst,
        IrkitInst,
        u32,
        *mut *mut IrkitError,
    ) -> IrkitInst,
}

isa_entries! {
    static_isa:
    nullary {
        static_create_return_void => create_return_void,
        static_create_null_ptr => create_null_ptr,
    }
    unary {
        static_create_return => create_return,
        static_create_neg => create_neg,
        static_create_not => create_not,
        static_create_len_array => create_len_array,
    }
    binary {
        static_create_add => create_add,
        static_create_sub => create_sub,
        static_create_mul => create_mul,
        static_create_div => create_div,
        static_create_mod => create_mod,
        static_create_and => create_and,
        static_create_or => create_or,
        static_create_xor => create_xor,
        static_create_cmp => create_cmp,
    }
}

unsafe extern "C" fn static_opcode(
    graph: *mut IrkitGraph,
    inst: IrkitInst,
    error: *mut *mut IrkitError,
) -> u32 {
    with_graph_mut(graph, error, IRKIT_INVALID, |g| {
        let inst = inst.resolve(g)?;
        Ok(tag_of(StaticOpcode::ALL, g.static_isa().opcode(inst)?))
    })
}

unsafe extern "C" fn static_condition_code(
    graph: *mut IrkitGraph,
    inst: IrkitInst,
    error: *mut *mut IrkitError,
) -> u32 {
    with_graph_mut(graph, error, IRKIT_INVALID, |g| {
        let inst = inst.resolve(g)?;
        Ok(tag_of(&CONDITION_CODES, g.static_isa().condition_code(inst)?))
    })
}

unsafe extern "C" fn static_set_condition_code(
    graph: *mut IrkitGraph,
    inst: IrkitInst,
    cc: u32,
    error: *mut *mut IrkitError,
) -> bool {
    with_graph_mut(graph, error, false, |g| {
        let inst = inst.resolve(g)?;
        let cc = from_tag(&CONDITION_CODES, cc, "condition code")?;
        g.static_isa().set_condition_code(inst, cc)?;
        Ok(true)
    })
}

macro_rules! static_immediate_entries {
    ($($entry:ident => $method:ident),* $(,)?) => {
        $(
            unsafe extern "C" fn $entry(
                graph: *mut IrkitGraph,
                input: IrkitInst,
                imm: u64,
                error: *mut *mut IrkitError,
            ) -> IrkitInst {
                with_graph_mut(graph, error, IrkitInst::NULL, |g| {
                    let input = input.resolve(g)?;
                    g.static_isa().$method(input, imm).map(IrkitInst::from_id)
                })
            }
        )*
    };
}

static_immediate_entries! {
    static_create_add_i => create_add_i,
    static_create_sub_i => create_sub_i,
}

unsafe extern "C" fn static_create_cast(
    graph: *mut IrkitGraph,
    input: IrkitInst,
    target: u32,
    error: *mut *mut IrkitError,
) -> IrkitInst {
    with_graph_mut(graph, error, IrkitInst::NULL, |g| {
        let input = input.resolve(g)?;
        let target = from_tag(&TYPES, target, "type")?;
        g.static_isa().create_cast(input, target).map(IrkitInst::from_id)
    })
}

unsafe extern "C" fn static_create_if(
    graph: *mut IrkitGraph,
    lhs: IrkitInst,
    rhs: IrkitInst,
    cc: u32,
    error: *mut *mut IrkitError,
) -> IrkitInst {
    with_graph_mut(graph, error, IrkitInst::NULL, |g| {
        let lhs = lhs.resolve(g)?;
        let rhs = rhs.resolve(g)?;
        let cc = from_tag(&CONDITION_CODES, cc, "condition code")?;
        g.static_isa().create_if(lhs, rhs, cc).map(IrkitInst::from_id)
    })
}

static STATIC_ISA_API_V1: IrkitStaticIsaApi = IrkitStaticIsaApi {
    opcode: static_opcode,
    condition_code: static_condition_code,
    set_condition_code: static_set_condition_code,
    create_return_void: static_create_return_void,
    create_null_ptr: static_create_null_ptr,
    create_return: static_create_return,
    create_neg: static_create_neg,
    create_not: static_create_not,
    create_len_array: static_create_len_array,
    create_add: static_create_add,
    create_sub: static_create_sub,
    create_mul: static_create_mul,
    create_div: static_create_div,
    create_mod: static_create_mod,
    create_and: static_create_and,
    create_or: static_create_or,
    create_xor: static_create_xor,
    create_cmp: static_create_cmp,
    create_add_i: static_create_add_i,
    create_sub_i: static_create_sub_i,
    create_cast: static_create_cast,
    create_if: static_create_if,
};

/// Dynamic-family capabilities
#[repr(C)]
pub struct IrkitDynamicIsaApi {
    /// Position of the opcode in `DynamicOpcode::ALL`
    pub opcode: InstTag,
    pub condition_code: InstTag,
    pub create_ldundefined: Nullary,
    pub create_ldnull: Nullary,
    pub create_ldtrue: Nullary,
    pub create_ldfalse: Nullary,
    pub create_ldhole: Nullary,
    pub create_createemptyobject: Nullary,
    pub create_returnundefined: Nullary,
    pub create_typeof: Unary,
    pub create_inc: Unary,
    pub create_dec: Unary,
    pub create_throw: Unary,
    pub create_return: Unary,
    pub create_callarg0: Unary,
    pub create_add2: Binary,
    pub create_sub2: Binary,
    pub create_mul2: Binary,
    pub create_less: Binary,
    pub create_greater: Binary,
    pub create_stricteq: Binary,
    pub create_callarg1: Binary,
    pub create_newlexenv: unsafe extern "C" fn(*mut IrkitGraph, u64, *mut *mut IrkitError) -> IrkitInst,
    pub create_ldlexvar:
        unsafe extern "C" fn(*mut IrkitGraph, u64, u64, *mut *mut IrkitError) -> IrkitInst,
    pub create_stlexvar: unsafe extern "C" fn(
        *mut IrkitGraph,
        IrkitInst,
        u64,
        u64,
        *mut *mut IrkitError,
    ) -> IrkitInst,
    pub create_ldobjbyindex: WithImmediate,
    pub create_callrange: unsafe extern "C" fn(
        *mut IrkitGraph,
        IrkitInst,
        *const IrkitInst,
        usize,
        *mut *mut IrkitError,
    ) -> IrkitInst,
    pub create_if:
        unsafe extern "C" fn(*mut IrkitGraph, IrkitInst, u32, *mut *mut IrkitError) -> IrkitInst,
}

isa_entries! {
    dynamic_isa:
    nullary {
        dynamic_create_ldundefined => create_ldundefined,
        dynamic_create_ldnull => create_ldnull,
        dynamic_create_ldtrue => create_ldtrue,
        dynamic_create_ldfalse => create_ldfalse,
        dynamic_create_ldhole => create_ldhole,
        dynamic_create_createemptyobject => create_createemptyobject,
        dynamic_create_returnundefined => create_returnundefined,
    }
    unary {
        dynamic_create_typeof => create_typeof,
        dynamic_create_inc => create_inc,
        dynamic_create_dec => create_dec,
        dynamic_create_throw => create_throw,
        dynamic_create_return => create_return,
        dynamic_create_callarg0 => create_callarg0,
    }
    binary {
        dynamic_create_add2 => create_add2,
        dynamic_create_sub2 => create_sub2,
        dynamic_create_mul2 => create_mul2,
        dynamic_create_less => create_less,
        dynamic_create_greater => create_greater,
        dynamic_create_stricteq => create_stricteq,
        dynamic_create_callarg1 => create_callarg1,
    }
}

unsafe extern "C" fn dynamic_opcode(
    graph: *mut IrkitGraph,
    inst: IrkitInst,
    error: *mut *mut IrkitError,
) -> u32 {
    with_graph_mut(graph, error, IRKIT_INVALID, |g| {
        let inst = inst.resolve(g)?;
        Ok(tag_of(DynamicOpcode::ALL, g.dynamic_isa().opcode(inst)?))
    })
}

unsafe extern "C" fn dynamic_condition_code(
    graph: *mut IrkitGraph,
    inst: IrkitInst,
    error: *mut *mut IrkitError,
) -> u32 {
    with_graph_mut(graph, error, IRKIT_INVALID, |g| {
        let inst = inst.resolve(g)?;
        Ok(tag_of(&CONDITION_CODES, g.dynamic_isa().condition_code(inst)?))
    })
}

unsafe extern "C" fn dynamic_create_newlexenv(
    graph: *mut IrkitGraph,
    slots: u64,
    error: *mut *mut IrkitError,
) -> IrkitInst {
    with_graph_mut(graph, error, IrkitInst::NULL, |g| {
        g.dynamic_isa().create_newlexenv(slots).map(IrkitInst::from_id)
    })
}

unsafe extern "C" fn dynamic_create_ldlexvar(
    graph: *mut IrkitGraph,
    level: u64,
    slot: u64,
    error: *mut *mut IrkitError,
) -> IrkitInst {
    with_graph_mut(graph, error, IrkitInst::NULL, |g| {
        g.dynamic_isa().create_ldlexvar(level, slot).map(IrkitInst::from_id)
    })
}

unsafe extern "C" fn dynamic_create_stlexvar(
    graph: *mut IrkitGraph,
    acc: IrkitInst,
    level: u64,
    slot: u64,
    error: *mut *mut IrkitError,
) -> IrkitInst {
    with_graph_mut(graph, error, IrkitInst::NULL, |g| {
        let acc = acc.resolve(g)?;
        g.dynamic_isa()
            .create_stlexvar(acc, level, slot)
            .map(IrkitInst::from_id)
    })
}

unsafe extern "C" fn dynamic_create_ldobjbyindex(
    graph: *mut IrkitGraph,
    acc: IrkitInst,
    index: u64,
    error: *mut *mut IrkitError,
) -> IrkitInst {
    with_graph_mut(graph, error, IrkitInst::NULL, |g| {
        let acc = acc.resolve(g)?;
        g.dynamic_isa()
            .create_ldobjbyindex(acc, index)
            .map(IrkitInst::from_id)
    })
}

unsafe extern "C" fn dynamic_create_callrange(
    graph: *mut IrkitGraph,
    callee: IrkitInst,
    args: *const IrkitInst,
    count: usize,
    error: *mut *mut IrkitError,
) -> IrkitInst {
    with_graph_mut(graph, error, IrkitInst::NULL, |g| {
        let callee = callee.resolve(g)?;
        let args = inst_slice(g, args, count)?;
        g.dynamic_isa()
            .create_callrange(callee, &args)
            .map(IrkitInst::from_id)
    })
}

unsafe extern "C" fn dynamic_create_if(
    graph: *mut IrkitGraph,
    input: IrkitInst,
    cc: u32,
    error: *mut *mut IrkitError,
) -> IrkitInst {
    with_graph_mut(graph, error, IrkitInst::NULL, |g| {
        let input = input.resolve(g)?;
        let cc = from_tag(&CONDITION_CODES, cc, "condition code")?;
        g.dynamic_isa().create_if(input, cc).map(IrkitInst::from_id)
    })
}

static DYNAMIC_ISA_API_V1: IrkitDynamicIsaApi = IrkitDynamicIsaApi {
    opcode: dynamic_opcode,
    condition_code: dynamic_condition_code,
    create_ldundefined: dynamic_create_ldundefined,
    create_ldnull: dynamic_create_ldnull,
    create_ldtrue: dynamic_create_ldtrue,
    create_ldfalse: dynamic_create_ldfalse,
    create_ldhole: dynamic_create_ldhole,
    create_createemptyobject: dynamic_create_createemptyobject,
    create_returnundefined: dynamic_create_returnundefined,
    create_typeof: dynamic_create_typeof,
    create_inc: dynamic_create_inc,
    create_dec: dynamic_create_dec,
    create_throw: dynamic_create_throw,
    create_return: dynamic_create_return,
    create_callarg0: dynamic_create_callarg0,
    create_add2: dynamic_create_add2,
    create_sub2: dynamic_create_sub2,
    create_mul2: dynamic_create_mul2,
    create_less: dynamic_create_less,
    create_greater: dynamic_create_greater,
    create_stricteq: dynamic_create_stricteq,
    create_callarg1: dynamic_create_callarg1,
    create_newlexenv: dynamic_create_newlexenv,
    create_ldlexvar: dynamic_create_ldlexvar,
    create_stlexvar: dynamic_create_stlexvar,
    create_ldobjbyindex: dynamic_create_ldobjbyindex,
    create_callrange: dynamic_create_callrange,
    create_if: dynamic_create_if,
};

// ============================================================================
// Table Lookup
// ============================================================================

macro_rules! table_lookups {
    ($($(#[$doc:meta])* $name:ident => $table:ty: $v1:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            ///
            /// # Returns
            /// * Pointer to a static table, never to be freed
            /// * NULL with `UnknownApiVersion` for an unsupported version tag
            ///
            /// # Safety
            /// `error` must be NULL or point to writable storage
            #[no_mangle]
            pub unsafe extern "C" fn $name(
                version: u32,
                error: *mut *mut IrkitError,
            ) -> *const $table {
                match ApiVersion::from_tag(version) {
                    Ok(ApiVersion::V1) => &$v1 as *const $table,
                    Err(e) => {
                        set_error(error, &e);
                        ptr::null()
                    }
                }
            }
        )*
    };
}

table_lookups! {
    /// Graph capability table for `version`
    irkit_graph_api => IrkitGraphApi: GRAPH_API_V1,
    /// Basic-block capability table for `version`
    irkit_block_api => IrkitBlockApi: BLOCK_API_V1,
    /// Instruction capability table for `version`
    irkit_inst_api => IrkitInstApi: INST_API_V1,
    /// Static-family capability table for `version`
    irkit_static_isa_api => IrkitStaticIsaApi: STATIC_ISA_API_V1,
    /// Dynamic-family capability table for `version`
    irkit_dynamic_isa_api => IrkitDynamicIsaApi: DYNAMIC_ISA_API_V1,
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Get the irkit version string
///
/// # Returns
/// * Null-terminated version string (e.g., "0.1.0")
///
/// # Safety
/// - The returned string is a static string and must not be freed
#[no_mangle]
pub unsafe extern "C" fn irkit_version() -> *const c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr() as *const c_char
}

// ============================================================================
// Tests
// ============================================================================
