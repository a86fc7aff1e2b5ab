//! Dynamic-family programs built end to end

use irkit_core::{
    BitWidth, ConditionCode, DynamicOpcode, File, Graph, IrError, IsaKind, Literal, TypeId,
};

fn dynamic_function(file: &mut File, name: &str, params: usize) -> Graph {
    let types = vec![TypeId::Any; params];
    let f = file.add_function(name, &types, TypeId::Any);
    file.create_graph(f).unwrap()
}

// ============================================================================
// Globals, properties and calls
// ============================================================================

#[test]
fn test_console_log_call() {
    let mut file = File::new(IsaKind::Dynamic);
    let console = file.create_string("console");
    let log = file.create_string("log");
    let hello = file.create_string("hello");
    let mut g = dynamic_function(&mut file, "main", 0);
    let end = g.end_block();

    let receiver = g.dynamic_isa().create_tryldglobalbyname(console).unwrap();
    let method = g.dynamic_isa().create_ldobjbyname(receiver, log).unwrap();
    let text = g.dynamic_isa().create_load_string(hello).unwrap();
    let call = g.dynamic_isa().create_callthis1(method, receiver, text).unwrap();
    let ret = g.dynamic_isa().create_returnundefined().unwrap();
    for inst in [receiver, method, text, call, ret] {
        g.add_instruction_back(end, inst).unwrap();
    }

    assert_eq!(g.string_operand(method).unwrap(), log);
    assert_eq!(file.string_text(log).unwrap(), "log");
    assert_eq!(g.users(receiver).unwrap(), vec![method, call]);
    assert_eq!(g.dynamic_isa().opcode(call).unwrap(), DynamicOpcode::Callthis1);
    assert!(g.is_call(call).unwrap());
    assert_eq!(g.result_type(call).unwrap(), TypeId::Any);
    assert_eq!(g.result_type(ret).unwrap(), TypeId::Void);

    // Strings are interned per file
    let again = file.create_string("log");
    assert_eq!(again, log);
    g.set_string_operand(method, hello).unwrap();
    assert_eq!(g.string_operand(method).unwrap(), hello);
    g.verify().unwrap();
}

#[test]
fn test_lexical_environment() {
    let mut file = File::new(IsaKind::Dynamic);
    let mut g = dynamic_function(&mut file, "closure", 1);
    let v = g.parameter(0).unwrap();

    let env = g.dynamic_isa().create_newlexenv(2).unwrap();
    let store = g.dynamic_isa().create_stlexvar(v, 0, 1).unwrap();
    let load = g.dynamic_isa().create_ldlexvar(0, 1).unwrap();
    assert_eq!(g.immediate_count(store).unwrap(), 2);
    assert_eq!(g.immediate_size(store, 0).unwrap(), BitWidth::W4);
    assert_eq!(g.immediate_size(env, 0).unwrap(), BitWidth::W8);
    assert_eq!(g.immediate(load, 1).unwrap(), 1);

    let far = g.dynamic_isa().create_stlexvar(v, 200, 3).unwrap();
    assert_eq!(g.immediate_size(far, 1).unwrap(), BitWidth::W8);
    assert!(matches!(
        g.dynamic_isa().create_stlexvar(v, 300, 3),
        Err(IrError::BadArgument(_))
    ));
    assert!(matches!(
        g.dynamic_isa().create_newlexenv(256),
        Err(IrError::BadArgument(_))
    ));
    let wide = g.dynamic_isa().create_wide_newlexenv(256).unwrap();
    assert_eq!(g.dynamic_isa().opcode(wide).unwrap(), DynamicOpcode::WideNewlexenv);
    assert_eq!(g.user_count(v).unwrap(), 2);
}

#[test]
fn test_class_definition() {
    let mut file = File::new(IsaKind::Dynamic);
    let ctor = file.add_function("Point", &[TypeId::Any, TypeId::Any], TypeId::Any);
    let method = file.add_function("Point.norm", &[], TypeId::Any);
    let name = file.create_string("norm");
    let members = file
        .add_literal_array(&[Literal::String(name), Literal::Method(method), Literal::U8(0)])
        .unwrap();
    let mut g = dynamic_function(&mut file, "main", 0);

    let parent = g.dynamic_isa().create_ldhole().unwrap();
    let class = g
        .dynamic_isa()
        .create_defineclasswithbuffer(ctor, members, 2, parent)
        .unwrap();
    let point = g.dynamic_isa().create_newobjrange(&[class]).unwrap();
    let proto = g.dynamic_isa().create_createobjectwithbuffer(members).unwrap();

    assert_eq!(g.immediate_size(class, 0).unwrap(), BitWidth::W16);
    assert_eq!(g.inputs(point).unwrap(), vec![class]);
    assert_eq!(g.immediate(point, 0).unwrap(), 1);
    assert_eq!(g.literal_array_operand(proto).unwrap(), members);
    assert!(matches!(
        g.dynamic_isa().create_newobjrange(&[]),
        Err(IrError::BadArgument(_))
    ));

    let mut other = File::new(IsaKind::Dynamic);
    let foreign = other.add_function("Foreign", &[], TypeId::Any);
    assert!(matches!(
        g.dynamic_isa().create_definefunc(foreign, 0),
        Err(IrError::WrongCtx(_))
    ));
    assert!(matches!(
        g.set_function_operand(class, foreign),
        Err(IrError::WrongCtx(_))
    ));
}

// ============================================================================
// Exceptions
// ============================================================================

#[test]
fn test_try_catch_with_catch_phi() {
    let mut file = File::new(IsaKind::Dynamic);
    let mut g = dynamic_function(&mut file, "guarded", 1);
    let start = g.start_block();
    let end = g.end_block();
    let arg = g.parameter(0).unwrap();

    let body = g.create_empty_block();
    let handler = g.create_empty_block();
    g.disconnect_successor(start, 0).unwrap();
    g.append_successor(start, body).unwrap();
    g.append_successor(body, end).unwrap();

    let call = g.dynamic_isa().create_callarg0(arg).unwrap();
    g.add_instruction_back(body, call).unwrap();
    let ret = g.dynamic_isa().create_return(call).unwrap();
    g.add_instruction_back(end, ret).unwrap();

    g.insert_try_catch(body, body, handler, handler).unwrap();
    let exception = g.create_catch_phi(handler, &[]).unwrap();
    let thrown = g.dynamic_isa().create_throw(exception).unwrap();
    g.add_instruction_back(handler, thrown).unwrap();

    assert!(g.is_catch_begin(handler).unwrap());
    assert_eq!(g.first_instruction(handler).unwrap(), Some(exception));
    assert!(g.is_phi(exception).unwrap());
    assert_eq!(g.dynamic_isa().opcode(exception).unwrap(), DynamicOpcode::CatchPhi);

    let try_begin = g.predecessor(body, 0).unwrap();
    let marker = g.first_instruction(try_begin).unwrap().unwrap();
    assert_eq!(g.dynamic_isa().opcode(marker).unwrap(), DynamicOpcode::Try);
    assert!(g.block_dominates(try_begin, handler).unwrap());
    g.verify().unwrap();

    let branch = g.dynamic_isa().create_if(call, ConditionCode::Ne).unwrap();
    assert_eq!(g.dynamic_isa().condition_code(branch).unwrap(), ConditionCode::Ne);
}

#[test]
fn test_catch_phi_rejected_on_static_graph() {
    let mut file = File::new(IsaKind::Static);
    let f = file.add_function("f", &[], TypeId::Void);
    let mut g = file.create_graph(f).unwrap();
    let bb = g.create_empty_block();
    assert!(matches!(
        g.create_catch_phi(bb, &[]),
        Err(IrError::WrongMode(_))
    ));
    assert_eq!(g.instruction_count(bb).unwrap(), 0);
}
