//! Static-family programs built end to end

use irkit_core::{
    BitWidth, BlockId, ConditionCode, File, Graph, IrError, IsaKind, Literal, StaticOpcode,
    TypeId,
};

fn link(g: &mut Graph, from: BlockId, to: BlockId) {
    g.append_successor(from, to).unwrap();
}

// ============================================================================
// Control flow
// ============================================================================

/// `max(a, b)` as a diamond with a phi in the join block
#[test]
fn test_max_diamond() {
    let mut file = File::new(IsaKind::Static);
    let f = file.add_function("max", &[TypeId::I32, TypeId::I32], TypeId::I32);
    let mut g = file.create_graph(f).unwrap();
    let start = g.start_block();
    let end = g.end_block();
    let a = g.parameter(0).unwrap();
    let b = g.parameter(1).unwrap();

    let head = g.create_empty_block();
    let then_bb = g.create_empty_block();
    let join = g.create_empty_block();
    g.disconnect_successor(start, 0).unwrap();
    link(&mut g, start, head);
    link(&mut g, head, join);
    link(&mut g, head, then_bb);
    link(&mut g, then_bb, join);
    link(&mut g, join, end);

    let branch = g.static_isa().create_if(a, b, ConditionCode::Gt).unwrap();
    g.add_instruction_back(head, branch).unwrap();
    let phi = g.create_phi(join, &[a, b]).unwrap();
    let ret = g.static_isa().create_return(phi).unwrap();
    g.add_instruction_back(join, ret).unwrap();

    assert_eq!(g.true_branch(head).unwrap(), join);
    assert_eq!(g.false_branch(head).unwrap(), then_bb);
    assert_eq!(g.immediate_dominator(join).unwrap(), Some(head));
    assert_eq!(g.result_type(phi).unwrap(), TypeId::I32);
    assert_eq!(g.static_isa().opcode(phi).unwrap(), StaticOpcode::Phi);
    assert_eq!(g.static_isa().opcode(branch).unwrap(), StaticOpcode::If);
    assert!(g.static_isa().opcode(branch).unwrap().has_condition_code());

    g.verify().unwrap();
    file.commit_graph(f, g).unwrap();
}

#[test]
fn test_counting_loop() {
    let mut file = File::new(IsaKind::Static);
    let f = file.add_function("count", &[TypeId::I32], TypeId::I32);
    let mut g = file.create_graph(f).unwrap();
    let start = g.start_block();
    let end = g.end_block();
    let n = g.parameter(0).unwrap();
    let zero = g.find_or_create_constant_i32(0);

    let head = g.create_empty_block();
    let body = g.create_empty_block();
    g.disconnect_successor(start, 0).unwrap();
    link(&mut g, start, head);
    link(&mut g, head, end);
    link(&mut g, head, body);
    link(&mut g, body, head);

    let i = g.create_phi(head, &[zero]).unwrap();
    let cond = g.static_isa().create_if(i, n, ConditionCode::Ge).unwrap();
    g.add_instruction_back(head, cond).unwrap();
    let next = g.static_isa().create_add_i(i, 1).unwrap();
    g.add_instruction_back(body, next).unwrap();
    g.append_input(i, next).unwrap();

    assert_eq!(g.inputs(i).unwrap(), vec![zero, next]);
    assert_eq!(g.users(i).unwrap(), vec![cond, next]);
    assert!(g.is_loop_head(head).unwrap());
    assert!(g.is_loop_prehead(start).unwrap());
    assert_eq!(g.immediate(next, 0).unwrap(), 1);
    assert_eq!(g.immediate_size(next, 0).unwrap(), BitWidth::W32);
    g.verify().unwrap();
}

// ============================================================================
// Objects and calls
// ============================================================================

#[test]
fn test_object_program() {
    let mut file = File::new(IsaKind::Static);
    let class = file.add_class("Counter");
    let value = file.add_field(class, "value", TypeId::I64).unwrap();
    let ctor = file.add_function("Counter.<init>", &[TypeId::Reference], TypeId::Void);
    let bump = file.add_function("Counter.bump", &[TypeId::I64], TypeId::I64);
    let main = file.add_function("main", &[TypeId::I64], TypeId::I64);
    let mut g = file.create_graph(main).unwrap();
    let end = g.end_block();
    let by = g.parameter(0).unwrap();

    let obj = g.static_isa().create_new_object(class).unwrap();
    let init = g.static_isa().create_init_object(ctor, &[obj]).unwrap();
    let call = g
        .static_isa()
        .create_call_virtual(bump, obj, &[by])
        .unwrap();
    let stored = g.static_isa().create_store_object(obj, value, call).unwrap();
    let loaded = g.static_isa().create_load_object(obj, value).unwrap();
    let ret = g.static_isa().create_return(loaded).unwrap();
    for inst in [obj, init, call, stored, loaded, ret] {
        g.add_instruction_back(end, inst).unwrap();
    }

    assert_eq!(g.result_type(call).unwrap(), TypeId::I64);
    assert_eq!(g.inputs(call).unwrap(), vec![obj, by]);
    assert_eq!(g.function_operand(call).unwrap(), bump);
    assert_eq!(g.class_operand(obj).unwrap(), class);
    assert_eq!(g.field_operand(loaded).unwrap(), value);
    assert_eq!(g.user_count(obj).unwrap(), 4);
    assert!(g.is_call(call).unwrap());
    assert!(!g.is_call(init).unwrap());

    // Retargeting a call changes its result type
    let other = file.add_function("Counter.reset", &[TypeId::I64], TypeId::Void);
    g.set_function_operand(call, other).unwrap();
    assert_eq!(g.result_type(call).unwrap(), TypeId::Void);
    assert!(matches!(
        g.class_operand(call),
        Err(IrError::BadArgument(_))
    ));
}

#[test]
fn test_arrays_and_literals() {
    let mut file = File::new(IsaKind::Static);
    let elem = file.add_class("i32");
    let lits = file
        .add_literal_array(&[Literal::U32(1), Literal::U32(2)])
        .unwrap();
    let f = file.add_function("arr", &[TypeId::I32], TypeId::I32);
    let mut g = file.create_graph(f).unwrap();
    let len = g.parameter(0).unwrap();
    let zero = g.find_or_create_constant_i32(0);

    let arr = g.static_isa().create_new_array(elem, len).unwrap();
    let store = g
        .static_isa()
        .create_store_array(arr, zero, len, TypeId::I32)
        .unwrap();
    let load = g
        .static_isa()
        .create_load_array(arr, zero, TypeId::I32)
        .unwrap();
    let size = g.static_isa().create_len_array(arr).unwrap();
    let constant = g.static_isa().create_load_const_array(lits).unwrap();

    assert_eq!(g.result_type(load).unwrap(), TypeId::I32);
    assert_eq!(g.result_type(size).unwrap(), TypeId::I32);
    assert_eq!(g.result_type(store).unwrap(), TypeId::Void);
    assert_eq!(g.literal_array_operand(constant).unwrap(), lits);
    assert_eq!(file.literal_array(lits).unwrap().len(), 2);

    let wide = g.find_or_create_constant_i64(1);
    assert!(matches!(
        g.static_isa().create_store_array(arr, zero, wide, TypeId::I32),
        Err(IrError::BadArgument(_))
    ));
}

#[test]
fn test_static_ops_reject_dynamic_graphs() {
    let mut file = File::new(IsaKind::Dynamic);
    let f = file.add_function("f", &[TypeId::Any], TypeId::Any);
    let mut g = file.create_graph(f).unwrap();
    let p = g.parameter(0).unwrap();
    assert!(matches!(
        g.static_isa().create_neg(p),
        Err(IrError::WrongMode(_))
    ));
    assert!(matches!(
        g.static_isa().opcode(p),
        Err(IrError::WrongMode(_))
    ));
    assert_eq!(g.user_count(p).unwrap(), 0);
}
