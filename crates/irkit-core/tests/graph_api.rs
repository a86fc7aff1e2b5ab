//! Integration tests for graph construction, editing and analyses

use irkit_core::{ConstValue, File, Graph, IrError, IsaKind, Op, PrettyPrint, TypeId};

/// Route library logs to the test harness, filtered by `RUST_LOG`
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn static_graph(params: &[TypeId], ret: TypeId) -> (File, Graph) {
    let mut file = File::new(IsaKind::Static);
    let f = file.add_function("f", params, ret);
    let graph = file.create_graph(f).unwrap();
    (file, graph)
}

// ============================================================================
// End-to-end
// ============================================================================

#[test]
fn test_add_and_return_scenario() {
    init_logging();
    let mut file = File::new(IsaKind::Static);
    let f = file.add_function("twelve", &[], TypeId::I32);
    let mut g = file.create_graph(f).unwrap();
    let start = g.start_block();
    let end = g.end_block();

    let c5 = g.find_or_create_constant_i32(5);
    let c7 = g.find_or_create_constant_i32(7);
    let add = g.static_isa().create_add(c5, c7).unwrap();
    g.add_instruction_back(start, add).unwrap();
    let ret = g.static_isa().create_return(add).unwrap();
    g.add_instruction_back(end, ret).unwrap();

    assert_eq!(g.input_count(add).unwrap(), 2);
    assert_eq!(g.users(c5).unwrap(), vec![add]);
    assert_eq!(g.users(add).unwrap(), vec![ret]);
    assert!(g.block_dominates(start, end).unwrap());
    assert!(g.inst_dominates(add, ret).unwrap());
    assert!(!g.inst_dominates(ret, add).unwrap());

    let before = (g.blocks(), g.instructions(start).unwrap());
    let text = g.pretty_print();
    assert!(text.contains("add"));
    let mut sink = Vec::new();
    g.dump(&mut sink).unwrap();
    assert_eq!(String::from_utf8(sink).unwrap(), text);
    assert_eq!((g.blocks(), g.instructions(start).unwrap()), before);

    g.verify().unwrap();
    file.commit_graph(f, g).unwrap();

    let reopened = file.create_graph(f).unwrap();
    let body_add = reopened.instructions(reopened.start_block()).unwrap()[2];
    assert_eq!(reopened.op(body_add).unwrap().mnemonic(), "add");
    assert_eq!(reopened.instruction_count(reopened.end_block()).unwrap(), 1);
}

#[test]
fn test_commit_rejects_invalid_or_foreign_graphs() {
    let mut file = File::new(IsaKind::Static);
    let f = file.add_function("f", &[], TypeId::Void);
    let h = file.add_function("h", &[], TypeId::Void);

    let g = file.create_graph(f).unwrap();
    assert!(matches!(file.commit_graph(h, g), Err(IrError::WrongCtx(_))));

    let mut other = File::new(IsaKind::Static);
    let x = other.add_function("x", &[], TypeId::Void);
    let foreign = other.create_graph(x).unwrap();
    assert!(matches!(
        file.commit_graph(f, foreign),
        Err(IrError::WrongCtx(_))
    ));
}

// ============================================================================
// Edges
// ============================================================================

#[test]
fn test_edges_stay_symmetric() {
    let (_file, mut g) = static_graph(&[], TypeId::Void);
    let start = g.start_block();
    let end = g.end_block();
    let a = g.create_empty_block();
    let b = g.create_empty_block();

    g.disconnect_successor(start, 0).unwrap();
    g.append_successor(start, a).unwrap();
    g.append_successor(a, b).unwrap();
    g.insert_successor(a, end, 0).unwrap();
    g.append_successor(b, end).unwrap();

    assert_eq!(g.successors(a).unwrap(), vec![end, b]);
    assert_eq!(g.true_branch(a).unwrap(), end);
    assert_eq!(g.false_branch(a).unwrap(), b);
    assert_eq!(g.predecessors(end).unwrap(), vec![a, b]);

    g.disconnect_successor(a, 0).unwrap();
    assert_eq!(g.successors(a).unwrap(), vec![b]);
    assert_eq!(g.predecessors(end).unwrap(), vec![b]);
    assert!(matches!(
        g.disconnect_successor(a, 3),
        Err(IrError::BadArgument(_))
    ));
    g.verify().unwrap();
}

#[test]
fn test_cross_graph_rejection_leaves_both_unchanged() {
    let (_f1, mut g1) = static_graph(&[TypeId::I32], TypeId::Void);
    let (_f2, mut g2) = static_graph(&[TypeId::I32], TypeId::Void);
    let b1 = g1.create_empty_block();
    let b2 = g2.create_empty_block();
    let before1 = g1.to_json().unwrap();
    let before2 = g2.to_json().unwrap();

    assert!(matches!(
        g1.append_successor(b1, b2),
        Err(IrError::WrongCtx(_))
    ));
    let p2 = g2.parameter(0).unwrap();
    assert!(matches!(
        g1.static_isa().create_neg(p2),
        Err(IrError::WrongCtx(_))
    ));
    assert_eq!(g1.to_json().unwrap(), before1);

    let p1 = g1.parameter(0).unwrap();
    let neg = g1.static_isa().create_neg(p1).unwrap();
    let with_neg = g1.to_json().unwrap();
    assert!(matches!(
        g1.set_input(neg, 0, p2),
        Err(IrError::WrongCtx(_))
    ));
    assert_eq!(g1.to_json().unwrap(), with_neg);
    assert_eq!(g1.users(p1).unwrap(), vec![neg]);
    assert_eq!(g2.to_json().unwrap(), before2);
}

// ============================================================================
// Instructions
// ============================================================================

#[test]
fn test_placement_and_removal() {
    let (_file, mut g) = static_graph(&[TypeId::I32], TypeId::I32);
    let bb = g.create_empty_block();
    let p = g.parameter(0).unwrap();
    let a = g.static_isa().create_neg(p).unwrap();
    let b = g.static_isa().create_not(a).unwrap();
    let c = g.static_isa().create_neg(b).unwrap();

    g.add_instruction_back(bb, b).unwrap();
    g.insert_before(a, b).unwrap();
    g.insert_after(c, b).unwrap();
    assert_eq!(g.instructions(bb).unwrap(), vec![a, b, c]);
    assert_eq!(g.first_instruction(bb).unwrap(), Some(a));
    assert_eq!(g.last_instruction(bb).unwrap(), Some(c));
    assert_eq!(g.next(a).unwrap(), Some(b));
    assert_eq!(g.prev(a).unwrap(), None);

    assert!(matches!(
        g.add_instruction_front(bb, a),
        Err(IrError::BadArgument(_))
    ));

    g.remove(c).unwrap();
    assert_eq!(g.instructions(bb).unwrap(), vec![a, b]);
    assert_eq!(g.user_count(b).unwrap(), 0);
    assert!(matches!(g.inst_block(c), Err(IrError::BadArgument(_))));
    g.verify().unwrap();
}

#[test]
fn test_input_replacement_updates_users() {
    let (_file, mut g) = static_graph(&[TypeId::I32, TypeId::I32], TypeId::I32);
    let p0 = g.parameter(0).unwrap();
    let p1 = g.parameter(1).unwrap();
    let add = g.static_isa().create_add(p0, p0).unwrap();
    assert_eq!(g.users(p0).unwrap(), vec![add, add]);

    g.set_input(add, 1, p1).unwrap();
    assert_eq!(g.inputs(add).unwrap(), vec![p0, p1]);
    assert_eq!(g.users(p0).unwrap(), vec![add]);
    assert_eq!(g.users(p1).unwrap(), vec![add]);

    assert!(matches!(
        g.set_inputs(add, &[p1]),
        Err(IrError::BadArgument(_))
    ));
    g.set_inputs(add, &[p1, p1]).unwrap();
    assert_eq!(g.user_count(p0).unwrap(), 0);
    assert_eq!(g.user_count(p1).unwrap(), 2);
    assert!(matches!(g.input(add, 2), Err(IrError::BadArgument(_))));
}

#[test]
fn test_constants_by_kind() {
    let (_file, mut g) = static_graph(&[], TypeId::Void);
    let i = g.find_or_create_constant_i64(-3);
    let u = g.find_or_create_constant_u64(3);
    let f = g.find_or_create_constant(ConstValue::F64(0.5));
    assert_eq!(g.constant_i64(i).unwrap(), -3);
    assert_eq!(g.constant_u64(u).unwrap(), 3);
    assert_eq!(g.constant_f64(f).unwrap(), 0.5);
    assert!(matches!(g.constant_i32(i), Err(IrError::BadArgument(_))));
    assert_eq!(g.result_type(u).unwrap(), TypeId::U64);
    assert!(g.is_constant(f).unwrap());
}

// ============================================================================
// Splitting, try/catch and analyses
// ============================================================================

#[test]
fn test_split_block_after() {
    let (_file, mut g) = static_graph(&[TypeId::I32], TypeId::I32);
    let start = g.start_block();
    let end = g.end_block();
    let bb = g.create_empty_block();
    g.disconnect_successor(start, 0).unwrap();
    g.append_successor(start, bb).unwrap();
    g.append_successor(bb, end).unwrap();

    let p = g.parameter(0).unwrap();
    let a = g.static_isa().create_neg(p).unwrap();
    let b = g.static_isa().create_neg(a).unwrap();
    let c = g.static_isa().create_neg(b).unwrap();
    for inst in [a, b, c] {
        g.add_instruction_back(bb, inst).unwrap();
    }

    let tail = g.split_block_after(bb, a, true).unwrap();
    assert_eq!(g.instructions(bb).unwrap(), vec![a]);
    assert_eq!(g.instructions(tail).unwrap(), vec![b, c]);
    assert_eq!(g.inst_block(c).unwrap(), Some(tail));
    assert_eq!(g.successors(bb).unwrap(), vec![tail]);
    assert_eq!(g.successors(tail).unwrap(), vec![end]);
    assert_eq!(g.predecessors(end).unwrap(), vec![tail]);
    assert_eq!(g.immediate_dominator(tail).unwrap(), Some(bb));
    g.verify().unwrap();

    let orphan = g.split_block_after(tail, b, false).unwrap();
    assert_eq!(g.successor_count(tail).unwrap(), 0);
    assert_eq!(g.predecessor_count(orphan).unwrap(), 0);
    assert_eq!(g.remove_unreachable_blocks(), 1);
    assert!(matches!(g.inst_block(c), Err(IrError::BadArgument(_))));
}

#[test]
fn test_insert_try_catch() {
    let mut file = File::new(IsaKind::Dynamic);
    let f = file.add_function("guarded", &[], TypeId::Any);
    let mut g = file.create_graph(f).unwrap();
    let start = g.start_block();
    let end = g.end_block();
    let body = g.create_empty_block();
    let handler = g.create_empty_block();
    g.disconnect_successor(start, 0).unwrap();
    g.append_successor(start, body).unwrap();
    g.append_successor(body, end).unwrap();

    g.insert_try_catch(body, body, handler, handler).unwrap();

    let try_begin = g.predecessor(body, 0).unwrap();
    assert!(g.is_try_begin(try_begin).unwrap());
    assert_eq!(g.successors(start).unwrap(), vec![try_begin]);
    assert_eq!(g.successors(try_begin).unwrap(), vec![body, handler]);
    let marker = g.first_instruction(try_begin).unwrap().unwrap();
    assert_eq!(g.op(marker).unwrap(), Op::Try);

    let try_end = g.successor(body, 0).unwrap();
    assert!(g.is_try_end(try_end).unwrap());
    assert_eq!(g.successors(try_end).unwrap(), vec![end, handler]);
    assert_eq!(g.successors(handler).unwrap(), vec![end]);

    assert!(g.is_try(body).unwrap());
    assert!(g.is_catch_begin(handler).unwrap());
    assert!(g.is_catch(handler).unwrap());
    assert!(!g.is_try(handler).unwrap());
    g.verify().unwrap();

    assert!(matches!(
        g.insert_try_catch(start, body, handler, handler),
        Err(IrError::BadArgument(_))
    ));
}

#[test]
fn test_loop_classification() {
    let (_file, mut g) = static_graph(&[], TypeId::Void);
    let start = g.start_block();
    let end = g.end_block();
    let pre = g.create_empty_block();
    let head = g.create_empty_block();
    let body = g.create_empty_block();
    g.disconnect_successor(start, 0).unwrap();
    g.append_successor(start, pre).unwrap();
    g.append_successor(pre, head).unwrap();
    g.append_successor(head, body).unwrap();
    g.append_successor(head, end).unwrap();
    g.append_successor(body, head).unwrap();

    assert!(g.is_loop_head(head).unwrap());
    assert!(!g.is_loop_head(body).unwrap());
    assert!(g.is_loop_prehead(pre).unwrap());
    assert!(!g.is_loop_prehead(body).unwrap());
    assert_eq!(g.dominated_blocks(head).unwrap(), vec![end, body]);

    let mut visited = Vec::new();
    let completed = g
        .visit_dominated(head, |bb| {
            visited.push(bb);
            false
        })
        .unwrap();
    assert!(!completed);
    assert_eq!(visited, vec![end]);
}
