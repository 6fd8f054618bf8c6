#![forbid(unsafe_code)]

//! Property tests for [`UndoManager`] invariants.
//!
//! Validates:
//! - Random perform/undo/redo sequences restore byte-identical prior state.
//! - Redo after undo replays the performed state.
//! - A successful perform always empties the redo stack.
//! - Failed performs never change state or history depth.
//! - Composites with a failing half leave no partial state.

use proptest::prelude::*;

use barpos_runtime::undo::{
    Command, CommandError, CommandExt, FnCommand, HistoryConfig, UndoManager,
};
use barpos_runtime::{Shared, shared};

// ============================================================================
// Model commands
// ============================================================================

fn push(list: &Shared<Vec<i64>>, value: i64) -> FnCommand<()> {
    let (a, b) = (list.clone(), list.clone());
    FnCommand::new(
        "push",
        move || {
            a.borrow_mut().push(value);
            Ok(())
        },
        move |()| {
            b.borrow_mut().pop();
            Ok(())
        },
    )
}

fn pop(list: &Shared<Vec<i64>>) -> FnCommand<i64> {
    let (a, b) = (list.clone(), list.clone());
    FnCommand::new(
        "pop",
        move || {
            a.borrow_mut()
                .pop()
                .ok_or_else(|| CommandError::NotFound("empty list".into()))
        },
        move |popped| {
            b.borrow_mut().push(popped);
            Ok(())
        },
    )
}

fn add_all(list: &Shared<Vec<i64>>, delta: i64) -> FnCommand<i64> {
    let (a, b) = (list.clone(), list.clone());
    FnCommand::new(
        "add all",
        move || {
            if delta == 0 {
                return Err(CommandError::NoChange("zero delta".into()));
            }
            for v in a.borrow_mut().iter_mut() {
                *v = v.wrapping_add(delta);
            }
            Ok(delta)
        },
        move |delta| {
            for v in b.borrow_mut().iter_mut() {
                *v = v.wrapping_sub(delta);
            }
            Ok(())
        },
    )
}

fn snapshot(list: &Shared<Vec<i64>>) -> String {
    serde_json::to_string(&*list.borrow()).unwrap()
}

// ============================================================================
// Strategy helpers
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Push(i64),
    Pop,
    AddAll(i64),
    PushThenPop(i64),
    Undo,
    Redo,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (-1000i64..1000).prop_map(Op::Push),
        2 => Just(Op::Pop),
        2 => (-3i64..=3).prop_map(Op::AddAll),
        1 => (-1000i64..1000).prop_map(Op::PushThenPop),
        3 => Just(Op::Undo),
        2 => Just(Op::Redo),
    ]
}

fn ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 1..=max_len)
}

fn perform_op(mgr: &mut UndoManager, list: &Shared<Vec<i64>>, op: &Op) -> Option<bool> {
    let ok = match op {
        Op::Push(v) => mgr.perform(push(list, *v)).is_ok(),
        Op::Pop => mgr.perform(pop(list)).is_ok(),
        Op::AddAll(d) => mgr.perform(add_all(list, *d)).is_ok(),
        Op::PushThenPop(v) => mgr.perform(push(list, *v).then(pop(list))).is_ok(),
        Op::Undo | Op::Redo => return None,
    };
    Some(ok)
}

// ============================================================================
// Invariant 1: undo/redo walk the exact history of states
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn undo_redo_track_reference_history(ops in ops_strategy(60)) {
        let list = shared(Vec::new());
        let mut mgr = UndoManager::default();
        // States before each undoable entry, and states after each redoable one.
        let mut undo_states: Vec<(String, String)> = Vec::new();
        let mut redo_states: Vec<(String, String)> = Vec::new();

        for op in &ops {
            let before = snapshot(&list);
            match op {
                Op::Undo => {
                    let outcome = mgr.undo();
                    match undo_states.pop() {
                        Some((prior, after)) => {
                            prop_assert!(matches!(outcome, Some(Ok(_))));
                            prop_assert_eq!(snapshot(&list), prior.clone());
                            redo_states.push((prior, after));
                        }
                        None => prop_assert!(outcome.is_none()),
                    }
                }
                Op::Redo => {
                    let outcome = mgr.redo();
                    match redo_states.pop() {
                        Some((prior, after)) => {
                            prop_assert!(matches!(outcome, Some(Ok(_))));
                            prop_assert_eq!(snapshot(&list), after.clone());
                            undo_states.push((prior, after));
                        }
                        None => prop_assert!(outcome.is_none()),
                    }
                }
                _ => {
                    let performed = perform_op(&mut mgr, &list, op).unwrap_or(false);
                    if performed {
                        undo_states.push((before, snapshot(&list)));
                        redo_states.clear();
                        prop_assert!(!mgr.redo_available());
                    } else {
                        prop_assert_eq!(snapshot(&list), before);
                    }
                }
            }
            prop_assert_eq!(mgr.undo_depth(), undo_states.len());
            prop_assert_eq!(mgr.redo_depth(), redo_states.len());
        }
    }
}

// ============================================================================
// Invariant 2: undoing everything restores the initial state
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn full_undo_restores_initial_state(
        initial in prop::collection::vec(-100i64..100, 0..10),
        ops in ops_strategy(40),
    ) {
        let list = shared(initial);
        let start = snapshot(&list);
        let mut mgr = UndoManager::default();
        for op in &ops {
            match op {
                Op::Undo => { mgr.undo(); }
                Op::Redo => { mgr.redo(); }
                _ => { perform_op(&mut mgr, &list, op); }
            }
        }
        while mgr.undo().is_some() {}
        prop_assert_eq!(snapshot(&list), start);
    }
}

// ============================================================================
// Invariant 3: composite with a failing half leaves no partial state
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn failing_second_half_rolls_back(
        initial in prop::collection::vec(-100i64..100, 0..10),
        value in -100i64..100,
    ) {
        let list = shared(initial);
        let before = snapshot(&list);
        let cmd = push(&list, value).then(add_all(&list, 0));
        prop_assert!(cmd.perform().is_err());
        prop_assert_eq!(snapshot(&list), before);
    }
}

// ============================================================================
// Invariant 4: depth limit is never exceeded
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn depth_limit_respected(max_depth in 1usize..8, ops in ops_strategy(50)) {
        let list = shared(Vec::new());
        let mut mgr = UndoManager::new(HistoryConfig::with_max_depth(max_depth));
        for op in &ops {
            match op {
                Op::Undo => { mgr.undo(); }
                Op::Redo => { mgr.redo(); }
                _ => { perform_op(&mut mgr, &list, op); }
            }
            prop_assert!(mgr.undo_depth() <= max_depth);
        }
    }
}
