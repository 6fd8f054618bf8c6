#![forbid(unsafe_code)]

//! Property tests for [`OrderList`] invariants.
//!
//! Validates:
//! - `ids` stays a duplicate-free permutation of the entries.
//! - `len()` never exceeds the cap.
//! - Undoing every command restores byte-identical JSON.
//! - Every reachable cart deserializes back to itself.

use proptest::prelude::*;

use barpos_cart::{CartCommands, OrderList};
use barpos_core::{Item, ItemFields, ItemId, Quantity};
use barpos_runtime::{Shared, UndoManager, shared};

const ITEMS: [&str; 5] = ["a", "b", "c", "d", "e"];

#[derive(Debug, Clone)]
enum Op {
    Add(usize, Quantity, usize),
    Remove(usize, Quantity),
    Clear,
    Undo,
    Redo,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..ITEMS.len(), 1i64..4, 0usize..6).prop_map(|(i, q, at)| Op::Add(i, q, at)),
        3 => (0..ITEMS.len(), 1i64..4).prop_map(|(i, q)| Op::Remove(i, q)),
        1 => Just(Op::Clear),
        3 => Just(Op::Undo),
        2 => Just(Op::Redo),
    ]
}

fn ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 1..=max_len)
}

fn item(ix: usize) -> Item {
    Item::generic(ItemFields::new(ITEMS[ix], ITEMS[ix], "Snacks", 5.0 + ix as f64))
}

fn apply(mgr: &mut UndoManager, cart: &Shared<OrderList>, op: &Op) {
    match op {
        Op::Add(i, q, at) => {
            let _ = mgr.perform(cart.add_item_command(item(*i), *q, *at));
        }
        Op::Remove(i, q) => {
            let _ = mgr.perform(cart.remove_item_command(ItemId::from(ITEMS[*i]), *q));
        }
        Op::Clear => {
            let _ = mgr.perform(cart.clear_command());
        }
        Op::Undo => {
            mgr.undo();
        }
        Op::Redo => {
            mgr.redo();
        }
    }
}

fn json(cart: &Shared<OrderList>) -> String {
    serde_json::to_string(&*cart.borrow()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn ids_stay_a_permutation_within_cap(ops in ops_strategy(60), cap in 3i64..12) {
        let cart = shared(OrderList::new(Some(cap)));
        let mut mgr = UndoManager::default();
        for op in &ops {
            apply(&mut mgr, &cart, op);
            let c = cart.borrow();
            prop_assert!(c.len() <= cap);
            let mut ids: Vec<&ItemId> = c.ids().iter().collect();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), c.entry_count());
            for id in c.ids() {
                prop_assert!(c.get(id).is_some_and(|e| e.quantity > 0));
            }
            prop_assert_eq!(c.iter().count(), c.entry_count());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn full_undo_is_byte_identical(ops in ops_strategy(60)) {
        let cart = shared(OrderList::unbounded());
        cart.borrow_mut().add_item(item(0), 2, 0).unwrap();
        let start = json(&cart);
        let mut mgr = UndoManager::default();
        for op in &ops {
            apply(&mut mgr, &cart, op);
        }
        while mgr.undo_available() {
            prop_assert!(matches!(mgr.undo(), Some(Ok(_))));
        }
        prop_assert_eq!(json(&cart), start);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn reachable_carts_round_trip(ops in ops_strategy(40)) {
        let cart = shared(OrderList::new(Some(20)));
        let mut mgr = UndoManager::default();
        for op in &ops {
            apply(&mut mgr, &cart, op);
        }
        let back: OrderList = serde_json::from_str(&json(&cart)).unwrap();
        prop_assert_eq!(&back, &*cart.borrow());
    }
}
