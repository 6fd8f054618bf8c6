#![forbid(unsafe_code)]

//! End-to-end order flows through the application context.

use barpos::prelude::*;
use barpos::{MenuView, Quantity};

fn catalog() -> Vec<Item> {
    vec![
        Item::drink(ItemFields::new("item1", "Pale Ale", "Öl", 49.0), 5.2),
        Item::drink(ItemFields::new("item2", "Porter", "Öl", 65.0), 6.0),
        Item::drink(ItemFields::new("item3", "Islay 12", "Whisky", 180.0), 43.0),
    ]
}

fn context() -> AppContext {
    AppContext::new(PosConfig::default(), [(MenuKind::Drink, catalog())])
}

fn ids(view: &MenuView) -> Vec<String> {
    view.iter().map(|i| i.id().as_str().to_string()).collect()
}

fn stock_of(ctx: &AppContext, id: &str) -> (Quantity, Quantity) {
    let stock = ctx.stock().borrow();
    let id = ItemId::from(id);
    (stock.physical(&id), stock.reserved_of(&id))
}

#[test]
fn price_filter_then_order_commit_and_undo() {
    let mut ctx = context();

    let cmd = ctx
        .modify_filter_command(
            |f| {
                f.price_max = Some(100.0);
                FilterEdit::MutatedInPlace
            },
            false,
        )
        .unwrap();
    ctx.perform(cmd).unwrap();
    assert_eq!(ids(&ctx.page_items().unwrap()), ["item1", "item2"]);

    let cmd = ctx.cart().add_item_command(catalog()[0].clone(), 2, 0);
    ctx.perform(cmd).unwrap();
    let cmd = ctx.place_order_command(TableId(5));
    ctx.perform(cmd).unwrap();
    assert!(ctx.cart().borrow().is_empty());
    assert_eq!(stock_of(&ctx, "item1"), (20, 2));

    let cmd = ctx.stock().commit_order_command(TableId(5));
    ctx.perform(cmd).unwrap();
    assert_eq!(stock_of(&ctx, "item1"), (18, 0));
    assert_eq!(ctx.stock().borrow().reservation(TableId(5)), None);

    assert!(matches!(ctx.undo_manager_mut().undo(), Some(Ok(_))));
    assert_eq!(stock_of(&ctx, "item1"), (20, 2));
    assert_eq!(
        ctx.stock().borrow().reservation(TableId(5)),
        Some(&vec![(ItemId::from("item1"), 2)])
    );
    assert!(ctx.stock().borrow().check_invariants().is_ok());
}

#[test]
fn undoing_everything_returns_to_the_start() {
    let mut ctx = context();
    let start = serde_json::to_string(&*ctx.stock().borrow()).unwrap();

    let cmd = ctx.cart().add_item_command(catalog()[2].clone(), 1, 0);
    ctx.perform(cmd).unwrap();
    let cmd = ctx.cart().add_item_command(catalog()[1].clone(), 3, 0);
    ctx.perform(cmd).unwrap();
    let cmd = ctx.checkout_command(TableId(1), PaymentMethod::Card);
    ctx.perform(cmd).unwrap();
    let cmd = ctx.stock().commit_order_command(TableId(1));
    ctx.perform(cmd).unwrap();
    assert_eq!(ctx.orders().borrow().len(), 1);
    assert_eq!(ctx.undo_manager().undo_depth(), 4);

    while ctx.undo_manager().undo_available() {
        assert!(matches!(ctx.undo_manager_mut().undo(), Some(Ok(_))));
    }
    assert_eq!(serde_json::to_string(&*ctx.stock().borrow()).unwrap(), start);
    assert!(ctx.cart().borrow().is_empty());
    assert!(ctx.orders().borrow().is_empty());
}

#[test]
fn low_stock_hides_items_after_invalidation() {
    let mut ctx = context();
    assert_eq!(ctx.page_items().unwrap().len(), 3);

    let cmd = ctx.stock().set_physical_command(ItemId::from("item2"), 5);
    ctx.perform(cmd).unwrap();
    assert_eq!(ctx.page_items().unwrap().len(), 3);
    ctx.invalidate_menus();
    assert_eq!(ids(&ctx.page_items().unwrap()), ["item1", "item3"]);
}

#[test]
fn refill_flow_marks_then_restocks() {
    let mut ctx = context();
    ctx.stock()
        .borrow_mut()
        .set_physical(&ItemId::from("item3"), 2);

    let cmd = ctx.cart().add_item_command(catalog()[2].clone(), 1, 0);
    ctx.perform(cmd).unwrap();
    let cmd = ctx.refill_items_command();
    ctx.perform(cmd).unwrap();
    assert!(ctx.stock().borrow().is_marked_for_refill(&ItemId::from("item3")));
    assert!(ctx.cart().borrow().is_empty());

    ctx.refill_marked();
    assert_eq!(stock_of(&ctx, "item3"), (20, 0));
    assert_eq!(ctx.stock().borrow().marked_for_refill().count(), 0);
}
