#![forbid(unsafe_code)]

//! Screen-level commands built from the model commands.
//!
//! | Command | Built as |
//! |---------|----------|
//! | [`FilterChange`] | menu filter change, then page reset |
//! | [`RefillItems`] | `unfailing(mark for refill)`, then clear the cart |
//! | [`PlaceOrder`] | reserve the cart as it is when performed, then clear it |
//! | [`Checkout`] | reserve, register the order, then clear the cart |
//! | [`PayWithCredit`] | charge the cart total read when performed, then checkout |
//!
//! Composition rolls the first half back when the second half fails, so an
//! empty cart makes every cart-clearing command fail as a whole.

use barpos_cart::{CartCommands, ClearCart, OrderList};
use barpos_core::TableId;
use barpos_menu::{FilterEdit, FilterSpec, MenuCommands, ModifyFilter};
use barpos_runtime::{
    CommandError, CommandExt, CommandResult, Composed, Delayed, FnCommand, Shared, Unfailing,
    delayed,
};
use barpos_session::{ModifyCredit, SessionCommands};
use barpos_stock::{MarkForRefill, ReserveOrder, StockCommands};
use tracing::info;

use crate::context::AppContext;
use crate::error::AppError;
use crate::orders::{OrderRegister, PaymentMethod, RegisteredOrder};

/// Moves the pager back to page 0, both ways.
pub type ResetPage = FnCommand<(), ()>;
/// See [`AppContext::modify_filter_command`].
pub type FilterChange = Composed<ModifyFilter, ResetPage>;
/// See [`AppContext::refill_items_command`].
pub type RefillItems = Composed<Unfailing<MarkForRefill>, ClearCart>;
/// Reserves the cart contents read at perform time.
pub type ReserveCart = Delayed<Box<dyn Fn() -> ReserveOrder>>;
/// See [`AppContext::register_order_command`]. Output: register index of
/// the appended order.
pub type RegisterOrder = FnCommand<usize, ()>;
/// See [`AppContext::place_order_command`].
pub type PlaceOrder = Composed<ReserveCart, ClearCart>;
/// See [`AppContext::checkout_command`].
pub type Checkout = Composed<Composed<ReserveCart, RegisterOrder>, ClearCart>;
/// Charges the cart total read at perform time.
pub type ChargeCart = Delayed<Box<dyn Fn() -> ModifyCredit>>;
/// See [`AppContext::pay_with_credit_command`].
pub type PayWithCredit = Composed<ChargeCart, Checkout>;

fn register_snapshot(
    cart: &Shared<OrderList>,
    orders: &Shared<OrderRegister>,
    table: TableId,
    method: PaymentMethod,
) -> CommandResult<usize> {
    let cart = cart.borrow();
    if cart.is_empty() {
        return Err(CommandError::Rejected("cannot register an empty order".into()));
    }
    let ix = orders.borrow_mut().push(RegisteredOrder {
        order: cart.clone(),
        table,
        method,
    });
    info!(%table, ?method, ix, items = cart.len(), total = cart.total_price(), "order registered");
    Ok(ix)
}

impl AppContext {
    /// Page reset used after every filter change.
    #[must_use]
    pub fn reset_page_command(&self) -> ResetPage {
        let pager = self.pager.clone();
        let undo_pager = self.pager.clone();
        FnCommand::new(
            "Reset page",
            move || {
                pager.borrow_mut().reset();
                Ok(())
            },
            move |()| {
                undo_pager.borrow_mut().reset();
                Ok(())
            },
        )
    }

    /// Change the active menu's filters and return to the first page.
    ///
    /// # Errors
    ///
    /// [`AppError::MissingMenu`] if the active menu was never loaded.
    pub fn modify_filter_command(
        &self,
        modifier: impl Fn(&mut FilterSpec) -> FilterEdit + 'static,
        preserve_view: bool,
    ) -> Result<FilterChange, AppError> {
        let menu = self.menu_manager()?;
        Ok(menu
            .modify_filter_command(modifier, preserve_view)
            .then(self.reset_page_command()))
    }

    /// Clear the active menu's filters and return to the first page.
    ///
    /// # Errors
    ///
    /// [`AppError::MissingMenu`] if the active menu was never loaded.
    pub fn clear_filter_command(&self) -> Result<FilterChange, AppError> {
        let menu = self.menu_manager()?;
        Ok(menu.clear_filter_command().then(self.reset_page_command()))
    }

    /// Mark everything in the cart for refill, then clear the cart.
    ///
    /// Items already marked do not make the command fail; an empty cart
    /// does.
    #[must_use]
    pub fn refill_items_command(&self) -> RefillItems {
        let ids = self.cart.borrow().ids().to_vec();
        self.stock
            .mark_for_refill_command(ids)
            .unfailing()
            .then(self.cart.clear_command())
    }

    fn reserve_cart_command(&self, table: TableId, description: &str) -> ReserveCart {
        let stock = self.stock.clone();
        let cart = self.cart.clone();
        let factory: Box<dyn Fn() -> ReserveOrder> =
            Box::new(move || stock.reserve_order_command(table, cart.borrow().compact()));
        delayed(description, factory)
    }

    /// Reserve the cart for `table` and clear it.
    ///
    /// The reservation is built from the cart as it is when the command is
    /// performed, not when it is built.
    #[must_use]
    pub fn place_order_command(&self, table: TableId) -> PlaceOrder {
        self.reserve_cart_command(table, "Place order")
            .then(self.cart.clear_command())
    }

    /// Append the current cart to the order register.
    ///
    /// Fails with [`CommandError::Rejected`] on an empty cart. Undo removes
    /// the appended entry by index, so orders registered after it without
    /// history are kept.
    #[must_use]
    pub fn register_order_command(&self, table: TableId, method: PaymentMethod) -> RegisterOrder {
        let cart = self.cart.clone();
        let orders = self.orders.clone();
        let undo_orders = self.orders.clone();
        FnCommand::new(
            "Register order",
            move || register_snapshot(&cart, &orders, table, method),
            move |ix| {
                undo_orders
                    .borrow_mut()
                    .remove(ix)
                    .map(drop)
                    .ok_or_else(|| {
                        CommandError::InvalidState(format!("no registered order at {ix}"))
                    })
            },
        )
    }

    /// Append the current cart to the order register without history.
    /// Returns the register index of the new entry.
    ///
    /// # Errors
    ///
    /// [`CommandError::Rejected`] on an empty cart.
    pub fn register_order(&self, table: TableId, method: PaymentMethod) -> CommandResult<usize> {
        register_snapshot(&self.cart, &self.orders, table, method)
    }

    /// Reserve, register and clear the cart in one step.
    #[must_use]
    pub fn checkout_command(&self, table: TableId, method: PaymentMethod) -> Checkout {
        self.reserve_cart_command(table, "Checkout")
            .then(self.register_order_command(table, method))
            .then(self.cart.clear_command())
    }

    /// Charge the cart total to the active user, then checkout with
    /// [`PaymentMethod::Credit`].
    ///
    /// The total is read when the command is performed, from the same cart
    /// the checkout reserves and registers. The charge is rejected when the
    /// user's credit does not cover it.
    ///
    /// # Errors
    ///
    /// [`AppError::NoSession`] if no user directory is attached.
    pub fn pay_with_credit_command(&self, table: TableId) -> Result<PayWithCredit, AppError> {
        let session = self.session.clone().ok_or(AppError::NoSession)?;
        let cart = self.cart.clone();
        let factory: Box<dyn Fn() -> ModifyCredit> =
            Box::new(move || session.charge_command(cart.borrow().total_price()));
        Ok(delayed("Pay with credit", factory)
            .then(self.checkout_command(table, PaymentMethod::Credit)))
    }

    /// Bring every marked item back to default stock and drop cached menu
    /// partitions. Not undoable.
    pub fn refill_marked(&self) {
        self.stock.borrow_mut().refill();
        self.invalidate_menus();
        info!("marked items refilled");
    }
}
