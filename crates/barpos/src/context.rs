#![forbid(unsafe_code)]

//! The explicit application context.
//!
//! # Invariants
//!
//! 1. Every shared handle in the context is the one its commands close
//!    over; replacing a handle is not supported, so commands built earlier
//!    stay valid.
//! 2. `active_menu` names a loaded menu whenever at least one menu is
//!    loaded.
//!
//! # Failure Modes
//!
//! - Asking for a menu that was never loaded returns
//!   [`AppError::MissingMenu`].

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::info;

use barpos_cart::OrderList;
use barpos_core::Item;
use barpos_menu::{MenuManager, MenuView};
use barpos_runtime::{Command, CommandResult, PosConfig, Shared, UndoManager, shared};
use barpos_session::{UserDirectory, UserSession};
use barpos_stock::Stock;

use crate::error::AppError;
use crate::orders::OrderRegister;
use crate::paging::Pager;

/// Which catalog a menu lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuKind {
    Drink,
    Food,
}

impl MenuKind {
    pub const ALL: [Self; 2] = [Self::Drink, Self::Food];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drink => "drink",
            Self::Food => "food",
        }
    }
}

impl fmt::Display for MenuKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything one running terminal works on.
pub struct AppContext {
    pub(crate) config: PosConfig,
    pub(crate) undo: UndoManager,
    pub(crate) stock: Shared<Stock>,
    pub(crate) cart: Shared<OrderList>,
    pub(crate) menus: BTreeMap<MenuKind, Shared<MenuManager>>,
    pub(crate) active_menu: MenuKind,
    pub(crate) pager: Shared<Pager>,
    pub(crate) session: Option<Shared<UserSession>>,
    pub(crate) orders: Shared<OrderRegister>,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("menus", &self.menus.keys().collect::<Vec<_>>())
            .field("active_menu", &self.active_menu)
            .field("undo_depth", &self.undo.undo_depth())
            .field("redo_depth", &self.undo.redo_depth())
            .field("cart_len", &self.cart.borrow().len())
            .field("page", &self.pager.borrow().ix())
            .field("session", &self.session.is_some())
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// A fresh context: default stock, empty cart, unfiltered menus.
    #[must_use]
    pub fn new(config: PosConfig, catalogs: impl IntoIterator<Item = (MenuKind, Vec<Item>)>) -> Self {
        let stock = shared(Stock::new(config.stock.default_stock));
        let menus: BTreeMap<MenuKind, Shared<MenuManager>> = catalogs
            .into_iter()
            .map(|(kind, items)| {
                let catalog: Rc<[Item]> = items.into();
                let menu = MenuManager::new(catalog, stock.clone(), config.menu.stock_min);
                (kind, shared(menu))
            })
            .collect();
        let active_menu = if menus.contains_key(&MenuKind::Drink) {
            MenuKind::Drink
        } else {
            menus.keys().next().copied().unwrap_or(MenuKind::Drink)
        };
        info!(
            menus = menus.len(),
            default_stock = config.stock.default_stock,
            "application context created"
        );
        Self {
            undo: UndoManager::new(config.history.clone()),
            cart: shared(OrderList::new(config.cart.max_items)),
            pager: shared(Pager::new(config.menu.order_page_size)),
            session: None,
            orders: shared(OrderRegister::new()),
            stock,
            menus,
            active_menu,
            config,
        }
    }

    /// Attach a user directory with nobody signed in.
    #[must_use]
    pub fn with_session(mut self, directory: Rc<UserDirectory>) -> Self {
        self.session = Some(shared(UserSession::new(directory)));
        self
    }

    /// Use `size` items per page instead of the order-screen default.
    #[must_use]
    pub fn with_page_size(self, size: usize) -> Self {
        *self.pager.borrow_mut() = Pager::new(size);
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn config(&self) -> &PosConfig {
        &self.config
    }

    #[must_use]
    pub fn undo_manager(&self) -> &UndoManager {
        &self.undo
    }

    pub fn undo_manager_mut(&mut self) -> &mut UndoManager {
        &mut self.undo
    }

    #[must_use]
    pub fn stock(&self) -> &Shared<Stock> {
        &self.stock
    }

    #[must_use]
    pub fn cart(&self) -> &Shared<OrderList> {
        &self.cart
    }

    #[must_use]
    pub fn orders(&self) -> &Shared<OrderRegister> {
        &self.orders
    }

    #[must_use]
    pub fn session(&self) -> Option<&Shared<UserSession>> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn menu(&self, kind: MenuKind) -> Option<&Shared<MenuManager>> {
        self.menus.get(&kind)
    }

    #[must_use]
    pub fn active_menu(&self) -> MenuKind {
        self.active_menu
    }

    /// The manager of the active menu.
    ///
    /// # Errors
    ///
    /// [`AppError::MissingMenu`] if the active menu was never loaded.
    pub fn menu_manager(&self) -> Result<&Shared<MenuManager>, AppError> {
        self.menus
            .get(&self.active_menu)
            .ok_or(AppError::MissingMenu(self.active_menu))
    }

    /// Switch menus and go back to the first page.
    ///
    /// # Errors
    ///
    /// [`AppError::MissingMenu`] if `kind` was never loaded.
    pub fn set_active_menu(&mut self, kind: MenuKind) -> Result<(), AppError> {
        if !self.menus.contains_key(&kind) {
            return Err(AppError::MissingMenu(kind));
        }
        self.active_menu = kind;
        self.pager.borrow_mut().reset();
        Ok(())
    }

    /// Perform `cmd` through the undo history.
    pub fn perform<C>(&mut self, cmd: C) -> CommandResult<C::Output>
    where
        C: Command + 'static,
        C::Output: Clone + 'static,
        C::Undone: 'static,
    {
        self.undo.perform(cmd)
    }

    /// Drop the cached partitions of every menu, for example after a
    /// stock refill.
    pub fn invalidate_menus(&self) {
        for menu in self.menus.values() {
            menu.borrow_mut().invalidate();
        }
    }

    // ------------------------------------------------------------------
    // Paging
    // ------------------------------------------------------------------

    #[must_use]
    pub fn page_ix(&self) -> usize {
        self.pager.borrow().ix()
    }

    /// The items on the current page of the active menu.
    ///
    /// # Errors
    ///
    /// [`AppError::MissingMenu`] if the active menu was never loaded.
    pub fn page_items(&self) -> Result<MenuView, AppError> {
        let view = self.menu_manager()?.borrow_mut().get_menu();
        Ok(view.restricted(self.pager.borrow().window()))
    }

    /// Last valid page index for the active menu.
    ///
    /// # Errors
    ///
    /// [`AppError::MissingMenu`] if the active menu was never loaded.
    pub fn max_page_ix(&self) -> Result<usize, AppError> {
        let len = self.menu_len()?;
        Ok(self.pager.borrow().max_page_ix(len))
    }

    /// Whether page `ix` exists for the active menu.
    ///
    /// # Errors
    ///
    /// [`AppError::MissingMenu`] if the active menu was never loaded.
    pub fn page_available(&self, ix: usize) -> Result<bool, AppError> {
        let len = self.menu_len()?;
        Ok(self.pager.borrow().page_available(ix, len))
    }

    /// Go to page `ix` if it exists. Returns whether the page changed.
    ///
    /// # Errors
    ///
    /// [`AppError::MissingMenu`] if the active menu was never loaded.
    pub fn goto_page(&self, ix: usize) -> Result<bool, AppError> {
        let len = self.menu_len()?;
        Ok(self.pager.borrow_mut().goto(ix, len))
    }

    /// # Errors
    ///
    /// [`AppError::MissingMenu`] if the active menu was never loaded.
    pub fn next_page(&self) -> Result<bool, AppError> {
        let len = self.menu_len()?;
        Ok(self.pager.borrow_mut().next(len))
    }

    /// # Errors
    ///
    /// [`AppError::MissingMenu`] if the active menu was never loaded.
    pub fn prev_page(&self) -> Result<bool, AppError> {
        let len = self.menu_len()?;
        Ok(self.pager.borrow_mut().prev(len))
    }

    #[must_use]
    pub fn prev_page_available(&self) -> bool {
        self.page_ix() > 0
    }

    /// # Errors
    ///
    /// [`AppError::MissingMenu`] if the active menu was never loaded.
    pub fn next_page_available(&self) -> Result<bool, AppError> {
        Ok(self.page_ix() < self.max_page_ix()?)
    }

    fn menu_len(&self) -> Result<usize, AppError> {
        Ok(self.menu_manager()?.borrow_mut().get_menu().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barpos_core::ItemFields;

    fn drinks(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| Item::drink(ItemFields::new(format!("d{i}"), format!("Drink {i}"), "Öl", 40.0), 5.0))
            .collect()
    }

    #[test]
    fn pages_walk_the_active_menu() {
        let ctx = AppContext::new(PosConfig::default(), [(MenuKind::Drink, drinks(25))]);
        assert_eq!(ctx.max_page_ix().unwrap(), 2);
        assert_eq!(ctx.page_items().unwrap().len(), 10);
        assert!(ctx.next_page().unwrap());
        assert!(ctx.next_page().unwrap());
        assert!(!ctx.next_page().unwrap());
        assert_eq!(ctx.page_items().unwrap().len(), 5);
        assert_eq!(
            ctx.page_items().unwrap().at(0).map(|i| i.id().as_str()),
            Some("d20")
        );
        assert!(ctx.prev_page_available());
        assert!(!ctx.next_page_available().unwrap());
        assert!(!ctx.page_available(3).unwrap());
    }

    #[test]
    fn missing_menu_is_reported() {
        let mut ctx = AppContext::new(PosConfig::default(), [(MenuKind::Drink, drinks(1))]);
        assert!(matches!(
            ctx.set_active_menu(MenuKind::Food),
            Err(AppError::MissingMenu(MenuKind::Food))
        ));
        let empty = AppContext::new(PosConfig::default(), std::iter::empty());
        assert!(matches!(empty.page_items(), Err(AppError::MissingMenu(MenuKind::Drink))));
    }

    #[test]
    fn active_menu_falls_back_to_a_loaded_one() {
        let mut ctx = AppContext::new(PosConfig::default(), [(MenuKind::Food, drinks(3))]);
        assert_eq!(ctx.active_menu(), MenuKind::Food);
        assert_eq!(ctx.page_items().unwrap().len(), 3);
        ctx.goto_page(0).unwrap();
        assert!(ctx.set_active_menu(MenuKind::Food).is_ok());
    }

    #[test]
    fn page_size_override() {
        let ctx = AppContext::new(PosConfig::default(), [(MenuKind::Drink, drinks(25))])
            .with_page_size(12);
        assert_eq!(ctx.max_page_ix().unwrap(), 2);
        assert_eq!(ctx.page_items().unwrap().len(), 12);
    }
}
