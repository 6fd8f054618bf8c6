#![forbid(unsafe_code)]

//! Startup, save points and shutdown.
//!
//! Each piece of state is one JSON document under a fixed key (see
//! [`keys`]). Loading replaces the contents behind the context's shared
//! handles, so commands built before a load keep pointing at live state;
//! the undo history is cleared because its results describe the old state.
//!
//! # Failure Modes
//!
//! Every document is read and validated before any state is replaced, so a
//! failed load leaves the context exactly as it was, history included.
//!
//! - A document that does not parse fails the load with
//!   [`AppError::Persist`] naming the key.
//! - Stored stock whose reserved totals disagree with its reservations is
//!   rejected with [`AppError::Stock`].

use std::path::Path;
use std::rc::Rc;

use tracing::info;

use barpos_cart::OrderList;
use barpos_core::Item;
use barpos_menu::MenuState;
use barpos_runtime::{JsonFileStore, KeyValueStore, PosConfig, load_json, save_json};
use barpos_session::{SessionState, UserDirectory, UserSession};
use barpos_stock::Stock;

use crate::context::{AppContext, MenuKind};
use crate::error::AppError;
use crate::orders::OrderRegister;

/// Store keys.
pub mod keys {
    use crate::context::MenuKind;

    pub const STOCK: &str = "stock";
    pub const ORDER_LIST: &str = "orderList";
    pub const MENU_DRINK: &str = "menu.drink";
    pub const MENU_FOOD: &str = "menu.food";
    pub const REGISTERED_ORDERS: &str = "registeredOrders";
    pub const SESSION: &str = "session";

    #[must_use]
    pub const fn menu(kind: MenuKind) -> &'static str {
        match kind {
            MenuKind::Drink => MENU_DRINK,
            MenuKind::Food => MENU_FOOD,
        }
    }
}

/// Parse a catalog: a JSON array of tagged items.
///
/// # Errors
///
/// [`AppError::Catalog`] if the text is not a valid item array.
pub fn catalog_from_json_str(json: &str) -> Result<Vec<Item>, AppError> {
    serde_json::from_str(json).map_err(AppError::Catalog)
}

/// Read and parse a catalog file.
///
/// # Errors
///
/// [`AppError::CatalogIo`] or [`AppError::Catalog`].
pub fn catalog_from_file(path: impl AsRef<Path>) -> Result<Vec<Item>, AppError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| AppError::CatalogIo {
        path: path.to_path_buf(),
        source,
    })?;
    catalog_from_json_str(&json)
}

impl AppContext {
    /// Build a context and restore whatever `store` holds.
    ///
    /// # Errors
    ///
    /// See [`restore`](Self::restore).
    pub fn load(
        config: PosConfig,
        catalogs: impl IntoIterator<Item = (MenuKind, Vec<Item>)>,
        directory: Option<Rc<UserDirectory>>,
        store: &dyn KeyValueStore,
    ) -> Result<Self, AppError> {
        let mut ctx = Self::new(config, catalogs);
        if let Some(directory) = directory {
            ctx = ctx.with_session(directory);
        }
        ctx.restore(store)?;
        Ok(ctx)
    }

    /// Replace in-memory state with what `store` holds. Keys that are absent
    /// leave their state untouched. Returns how many keys were restored.
    ///
    /// On success the undo history is cleared, the pager goes back to page
    /// 0 and every menu partition is dropped. On error nothing changes.
    ///
    /// # Errors
    ///
    /// [`AppError::Persist`] for an unreadable document, [`AppError::Stock`]
    /// for an inconsistent stock ledger.
    pub fn restore(&mut self, store: &dyn KeyValueStore) -> Result<usize, AppError> {
        let stock = match load_json::<Stock>(store, keys::STOCK)? {
            Some(mut stock) => {
                stock.check_invariants()?;
                stock.set_default_stock(self.config.stock.default_stock);
                Some(stock)
            }
            None => None,
        };
        let cart = load_json::<OrderList>(store, keys::ORDER_LIST)?;
        let menus = self
            .menus
            .keys()
            .map(|kind| load_json::<MenuState>(store, keys::menu(*kind)).map(|state| (*kind, state)))
            .collect::<Result<Vec<_>, _>>()?;
        let orders = load_json::<OrderRegister>(store, keys::REGISTERED_ORDERS)?;
        let session = match &self.session {
            Some(_) => load_json::<SessionState>(store, keys::SESSION)?,
            None => None,
        };

        let mut restored = 0;
        if let Some(stock) = stock {
            *self.stock.borrow_mut() = stock;
            restored += 1;
        }
        if let Some(cart) = cart {
            *self.cart.borrow_mut() = cart;
            restored += 1;
        }
        for (kind, state) in menus {
            if let Some(state) = state
                && let Some(menu) = self.menus.get(&kind)
            {
                menu.borrow_mut().restore_state(state);
                restored += 1;
            }
        }
        if let Some(orders) = orders {
            *self.orders.borrow_mut() = orders;
            restored += 1;
        }
        if let Some(handle) = &self.session
            && let Some(state) = session
        {
            let directory = Rc::clone(handle.borrow().directory());
            *handle.borrow_mut() = UserSession::from_state(directory, state);
            restored += 1;
        }

        self.undo.clear();
        self.pager.borrow_mut().reset();
        self.invalidate_menus();
        info!(restored, "state loaded");
        Ok(restored)
    }

    /// Write every piece of state to `store`.
    ///
    /// # Errors
    ///
    /// [`AppError::Persist`] if a document cannot be encoded.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), AppError> {
        save_json(store, keys::STOCK, &*self.stock.borrow())?;
        save_json(store, keys::ORDER_LIST, &*self.cart.borrow())?;
        for (kind, menu) in &self.menus {
            save_json(store, keys::menu(*kind), &menu.borrow().state())?;
        }
        save_json(store, keys::REGISTERED_ORDERS, &*self.orders.borrow())?;
        if let Some(session) = &self.session {
            save_json(store, keys::SESSION, session.borrow().state())?;
        }
        info!(menus = self.menus.len(), "state saved");
        Ok(())
    }

    /// Save, flush the file store and drop the context.
    ///
    /// # Errors
    ///
    /// [`AppError::Persist`] if saving or writing the file fails.
    pub fn shutdown(self, store: &mut JsonFileStore) -> Result<(), AppError> {
        self.save(store)?;
        store.flush()?;
        info!(path = %store.path().display(), "shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barpos_core::{ItemFields, ItemId, TableId};
    use barpos_runtime::MemoryStore;
    use barpos_stock::StockCommands;
    use tracing_test::traced_test;

    fn drinks() -> Vec<Item> {
        vec![
            Item::drink(ItemFields::new("a", "Pale", "Öl", 50.0), 5.0),
            Item::drink(ItemFields::new("w", "Islay", "Whisky", 200.0), 43.0),
        ]
    }

    #[test]
    fn catalog_json_uses_kind_tags() {
        let json = serde_json::to_string(&drinks()).unwrap();
        assert!(json.contains("\"kind\":\"drink\""));
        assert_eq!(catalog_from_json_str(&json).unwrap(), drinks());
        assert!(matches!(catalog_from_json_str("{}"), Err(AppError::Catalog(_))));
    }

    #[test]
    fn missing_catalog_file_is_an_io_error() {
        assert!(matches!(
            catalog_from_file("/nonexistent/barpos/catalog.json"),
            Err(AppError::CatalogIo { .. })
        ));
    }

    #[traced_test]
    #[test]
    fn save_then_load_restores_state_and_clears_history() {
        let ctx = AppContext::new(PosConfig::default(), [(MenuKind::Drink, drinks())]);
        ctx.stock().borrow_mut().reserve_order(TableId(2), vec![(ItemId::from("a"), 3)]);
        ctx.cart().borrow_mut().add_item(drinks()[1].clone(), 1, 0).unwrap();
        ctx.menu(MenuKind::Drink)
            .unwrap()
            .borrow_mut()
            .set_main_category(Some(barpos_core::MainCategory::Whisky));
        let mut store = MemoryStore::new();
        ctx.save(&mut store).unwrap();
        assert!(store.contains(keys::MENU_DRINK));
        assert!(!store.contains(keys::MENU_FOOD));
        assert!(logs_contain("state saved"));

        let loaded =
            AppContext::load(PosConfig::default(), [(MenuKind::Drink, drinks())], None, &store)
                .unwrap();
        assert_eq!(*loaded.stock().borrow(), *ctx.stock().borrow());
        assert_eq!(*loaded.cart().borrow(), *ctx.cart().borrow());
        assert_eq!(loaded.page_items().unwrap().len(), 1);
        assert!(!loaded.undo_manager().undo_available());
        assert!(logs_contain("state loaded"));
    }

    #[test]
    fn inconsistent_stock_is_rejected() {
        let mut store = MemoryStore::new();
        store.set(
            keys::STOCK,
            r#"{"physicalStock":{},"reservedStock":{"orders":{},"items":{"a":4}},"toRefill":{}}"#
                .to_string(),
        );
        let result = AppContext::load(PosConfig::default(), [(MenuKind::Drink, drinks())], None, &store);
        assert!(matches!(result, Err(AppError::Stock(_))));
    }

    #[test]
    fn corrupt_document_names_its_key() {
        let mut store = MemoryStore::new();
        store.set(keys::ORDER_LIST, "not json".to_string());
        let err = AppContext::load(PosConfig::default(), [(MenuKind::Drink, drinks())], None, &store)
            .unwrap_err();
        assert!(err.to_string().contains("orderList"));
    }

    #[test]
    fn failed_restore_changes_nothing() {
        let mut ctx = AppContext::new(PosConfig::default(), [(MenuKind::Drink, drinks())]);
        let cmd = ctx.stock().set_physical_command(ItemId::from("a"), 3);
        ctx.perform(cmd).unwrap();

        let mut valid = Stock::new(20);
        valid.set_physical(&ItemId::from("a"), 50);
        let mut store = MemoryStore::new();
        save_json(&mut store, keys::STOCK, &valid).unwrap();
        store.set(keys::ORDER_LIST, "not json".to_string());

        assert!(matches!(ctx.restore(&store), Err(AppError::Persist(_))));
        assert_eq!(ctx.stock().borrow().physical(&ItemId::from("a")), 3);
        assert!(matches!(ctx.undo_manager_mut().undo(), Some(Ok(_))));
        assert_eq!(ctx.stock().borrow().physical(&ItemId::from("a")), 20);
    }

    #[test]
    fn restore_drops_partitions_built_from_old_stock() {
        let mut ctx = AppContext::new(PosConfig::default(), [(MenuKind::Drink, drinks())]);
        assert_eq!(ctx.page_items().unwrap().len(), 2);

        let mut emptied = Stock::new(20);
        emptied.set_physical(&ItemId::from("w"), 0);
        let mut store = MemoryStore::new();
        save_json(&mut store, keys::STOCK, &emptied).unwrap();

        assert_eq!(ctx.restore(&store).unwrap(), 1);
        let page = ctx.page_items().unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page.at(0).map(|i| i.id().as_str()), Some("a"));
    }

    #[test]
    fn restored_stock_takes_configured_default() {
        let mut store = MemoryStore::new();
        let ctx = AppContext::new(PosConfig::default(), [(MenuKind::Drink, drinks())]);
        ctx.save(&mut store).unwrap();
        let mut config = PosConfig::default();
        config.stock.default_stock = 7;
        let loaded = AppContext::load(config, [(MenuKind::Drink, drinks())], None, &store).unwrap();
        assert_eq!(loaded.stock().borrow().physical(&ItemId::from("a")), 7);
    }
}
