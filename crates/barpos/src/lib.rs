#![forbid(unsafe_code)]

//! barpos public facade.
//!
//! Re-exports the model crates and adds the [`AppContext`]: the one object
//! that owns the undo history, stock, cart, menus, pager, user session and
//! order register of a running terminal. It is created at startup, passed
//! explicitly to whatever drives it, and saved at save points or shutdown.
//!
//! ```rust,ignore
//! use barpos::prelude::*;
//!
//! barpos::init_logging("info")?;
//! let config = PosConfig::from_toml_file("barpos.toml")?;
//! let drinks = barpos::catalog_from_file("drinks.json")?;
//! let mut store = JsonFileStore::open("state.json")?;
//! let mut ctx = AppContext::load(config, [(MenuKind::Drink, drinks)], None, &store)?;
//!
//! let cmd = ctx.cart().add_item_command(item, 2, 0);
//! ctx.perform(cmd)?;
//! let cmd = ctx.place_order_command(TableId(5));
//! ctx.perform(cmd)?;
//!
//! ctx.shutdown(&mut store)?;
//! ```

pub mod commands;
pub mod context;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod orders;
pub mod paging;

pub use commands::{
    ChargeCart, Checkout, FilterChange, PayWithCredit, PlaceOrder, RefillItems, RegisterOrder,
    ReserveCart, ResetPage,
};
pub use context::{AppContext, MenuKind};
pub use error::AppError;
pub use lifecycle::{catalog_from_file, catalog_from_json_str, keys};
pub use logging::init_logging;
pub use orders::{OrderRegister, PaymentMethod, RegisteredOrder};
pub use paging::Pager;

// --- Model re-exports ------------------------------------------------------

pub use barpos_cart::{CartCommands, CartError, OrderList};
pub use barpos_core::{CompactOrder, Item, ItemFields, ItemId, MainCategory, Quantity, TableId};
pub use barpos_menu::{FilterEdit, FilterSpec, MenuCommands, MenuManager, MenuView};
pub use barpos_runtime::{
    Command, CommandError, CommandExt, CommandResult, JsonFileStore, KeyValueStore, MemoryStore,
    PosConfig, UndoManager,
};
pub use barpos_session::{SessionCommands, User, UserDirectory, UserId, UserSession};
pub use barpos_stock::{Stock, StockCommands};

/// Everything a front end usually needs.
pub mod prelude {
    pub use crate::{
        AppContext, AppError, CartCommands, Command, CommandError, CommandExt, FilterEdit,
        FilterSpec, Item, ItemFields, ItemId, JsonFileStore, KeyValueStore, MainCategory,
        MemoryStore, MenuCommands, MenuKind, PaymentMethod, PosConfig, SessionCommands,
        StockCommands, TableId,
    };
}
