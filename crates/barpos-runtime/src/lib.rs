#![forbid(unsafe_code)]

//! Runtime plumbing for the barpos model layer.
//!
//! # Modules
//!
//! - [`undo`]: the [`Command`] trait, its combinators, and the
//!   [`UndoManager`] history
//! - [`shared`]: single-threaded shared handles (`Rc<RefCell<T>>`)
//! - [`storage`]: the string-keyed [`KeyValueStore`] persistence substrate
//! - [`config`]: [`PosConfig`], loaded from TOML or JSON
//!
//! Everything here is synchronous and single-threaded. Shared handles are
//! `!Send`, so the compiler rejects any attempt to move model state across
//! threads.

pub mod config;
pub mod shared;
pub mod storage;
pub mod undo;

pub use config::{CartConfig, ConfigError, MenuConfig, PosConfig, StockConfig};
pub use shared::{Shared, shared};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, PersistError, load_json, save_json};
pub use undo::{
    Command, CommandError, CommandExt, CommandResult, Composed, Delayed, Described, FnCommand,
    HistoryConfig, UndoManager, Unfailing, compose, delayed, unfailing,
};
