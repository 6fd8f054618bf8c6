#![forbid(unsafe_code)]

//! Filtered catalog views for the barpos menus.
//!
//! A [`MenuManager`] owns the filter settings of one menu (drinks, food, the
//! management listing) and hands out [`MenuView`]s of the catalog.
//!
//! ```text
//!   catalog ──► FilterSpec::accepts ──► Partition (10 buckets, shared Rc)
//!                                           │
//!                            MenuView { begin, end, category }
//!                                           │
//!                        .restricted(20..40)  ──► MenuView (same Rc)
//! ```
//!
//! Building a [`Partition`] scans the whole catalog, so the manager caches
//! the last one and reuses it while the filters compare equal. Windows are
//! cheap: every restriction shares the partition and only narrows the index
//! range.
//!
//! Filter changes go through undoable commands ([`MenuCommands`]).

pub mod commands;
pub mod filter;
pub mod manager;
pub mod view;

pub use commands::{FilterEdit, FilterSnapshot, MenuCommands, ModifyFilter, SetMainCategory};
pub use filter::{DEFAULT_STOCK_MIN, FilterSpec, PercentageRange};
pub use manager::{MenuManager, MenuState};
pub use view::{MenuView, Partition};
