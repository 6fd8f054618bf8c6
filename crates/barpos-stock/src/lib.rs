#![forbid(unsafe_code)]

//! Stock ledger for barpos.
//!
//! The ledger keeps two books per item: the physical count on the shelf and
//! the quantity reserved by open table orders. Availability is their
//! difference. Every mutation is available both as a direct method on
//! [`Stock`] and as an undoable [`Command`](barpos_runtime::Command) built
//! through [`StockCommands`] on a shared handle.
//!
//! ```text
//!  reserve_order(t, o)        commit_order(t)
//!  ───────────────────►  reserved  ───────────────►  physical −= o
//!                           │
//!                           └── release_order(t) ──► (dropped)
//! ```

pub mod commands;
pub mod ledger;

pub use commands::{
    CommitOrder, MarkForRefill, ModifyPhysicalStock, ReleaseOrder, ReserveOrder,
    SetPhysicalStock, StockCommands,
};
pub use ledger::{DEFAULT_STOCK, ReservedStock, Stock, StockError};
