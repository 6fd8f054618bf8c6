#![forbid(unsafe_code)]

//! The cart: an ordered multiset of catalog items.
//!
//! [`OrderList`] keeps one [`ItemQuantity`] per item and remembers the
//! display order of the entries, so that an undone removal puts the item
//! back where it was. [`CartCommands`] builds undoable commands over a
//! shared cart.

pub mod commands;
pub mod order_list;

pub use commands::{AddItem, CartCommands, ClearCart, RemoveItem, RemovedItem};
pub use order_list::{CartContents, CartError, ItemQuantity, OrderList};
