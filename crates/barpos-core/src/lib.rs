#![forbid(unsafe_code)]

//! Core vocabulary for the barpos point-of-sale model.
//!
//! This crate holds the plain data every other barpos crate agrees on:
//!
//! - [`ItemId`], [`TableId`], [`Quantity`] and [`CompactOrder`]
//! - the [`Item`] catalog record, a tagged variant over generic, drink and
//!   food items
//! - the main-category keyword tables used to bucket items
//!   ([`MainCategory`], [`sub_categories_of`])
//! - the free-text search tokenizer ([`search_terms`])
//!
//! Nothing here is mutable shared state; stock, cart and menu state live in
//! their own crates and are mutated through undoable commands.

pub mod category;
pub mod ids;
pub mod item;
pub mod search;

pub use category::{MainCategory, main_categories_of, sub_categories_of};
pub use ids::{CompactOrder, ItemId, Quantity, TableId};
pub use item::{Item, ItemFields};
pub use search::{join_search_terms, search_terms};
