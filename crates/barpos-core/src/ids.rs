#![forbid(unsafe_code)]

//! Identifier newtypes shared across the model.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of units of an item. Signed: stock may transiently go negative.
pub type Quantity = i64;

/// A cart flattened to `(item, quantity)` pairs in display order.
///
/// This is the representation the stock ledger reserves and commits.
pub type CompactOrder = Vec<(ItemId, Quantity)>;

/// Catalog identifier of an item (the article number of the source database).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create an item id from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Table number an order is placed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(pub u32);

impl TableId {
    /// Create a table id from its number.
    #[must_use]
    pub const fn new(table: u32) -> Self {
        Self(table)
    }

    /// Get the raw table number.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "table {}", self.0)
    }
}
