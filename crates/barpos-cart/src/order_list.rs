#![forbid(unsafe_code)]

//! [`OrderList`] and its errors.
//!
//! # Invariants
//!
//! 1. `ids` is a permutation of the keys of `items`, with no duplicates
//! 2. Every quantity is positive
//! 3. `len() <= max` after any successful `add_item`, when a max is set
//!
//! Deserialization checks 1 and 2 and rejects documents that break them.

use std::collections::{BTreeMap, BTreeSet};

use barpos_core::{CompactOrder, Item, ItemId, Quantity};
use barpos_runtime::CommandError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a cart operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Adding would take the cart past its maximum.
    #[error("cart holds at most {limit} items, {requested} requested")]
    CapacityExceeded { requested: Quantity, limit: Quantity },
    /// Quantities must be positive.
    #[error("invalid quantity {0}")]
    InvalidQuantity(Quantity),
    /// The item is not in the cart.
    #[error("{0} is not in the cart")]
    NotInCart(ItemId),
    /// The cart is already empty.
    #[error("cart is empty")]
    Empty,
    /// A stored cart breaks the cart invariants.
    #[error("corrupt cart: {0}")]
    Corrupt(String),
}

impl From<CartError> for CommandError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::CapacityExceeded { requested, limit } => {
                CommandError::CapacityExceeded { requested, limit }
            }
            CartError::InvalidQuantity(_) => CommandError::Rejected(err.to_string()),
            CartError::NotInCart(_) => CommandError::NotFound(err.to_string()),
            CartError::Empty => CommandError::NoChange(err.to_string()),
            CartError::Corrupt(_) => CommandError::InvalidState(err.to_string()),
        }
    }
}

/// An item together with how many of it are in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemQuantity {
    pub item: Item,
    pub quantity: Quantity,
}

/// Everything a cart held, as taken by [`OrderList::clear`].
#[derive(Debug, Clone, PartialEq)]
pub struct CartContents {
    items: BTreeMap<ItemId, ItemQuantity>,
    ids: Vec<ItemId>,
}

impl CartContents {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// The cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OrderListRepr")]
pub struct OrderList {
    items: BTreeMap<ItemId, ItemQuantity>,
    ids: Vec<ItemId>,
    max: Option<Quantity>,
}

#[derive(Deserialize)]
struct OrderListRepr {
    items: BTreeMap<ItemId, ItemQuantity>,
    ids: Vec<ItemId>,
    #[serde(default)]
    max: Option<Quantity>,
}

impl TryFrom<OrderListRepr> for OrderList {
    type Error = CartError;

    fn try_from(repr: OrderListRepr) -> Result<Self, CartError> {
        if repr.ids.len() != repr.items.len() {
            return Err(CartError::Corrupt(format!(
                "{} ids for {} entries",
                repr.ids.len(),
                repr.items.len()
            )));
        }
        for id in &repr.ids {
            let Some(entry) = repr.items.get(id) else {
                return Err(CartError::Corrupt(format!("id {id} has no entry")));
            };
            if entry.item.id() != id {
                return Err(CartError::Corrupt(format!(
                    "entry {id} holds item {}",
                    entry.item.id()
                )));
            }
            if entry.quantity <= 0 {
                return Err(CartError::Corrupt(format!(
                    "entry {id} has quantity {}",
                    entry.quantity
                )));
            }
        }
        let distinct: BTreeSet<&ItemId> = repr.ids.iter().collect();
        if distinct.len() != repr.ids.len() {
            return Err(CartError::Corrupt("duplicate ids".into()));
        }
        Ok(Self {
            items: repr.items,
            ids: repr.ids,
            max: repr.max,
        })
    }
}

impl OrderList {
    /// Empty cart with an optional maximum total quantity.
    #[must_use]
    pub fn new(max: Option<Quantity>) -> Self {
        Self {
            items: BTreeMap::new(),
            ids: Vec::new(),
            max,
        }
    }

    /// Empty cart with no maximum.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    #[must_use]
    pub fn max(&self) -> Option<Quantity> {
        self.max
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Add `quantity` of `item`.
    ///
    /// An item already in the cart keeps its position; a new one is inserted
    /// at `at`, clamped to the number of entries.
    pub fn add_item(&mut self, item: Item, quantity: Quantity, at: usize) -> Result<(), CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        if let Some(limit) = self.max {
            let requested = self.len() + quantity;
            if requested > limit {
                return Err(CartError::CapacityExceeded { requested, limit });
            }
        }
        if let Some(entry) = self.items.get_mut(item.id()) {
            entry.quantity += quantity;
            return Ok(());
        }
        let id = item.id().clone();
        let at = at.min(self.ids.len());
        self.ids.insert(at, id.clone());
        self.items.insert(id, ItemQuantity { item, quantity });
        Ok(())
    }

    /// Remove up to `quantity` of `id`. Returns how many were removed.
    ///
    /// The entry and its position are dropped when nothing is left.
    pub fn remove_item(&mut self, id: &ItemId, quantity: Quantity) -> Result<Quantity, CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        let entry = self
            .items
            .get_mut(id)
            .ok_or_else(|| CartError::NotInCart(id.clone()))?;
        if entry.quantity > quantity {
            entry.quantity -= quantity;
            return Ok(quantity);
        }
        let removed = entry.quantity;
        self.items.remove(id);
        self.ids.retain(|other| other != id);
        Ok(removed)
    }

    /// Empty the cart, returning what it held.
    pub fn clear(&mut self) -> Result<CartContents, CartError> {
        if self.ids.is_empty() {
            return Err(CartError::Empty);
        }
        Ok(CartContents {
            items: std::mem::take(&mut self.items),
            ids: std::mem::take(&mut self.ids),
        })
    }

    /// Put back contents taken by [`clear`](Self::clear), replacing whatever
    /// the cart holds now.
    pub fn restore(&mut self, contents: CartContents) {
        self.items = contents.items;
        self.ids = contents.ids;
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Total quantity over all entries.
    #[must_use]
    pub fn len(&self) -> Quantity {
        self.items.values().map(|e| e.quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of distinct items.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.ids.len()
    }

    /// `(id, quantity)` pairs in display order.
    #[must_use]
    pub fn compact(&self) -> CompactOrder {
        self.iter()
            .map(|e| (e.item.id().clone(), e.quantity))
            .collect()
    }

    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&ItemQuantity> {
        self.items.get(id)
    }

    /// Entry at display position `ix`.
    #[must_use]
    pub fn get_at(&self, ix: usize) -> Option<&ItemQuantity> {
        self.ids.get(ix).and_then(|id| self.items.get(id))
    }

    /// Display position of `id`.
    #[must_use]
    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.ids.iter().position(|other| other == id)
    }

    /// Item ids in display order.
    #[must_use]
    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    /// Entries in display order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemQuantity> + '_ {
        self.ids.iter().filter_map(|id| self.items.get(id))
    }

    /// Sum of price times quantity.
    #[must_use]
    pub fn total_price(&self) -> f64 {
        self.iter()
            .map(|e| e.item.price() * e.quantity as f64)
            .sum()
    }
}

impl<'a> IntoIterator for &'a OrderList {
    type Item = &'a ItemQuantity;
    type IntoIter = Box<dyn Iterator<Item = &'a ItemQuantity> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
