#![forbid(unsafe_code)]

//! The [`Stock`] ledger.
//!
//! # Invariants
//!
//! 1. `reserved_stock.items[id]` equals the sum of `id` over every table's
//!    reservation
//! 2. `availability(id) == physical(id) - reserved_of(id)`
//! 3. No zero entries in `reserved_stock.items`, and no physical entry equal
//!    to the default, so equal states serialize to equal JSON
//!
//! Availability may go negative; the menu treats anything at or below its
//! buffer as unavailable.

use std::collections::{BTreeMap, BTreeSet};

use barpos_core::{CompactOrder, ItemId, Quantity, TableId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Physical stock assumed for an item with no recorded level.
pub const DEFAULT_STOCK: Quantity = 20;

fn default_stock() -> Quantity {
    DEFAULT_STOCK
}

/// A broken ledger invariant, found by [`Stock::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    /// The per-item reserved total disagrees with the table reservations.
    #[error("reserved total for {item} is {recorded}, table reservations sum to {expected}")]
    ReservedMismatch {
        item: ItemId,
        recorded: Quantity,
        expected: Quantity,
    },
    /// A zero entry was left in the reserved totals.
    #[error("zero reserved entry for {0}")]
    ZeroEntry(ItemId),
}

/// Reservations of open table orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedStock {
    /// Reservation per table.
    pub orders: BTreeMap<TableId, CompactOrder>,
    /// Reserved total per item.
    pub items: BTreeMap<ItemId, Quantity>,
}

/// Physical and reserved stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    #[serde(skip, default = "default_stock")]
    default_stock: Quantity,
    physical_stock: BTreeMap<ItemId, Quantity>,
    reserved_stock: ReservedStock,
    #[serde(with = "null_valued_set")]
    to_refill: BTreeSet<ItemId>,
}

impl Default for Stock {
    fn default() -> Self {
        Self::new(DEFAULT_STOCK)
    }
}

impl Stock {
    /// Empty ledger where unrecorded items have `default_stock` units.
    #[must_use]
    pub fn new(default_stock: Quantity) -> Self {
        Self {
            default_stock,
            physical_stock: BTreeMap::new(),
            reserved_stock: ReservedStock::default(),
            to_refill: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn default_stock(&self) -> Quantity {
        self.default_stock
    }

    /// Change the default level. Used after deserializing, since the
    /// default is configuration rather than state.
    ///
    /// Recorded levels equal to the new default are dropped.
    pub fn set_default_stock(&mut self, default_stock: Quantity) {
        self.default_stock = default_stock;
        self.physical_stock.retain(|_, q| *q != default_stock);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Units that can still be ordered: physical minus reserved.
    #[must_use]
    pub fn availability(&self, id: &ItemId) -> Quantity {
        self.physical(id) - self.reserved_of(id)
    }

    /// Units on the shelf.
    #[must_use]
    pub fn physical(&self, id: &ItemId) -> Quantity {
        self.physical_stock
            .get(id)
            .copied()
            .unwrap_or(self.default_stock)
    }

    /// Units reserved by open orders.
    #[must_use]
    pub fn reserved_of(&self, id: &ItemId) -> Quantity {
        self.reserved_stock.items.get(id).copied().unwrap_or(0)
    }

    /// Reservation held for `table`.
    #[must_use]
    pub fn reservation(&self, table: TableId) -> Option<&CompactOrder> {
        self.reserved_stock.orders.get(&table)
    }

    /// Tables with an open reservation.
    pub fn reserved_tables(&self) -> impl Iterator<Item = TableId> + '_ {
        self.reserved_stock.orders.keys().copied()
    }

    #[must_use]
    pub fn reserved(&self) -> &ReservedStock {
        &self.reserved_stock
    }

    #[must_use]
    pub fn is_marked_for_refill(&self, id: &ItemId) -> bool {
        self.to_refill.contains(id)
    }

    /// Items waiting for a refill, in id order.
    pub fn marked_for_refill(&self) -> impl Iterator<Item = &ItemId> + '_ {
        self.to_refill.iter()
    }

    // ========================================================================
    // Physical stock
    // ========================================================================

    /// Set the physical level of `id`. Returns the previous level.
    pub fn set_physical(&mut self, id: &ItemId, quantity: Quantity) -> Quantity {
        let old = self.physical(id);
        if old != quantity {
            if quantity == self.default_stock {
                self.physical_stock.remove(id);
            } else {
                self.physical_stock.insert(id.clone(), quantity);
            }
        }
        old
    }

    /// Add `delta` to the physical level of `id`. Returns the previous level.
    pub fn modify_physical(&mut self, id: &ItemId, delta: Quantity) -> Quantity {
        let old = self.physical(id);
        self.set_physical(id, old + delta)
    }

    /// Return every item to the default level. Reservations are kept.
    pub fn reset(&mut self) {
        debug!(items = self.physical_stock.len(), "stock reset to default");
        self.physical_stock.clear();
    }

    // ========================================================================
    // Reservations
    // ========================================================================

    /// Replace the reservation of `table` with `order`.
    ///
    /// Returns the previous reservation so it can be restored.
    pub fn reserve_order(&mut self, table: TableId, order: CompactOrder) -> Option<CompactOrder> {
        let previous = self.release_order(table);
        for (id, q) in &order {
            self.adjust_reserved(id, *q);
        }
        self.reserved_stock.orders.insert(table, order);
        previous
    }

    /// Drop the reservation of `table` without touching physical stock.
    pub fn release_order(&mut self, table: TableId) -> Option<CompactOrder> {
        let order = self.reserved_stock.orders.remove(&table)?;
        for (id, q) in &order {
            self.adjust_reserved(id, -*q);
        }
        Some(order)
    }

    /// Turn the reservation of `table` into a deduction of physical stock.
    ///
    /// Returns the committed order, or `None` if `table` had nothing reserved.
    pub fn commit_order(&mut self, table: TableId) -> Option<CompactOrder> {
        let order = self.release_order(table)?;
        for (id, q) in &order {
            self.modify_physical(id, -*q);
        }
        debug!(%table, lines = order.len(), "order committed");
        Some(order)
    }

    fn adjust_reserved(&mut self, id: &ItemId, delta: Quantity) {
        let total = self.reserved_of(id) + delta;
        if total == 0 {
            self.reserved_stock.items.remove(id);
        } else {
            self.reserved_stock.items.insert(id.clone(), total);
        }
    }

    // ========================================================================
    // Refill
    // ========================================================================

    /// Mark items for refill. Returns the ids that were not already marked.
    pub fn mark_for_refill<I>(&mut self, ids: I) -> Vec<ItemId>
    where
        I: IntoIterator<Item = ItemId>,
    {
        ids.into_iter()
            .filter(|id| self.to_refill.insert(id.clone()))
            .collect()
    }

    /// Remove refill marks.
    pub fn unmark_for_refill<'a, I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = &'a ItemId>,
    {
        for id in ids {
            self.to_refill.remove(id);
        }
    }

    /// Return every marked item to the default level and clear the marks.
    pub fn refill(&mut self) {
        debug!(items = self.to_refill.len(), "refilling marked items");
        for id in std::mem::take(&mut self.to_refill) {
            self.physical_stock.remove(&id);
        }
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Verify the reserved totals against the table reservations.
    pub fn check_invariants(&self) -> Result<(), StockError> {
        let mut expected: BTreeMap<&ItemId, Quantity> = BTreeMap::new();
        for order in self.reserved_stock.orders.values() {
            for (id, q) in order {
                *expected.entry(id).or_insert(0) += q;
            }
        }
        for (id, recorded) in &self.reserved_stock.items {
            if *recorded == 0 {
                return Err(StockError::ZeroEntry(id.clone()));
            }
            let sum = expected.remove(id).unwrap_or(0);
            if sum != *recorded {
                return Err(StockError::ReservedMismatch {
                    item: id.clone(),
                    recorded: *recorded,
                    expected: sum,
                });
            }
        }
        if let Some((id, sum)) = expected.into_iter().find(|(_, sum)| *sum != 0) {
            return Err(StockError::ReservedMismatch {
                item: id.clone(),
                recorded: 0,
                expected: sum,
            });
        }
        Ok(())
    }
}

/// `BTreeSet<ItemId>` as a JSON object with `null` values.
mod null_valued_set {
    use std::collections::{BTreeMap, BTreeSet};

    use barpos_core::ItemId;
    use serde::de::IgnoredAny;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(set: &BTreeSet<ItemId>, s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(set.len()))?;
        for id in set {
            map.serialize_entry(id, &())?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeSet<ItemId>, D::Error> {
        let map = BTreeMap::<ItemId, IgnoredAny>::deserialize(d)?;
        Ok(map.into_keys().collect())
    }
}
