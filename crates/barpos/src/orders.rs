#![forbid(unsafe_code)]

//! The register of checked-out orders.

use serde::{Deserialize, Serialize};

use barpos_cart::OrderList;
use barpos_core::TableId;

/// How an order was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Paid at the bar.
    Bar,
    Card,
    Cash,
    /// Charged to the active VIP's credit.
    Credit,
}

/// A cart snapshot as it was checked out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredOrder {
    pub order: OrderList,
    pub table: TableId,
    pub method: PaymentMethod,
}

/// Checked-out orders, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderRegister {
    orders: Vec<RegisteredOrder>,
}

impl OrderRegister {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `order`. Returns its index.
    pub fn push(&mut self, order: RegisteredOrder) -> usize {
        self.orders.push(order);
        self.orders.len() - 1
    }

    /// Remove the order at `ix`, shifting later ones down.
    pub fn remove(&mut self, ix: usize) -> Option<RegisteredOrder> {
        (ix < self.orders.len()).then(|| self.orders.remove(ix))
    }

    #[must_use]
    pub fn last(&self) -> Option<&RegisteredOrder> {
        self.orders.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredOrder> + '_ {
        self.orders.iter()
    }

    /// Orders placed from `table`.
    pub fn for_table(&self, table: TableId) -> impl Iterator<Item = &RegisteredOrder> + '_ {
        self.orders.iter().filter(move |o| o.table == table)
    }
}
