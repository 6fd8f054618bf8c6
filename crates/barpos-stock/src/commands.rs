#![forbid(unsafe_code)]

//! Undoable commands over a shared [`Stock`].
//!
//! Each command captures a clone of the shared handle plus its parameters;
//! it reads and writes the ledger only while performing, undoing or
//! redoing. Build them through [`StockCommands`]:
//!
//! ```
//! use barpos_core::{ItemId, TableId};
//! use barpos_runtime::{UndoManager, shared};
//! use barpos_stock::{Stock, StockCommands};
//!
//! let stock = shared(Stock::default());
//! let mut history = UndoManager::default();
//! let ale = ItemId::from("101");
//!
//! history
//!     .perform(stock.reserve_order_command(TableId(5), vec![(ale.clone(), 2)]))
//!     .unwrap();
//! history.perform(stock.commit_order_command(TableId(5))).unwrap();
//! assert_eq!(stock.borrow().physical(&ale), 18);
//!
//! history.undo();
//! assert_eq!(stock.borrow().physical(&ale), 20);
//! assert_eq!(stock.borrow().reserved_of(&ale), 2);
//! ```

use barpos_core::{CompactOrder, ItemId, Quantity, TableId};
use barpos_runtime::{Command, CommandError, CommandResult, Shared};

use crate::ledger::Stock;

/// Command factories on a shared stock handle.
pub trait StockCommands {
    /// Set the physical level of `id`. Fails if it already has that level.
    fn set_physical_command(&self, id: ItemId, quantity: Quantity) -> SetPhysicalStock;

    /// Add `delta` to the physical level of `id`. Fails on a zero delta.
    fn modify_physical_command(&self, id: ItemId, delta: Quantity) -> ModifyPhysicalStock;

    /// Replace the reservation of `table`. Always succeeds.
    fn reserve_order_command(&self, table: TableId, order: CompactOrder) -> ReserveOrder;

    /// Commit the reservation of `table`. Fails if there is none.
    fn commit_order_command(&self, table: TableId) -> CommitOrder;

    /// Drop the reservation of `table`. Fails if there is none.
    fn release_order_command(&self, table: TableId) -> ReleaseOrder;

    /// Mark items for refill. Fails if every id was already marked.
    fn mark_for_refill_command(&self, ids: Vec<ItemId>) -> MarkForRefill;
}

impl StockCommands for Shared<Stock> {
    fn set_physical_command(&self, id: ItemId, quantity: Quantity) -> SetPhysicalStock {
        SetPhysicalStock {
            stock: self.clone(),
            id,
            quantity,
        }
    }

    fn modify_physical_command(&self, id: ItemId, delta: Quantity) -> ModifyPhysicalStock {
        ModifyPhysicalStock {
            stock: self.clone(),
            id,
            delta,
        }
    }

    fn reserve_order_command(&self, table: TableId, order: CompactOrder) -> ReserveOrder {
        ReserveOrder {
            stock: self.clone(),
            table,
            order,
        }
    }

    fn commit_order_command(&self, table: TableId) -> CommitOrder {
        CommitOrder {
            stock: self.clone(),
            table,
        }
    }

    fn release_order_command(&self, table: TableId) -> ReleaseOrder {
        ReleaseOrder {
            stock: self.clone(),
            table,
        }
    }

    fn mark_for_refill_command(&self, ids: Vec<ItemId>) -> MarkForRefill {
        MarkForRefill {
            stock: self.clone(),
            ids,
        }
    }
}

// ============================================================================
// Physical stock
// ============================================================================

/// See [`StockCommands::set_physical_command`]. Output: previous level.
#[derive(Debug, Clone)]
pub struct SetPhysicalStock {
    stock: Shared<Stock>,
    id: ItemId,
    quantity: Quantity,
}

impl Command for SetPhysicalStock {
    type Output = Quantity;
    type Undone = ();

    fn perform(&self) -> CommandResult<Quantity> {
        let mut stock = self.stock.borrow_mut();
        if stock.physical(&self.id) == self.quantity {
            return Err(CommandError::NoChange(format!(
                "{} already has {} in stock",
                self.id, self.quantity
            )));
        }
        Ok(stock.set_physical(&self.id, self.quantity))
    }

    fn undo(&self, previous: Quantity) -> CommandResult<()> {
        self.stock.borrow_mut().set_physical(&self.id, previous);
        Ok(())
    }

    fn description(&self) -> &str {
        "Set stock"
    }
}

/// See [`StockCommands::modify_physical_command`]. Output: previous level.
#[derive(Debug, Clone)]
pub struct ModifyPhysicalStock {
    stock: Shared<Stock>,
    id: ItemId,
    delta: Quantity,
}

impl Command for ModifyPhysicalStock {
    type Output = Quantity;
    type Undone = ();

    fn perform(&self) -> CommandResult<Quantity> {
        if self.delta == 0 {
            return Err(CommandError::NoChange(format!(
                "zero stock change for {}",
                self.id
            )));
        }
        Ok(self.stock.borrow_mut().modify_physical(&self.id, self.delta))
    }

    fn undo(&self, previous: Quantity) -> CommandResult<()> {
        self.stock.borrow_mut().set_physical(&self.id, previous);
        Ok(())
    }

    fn description(&self) -> &str {
        "Change stock"
    }
}

// ============================================================================
// Reservations
// ============================================================================

/// See [`StockCommands::reserve_order_command`]. Output: previous
/// reservation of the table.
#[derive(Debug, Clone)]
pub struct ReserveOrder {
    stock: Shared<Stock>,
    table: TableId,
    order: CompactOrder,
}

impl ReserveOrder {
    #[must_use]
    pub fn order(&self) -> &CompactOrder {
        &self.order
    }
}

impl Command for ReserveOrder {
    type Output = Option<CompactOrder>;
    type Undone = ();

    fn perform(&self) -> CommandResult<Option<CompactOrder>> {
        Ok(self
            .stock
            .borrow_mut()
            .reserve_order(self.table, self.order.clone()))
    }

    fn undo(&self, previous: Option<CompactOrder>) -> CommandResult<()> {
        let mut stock = self.stock.borrow_mut();
        match previous {
            Some(previous) => {
                stock.reserve_order(self.table, previous);
            }
            None => {
                stock.release_order(self.table);
            }
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Reserve order"
    }
}

/// See [`StockCommands::commit_order_command`]. Output: committed order.
///
/// Undo adds the committed quantities back to physical stock and restores
/// the reservation. It does not check whether other commits touched the
/// same items in between.
#[derive(Debug, Clone)]
pub struct CommitOrder {
    stock: Shared<Stock>,
    table: TableId,
}

impl Command for CommitOrder {
    type Output = CompactOrder;
    type Undone = ();

    fn perform(&self) -> CommandResult<CompactOrder> {
        self.stock
            .borrow_mut()
            .commit_order(self.table)
            .ok_or_else(|| CommandError::NotFound(format!("no reservation for {}", self.table)))
    }

    fn undo(&self, committed: CompactOrder) -> CommandResult<()> {
        let mut stock = self.stock.borrow_mut();
        for (id, q) in &committed {
            stock.modify_physical(id, *q);
        }
        stock.reserve_order(self.table, committed);
        Ok(())
    }

    fn description(&self) -> &str {
        "Commit order"
    }
}

/// See [`StockCommands::release_order_command`]. Output: released order.
#[derive(Debug, Clone)]
pub struct ReleaseOrder {
    stock: Shared<Stock>,
    table: TableId,
}

impl Command for ReleaseOrder {
    type Output = CompactOrder;
    type Undone = ();

    fn perform(&self) -> CommandResult<CompactOrder> {
        self.stock
            .borrow_mut()
            .release_order(self.table)
            .ok_or_else(|| CommandError::NotFound(format!("no reservation for {}", self.table)))
    }

    fn undo(&self, released: CompactOrder) -> CommandResult<()> {
        self.stock.borrow_mut().reserve_order(self.table, released);
        Ok(())
    }

    fn description(&self) -> &str {
        "Cancel order"
    }
}

// ============================================================================
// Refill
// ============================================================================

/// See [`StockCommands::mark_for_refill_command`]. Output: ids newly marked.
#[derive(Debug, Clone)]
pub struct MarkForRefill {
    stock: Shared<Stock>,
    ids: Vec<ItemId>,
}

impl Command for MarkForRefill {
    type Output = Vec<ItemId>;
    type Undone = ();

    fn perform(&self) -> CommandResult<Vec<ItemId>> {
        let marked = self
            .stock
            .borrow_mut()
            .mark_for_refill(self.ids.iter().cloned());
        if marked.is_empty() {
            return Err(CommandError::NoChange(
                "every item is already marked for refill".into(),
            ));
        }
        Ok(marked)
    }

    fn undo(&self, marked: Vec<ItemId>) -> CommandResult<()> {
        self.stock.borrow_mut().unmark_for_refill(&marked);
        Ok(())
    }

    fn description(&self) -> &str {
        "Order refill"
    }
}
