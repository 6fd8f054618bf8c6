#![forbid(unsafe_code)]

//! Undoable commands over a shared [`OrderList`].

use barpos_core::{Item, ItemId, Quantity};
use barpos_runtime::{Command, CommandResult, Shared};

use crate::order_list::{CartContents, CartError, OrderList};

/// Command factories on a shared cart handle.
pub trait CartCommands {
    /// Add `quantity` of `item`, inserting a new entry at `at`.
    fn add_item_command(&self, item: Item, quantity: Quantity, at: usize) -> AddItem;

    /// Remove up to `quantity` of `id`.
    fn remove_item_command(&self, id: ItemId, quantity: Quantity) -> RemoveItem;

    /// Empty the cart. Fails if it is already empty.
    fn clear_command(&self) -> ClearCart;
}

impl CartCommands for Shared<OrderList> {
    fn add_item_command(&self, item: Item, quantity: Quantity, at: usize) -> AddItem {
        AddItem {
            cart: self.clone(),
            item,
            quantity,
            at,
        }
    }

    fn remove_item_command(&self, id: ItemId, quantity: Quantity) -> RemoveItem {
        RemoveItem {
            cart: self.clone(),
            id,
            quantity,
        }
    }

    fn clear_command(&self) -> ClearCart {
        ClearCart { cart: self.clone() }
    }
}

/// See [`CartCommands::add_item_command`].
#[derive(Debug, Clone)]
pub struct AddItem {
    cart: Shared<OrderList>,
    item: Item,
    quantity: Quantity,
    at: usize,
}

impl Command for AddItem {
    type Output = ();
    type Undone = ();

    fn perform(&self) -> CommandResult<()> {
        self.cart
            .borrow_mut()
            .add_item(self.item.clone(), self.quantity, self.at)?;
        Ok(())
    }

    fn undo(&self, (): ()) -> CommandResult<()> {
        self.cart
            .borrow_mut()
            .remove_item(self.item.id(), self.quantity)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Add to order"
    }
}

/// What a [`RemoveItem`] took out, and where it was.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedItem {
    /// Display position before removal.
    pub index: usize,
    pub item: Item,
    /// Quantity actually removed.
    pub removed: Quantity,
}

/// See [`CartCommands::remove_item_command`].
#[derive(Debug, Clone)]
pub struct RemoveItem {
    cart: Shared<OrderList>,
    id: ItemId,
    quantity: Quantity,
}

impl Command for RemoveItem {
    type Output = RemovedItem;
    type Undone = ();

    fn perform(&self) -> CommandResult<RemovedItem> {
        let mut cart = self.cart.borrow_mut();
        let (index, item) = match (cart.position(&self.id), cart.get(&self.id)) {
            (Some(index), Some(entry)) => (index, entry.item.clone()),
            _ => return Err(CartError::NotInCart(self.id.clone()).into()),
        };
        let removed = cart.remove_item(&self.id, self.quantity)?;
        Ok(RemovedItem {
            index,
            item,
            removed,
        })
    }

    fn undo(&self, performed: RemovedItem) -> CommandResult<()> {
        self.cart
            .borrow_mut()
            .add_item(performed.item, performed.removed, performed.index)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Remove from order"
    }
}

/// See [`CartCommands::clear_command`]. Output: the cleared contents.
#[derive(Debug, Clone)]
pub struct ClearCart {
    cart: Shared<OrderList>,
}

impl Command for ClearCart {
    type Output = CartContents;
    type Undone = ();

    fn perform(&self) -> CommandResult<CartContents> {
        Ok(self.cart.borrow_mut().clear()?)
    }

    fn undo(&self, contents: CartContents) -> CommandResult<()> {
        self.cart.borrow_mut().restore(contents);
        Ok(())
    }

    fn description(&self) -> &str {
        "Clear order"
    }
}
