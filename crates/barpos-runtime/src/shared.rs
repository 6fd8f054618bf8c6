#![forbid(unsafe_code)]

//! Shared mutable model state.
//!
//! Commands are immutable once built but must mutate the stock ledger, the
//! cart, or a menu cache when performed. They do so through a [`Shared`]
//! handle cloned at construction time.
//!
//! # Failure Modes
//!
//! - **Re-entrant borrow**: mutating a shared value from inside a callback
//!   that already holds a borrow of it panics (RefCell borrow rules). A
//!   re-entrant mutation is a bug in the caller.

use std::cell::RefCell;
use std::rc::Rc;

/// Reference-counted, interior-mutable handle to model state.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wrap a value in a fresh [`Shared`] handle.
#[must_use]
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}
