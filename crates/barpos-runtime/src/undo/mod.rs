#![forbid(unsafe_code)]

//! Undo/redo command algebra.
//!
//! Every mutation of model state is expressed as a [`Command`]: a value
//! with `perform`, `undo` and `redo` operations, each returning a
//! [`CommandResult`]. The result of one operation is handed to the next, so
//! a command never needs interior bookkeeping to know how to reverse
//! itself.
//!
//! # Architecture
//!
//! ```text
//!             perform()                     undo()
//!  Command ─────────────► (cmd, Output) ─────────────► (cmd, Undone)
//!                              ▲                              │
//!                              └──────────── redo() ──────────┘
//!
//!  UndoManager
//!  ┌────────────────────┐          ┌────────────────────┐
//!  │ undo stack         │  undo()  │ redo stack         │
//!  │  (cmd, Output)     │ ───────► │  (cmd, Undone)     │
//!  │                    │ ◄─────── │                    │
//!  └────────────────────┘  redo()  └────────────────────┘
//! ```
//!
//! # Combinators
//!
//! - [`compose`]: run two commands as one; a failure of the second half
//!   rolls back the first
//! - [`unfailing`]: report success even when the wrapped command fails,
//!   recording `None` so undo knows nothing happened
//! - [`delayed`]: build the concrete command only when it is performed and
//!   carry the built instance through undo and redo
//!
//! # Quick Start
//!
//! ```
//! use barpos_runtime::{CommandExt, FnCommand, UndoManager, shared};
//!
//! let counter = shared(0);
//! let (a, b) = (counter.clone(), counter.clone());
//! let inc = FnCommand::new(
//!     "increment",
//!     move || { *a.borrow_mut() += 1; Ok(()) },
//!     move |()| { *b.borrow_mut() -= 1; Ok(()) },
//! );
//!
//! let mut history = UndoManager::default();
//! history.perform(inc).unwrap();
//! assert_eq!(*counter.borrow(), 1);
//! history.undo();
//! assert_eq!(*counter.borrow(), 0);
//! history.redo();
//! assert_eq!(*counter.borrow(), 1);
//! ```

pub mod command;
pub mod history;

pub use command::{
    Command, CommandError, CommandExt, CommandResult, Composed, Delayed, Described, FnCommand,
    Unfailing, compose, delayed, unfailing,
};
pub use history::{HistoryConfig, UndoManager};
