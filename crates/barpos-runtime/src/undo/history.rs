#![forbid(unsafe_code)]

//! History stack for undo/redo operations.
//!
//! [`UndoManager`] keeps two stacks of type-erased `(command, result)`
//! entries and a list of observers.
//!
//! # Invariants
//!
//! 1. After a successful `perform`, the redo stack is empty
//! 2. The top of the undo stack is the most recently applied command whose
//!    inverse has not run
//! 3. `undo_stack.len() <= config.max_depth` (after any operation, if set)
//! 4. Observers run after every structural change, in registration order
//!
//! # Failure Modes
//!
//! - **Failed undo or redo**: the command could not reverse its own result,
//!   so the history no longer describes reality. The entry is logged with
//!   `warn!` and discarded; the other stacks are left as they are.
//! - **Re-entrant perform**: an observer that reaches the manager through a
//!   shared handle panics on the borrow. This is a bug in the observer.
//!
//! ```text
//! perform(c3)
//! ┌───────────────────────────────────────┐
//! │ Undo: [c1, c2, c3]   Redo: []         │
//! └───────────────────────────────────────┘
//! undo() x2
//! ┌───────────────────────────────────────┐
//! │ Undo: [c1]           Redo: [c3, c2]   │
//! └───────────────────────────────────────┘
//! perform(c4)  <-- new branch, clears redo
//! ┌───────────────────────────────────────┐
//! │ Undo: [c1, c4]       Redo: []         │
//! └───────────────────────────────────────┘
//! ```

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::command::{Command, CommandError, CommandResult};

/// Configuration for the undo manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of entries kept for undo. `None` keeps everything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

impl HistoryConfig {
    /// Keep at most `max_depth` undo entries.
    #[must_use]
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
        }
    }

    /// Keep every entry.
    #[must_use]
    pub fn unlimited() -> Self {
        Self { max_depth: None }
    }
}

// ============================================================================
// Type-erased entries
// ============================================================================

trait AppliedEntry {
    fn description(&self) -> &str;
    fn undo(self: Box<Self>) -> Result<Box<dyn RevertedEntry>, CommandError>;
}

trait RevertedEntry {
    fn description(&self) -> &str;
    fn redo(self: Box<Self>) -> Result<Box<dyn AppliedEntry>, CommandError>;
}

struct Applied<C: Command> {
    cmd: C,
    result: C::Output,
}

struct Reverted<C: Command> {
    cmd: C,
    result: C::Undone,
}

impl<C> AppliedEntry for Applied<C>
where
    C: Command + 'static,
    C::Output: 'static,
    C::Undone: 'static,
{
    fn description(&self) -> &str {
        self.cmd.description()
    }

    fn undo(self: Box<Self>) -> Result<Box<dyn RevertedEntry>, CommandError> {
        let Applied { cmd, result } = *self;
        let result = cmd.undo(result)?;
        Ok(Box::new(Reverted { cmd, result }))
    }
}

impl<C> RevertedEntry for Reverted<C>
where
    C: Command + 'static,
    C::Output: 'static,
    C::Undone: 'static,
{
    fn description(&self) -> &str {
        self.cmd.description()
    }

    fn redo(self: Box<Self>) -> Result<Box<dyn AppliedEntry>, CommandError> {
        let Reverted { cmd, result } = *self;
        let result = cmd.redo(result)?;
        Ok(Box::new(Applied { cmd, result }))
    }
}

// ============================================================================
// UndoManager
// ============================================================================

/// Undo/redo history with change observers.
pub struct UndoManager {
    /// Applied commands (newest at back).
    undo_stack: VecDeque<Box<dyn AppliedEntry>>,
    /// Reverted commands (newest at back).
    redo_stack: VecDeque<Box<dyn RevertedEntry>>,
    callbacks: Vec<Box<dyn Fn()>>,
    config: HistoryConfig,
}

impl fmt::Debug for UndoManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoManager")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("callbacks", &self.callbacks.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl UndoManager {
    /// Create an empty history with the given configuration.
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            callbacks: Vec::new(),
            config,
        }
    }

    // ========================================================================
    // Core Operations
    // ========================================================================

    /// Perform `cmd` and, on success, record it for undo.
    ///
    /// Success clears the redo stack and notifies observers. Failure leaves
    /// the history untouched. The command's result is returned either way.
    pub fn perform<C>(&mut self, cmd: C) -> CommandResult<C::Output>
    where
        C: Command + 'static,
        C::Output: Clone + 'static,
        C::Undone: 'static,
    {
        let result = match cmd.perform() {
            Ok(result) => result,
            Err(err) => {
                debug!(command = cmd.description(), error = %err, "command not performed");
                return Err(err);
            }
        };
        debug!(command = cmd.description(), "command performed");
        self.redo_stack.clear();
        self.undo_stack.push_back(Box::new(Applied {
            cmd,
            result: result.clone(),
        }));
        self.enforce_limits();
        self.notify();
        Ok(result)
    }

    /// Undo the most recent command.
    ///
    /// # Returns
    ///
    /// - `Some(Ok(description))` if undo succeeded
    /// - `Some(Err(error))` if undo failed (the entry is discarded)
    /// - `None` if there is nothing to undo
    pub fn undo(&mut self) -> Option<Result<String, CommandError>> {
        let entry = self.undo_stack.pop_back()?;
        let description = entry.description().to_owned();
        let outcome = match entry.undo() {
            Ok(reverted) => {
                debug!(command = %description, "command undone");
                self.redo_stack.push_back(reverted);
                Ok(description)
            }
            Err(err) => {
                warn!(
                    command = %description,
                    error = %err,
                    "undo failed; discarding history entry"
                );
                Err(err)
            }
        };
        self.notify();
        Some(outcome)
    }

    /// Redo the most recently undone command.
    ///
    /// # Returns
    ///
    /// - `Some(Ok(description))` if redo succeeded
    /// - `Some(Err(error))` if redo failed (the entry is discarded)
    /// - `None` if there is nothing to redo
    pub fn redo(&mut self) -> Option<Result<String, CommandError>> {
        let entry = self.redo_stack.pop_back()?;
        let description = entry.description().to_owned();
        let outcome = match entry.redo() {
            Ok(applied) => {
                debug!(command = %description, "command redone");
                self.undo_stack.push_back(applied);
                self.enforce_limits();
                Ok(description)
            }
            Err(err) => {
                warn!(
                    command = %description,
                    error = %err,
                    "redo failed; discarding history entry"
                );
                Err(err)
            }
        };
        self.notify();
        Some(outcome)
    }

    /// Check if undo is available.
    #[must_use]
    pub fn undo_available(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn redo_available(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Register an observer run after every structural change.
    pub fn register_callback(&mut self, callback: impl Fn() + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    // ========================================================================
    // Info
    // ========================================================================

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Description of the command `undo()` would reverse.
    #[must_use]
    pub fn next_undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|e| e.description())
    }

    /// Description of the command `redo()` would re-apply.
    #[must_use]
    pub fn next_redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|e| e.description())
    }

    /// Descriptions of undoable commands, most recent first.
    pub fn undo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.undo_stack
            .iter()
            .rev()
            .take(limit)
            .map(|e| e.description())
            .collect()
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Forget all history. Observers stay registered.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.notify();
    }

    fn enforce_limits(&mut self) {
        if let Some(max_depth) = self.config.max_depth {
            while self.undo_stack.len() > max_depth {
                self.undo_stack.pop_front();
            }
        }
    }

    fn notify(&self) {
        for callback in &self.callbacks {
            callback();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
