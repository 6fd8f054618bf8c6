#![forbid(unsafe_code)]

//! The [`Command`] trait and its combinators.
//!
//! # Invariants
//!
//! - `perform()` returning `Err` leaves observable state unchanged
//! - `undo(perform())` restores the state from before `perform`
//! - `redo(undo(x))` restores the state from after `perform`
//! - a command is immutable once built; state it mutates lives behind
//!   shared handles captured at construction time
//!
//! # Failure Modes
//!
//! - **Undo of own result fails**: a contract violation. The error is
//!   returned to the history, which logs it and discards the entry.
//! - **Rollback fails inside a composite**: logged with `warn!`; the
//!   original failure is still returned.

use std::fmt;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, warn};

/// Result of performing, undoing or redoing a command.
pub type CommandResult<T> = Result<T, CommandError>;

/// Why a command refused to act.
///
/// All variants promise that no state was changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The command would not change anything.
    #[error("no change: {0}")]
    NoChange(String),
    /// The thing the command targets does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// A business rule refused the action.
    #[error("rejected: {0}")]
    Rejected(String),
    /// A capacity limit would be exceeded.
    #[error("capacity exceeded: {requested} requested, limit {limit}")]
    CapacityExceeded { requested: i64, limit: i64 },
    /// State no longer matches what the command expects.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl CommandError {
    /// Whether this is an ordinary business outcome rather than a sign of
    /// corrupted state.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        !matches!(self, Self::InvalidState(_))
    }
}

// ============================================================================
// Command trait
// ============================================================================

/// A reversible operation.
///
/// `perform` yields an [`Output`](Command::Output) that is later handed back
/// to `undo`, which yields an [`Undone`](Command::Undone) value handed to
/// `redo`. Commands hold no interior bookkeeping of their own.
pub trait Command {
    /// Result of `perform` and `redo`, consumed by `undo`.
    type Output;
    /// Result of `undo`, consumed by `redo`.
    type Undone;

    /// Apply the effect.
    fn perform(&self) -> CommandResult<Self::Output>;

    /// Reverse the effect using the result of the latest perform or redo.
    fn undo(&self, performed: Self::Output) -> CommandResult<Self::Undone>;

    /// Re-apply after an undo. Defaults to performing again.
    fn redo(&self, undone: Self::Undone) -> CommandResult<Self::Output> {
        let _ = undone;
        self.perform()
    }

    /// Human-readable description for UI display.
    fn description(&self) -> &str {
        "Command"
    }
}

impl<C: Command + ?Sized> Command for Box<C> {
    type Output = C::Output;
    type Undone = C::Undone;

    fn perform(&self) -> CommandResult<Self::Output> {
        (**self).perform()
    }

    fn undo(&self, performed: Self::Output) -> CommandResult<Self::Undone> {
        (**self).undo(performed)
    }

    fn redo(&self, undone: Self::Undone) -> CommandResult<Self::Output> {
        (**self).redo(undone)
    }

    fn description(&self) -> &str {
        (**self).description()
    }
}

// ============================================================================
// FnCommand
// ============================================================================

type PerformFn<O> = Box<dyn Fn() -> CommandResult<O>>;
type UndoFn<O, D> = Box<dyn Fn(O) -> CommandResult<D>>;
type RedoFn<O, D> = Box<dyn Fn(D) -> CommandResult<O>>;

/// A command built from closures.
///
/// Without an explicit redo closure, redo performs again.
pub struct FnCommand<O, D = ()> {
    description: String,
    perform: PerformFn<O>,
    undo: UndoFn<O, D>,
    redo: Option<RedoFn<O, D>>,
}

impl<O, D> fmt::Debug for FnCommand<O, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCommand")
            .field("description", &self.description)
            .field("has_redo", &self.redo.is_some())
            .finish()
    }
}

impl<O, D> FnCommand<O, D> {
    /// Create a command from perform and undo closures.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        perform: impl Fn() -> CommandResult<O> + 'static,
        undo: impl Fn(O) -> CommandResult<D> + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            perform: Box::new(perform),
            undo: Box::new(undo),
            redo: None,
        }
    }

    /// Use a dedicated redo closure instead of performing again.
    #[must_use]
    pub fn with_redo(mut self, redo: impl Fn(D) -> CommandResult<O> + 'static) -> Self {
        self.redo = Some(Box::new(redo));
        self
    }
}

impl<O, D> Command for FnCommand<O, D> {
    type Output = O;
    type Undone = D;

    fn perform(&self) -> CommandResult<O> {
        (self.perform)()
    }

    fn undo(&self, performed: O) -> CommandResult<D> {
        (self.undo)(performed)
    }

    fn redo(&self, undone: D) -> CommandResult<O> {
        match &self.redo {
            Some(redo) => redo(undone),
            None => (self.perform)(),
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

// ============================================================================
// Composed
// ============================================================================

/// Two commands run as one. See [`compose`].
#[derive(Debug, Clone)]
pub struct Composed<A, B> {
    first: A,
    second: B,
}

impl<A, B> Composed<A, B> {
    #[must_use]
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// The command run first.
    #[must_use]
    pub fn first(&self) -> &A {
        &self.first
    }

    /// The command run second.
    #[must_use]
    pub fn second(&self) -> &B {
        &self.second
    }
}

/// Run `first`, then `second` if `first` succeeded.
///
/// Undo runs in reverse order. If `second` fails, `first` is rolled back so
/// the composite never leaves partial state behind.
#[must_use]
pub fn compose<A: Command, B: Command>(first: A, second: B) -> Composed<A, B> {
    Composed::new(first, second)
}

impl<A: Command, B: Command> Command for Composed<A, B> {
    type Output = (A::Output, B::Output);
    type Undone = (A::Undone, B::Undone);

    fn perform(&self) -> CommandResult<Self::Output> {
        let a = self.first.perform()?;
        match self.second.perform() {
            Ok(b) => Ok((a, b)),
            Err(err) => {
                if let Err(rollback) = self.first.undo(a) {
                    warn!(
                        command = self.first.description(),
                        error = %rollback,
                        "rollback after failed second half did not succeed"
                    );
                }
                Err(err)
            }
        }
    }

    fn undo(&self, (a, b): Self::Output) -> CommandResult<Self::Undone> {
        let ub = self.second.undo(b)?;
        match self.first.undo(a) {
            Ok(ua) => Ok((ua, ub)),
            Err(err) => {
                if let Err(reapply) = self.second.redo(ub) {
                    warn!(
                        command = self.second.description(),
                        error = %reapply,
                        "re-applying second half after failed undo did not succeed"
                    );
                }
                Err(err)
            }
        }
    }

    fn redo(&self, (ua, ub): Self::Undone) -> CommandResult<Self::Output> {
        let a = self.first.redo(ua)?;
        match self.second.redo(ub) {
            Ok(b) => Ok((a, b)),
            Err(err) => {
                if let Err(rollback) = self.first.undo(a) {
                    warn!(
                        command = self.first.description(),
                        error = %rollback,
                        "rollback after failed second-half redo did not succeed"
                    );
                }
                Err(err)
            }
        }
    }

    fn description(&self) -> &str {
        self.first.description()
    }
}

// ============================================================================
// Unfailing
// ============================================================================

/// A command that always reports success. See [`unfailing`].
#[derive(Debug, Clone)]
pub struct Unfailing<C> {
    inner: C,
}

/// Wrap `cmd` so that a failure becomes `Ok(None)`: nothing happened, and
/// undo of `None` does nothing.
#[must_use]
pub fn unfailing<C: Command>(cmd: C) -> Unfailing<C> {
    Unfailing { inner: cmd }
}

impl<C> Unfailing<C> {
    #[must_use]
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: Command> Command for Unfailing<C> {
    type Output = Option<C::Output>;
    type Undone = Option<C::Undone>;

    fn perform(&self) -> CommandResult<Self::Output> {
        match self.inner.perform() {
            Ok(out) => Ok(Some(out)),
            Err(err) => {
                debug!(
                    command = self.inner.description(),
                    error = %err,
                    "swallowed command failure"
                );
                Ok(None)
            }
        }
    }

    fn undo(&self, performed: Self::Output) -> CommandResult<Self::Undone> {
        match performed {
            Some(out) => self.inner.undo(out).map(Some),
            None => Ok(None),
        }
    }

    fn redo(&self, undone: Self::Undone) -> CommandResult<Self::Output> {
        match undone {
            Some(undone) => match self.inner.redo(undone) {
                Ok(out) => Ok(Some(out)),
                Err(err) => {
                    debug!(
                        command = self.inner.description(),
                        error = %err,
                        "swallowed redo failure"
                    );
                    Ok(None)
                }
            },
            None => self.perform(),
        }
    }

    fn description(&self) -> &str {
        self.inner.description()
    }
}

// ============================================================================
// Delayed
// ============================================================================

/// A command constructed at perform time. See [`delayed`].
pub struct Delayed<F> {
    factory: F,
    description: String,
}

impl<F> fmt::Debug for Delayed<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delayed")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Build the concrete command from `factory` only when performed.
///
/// The built instance travels in the result, so undo and redo act on the
/// same command that was performed even if the inputs the factory reads
/// have changed since.
#[must_use]
pub fn delayed<F, C>(description: impl Into<String>, factory: F) -> Delayed<F>
where
    F: Fn() -> C,
    C: Command,
{
    Delayed {
        factory,
        description: description.into(),
    }
}

impl<F, C> Command for Delayed<F>
where
    F: Fn() -> C,
    C: Command,
{
    type Output = (Rc<C>, C::Output);
    type Undone = (Rc<C>, C::Undone);

    fn perform(&self) -> CommandResult<Self::Output> {
        let cmd = Rc::new((self.factory)());
        let out = cmd.perform()?;
        Ok((cmd, out))
    }

    fn undo(&self, (cmd, out): Self::Output) -> CommandResult<Self::Undone> {
        let undone = cmd.undo(out)?;
        Ok((cmd, undone))
    }

    fn redo(&self, (cmd, undone): Self::Undone) -> CommandResult<Self::Output> {
        let out = cmd.redo(undone)?;
        Ok((cmd, out))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

// ============================================================================
// Described
// ============================================================================

/// A command with an overridden description.
#[derive(Debug, Clone)]
pub struct Described<C> {
    inner: C,
    description: String,
}

impl<C: Command> Command for Described<C> {
    type Output = C::Output;
    type Undone = C::Undone;

    fn perform(&self) -> CommandResult<Self::Output> {
        self.inner.perform()
    }

    fn undo(&self, performed: Self::Output) -> CommandResult<Self::Undone> {
        self.inner.undo(performed)
    }

    fn redo(&self, undone: Self::Undone) -> CommandResult<Self::Output> {
        self.inner.redo(undone)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Combinator methods available on every command.
pub trait CommandExt: Command + Sized {
    /// Run `next` after `self`. See [`compose`].
    fn then<B: Command>(self, next: B) -> Composed<Self, B> {
        Composed::new(self, next)
    }

    /// See [`unfailing`].
    fn unfailing(self) -> Unfailing<Self> {
        unfailing(self)
    }

    /// Replace the description shown in the UI.
    fn described(self, description: impl Into<String>) -> Described<Self> {
        Described {
            inner: self,
            description: description.into(),
        }
    }
}

impl<C: Command> CommandExt for C {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::{Shared, shared};

    fn push_cmd(log: &Shared<Vec<i32>>, value: i32) -> FnCommand<()> {
        let (a, b) = (log.clone(), log.clone());
        FnCommand::new(
            format!("push {value}"),
            move || {
                a.borrow_mut().push(value);
                Ok(())
            },
            move |()| {
                b.borrow_mut().pop();
                Ok(())
            },
        )
    }

    fn failing(description: &str) -> FnCommand<()> {
        let msg = description.to_owned();
        FnCommand::new(
            description,
            move || Err(CommandError::Rejected(msg.clone())),
            |()| Ok(()),
        )
    }

    #[test]
    fn fn_command_round_trip() {
        let log = shared(Vec::new());
        let cmd = push_cmd(&log, 1);
        let out = cmd.perform().unwrap();
        assert_eq!(*log.borrow(), vec![1]);
        let undone = cmd.undo(out).unwrap();
        assert!(log.borrow().is_empty());
        cmd.redo(undone).unwrap();
        assert_eq!(*log.borrow(), vec![1]);
        assert_eq!(cmd.description(), "push 1");
    }

    #[test]
    fn fn_command_custom_redo_receives_undo_result() {
        let seen = shared(None);
        let s = seen.clone();
        let cmd = FnCommand::new("x", || Ok(10), |out: i32| Ok(out * 2))
            .with_redo(move |undone: i32| {
                *s.borrow_mut() = Some(undone);
                Ok(undone + 1)
            });
        let out = cmd.perform().unwrap();
        let undone = cmd.undo(out).unwrap();
        assert_eq!(cmd.redo(undone).unwrap(), 21);
        assert_eq!(*seen.borrow(), Some(20));
    }

    #[test]
    fn compose_runs_in_order_and_undoes_in_reverse() {
        let log = shared(Vec::new());
        let cmd = compose(push_cmd(&log, 1), push_cmd(&log, 2));
        let out = cmd.perform().unwrap();
        assert_eq!(*log.borrow(), vec![1, 2]);
        let undone = cmd.undo(out).unwrap();
        assert!(log.borrow().is_empty());
        cmd.redo(undone).unwrap();
        assert_eq!(*log.borrow(), vec![1, 2]);
        assert_eq!(cmd.description(), "push 1");
    }

    #[test]
    fn compose_short_circuits_on_first_failure() {
        let log = shared(Vec::new());
        let cmd = failing("nope").then(push_cmd(&log, 2));
        assert!(matches!(cmd.perform(), Err(CommandError::Rejected(_))));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn compose_rolls_back_first_on_second_failure() {
        let log = shared(Vec::new());
        let cmd = push_cmd(&log, 1).then(failing("second"));
        let err = cmd.perform().unwrap_err();
        assert_eq!(err, CommandError::Rejected("second".into()));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn unfailing_reports_none_and_undo_is_noop() {
        let cmd = unfailing(failing("inner"));
        let out = cmd.perform().unwrap();
        assert!(out.is_none());
        assert!(cmd.undo(out).unwrap().is_none());
    }

    #[test]
    fn unfailing_passes_success_through() {
        let log = shared(Vec::new());
        let cmd = push_cmd(&log, 3).unfailing();
        let out = cmd.perform().unwrap();
        assert_eq!(out, Some(()));
        let undone = cmd.undo(out).unwrap();
        assert!(log.borrow().is_empty());
        assert_eq!(cmd.redo(undone).unwrap(), Some(()));
        assert_eq!(*log.borrow(), vec![3]);
    }

    #[test]
    fn delayed_builds_at_perform_time_and_reuses_instance() {
        let source = shared(1);
        let log = shared(Vec::new());
        let (src, lg) = (source.clone(), log.clone());
        let cmd = delayed("push current", move || push_cmd(&lg, *src.borrow()));

        *source.borrow_mut() = 7;
        let out = cmd.perform().unwrap();
        assert_eq!(*log.borrow(), vec![7]);

        *source.borrow_mut() = 9;
        let undone = cmd.undo(out).unwrap();
        let (built, ()) = cmd.redo(undone).unwrap();
        assert_eq!(*log.borrow(), vec![7]);
        assert_eq!(built.description(), "push 7");
        assert_eq!(cmd.description(), "push current");
    }

    #[test]
    fn delayed_propagates_failure() {
        let cmd = delayed("late failure", || failing("built"));
        assert!(cmd.perform().is_err());
    }

    #[test]
    fn described_overrides_only_description() {
        let log = shared(Vec::new());
        let cmd = push_cmd(&log, 1).described("Add one");
        assert_eq!(cmd.description(), "Add one");
        cmd.perform().unwrap();
        assert_eq!(*log.borrow(), vec![1]);
    }

    #[test]
    fn boxed_command_delegates() {
        let log = shared(Vec::new());
        let cmd: Box<dyn Command<Output = (), Undone = ()>> = Box::new(push_cmd(&log, 4));
        let out = cmd.perform().unwrap();
        cmd.undo(out).unwrap();
        assert!(log.borrow().is_empty());
        assert_eq!(cmd.description(), "push 4");
    }

    #[test]
    fn expected_errors() {
        assert!(CommandError::NoChange("x".into()).is_expected());
        assert!(!CommandError::InvalidState("x".into()).is_expected());
        assert_eq!(
            CommandError::CapacityExceeded {
                requested: 5,
                limit: 3
            }
            .to_string(),
            "capacity exceeded: 5 requested, limit 3"
        );
    }
}
