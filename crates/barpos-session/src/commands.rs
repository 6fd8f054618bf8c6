#![forbid(unsafe_code)]

//! Undoable credit changes on a shared [`UserSession`].

use barpos_runtime::{Command, CommandResult, Shared};

use crate::directory::UserId;
use crate::session::{SessionError, UserSession};

/// Command factories on a shared session handle.
pub trait SessionCommands {
    /// Add `delta` to the active user's credit.
    ///
    /// A negative delta that would take the credit below zero is rejected.
    fn modify_credit_command(&self, delta: f64) -> ModifyCredit;

    /// Charge `amount` to the active user.
    fn charge_command(&self, amount: f64) -> ModifyCredit;
}

impl SessionCommands for Shared<UserSession> {
    fn modify_credit_command(&self, delta: f64) -> ModifyCredit {
        ModifyCredit {
            session: self.clone(),
            delta,
            description: "Adjust credit",
        }
    }

    fn charge_command(&self, amount: f64) -> ModifyCredit {
        ModifyCredit {
            session: self.clone(),
            delta: -amount,
            description: "Pay with credit",
        }
    }
}

/// See [`SessionCommands::modify_credit_command`].
///
/// The user is resolved when the command is performed; undo and redo act on
/// that same user even if the active user has changed since.
#[derive(Debug, Clone)]
pub struct ModifyCredit {
    session: Shared<UserSession>,
    delta: f64,
    description: &'static str,
}

impl ModifyCredit {
    fn apply_to(&self, id: UserId) -> CommandResult<(UserId, Option<f64>)> {
        let mut session = self.session.borrow_mut();
        let available = session.credit_of(id);
        if self.delta < 0.0 && available + self.delta < 0.0 {
            return Err(SessionError::InsufficientCredit {
                available,
                required: -self.delta,
            }
            .into());
        }
        let previous = session.credit_diff(id);
        session.modify_credit_of(id, self.delta)?;
        Ok((id, previous))
    }
}

impl Command for ModifyCredit {
    /// The charged user and their diff before the change.
    type Output = (UserId, Option<f64>);
    type Undone = UserId;

    fn perform(&self) -> CommandResult<Self::Output> {
        let id = self
            .session
            .borrow()
            .active_id()
            .ok_or(SessionError::NoActiveUser)?;
        self.apply_to(id)
    }

    fn undo(&self, (id, previous): Self::Output) -> CommandResult<UserId> {
        self.session.borrow_mut().restore_credit_diff(id, previous);
        Ok(id)
    }

    fn redo(&self, id: UserId) -> CommandResult<Self::Output> {
        self.apply_to(id)
    }

    fn description(&self) -> &str {
        self.description
    }
}
