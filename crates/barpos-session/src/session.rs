#![forbid(unsafe_code)]

//! Signed-in users and their credit.
//!
//! # Invariants
//!
//! 1. `active`, when set, is one of `authenticated`.
//! 2. Every id in the state is known to the directory. Ids that are not are
//!    dropped when a persisted state is restored.
//! 3. `credit_of(id) == base_credit(id) + credit_diffs[id]`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use barpos_runtime::CommandError;

use crate::directory::{User, UserDirectory, UserId};

/// Session failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("no user named {0:?}")]
    UnknownUser(String),

    #[error("{0} is not in the user directory")]
    UnknownUserId(UserId),

    #[error("wrong password for {0:?}")]
    WrongPassword(String),

    #[error("{0} is not signed in")]
    NotAuthenticated(UserId),

    #[error("no active user")]
    NoActiveUser,

    #[error("insufficient credit: {available} available, {required} required")]
    InsufficientCredit { available: f64, required: f64 },
}

impl From<SessionError> for CommandError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::UnknownUser(_) | SessionError::UnknownUserId(_) => {
                Self::NotFound(err.to_string())
            }
            SessionError::WrongPassword(_)
            | SessionError::NotAuthenticated(_)
            | SessionError::InsufficientCredit { .. } => Self::Rejected(err.to_string()),
            SessionError::NoActiveUser => Self::InvalidState(err.to_string()),
        }
    }
}

/// The persisted part of a [`UserSession`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionState {
    pub authenticated: BTreeSet<UserId>,
    pub active: Option<UserId>,
    pub credit_diffs: BTreeMap<UserId, f64>,
}

/// Signed-in users over a shared [`UserDirectory`].
pub struct UserSession {
    directory: Rc<UserDirectory>,
    state: SessionState,
}

impl fmt::Debug for UserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSession")
            .field("users", &self.directory.len())
            .field("authenticated", &self.state.authenticated)
            .field("active", &self.state.active)
            .finish_non_exhaustive()
    }
}

impl UserSession {
    /// A session with nobody signed in.
    #[must_use]
    pub fn new(directory: Rc<UserDirectory>) -> Self {
        Self {
            directory,
            state: SessionState::default(),
        }
    }

    /// Restore a persisted session, dropping ids the directory does not know.
    #[must_use]
    pub fn from_state(directory: Rc<UserDirectory>, mut state: SessionState) -> Self {
        let before = state.authenticated.len() + state.credit_diffs.len();
        state.authenticated.retain(|id| directory.contains(*id));
        state.credit_diffs.retain(|id, _| directory.contains(*id));
        let dropped = before - state.authenticated.len() - state.credit_diffs.len();
        if state
            .active
            .is_some_and(|id| !state.authenticated.contains(&id))
        {
            state.active = None;
        }
        if dropped > 0 {
            warn!(dropped, "restored session referenced unknown users");
        }
        Self { directory, state }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn directory(&self) -> &Rc<UserDirectory> {
        &self.directory
    }

    /// Sign `username` in and make them active.
    ///
    /// Users without a stored password are accepted with any password.
    ///
    /// # Errors
    ///
    /// [`SessionError::UnknownUser`] or [`SessionError::WrongPassword`].
    pub fn authenticate(&mut self, username: &str, password: &str) -> Result<UserId, SessionError> {
        let user = self
            .directory
            .by_username(username)
            .ok_or_else(|| SessionError::UnknownUser(username.to_string()))?;
        if user.password.as_deref().is_some_and(|p| p != password) {
            return Err(SessionError::WrongPassword(username.to_string()));
        }
        let id = user.id;
        self.state.authenticated.insert(id);
        self.state.active = Some(id);
        info!(user = %id, "user signed in");
        Ok(id)
    }

    /// Make a signed-in user active, or clear the active user with `None`.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotAuthenticated`] if `id` is not signed in.
    pub fn switch_to(&mut self, id: Option<UserId>) -> Result<(), SessionError> {
        if let Some(id) = id
            && !self.state.authenticated.contains(&id)
        {
            return Err(SessionError::NotAuthenticated(id));
        }
        self.state.active = id;
        Ok(())
    }

    /// Sign `id` out. Clears the active user if it was `id`.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotAuthenticated`] if `id` is not signed in.
    pub fn unauthenticate(&mut self, id: UserId) -> Result<(), SessionError> {
        if self.state.authenticated.contains(&id) {
            self.sign_out(id);
            Ok(())
        } else {
            Err(SessionError::NotAuthenticated(id))
        }
    }

    /// Sign out the active user. Returns who was signed out.
    pub fn unauthenticate_active(&mut self) -> Option<UserId> {
        let id = self.active_id()?;
        self.sign_out(id);
        Some(id)
    }

    fn sign_out(&mut self, id: UserId) {
        self.state.authenticated.remove(&id);
        if self.state.active == Some(id) {
            self.state.active = None;
        }
        info!(user = %id, "user signed out");
    }

    pub fn unauthenticate_all(&mut self) {
        self.state.authenticated.clear();
        self.state.active = None;
    }

    /// Sign out everyone except the active user.
    pub fn unauthenticate_all_else(&mut self) {
        let active = self.state.active;
        self.state.authenticated.retain(|id| Some(*id) == active);
    }

    #[must_use]
    pub fn active(&self) -> Option<&User> {
        self.state.active.and_then(|id| self.directory.get(id))
    }

    #[must_use]
    pub fn active_id(&self) -> Option<UserId> {
        self.state.active
    }

    /// Signed-in users, in id order.
    #[must_use]
    pub fn authenticated(&self) -> Vec<&User> {
        self.state
            .authenticated
            .iter()
            .filter_map(|id| self.directory.get(*id))
            .collect()
    }

    #[must_use]
    pub fn is_authenticated(&self, id: UserId) -> bool {
        self.state.authenticated.contains(&id)
    }

    // ------------------------------------------------------------------
    // Credit
    // ------------------------------------------------------------------

    /// Current credit of `id`: base credit plus recorded diff.
    #[must_use]
    pub fn credit_of(&self, id: UserId) -> f64 {
        let base = self.directory.get(id).map_or(0.0, User::base_credit);
        base + self.state.credit_diffs.get(&id).copied().unwrap_or(0.0)
    }

    /// Set the credit of `id`, returning the previous credit.
    ///
    /// # Errors
    ///
    /// [`SessionError::UnknownUserId`] if `id` is not in the directory.
    pub fn set_credit_of(&mut self, id: UserId, credit: f64) -> Result<f64, SessionError> {
        let base = self
            .directory
            .get(id)
            .ok_or(SessionError::UnknownUserId(id))?
            .base_credit();
        let old = self.credit_of(id);
        self.state.credit_diffs.insert(id, credit - base);
        Ok(old)
    }

    /// Add `delta` to the credit of `id`, returning the previous credit.
    ///
    /// # Errors
    ///
    /// [`SessionError::UnknownUserId`] if `id` is not in the directory.
    pub fn modify_credit_of(&mut self, id: UserId, delta: f64) -> Result<f64, SessionError> {
        if !self.directory.contains(id) {
            return Err(SessionError::UnknownUserId(id));
        }
        let old = self.credit_of(id);
        *self.state.credit_diffs.entry(id).or_insert(0.0) += delta;
        Ok(old)
    }

    /// Credit of the active user.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoActiveUser`].
    pub fn credit(&self) -> Result<f64, SessionError> {
        let id = self.state.active.ok_or(SessionError::NoActiveUser)?;
        Ok(self.credit_of(id))
    }

    /// Set the active user's credit, returning the previous credit.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoActiveUser`].
    pub fn set_credit(&mut self, credit: f64) -> Result<f64, SessionError> {
        let id = self.state.active.ok_or(SessionError::NoActiveUser)?;
        self.set_credit_of(id, credit)
    }

    /// Add `delta` to the active user's credit, returning the previous credit.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoActiveUser`].
    pub fn modify_credit(&mut self, delta: f64) -> Result<f64, SessionError> {
        let id = self.state.active.ok_or(SessionError::NoActiveUser)?;
        self.modify_credit_of(id, delta)
    }

    /// The raw diff recorded for `id`, if any.
    pub(crate) fn credit_diff(&self, id: UserId) -> Option<f64> {
        self.state.credit_diffs.get(&id).copied()
    }

    /// Put back a raw diff captured by [`credit_diff`](Self::credit_diff).
    pub(crate) fn restore_credit_diff(&mut self, id: UserId, diff: Option<f64>) {
        match diff {
            Some(diff) => {
                self.state.credit_diffs.insert(id, diff);
            }
            None => {
                self.state.credit_diffs.remove(&id);
            }
        }
    }
}
