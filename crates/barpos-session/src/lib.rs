#![forbid(unsafe_code)]

//! Users, VIP sessions and credit for barpos.
//!
//! - [`UserDirectory`]: the immutable user database, with the base credit of
//!   each account
//! - [`UserSession`]: who is signed in, who is active, and how each user's
//!   credit has moved since the directory was loaded
//! - [`SessionCommands`]: undoable credit changes
//!
//! Credit is stored as a diff against the directory's base credit, so the
//! persisted session stays small and the directory can be reloaded without
//! losing charges.

pub mod commands;
pub mod directory;
pub mod session;

pub use commands::{ModifyCredit, SessionCommands};
pub use directory::{AccountRecord, User, UserDatabase, UserDirectory, UserId, UserRecord};
pub use session::{SessionError, SessionState, UserSession};
