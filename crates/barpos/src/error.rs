#![forbid(unsafe_code)]

//! Errors surfaced by the application context.
//!
//! Command failures stay [`CommandError`](barpos_runtime::CommandError);
//! this type covers startup, load, save and wiring problems.

use std::path::PathBuf;

use thiserror::Error;

use barpos_runtime::{ConfigError, PersistError};
use barpos_session::SessionError;
use barpos_stock::StockError;

use crate::context::MenuKind;

/// Top-level error type for barpos front ends.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("stored stock is inconsistent: {0}")]
    Stock(#[from] StockError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("cannot read catalog {path}: {source}")]
    CatalogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog: {0}")]
    Catalog(#[source] serde_json::Error),

    #[error("no {0} menu loaded")]
    MissingMenu(MenuKind),

    #[error("no user directory loaded")]
    NoSession,

    #[error("logging already initialized or bad filter: {0}")]
    Logging(String),
}

/// Standard result type for barpos facade APIs.
pub type Result<T> = std::result::Result<T, AppError>;
