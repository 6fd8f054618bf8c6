#![forbid(unsafe_code)]

//! Startup configuration.
//!
//! All tunables of the model layer live in one [`PosConfig`] that can be
//! loaded from TOML or JSON. Every field has a default, so a partial file
//! only overrides what it names.
//!
//! # Loading
//!
//! ```toml
//! # barpos.toml
//! [stock]
//! default_stock = 24
//!
//! [menu]
//! stock_min = 3
//! order_page_size = 8
//!
//! [history]
//! max_depth = 200
//! ```
//!
//! ```rust,ignore
//! let config = PosConfig::from_toml_file("barpos.toml")?;
//! let config = PosConfig::from_json_str(json)?;
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::undo::HistoryConfig;

// ---------------------------------------------------------------------------
// Top-level PosConfig
// ---------------------------------------------------------------------------

/// Top-level configuration for the model layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosConfig {
    /// Stock ledger parameters.
    pub stock: StockConfig,
    /// Menu filtering and paging parameters.
    pub menu: MenuConfig,
    /// Cart limits.
    pub cart: CartConfig,
    /// Undo history limits.
    pub history: HistoryConfig,
}

impl PosConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.stock.default_stock < 0 {
            errors.push(format!(
                "stock.default_stock must be >= 0, got {}",
                self.stock.default_stock
            ));
        }
        if self.menu.stock_min < 0 {
            errors.push(format!(
                "menu.stock_min must be >= 0, got {}",
                self.menu.stock_min
            ));
        }
        if self.menu.order_page_size == 0 {
            errors.push("menu.order_page_size must be > 0".to_owned());
        }
        if self.menu.management_page_size == 0 {
            errors.push("menu.management_page_size must be > 0".to_owned());
        }
        if let Some(max) = self.cart.max_items
            && max <= 0
        {
            errors.push(format!("cart.max_items must be > 0 when set, got {max}"));
        }
        if self.history.max_depth == Some(0) {
            errors.push("history.max_depth must be > 0 when set".to_owned());
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Stock ledger parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockConfig {
    /// Physical stock assumed for an item with no recorded level.
    pub default_stock: i64,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self { default_stock: 20 }
    }
}

/// Menu filtering and paging parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Items with availability at or below this buffer are hidden.
    pub stock_min: i64,
    /// Items per page on the ordering screen.
    pub order_page_size: usize,
    /// Items per page on the stock-management screen.
    pub management_page_size: usize,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            stock_min: 5,
            order_page_size: 10,
            management_page_size: 12,
        }
    }
}

/// Cart limits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Maximum total quantity in a cart. `None` is unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<i64>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[error("config TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    /// TOML render error.
    #[error("config TOML render error: {0}")]
    TomlRender(#[from] toml::ser::Error),
    /// JSON parse error.
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shop_floor_values() {
        let cfg = PosConfig::default();
        assert_eq!(cfg.stock.default_stock, 20);
        assert_eq!(cfg.menu.stock_min, 5);
        assert_eq!(cfg.menu.order_page_size, 10);
        assert_eq!(cfg.menu.management_page_size, 12);
        assert_eq!(cfg.cart.max_items, None);
        assert_eq!(cfg.history.max_depth, None);
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let cfg = PosConfig::from_toml_str(
            r#"
            [menu]
            stock_min = 2

            [history]
            max_depth = 50
            "#,
        )
        .unwrap();
        assert_eq!(cfg.menu.stock_min, 2);
        assert_eq!(cfg.menu.order_page_size, 10);
        assert_eq!(cfg.stock.default_stock, 20);
        assert_eq!(cfg.history.max_depth, Some(50));
    }

    #[test]
    fn empty_inputs_give_defaults() {
        assert_eq!(PosConfig::from_toml_str("").unwrap(), PosConfig::default());
        assert_eq!(PosConfig::from_json_str("{}").unwrap(), PosConfig::default());
    }

    #[test]
    fn json_cart_limit() {
        let cfg = PosConfig::from_json_str(r#"{"cart":{"max_items":12}}"#).unwrap();
        assert_eq!(cfg.cart.max_items, Some(12));
    }

    #[test]
    fn toml_render_round_trips() {
        let mut cfg = PosConfig::default();
        cfg.cart.max_items = Some(30);
        let text = cfg.to_toml_string().unwrap();
        assert_eq!(PosConfig::from_toml_str(&text).unwrap(), cfg);
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(matches!(
            PosConfig::from_toml_str("[menu\nstock_min = 1"),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            PosConfig::from_json_str("{"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PosConfig::from_toml_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn file_loaders_read_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("barpos.json");
        std::fs::write(&path, r#"{"stock":{"default_stock":7}}"#).unwrap();
        assert_eq!(
            PosConfig::from_json_file(&path).unwrap().stock.default_stock,
            7
        );
    }

    #[test]
    fn validate_catches_bad_values() {
        let mut cfg = PosConfig::default();
        cfg.stock.default_stock = -1;
        cfg.menu.order_page_size = 0;
        cfg.cart.max_items = Some(0);
        cfg.history.max_depth = Some(0);
        let errors = cfg.validate();
        assert_eq!(errors.len(), 4);
        assert!(errors[0].contains("default_stock"));
    }
}
