#![forbid(unsafe_code)]

//! Catalog items.
//!
//! An [`Item`] is a tagged variant: the JSON form carries a `kind` field
//! (`"generic"`, `"drink"` or `"food"`) and serde maps it to the matching
//! variant. Fields shared by every kind live in [`ItemFields`].
//!
//! ```text
//! {"kind":"drink","id":"101","name":"Pale Ale","secondaryName":"",
//!  "category":"Öl, Ale","price":50.0,"organic":false,"kosher":false,
//!  "alcoholPercentage":5.2}
//! ```

use serde::{Deserialize, Serialize};

use crate::category::sub_categories_of;
use crate::ids::ItemId;

/// Fields every catalog item has.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFields {
    pub id: ItemId,
    pub name: String,
    /// Secondary name line (producer, style, ...). May be empty.
    #[serde(default)]
    pub secondary_name: String,
    /// Free-text category, e.g. `"Rött vin, Kryddigt & Mustigt"`.
    pub category: String,
    /// Price including VAT.
    pub price: f64,
    #[serde(default)]
    pub organic: bool,
    #[serde(default)]
    pub kosher: bool,
}

impl ItemFields {
    /// Create fields with empty secondary name and no dietary flags.
    #[must_use]
    pub fn new(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        category: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            secondary_name: String::new(),
            category: category.into(),
            price,
            organic: false,
            kosher: false,
        }
    }

    #[must_use]
    pub fn with_secondary_name(mut self, name: impl Into<String>) -> Self {
        self.secondary_name = name.into();
        self
    }

    #[must_use]
    pub fn organic(mut self, organic: bool) -> Self {
        self.organic = organic;
        self
    }

    #[must_use]
    pub fn kosher(mut self, kosher: bool) -> Self {
        self.kosher = kosher;
        self
    }
}

/// A catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Item {
    /// An item with no kind-specific data.
    Generic(ItemFields),
    /// A beverage; the alcohol percentage participates in filtering.
    Drink {
        #[serde(flatten)]
        fields: ItemFields,
        #[serde(rename = "alcoholPercentage")]
        alcohol_percentage: f64,
    },
    /// A dish; mass in grams.
    Food {
        #[serde(flatten)]
        fields: ItemFields,
        mass: f64,
    },
}

impl Item {
    #[must_use]
    pub fn generic(fields: ItemFields) -> Self {
        Self::Generic(fields)
    }

    #[must_use]
    pub fn drink(fields: ItemFields, alcohol_percentage: f64) -> Self {
        Self::Drink {
            fields,
            alcohol_percentage,
        }
    }

    #[must_use]
    pub fn food(fields: ItemFields, mass: f64) -> Self {
        Self::Food { fields, mass }
    }

    /// Shared fields regardless of kind.
    #[must_use]
    pub fn fields(&self) -> &ItemFields {
        match self {
            Self::Generic(fields) | Self::Drink { fields, .. } | Self::Food { fields, .. } => {
                fields
            }
        }
    }

    #[must_use]
    pub fn id(&self) -> &ItemId {
        &self.fields().id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.fields().name
    }

    #[must_use]
    pub fn secondary_name(&self) -> &str {
        &self.fields().secondary_name
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.fields().category
    }

    #[must_use]
    pub fn price(&self) -> f64 {
        self.fields().price
    }

    #[must_use]
    pub fn is_organic(&self) -> bool {
        self.fields().organic
    }

    #[must_use]
    pub fn is_kosher(&self) -> bool {
        self.fields().kosher
    }

    /// Alcohol percentage, present only for drinks.
    #[must_use]
    pub fn alcohol_percentage(&self) -> Option<f64> {
        match self {
            Self::Drink {
                alcohol_percentage, ..
            } => Some(*alcohol_percentage),
            Self::Generic(_) | Self::Food { .. } => None,
        }
    }

    /// Sub-categories parsed from the category string.
    #[must_use]
    pub fn sub_categories(&self) -> Vec<String> {
        sub_categories_of(self.category())
    }

    /// Whether the item lacks an organic or a kosher certification.
    #[must_use]
    pub fn has_hazards(&self) -> bool {
        !self.is_kosher() || !self.is_organic()
    }
}
