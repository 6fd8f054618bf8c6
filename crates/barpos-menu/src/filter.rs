#![forbid(unsafe_code)]

//! The filter predicate applied when a menu partition is built.
//!
//! # Invariants
//!
//! 1. A default [`FilterSpec`] accepts every item whose availability exceeds
//!    [`DEFAULT_STOCK_MIN`].
//! 2. Alcohol bounds apply to drinks only; generic and food items ignore them.
//! 3. Two specs that compare equal accept exactly the same items for the same
//!    stock state. The partition cache relies on this.
//! 4. Equality is reflexive: float bounds compare with `f64::total_cmp`, so a
//!    NaN bound equals itself and still hits the cache.

use serde::{Deserialize, Serialize};

use barpos_core::{Item, Quantity};
use barpos_stock::Stock;

/// Items with availability at or below this buffer are hidden by default.
pub const DEFAULT_STOCK_MIN: Quantity = 5;

fn same_bound(a: f64, b: f64) -> bool {
    a.total_cmp(&b).is_eq()
}

/// Inclusive alcohol-by-volume bounds, in percent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PercentageRange {
    pub percentage_min: f64,
    pub percentage_max: f64,
}

impl Default for PercentageRange {
    fn default() -> Self {
        Self {
            percentage_min: 0.0,
            percentage_max: 100.0,
        }
    }
}

impl PartialEq for PercentageRange {
    fn eq(&self, other: &Self) -> bool {
        same_bound(self.percentage_min, other.percentage_min)
            && same_bound(self.percentage_max, other.percentage_max)
    }
}

impl Eq for PercentageRange {}

impl PercentageRange {
    #[must_use]
    pub fn contains(&self, percentage: f64) -> bool {
        percentage >= self.percentage_min && percentage <= self.percentage_max
    }
}

/// Filter settings of one menu.
///
/// `price_max: None` means no upper bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterSpec {
    pub price_min: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,
    pub drink: PercentageRange,
    /// Sub-categories an item must all carry (case-insensitive).
    pub sub_categories: Vec<String>,
    /// Words or phrases that must each occur in the name, secondary name or
    /// category (case-sensitive).
    pub searches: Vec<String>,
    pub organic: bool,
    pub kosher: bool,
    /// Availability buffer: an item is shown only when its availability is
    /// strictly greater.
    pub stock_min: Quantity,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            price_min: 0.0,
            price_max: None,
            drink: PercentageRange::default(),
            sub_categories: Vec::new(),
            searches: Vec::new(),
            organic: false,
            kosher: false,
            stock_min: DEFAULT_STOCK_MIN,
        }
    }
}

impl PartialEq for FilterSpec {
    fn eq(&self, other: &Self) -> bool {
        let Self {
            price_min,
            price_max,
            drink,
            sub_categories,
            searches,
            organic,
            kosher,
            stock_min,
        } = self;
        let price_max_eq = match (price_max, other.price_max) {
            (Some(a), Some(b)) => same_bound(*a, b),
            (None, None) => true,
            _ => false,
        };
        same_bound(*price_min, other.price_min)
            && price_max_eq
            && *drink == other.drink
            && *sub_categories == other.sub_categories
            && *searches == other.searches
            && *organic == other.organic
            && *kosher == other.kosher
            && *stock_min == other.stock_min
    }
}

impl Eq for FilterSpec {}

impl FilterSpec {
    /// An unrestricted spec with the given availability buffer.
    #[must_use]
    pub fn with_stock_min(stock_min: Quantity) -> Self {
        Self {
            stock_min,
            ..Self::default()
        }
    }

    /// The unrestricted spec that keeps this spec's availability buffer.
    #[must_use]
    pub fn cleared(&self) -> Self {
        Self::with_stock_min(self.stock_min)
    }

    /// True when nothing but the availability buffer restricts the view.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        *self == self.cleared()
    }

    /// Whether `item` passes every filter given the current `stock`.
    #[must_use]
    pub fn accepts(&self, item: &Item, stock: &Stock) -> bool {
        let price = item.price();
        if price < self.price_min || self.price_max.is_some_and(|max| price > max) {
            return false;
        }
        if (self.organic && !item.is_organic()) || (self.kosher && !item.is_kosher()) {
            return false;
        }
        if let Some(percentage) = item.alcohol_percentage()
            && !self.drink.contains(percentage)
        {
            return false;
        }
        if stock.availability(item.id()) <= self.stock_min {
            return false;
        }
        if !self.sub_categories.is_empty() {
            let carried: Vec<String> = item
                .sub_categories()
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect();
            let all_present = self
                .sub_categories
                .iter()
                .all(|wanted| carried.contains(&wanted.to_lowercase()));
            if !all_present {
                return false;
            }
        }
        self.searches.iter().all(|search| {
            item.name().contains(search.as_str())
                || item.secondary_name().contains(search.as_str())
                || item.category().contains(search.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barpos_core::ItemFields;

    fn stock() -> Stock {
        Stock::new(20)
    }

    fn ale() -> Item {
        Item::drink(
            ItemFields::new("1", "Pale Ale", "Öl, Ljus lager", 50.0).with_secondary_name("Brygghus"),
            5.2,
        )
    }

    #[test]
    fn default_accepts_stocked_items() {
        assert!(FilterSpec::default().accepts(&ale(), &stock()));
    }

    #[test]
    fn availability_must_exceed_buffer() {
        let mut stock = stock();
        stock.set_physical(ale().id(), DEFAULT_STOCK_MIN);
        assert!(!FilterSpec::default().accepts(&ale(), &stock));
        stock.set_physical(ale().id(), DEFAULT_STOCK_MIN + 1);
        assert!(FilterSpec::default().accepts(&ale(), &stock));
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let spec = FilterSpec {
            price_min: 50.0,
            price_max: Some(50.0),
            ..FilterSpec::default()
        };
        assert!(spec.accepts(&ale(), &stock()));
        let spec = FilterSpec {
            price_max: Some(49.0),
            ..FilterSpec::default()
        };
        assert!(!spec.accepts(&ale(), &stock()));
    }

    #[test]
    fn percentage_applies_to_drinks_only() {
        let spec = FilterSpec {
            drink: PercentageRange {
                percentage_min: 10.0,
                percentage_max: 100.0,
            },
            ..FilterSpec::default()
        };
        assert!(!spec.accepts(&ale(), &stock()));
        let snack = Item::generic(ItemFields::new("2", "Nuts", "Snacks", 20.0));
        assert!(spec.accepts(&snack, &stock()));
    }

    #[test]
    fn sub_categories_are_case_insensitive() {
        let spec = FilterSpec {
            sub_categories: vec!["ljus LAGER".into()],
            ..FilterSpec::default()
        };
        assert!(spec.accepts(&ale(), &stock()));
        let spec = FilterSpec {
            sub_categories: vec!["Ljus lager".into(), "Mörk".into()],
            ..FilterSpec::default()
        };
        assert!(!spec.accepts(&ale(), &stock()));
    }

    #[test]
    fn searches_match_any_text_field_case_sensitively() {
        let mut spec = FilterSpec {
            searches: vec!["Pale".into(), "Brygg".into(), "lager".into()],
            ..FilterSpec::default()
        };
        assert!(spec.accepts(&ale(), &stock()));
        spec.searches = vec!["pale".into()];
        assert!(!spec.accepts(&ale(), &stock()));
    }

    #[test]
    fn flags_are_required_only_when_set() {
        let spec = FilterSpec {
            organic: true,
            ..FilterSpec::default()
        };
        assert!(!spec.accepts(&ale(), &stock()));
        let organic = Item::generic(ItemFields::new("3", "Apple", "Fruit", 5.0).organic(true));
        assert!(spec.accepts(&organic, &stock()));
    }

    #[test]
    fn nan_bounds_equal_themselves() {
        let spec = FilterSpec {
            price_min: f64::NAN,
            price_max: Some(f64::NAN),
            drink: PercentageRange {
                percentage_min: f64::NAN,
                percentage_max: 100.0,
            },
            ..FilterSpec::default()
        };
        assert_eq!(spec, spec.clone());
        assert_ne!(spec, FilterSpec::default());
        assert_ne!(
            FilterSpec {
                price_max: Some(100.0),
                ..FilterSpec::default()
            },
            FilterSpec::default()
        );
    }

    #[test]
    fn cleared_keeps_stock_min() {
        let spec = FilterSpec {
            kosher: true,
            stock_min: 2,
            ..FilterSpec::default()
        };
        assert!(!spec.is_unrestricted());
        assert_eq!(spec.cleared(), FilterSpec::with_stock_min(2));
        assert!(spec.cleared().is_unrestricted());
    }

    #[test]
    fn serde_uses_camel_case_and_defaults() {
        let spec: FilterSpec = serde_json::from_str(r#"{"priceMax":100,"stockMin":3}"#).unwrap();
        assert_eq!(spec.price_max, Some(100.0));
        assert_eq!(spec.stock_min, 3);
        assert_eq!(spec.drink, PercentageRange::default());
        let json = serde_json::to_string(&FilterSpec::default()).unwrap();
        assert!(json.contains("\"subCategories\":[]"));
        assert!(!json.contains("priceMax"));
    }
}
