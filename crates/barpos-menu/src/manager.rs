#![forbid(unsafe_code)]

//! Per-menu filter state and the partition cache.
//!
//! # Invariants
//!
//! 1. The cache is keyed by filters alone: while the filters compare equal,
//!    [`MenuManager::get_menu`] returns views over the identical `Rc`.
//! 2. Stock changes do not invalidate the cache. Call
//!    [`MenuManager::invalidate`] after bulk stock edits.
//!
//! # Failure Modes
//!
//! - The catalog is immutable; an item that disappears from stock is hidden
//!   only after the next rebuild.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use barpos_core::{Item, MainCategory, Quantity};
use barpos_runtime::Shared;
use barpos_stock::Stock;

use crate::filter::FilterSpec;
use crate::view::{MenuView, Partition};

/// The persisted part of a [`MenuManager`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MenuState {
    pub main_category: Option<MainCategory>,
    pub filters: FilterSpec,
}

/// Filter settings for one menu plus a memoized partition.
pub struct MenuManager {
    catalog: Rc<[Item]>,
    stock: Shared<Stock>,
    filters: FilterSpec,
    main_category: Option<MainCategory>,
    cached: Option<Rc<Partition>>,
    rebuilds: usize,
}

impl fmt::Debug for MenuManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuManager")
            .field("catalog_len", &self.catalog.len())
            .field("filters", &self.filters)
            .field("main_category", &self.main_category)
            .field("cached", &self.cached.is_some())
            .field("rebuilds", &self.rebuilds)
            .finish()
    }
}

impl MenuManager {
    /// An unfiltered manager with the given availability buffer.
    #[must_use]
    pub fn new(catalog: Rc<[Item]>, stock: Shared<Stock>, stock_min: Quantity) -> Self {
        Self::from_state(
            catalog,
            stock,
            MenuState {
                main_category: None,
                filters: FilterSpec::with_stock_min(stock_min),
            },
        )
    }

    /// Rebuild a manager from persisted state.
    #[must_use]
    pub fn from_state(catalog: Rc<[Item]>, stock: Shared<Stock>, state: MenuState) -> Self {
        Self {
            catalog,
            stock,
            filters: state.filters,
            main_category: state.main_category,
            cached: None,
            rebuilds: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> MenuState {
        MenuState {
            main_category: self.main_category,
            filters: self.filters.clone(),
        }
    }

    /// Replace filters and focus with persisted state and drop the cache.
    pub fn restore_state(&mut self, state: MenuState) {
        self.filters = state.filters;
        self.main_category = state.main_category;
        self.cached = None;
    }

    #[must_use]
    pub fn catalog(&self) -> &Rc<[Item]> {
        &self.catalog
    }

    #[must_use]
    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    /// Replace the filters without recording history.
    pub fn set_filters(&mut self, filters: FilterSpec) {
        self.filters = filters;
    }

    /// Reset every filter except the availability buffer, without history.
    pub fn clear_filter(&mut self) {
        self.filters = self.filters.cleared();
    }

    #[must_use]
    pub fn main_category(&self) -> Option<MainCategory> {
        self.main_category
    }

    /// Focus the views returned by [`get_menu`](Self::get_menu) on one
    /// category, or on all of them with `None`.
    pub fn set_main_category(&mut self, category: Option<MainCategory>) {
        self.main_category = category;
    }

    /// How many partitions this manager has built.
    #[must_use]
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }

    /// Drop the cached partition so the next view rescans the catalog.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// A view of the catalog under the current filters, focused on the
    /// current main category.
    pub fn get_menu(&mut self) -> MenuView {
        let category = self.main_category;
        MenuView::new(self.partition()).restricted_in(.., category)
    }

    /// An unfocused view of the catalog under `filters`.
    ///
    /// Reuses the cached partition when `filters` equals the cache key;
    /// otherwise builds one and caches it.
    pub fn view_for(&mut self, filters: &FilterSpec) -> MenuView {
        MenuView::new(self.partition_for(filters))
    }

    /// The partition for the current filters.
    pub fn partition(&mut self) -> Rc<Partition> {
        if let Some(cached) = self.cached_for(&self.filters) {
            return cached;
        }
        let filters = self.filters.clone();
        self.rebuild(filters)
    }

    fn partition_for(&mut self, filters: &FilterSpec) -> Rc<Partition> {
        match self.cached_for(filters) {
            Some(cached) => cached,
            None => self.rebuild(filters.clone()),
        }
    }

    /// The cached partition if it was built with `filters`.
    pub(crate) fn cached_for(&self, filters: &FilterSpec) -> Option<Rc<Partition>> {
        self.cached
            .as_ref()
            .filter(|p| p.filters() == filters)
            .map(Rc::clone)
    }

    /// Swap in a previously built partition. Ignored unless it matches the
    /// current filters.
    pub(crate) fn adopt(&mut self, partition: Rc<Partition>) {
        if *partition.filters() == self.filters {
            self.cached = Some(partition);
        }
    }

    pub(crate) fn replace_filters(&mut self, filters: FilterSpec) -> FilterSpec {
        std::mem::replace(&mut self.filters, filters)
    }

    fn rebuild(&mut self, filters: FilterSpec) -> Rc<Partition> {
        let partition = Rc::new(Partition::build(
            Rc::clone(&self.catalog),
            &self.stock.borrow(),
            filters,
        ));
        self.rebuilds += 1;
        debug!(
            catalog = self.catalog.len(),
            accepted = partition.total_len(),
            rebuilds = self.rebuilds,
            "rebuilt menu partition"
        );
        self.cached = Some(Rc::clone(&partition));
        partition
    }
}
