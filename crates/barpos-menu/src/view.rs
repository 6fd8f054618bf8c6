#![forbid(unsafe_code)]

//! Catalog partitions and windowed views over them.
//!
//! # Invariants
//!
//! 1. A [`Partition`] is immutable once built; every [`MenuView`] derived
//!    from it shares the same `Rc`.
//! 2. `restricted*` never widens: the child's `[begin, end)` lies inside the
//!    parent's window, measured in the parent's category sequence.
//! 3. With no category set, buckets are walked in [`MainCategory::ALL`]
//!    order, so an item that belongs to two categories appears twice.
//!
//! # Failure Modes
//!
//! - Out-of-window indexing returns `None`.
//! - `end` is unbounded (`usize::MAX`) until a restriction caps it; all
//!   offset arithmetic saturates.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Bound, RangeBounds};
use std::rc::Rc;

use barpos_core::{Item, MainCategory, main_categories_of};
use barpos_stock::Stock;

use crate::filter::FilterSpec;

// ============================================================================
// Partition
// ============================================================================

/// The accepted catalog items, bucketed by main category.
pub struct Partition {
    catalog: Rc<[Item]>,
    filters: FilterSpec,
    buckets: [Vec<usize>; MainCategory::COUNT],
}

impl fmt::Debug for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sizes: Vec<usize> = self.buckets.iter().map(Vec::len).collect();
        f.debug_struct("Partition")
            .field("catalog_len", &self.catalog.len())
            .field("filters", &self.filters)
            .field("bucket_sizes", &sizes)
            .finish()
    }
}

impl Partition {
    /// Scan `catalog` once, keeping what `filters` accepts under `stock`.
    #[must_use]
    pub fn build(catalog: Rc<[Item]>, stock: &Stock, filters: FilterSpec) -> Self {
        let mut buckets: [Vec<usize>; MainCategory::COUNT] = Default::default();
        for (ix, item) in catalog.iter().enumerate() {
            if !filters.accepts(item, stock) {
                continue;
            }
            for category in main_categories_of(item.category()) {
                buckets[category.index()].push(ix);
            }
        }
        Self {
            catalog,
            filters,
            buckets,
        }
    }

    /// The filters this partition was built with.
    #[must_use]
    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    /// Number of entries in one bucket.
    #[must_use]
    pub fn bucket_len(&self, category: MainCategory) -> usize {
        self.buckets[category.index()].len()
    }

    /// Number of entries across all buckets.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    fn sequence_len(&self, category: Option<MainCategory>) -> usize {
        match category {
            Some(category) => self.bucket_len(category),
            None => self.total_len(),
        }
    }

    fn sequence(&self, category: Option<MainCategory>) -> &[Vec<usize>] {
        match category {
            Some(category) => std::slice::from_ref(&self.buckets[category.index()]),
            None => &self.buckets,
        }
    }
}

// ============================================================================
// MenuView
// ============================================================================

/// A window onto a shared [`Partition`].
#[derive(Clone)]
pub struct MenuView {
    partition: Rc<Partition>,
    begin: usize,
    end: usize,
    category: Option<MainCategory>,
}

impl fmt::Debug for MenuView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end: &dyn fmt::Debug = if self.end == usize::MAX {
            &"unbounded"
        } else {
            &self.end
        };
        f.debug_struct("MenuView")
            .field("begin", &self.begin)
            .field("end", end)
            .field("category", &self.category)
            .field("len", &self.len())
            .finish()
    }
}

impl MenuView {
    /// The unrestricted view of `partition`.
    #[must_use]
    pub fn new(partition: Rc<Partition>) -> Self {
        Self {
            partition,
            begin: 0,
            end: usize::MAX,
            category: None,
        }
    }

    /// The shared partition behind this view.
    #[must_use]
    pub fn partition(&self) -> &Rc<Partition> {
        &self.partition
    }

    #[must_use]
    pub fn filters(&self) -> &FilterSpec {
        &self.partition.filters
    }

    /// The category this view is fixed to, if any.
    #[must_use]
    pub fn category(&self) -> Option<MainCategory> {
        self.category
    }

    /// Narrow the window, keeping the current category.
    ///
    /// `range` is relative to this view's window.
    #[must_use]
    pub fn restricted(&self, range: impl RangeBounds<usize>) -> Self {
        self.restricted_in(range, self.category)
    }

    /// Narrow the window and switch the category sequence it indexes.
    ///
    /// The bounds are still taken relative to this view's window; only the
    /// sequence they index changes.
    #[must_use]
    pub fn restricted_in(
        &self,
        range: impl RangeBounds<usize>,
        category: Option<MainCategory>,
    ) -> Self {
        let rel_begin = match range.start_bound() {
            Bound::Included(&b) => b,
            Bound::Excluded(&b) => b.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let rel_end = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => usize::MAX,
        };
        let end = self.end.min(self.begin.saturating_add(rel_end));
        let begin = end.min(self.begin.saturating_add(rel_begin));
        Self {
            partition: Rc::clone(&self.partition),
            begin,
            end,
            category,
        }
    }

    /// Number of items visible through the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.partition
            .sequence_len(self.category)
            .min(self.end)
            .saturating_sub(self.begin)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The item at `ix`, relative to the window.
    #[must_use]
    pub fn at(&self, ix: usize) -> Option<&Item> {
        let mut ix = self.begin.checked_add(ix)?;
        if ix >= self.end {
            return None;
        }
        for bucket in self.partition.sequence(self.category) {
            if let Some(&pos) = bucket.get(ix) {
                return self.partition.catalog.get(pos);
            }
            ix -= bucket.len();
        }
        None
    }

    /// Items in window order.
    pub fn iter(&self) -> impl Iterator<Item = &Item> + '_ {
        let catalog = &self.partition.catalog;
        self.partition
            .sequence(self.category)
            .iter()
            .flatten()
            .skip(self.begin)
            .take(self.len())
            .filter_map(move |&pos| catalog.get(pos))
    }

    /// How many visible items carry each sub-category.
    #[must_use]
    pub fn sub_categories(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for item in self.iter() {
            for sub in item.sub_categories() {
                *counts.entry(sub).or_insert(0) += 1;
            }
        }
        counts
    }
}

impl<'a> IntoIterator for &'a MenuView {
    type Item = &'a Item;
    type IntoIter = Box<dyn Iterator<Item = &'a Item> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
