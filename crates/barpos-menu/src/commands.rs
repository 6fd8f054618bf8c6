#![forbid(unsafe_code)]

//! Undoable filter and focus changes on a shared [`MenuManager`].
//!
//! A filter modifier receives a scratch copy of the current filters and says
//! explicitly what it did with it:
//!
//! ```
//! use barpos_menu::FilterEdit;
//! # use barpos_menu::FilterSpec;
//! let in_place = |f: &mut FilterSpec| {
//!     f.kosher = true;
//!     FilterEdit::MutatedInPlace
//! };
//! let replace = |f: &mut FilterSpec| FilterEdit::Replace(f.cleared());
//! # let _ = (in_place, replace);
//! ```
//!
//! A modification that leaves the filters equal fails with
//! [`CommandError::NoChange`] and is not recorded.

use std::fmt;
use std::rc::Rc;

use barpos_core::MainCategory;
use barpos_runtime::{Command, CommandError, CommandResult, Shared};

use crate::filter::FilterSpec;
use crate::manager::MenuManager;
use crate::view::Partition;

/// What a filter modifier did with the filters it was handed.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterEdit {
    /// Use this spec instead.
    Replace(FilterSpec),
    /// The filters passed in were edited in place; use them.
    MutatedInPlace,
}

type Modifier = Rc<dyn Fn(&mut FilterSpec) -> FilterEdit>;

/// Command factories on a shared menu handle.
pub trait MenuCommands {
    /// Change the filters through `modifier`.
    ///
    /// With `preserve_view`, the partition of the replaced filters is kept in
    /// the history entry, so undo and redo swap it back in without a rescan.
    fn modify_filter_command(
        &self,
        modifier: impl Fn(&mut FilterSpec) -> FilterEdit + 'static,
        preserve_view: bool,
    ) -> ModifyFilter;

    /// Reset every filter except the availability buffer.
    fn clear_filter_command(&self) -> ModifyFilter;

    /// Focus the menu on one main category, or all with `None`.
    fn set_main_category_command(&self, category: Option<MainCategory>) -> SetMainCategory;
}

impl MenuCommands for Shared<MenuManager> {
    fn modify_filter_command(
        &self,
        modifier: impl Fn(&mut FilterSpec) -> FilterEdit + 'static,
        preserve_view: bool,
    ) -> ModifyFilter {
        ModifyFilter {
            menu: self.clone(),
            modifier: Rc::new(modifier),
            preserve_view,
            description: "Change filter",
        }
    }

    fn clear_filter_command(&self) -> ModifyFilter {
        ModifyFilter {
            menu: self.clone(),
            modifier: Rc::new(|f: &mut FilterSpec| FilterEdit::Replace(f.cleared())),
            preserve_view: false,
            description: "Clear filter",
        }
    }

    fn set_main_category_command(&self, category: Option<MainCategory>) -> SetMainCategory {
        SetMainCategory {
            menu: self.clone(),
            category,
        }
    }
}

// ============================================================================
// ModifyFilter
// ============================================================================

/// Filters before a swap, and optionally the partition built for them.
#[derive(Debug, Clone)]
pub struct FilterSnapshot {
    pub filters: FilterSpec,
    pub partition: Option<Rc<Partition>>,
}

/// See [`MenuCommands::modify_filter_command`].
#[derive(Clone)]
pub struct ModifyFilter {
    menu: Shared<MenuManager>,
    modifier: Modifier,
    preserve_view: bool,
    description: &'static str,
}

impl fmt::Debug for ModifyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifyFilter")
            .field("description", &self.description)
            .field("preserve_view", &self.preserve_view)
            .finish_non_exhaustive()
    }
}

impl ModifyFilter {
    /// Install `snapshot` and return what it replaced.
    fn swap(&self, snapshot: FilterSnapshot) -> FilterSnapshot {
        let mut menu = self.menu.borrow_mut();
        let current_view = if self.preserve_view {
            let current = menu.filters().clone();
            menu.cached_for(&current)
        } else {
            None
        };
        let previous = menu.replace_filters(snapshot.filters);
        if let Some(partition) = snapshot.partition {
            menu.adopt(partition);
        }
        FilterSnapshot {
            filters: previous,
            partition: current_view,
        }
    }
}

impl Command for ModifyFilter {
    type Output = FilterSnapshot;
    type Undone = FilterSnapshot;

    fn perform(&self) -> CommandResult<FilterSnapshot> {
        let mut menu = self.menu.borrow_mut();
        let mut next = menu.filters().clone();
        if let FilterEdit::Replace(spec) = (self.modifier)(&mut next) {
            next = spec;
        }
        if next == *menu.filters() {
            return Err(CommandError::NoChange("filters unchanged".into()));
        }
        let partition = self.preserve_view.then(|| menu.partition());
        let filters = menu.replace_filters(next);
        Ok(FilterSnapshot { filters, partition })
    }

    fn undo(&self, performed: FilterSnapshot) -> CommandResult<FilterSnapshot> {
        Ok(self.swap(performed))
    }

    fn redo(&self, undone: FilterSnapshot) -> CommandResult<FilterSnapshot> {
        Ok(self.swap(undone))
    }

    fn description(&self) -> &str {
        self.description
    }
}

// ============================================================================
// SetMainCategory
// ============================================================================

/// See [`MenuCommands::set_main_category_command`]. Output: the previous
/// focus.
#[derive(Debug, Clone)]
pub struct SetMainCategory {
    menu: Shared<MenuManager>,
    category: Option<MainCategory>,
}

impl Command for SetMainCategory {
    type Output = Option<MainCategory>;
    type Undone = ();

    fn perform(&self) -> CommandResult<Option<MainCategory>> {
        let mut menu = self.menu.borrow_mut();
        let previous = menu.main_category();
        if previous == self.category {
            return Err(CommandError::NoChange("category already selected".into()));
        }
        menu.set_main_category(self.category);
        Ok(previous)
    }

    fn undo(&self, previous: Option<MainCategory>) -> CommandResult<()> {
        self.menu.borrow_mut().set_main_category(previous);
        Ok(())
    }

    fn description(&self) -> &str {
        "Select category"
    }
}
