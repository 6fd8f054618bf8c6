#![forbid(unsafe_code)]

//! Fixed-size pages over a menu view.

use std::ops::Range;

/// Current page of a paged listing.
///
/// The pager does not know the listing; callers pass its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    ix: usize,
    size: usize,
}

impl Pager {
    /// A pager on page 0. A zero size is treated as 1.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            ix: 0,
            size: size.max(1),
        }
    }

    #[must_use]
    pub fn ix(&self) -> usize {
        self.ix
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Index range of the current page.
    #[must_use]
    pub fn window(&self) -> Range<usize> {
        let begin = self.ix.saturating_mul(self.size);
        begin..begin.saturating_add(self.size)
    }

    /// Last valid page for a listing of `len` items; 0 when empty.
    #[must_use]
    pub fn max_page_ix(&self, len: usize) -> usize {
        len.div_ceil(self.size).saturating_sub(1)
    }

    #[must_use]
    pub fn page_available(&self, ix: usize, len: usize) -> bool {
        ix <= self.max_page_ix(len)
    }

    /// Move to `ix` if it exists. Returns whether the page changed.
    pub fn goto(&mut self, ix: usize, len: usize) -> bool {
        if self.page_available(ix, len) && ix != self.ix {
            self.ix = ix;
            true
        } else {
            false
        }
    }

    pub fn next(&mut self, len: usize) -> bool {
        self.goto(self.ix.saturating_add(1), len)
    }

    pub fn prev(&mut self, len: usize) -> bool {
        match self.ix.checked_sub(1) {
            Some(ix) => self.goto(ix, len),
            None => false,
        }
    }

    /// Back to page 0. Returns the page left.
    pub fn reset(&mut self) -> usize {
        std::mem::take(&mut self.ix)
    }
}
