//! Pagination utilities for store listings
//!
//! Provides a simple `Pagination` struct and helpers to normalize inputs.

/// Pagination parameters
#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    /// Clamp to sane defaults and return `(skip, take)`
    pub fn normalize(self) -> (usize, usize) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, 100);
        ((page as usize - 1) * per_page as usize, per_page as usize)
    }

    /// Cut one page out of an ordered sequence.
    pub fn apply<T, I: IntoIterator<Item = T>>(self, items: I) -> Vec<T> {
        let (skip, take) = self.normalize();
        items.into_iter().skip(skip).take(take).collect()
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 20 } }
}
