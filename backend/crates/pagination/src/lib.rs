//! Page windows and page envelopes for feed endpoints.
//!
//! A [`PageWindow`] names which slice of a feed a request wants. It is either
//! a bounded page (`page N of posts`) or the full-range sentinel used by feeds
//! that are never paginated. Storage adapters translate a window into
//! [`SliceBounds`] using their own [`PageSize`]; the request layer never
//! decides how many items a page holds.
//!
//! # Examples
//! ```
//! use pagination::{PageSize, PageWindow};
//!
//! let window = PageWindow::from_raw(Some(-3));
//! assert_eq!(window.page_number(), Some(3));
//! assert_eq!(window.displayed_page(), Some(4));
//!
//! let size = PageSize::new(10).expect("non-zero page size");
//! let bounds = window.slice(size);
//! assert_eq!(bounds.offset(), 20);
//! assert_eq!(bounds.limit(), Some(10));
//! ```

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page number used when the caller did not supply one.
pub const DEFAULT_PAGE: u64 = 1;

/// Page size used by adapters that are not configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Errors raised while constructing pagination values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageSizeError {
    /// A page must hold at least one item.
    #[error("page size must be greater than zero")]
    Zero,
}

/// Number of items in one bounded page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct PageSize(NonZeroUsize);

impl PageSize {
    /// Validate and construct a page size.
    ///
    /// # Errors
    /// Returns [`PageSizeError::Zero`] when `size` is zero.
    pub fn new(size: usize) -> Result<Self, PageSizeError> {
        NonZeroUsize::new(size).map(Self).ok_or(PageSizeError::Zero)
    }

    /// Number of items per page.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(NonZeroUsize::MIN.saturating_add(DEFAULT_PAGE_SIZE - 1))
    }
}

impl TryFrom<usize> for PageSize {
    type Error = PageSizeError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageSize> for usize {
    fn from(value: PageSize) -> Self {
        value.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum WindowKind {
    Bounded { page: u64 },
    FullRange,
}

/// Which slice of a feed a request wants.
///
/// ## Invariants
/// - A bounded window's page number is never negative: raw input is
///   normalised with its absolute value and a missing page becomes
///   [`DEFAULT_PAGE`].
/// - The window is immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageWindow(WindowKind);

impl PageWindow {
    /// Build a bounded window from a raw, possibly missing or negative, page
    /// parameter.
    ///
    /// # Examples
    /// ```
    /// use pagination::PageWindow;
    ///
    /// assert_eq!(PageWindow::from_raw(None).page_number(), Some(1));
    /// assert_eq!(PageWindow::from_raw(Some(-2)).page_number(), Some(2));
    /// assert_eq!(PageWindow::from_raw(Some(i64::MIN)).page_number(), Some(i64::MIN.unsigned_abs()));
    /// ```
    #[must_use]
    pub fn from_raw(raw: Option<i64>) -> Self {
        Self::bounded(raw.map_or(DEFAULT_PAGE, i64::unsigned_abs))
    }

    /// Build a bounded window for an already normalised page number.
    #[must_use]
    pub const fn bounded(page: u64) -> Self {
        Self(WindowKind::Bounded { page })
    }

    /// Window covering an entire feed; used for feeds that are never paged.
    #[must_use]
    pub const fn full_range() -> Self {
        Self(WindowKind::FullRange)
    }

    /// Whether this is the full-range sentinel.
    #[must_use]
    pub const fn is_full_range(&self) -> bool {
        matches!(self.0, WindowKind::FullRange)
    }

    /// Normalised page number, or `None` for the full-range sentinel.
    #[must_use]
    pub const fn page_number(&self) -> Option<u64> {
        match self.0 {
            WindowKind::Bounded { page } => Some(page),
            WindowKind::FullRange => None,
        }
    }

    /// Page number shown to clients as the "load more" target.
    ///
    /// This is always one greater than [`PageWindow::page_number`]; views
    /// link to it directly.
    #[must_use]
    pub const fn displayed_page(&self) -> Option<u64> {
        match self.0 {
            WindowKind::Bounded { page } => Some(page.saturating_add(1)),
            WindowKind::FullRange => None,
        }
    }

    /// Translate the window into item offsets for a given page size.
    ///
    /// Page `N` covers items `[(N - 1) * size, N * size)`. Page zero covers
    /// the same items as page one.
    #[must_use]
    pub fn slice(&self, size: PageSize) -> SliceBounds {
        match self.0 {
            WindowKind::FullRange => SliceBounds {
                offset: 0,
                limit: None,
            },
            WindowKind::Bounded { page } => {
                let index = usize::try_from(page.saturating_sub(1)).unwrap_or(usize::MAX);
                SliceBounds {
                    offset: index.saturating_mul(size.get()),
                    limit: Some(size.get()),
                }
            }
        }
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::bounded(DEFAULT_PAGE)
    }
}

/// Concrete item range derived from a [`PageWindow`] and a [`PageSize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceBounds {
    offset: usize,
    limit: Option<usize>,
}

impl SliceBounds {
    /// Index of the first item in the slice.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Maximum number of items in the slice; `None` means unbounded.
    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Exclusive end index, saturating at `usize::MAX` for unbounded slices.
    #[must_use]
    pub const fn end(&self) -> usize {
        match self.limit {
            Some(limit) => self.offset.saturating_add(limit),
            None => usize::MAX,
        }
    }

    /// Copy the items covered by this slice out of an ordered feed.
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageSize, PageWindow};
    ///
    /// let feed = [1, 2, 3, 4, 5];
    /// let size = PageSize::new(2).expect("page size");
    /// assert_eq!(PageWindow::bounded(2).slice(size).take(&feed), vec![3, 4]);
    /// assert_eq!(PageWindow::bounded(9).slice(size).take(&feed), Vec::<i32>::new());
    /// ```
    #[must_use]
    pub fn take<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let iter = items.iter().skip(self.offset);
        match self.limit {
            Some(limit) => iter.take(limit).cloned().collect(),
            None => iter.cloned().collect(),
        }
    }

    /// Whether a feed of `total` items continues past this slice.
    #[must_use]
    pub const fn has_more(&self, total: usize) -> bool {
        total > self.end()
    }
}

/// A page of items plus the flags a view needs to offer "load more".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items in feed order.
    pub items: Vec<T>,
    /// Whether further items exist after this page.
    pub has_more: bool,
    /// Page number a "load more" link should request, when the window is
    /// bounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<u64>,
}

impl<T: Clone> Page<T> {
    /// Cut a page out of a complete ordered feed.
    ///
    /// # Examples
    /// ```
    /// use pagination::{Page, PageSize, PageWindow};
    ///
    /// let size = PageSize::new(2).expect("page size");
    /// let page = Page::from_feed(&["a", "b", "c"], PageWindow::bounded(1), size);
    /// assert_eq!(page.items, vec!["a", "b"]);
    /// assert!(page.has_more);
    /// assert_eq!(page.next_page, Some(2));
    /// ```
    #[must_use]
    pub fn from_feed(feed: &[T], window: PageWindow, size: PageSize) -> Self {
        let bounds = window.slice(size);
        Self {
            items: bounds.take(feed),
            has_more: bounds.has_more(feed.len()),
            next_page: window.displayed_page(),
        }
    }
}

impl<T> Page<T> {
    /// Convert every item, keeping the flags.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            has_more: self.has_more,
            next_page: self.next_page,
        }
    }
}
