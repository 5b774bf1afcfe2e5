//! Pagination types
//!
//! Page numbers are 1-indexed. Out-of-range query values are rejected
//! rather than clamped so clients learn about the bad parameter.

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Maximum items per page
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default items per page for admin and account listings
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Default items per page for the public catalog
pub const CATALOG_PAGE_SIZE: u32 = 12;

/// Validated pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (1-indexed)
    pub page: u32,
    /// Items per page (1..=100)
    pub page_size: u32,
}

impl Pagination {
    /// Build a pagination window from raw query values.
    ///
    /// Missing values fall back to page 1 and `default_page_size`.
    pub fn from_query(
        page: Option<i64>,
        page_size: Option<i64>,
        default_page_size: u32,
    ) -> Result<Self, ValidationError> {
        let page = page.unwrap_or(1);
        if page < 1 || page > u32::MAX as i64 {
            return Err(ValidationError::OutOfRange {
                field: "page",
                min: 1,
                max: None,
            });
        }

        let page_size = page_size.unwrap_or(default_page_size as i64);
        if !(1..=MAX_PAGE_SIZE as i64).contains(&page_size) {
            return Err(ValidationError::OutOfRange {
                field: "page_size",
                min: 1,
                max: Some(MAX_PAGE_SIZE as i64),
            });
        }

        Ok(Self {
            page: page as u32,
            page_size: page_size as u32,
        })
    }

    /// SQL OFFSET value.
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }

    /// SQL LIMIT value.
    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }

    /// Wrap a page of items with the totals the catalog clients expect.
    pub fn paginate<T>(&self, items: Vec<T>, total: i64) -> Paginated<T> {
        Paginated {
            items,
            total,
            page: self.page,
            page_size: self.page_size,
            pages: total_pages(total, self.page_size),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Number of pages needed for `total` items; an empty result still has one page.
pub fn total_pages(total: i64, page_size: u32) -> i64 {
    if total <= 0 {
        1
    } else {
        (total + page_size as i64 - 1) / page_size as i64
    }
}

/// Paginated response with page arithmetic (catalog listings)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub pages: i64,
}

impl<T> Paginated<T> {
    /// Convert the items while keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            pages: self.pages,
        }
    }
}

/// Items plus total count (order and ticket listings)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Listing<T> {
    /// A listing whose total is simply the number of items.
    pub fn complete(items: Vec<T>) -> Self {
        let total = items.len() as i64;
        Self { items, total }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        Listing {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

/// Query parameters for pagination
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PaginationParams {
    pub fn resolve(&self, default_page_size: u32) -> Result<Pagination, ValidationError> {
        Pagination::from_query(self.page, self.page_size, default_page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_calculation() {
        let p = Pagination::from_query(Some(1), Some(10), DEFAULT_PAGE_SIZE).unwrap();
        assert_eq!(p.offset(), 0);

        let p = Pagination::from_query(Some(2), Some(10), DEFAULT_PAGE_SIZE).unwrap();
        assert_eq!(p.offset(), 10);

        let p = Pagination::from_query(Some(3), Some(25), DEFAULT_PAGE_SIZE).unwrap();
        assert_eq!(p.offset(), 50);
        assert_eq!(p.limit(), 25);
    }

    #[test]
    fn defaults_apply() {
        let p = Pagination::from_query(None, None, CATALOG_PAGE_SIZE).unwrap();
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 12);
    }

    #[test]
    fn rejects_page_below_one() {
        let err = Pagination::from_query(Some(0), None, DEFAULT_PAGE_SIZE).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "page", .. }));
    }

    #[test]
    fn rejects_page_size_outside_bounds() {
        for size in [0, -3, 101, 999] {
            let err = Pagination::from_query(None, Some(size), DEFAULT_PAGE_SIZE).unwrap_err();
            assert!(matches!(
                err,
                ValidationError::OutOfRange {
                    field: "page_size",
                    ..
                }
            ));
        }
        assert!(Pagination::from_query(None, Some(100), DEFAULT_PAGE_SIZE).is_ok());
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(100, 10), 10);
    }

    #[test]
    fn paginate_fills_metadata() {
        let p = Pagination::from_query(Some(2), Some(12), CATALOG_PAGE_SIZE).unwrap();
        let page = p.paginate(vec!["a", "b"], 14);
        assert_eq!(page.page, 2);
        assert_eq!(page.page_size, 12);
        assert_eq!(page.pages, 2);
        assert_eq!(page.total, 14);
    }
}
