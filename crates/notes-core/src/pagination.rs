//! Page arithmetic for list views.

use serde::Serialize;

/// Requested page could not be served.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("page number is not an integer: {0}")]
    NotAnInteger(String),

    #[error("page {0} is out of range")]
    OutOfRange(u32),
}

/// Splits a counted collection into fixed-size pages.
///
/// Page numbers are 1-based. The first page always exists, even when the
/// collection is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: u32,
}

impl Paginator {
    /// A paginator with `per_page` items per page (at least one).
    pub fn new(per_page: u32) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn num_pages(&self, count: u64) -> u32 {
        let pages = count.div_ceil(u64::from(self.per_page)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Parse a `?page=` value. Absent means the first page; `last` means the
    /// final one.
    pub fn validate_number(&self, requested: Option<&str>, count: u64) -> Result<u32, PageError> {
        let num_pages = self.num_pages(count);
        let number = match requested.map(str::trim) {
            None | Some("") => 1,
            Some("last") => num_pages,
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| PageError::NotAnInteger(raw.to_string()))?,
        };

        if number == 0 || number > num_pages {
            return Err(PageError::OutOfRange(number));
        }
        Ok(number)
    }

    /// Number of items preceding page `number`.
    pub fn offset(&self, number: u32) -> u64 {
        u64::from(number.saturating_sub(1)) * u64::from(self.per_page)
    }

    /// Wrap already-fetched items of page `number`.
    pub fn page<T>(&self, object_list: Vec<T>, number: u32, count: u64) -> Page<T> {
        let num_pages = self.num_pages(count);
        Page {
            object_list,
            number,
            num_pages,
            count,
            per_page: self.per_page,
            has_next: number < num_pages,
            has_previous: number > 1,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    pub number: u32,
    pub num_pages: u32,
    pub count: u64,
    pub per_page: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }

    /// Whether there is more than one page at all.
    pub fn is_paginated(&self) -> bool {
        self.num_pages > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            object_list: self.object_list.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            per_page: self.per_page,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_pages() {
        let p = Paginator::new(10);
        assert_eq!(p.num_pages(0), 1);
        assert_eq!(p.num_pages(10), 1);
        assert_eq!(p.num_pages(11), 2);
        assert_eq!(p.num_pages(30), 3);
    }

    #[test]
    fn test_zero_per_page_is_clamped() {
        assert_eq!(Paginator::new(0).per_page(), 1);
    }

    #[test]
    fn test_validate_number() {
        let p = Paginator::new(10);
        assert_eq!(p.validate_number(None, 11), Ok(1));
        assert_eq!(p.validate_number(Some("2"), 11), Ok(2));
        assert_eq!(p.validate_number(Some("last"), 11), Ok(2));
        assert_eq!(p.validate_number(Some("3"), 11), Err(PageError::OutOfRange(3)));
        assert_eq!(p.validate_number(Some("0"), 11), Err(PageError::OutOfRange(0)));
        assert_eq!(
            p.validate_number(Some("abc"), 11),
            Err(PageError::NotAnInteger("abc".into()))
        );
    }

    #[test]
    fn test_first_page_of_empty_collection() {
        let p = Paginator::new(10);
        assert_eq!(p.validate_number(Some("1"), 0), Ok(1));
        let page: Page<u8> = p.page(vec![], 1, 0);
        assert!(page.is_empty());
        assert!(!page.has_next);
        assert!(!page.is_paginated());
    }

    #[test]
    fn test_offset() {
        let p = Paginator::new(10);
        assert_eq!(p.offset(1), 0);
        assert_eq!(p.offset(3), 20);
    }

    #[test]
    fn test_page_flags() {
        let p = Paginator::new(2);
        let page = p.page(vec![3, 4], 2, 5);
        assert_eq!(page.num_pages, 3);
        assert!(page.has_next);
        assert!(page.has_previous);
        assert!(page.is_paginated());
        let doubled = page.map(|x| x * 2);
        assert_eq!(doubled.object_list, vec![6, 8]);
        assert_eq!(doubled.number, 2);
    }
}
