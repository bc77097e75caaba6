//! Paginated listing request and response shapes.

use serde::{Deserialize, Serialize};

/// Page size applied when a caller asks for zero or fewer items.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A request for one page of a status partition.
///
/// `last_id` is an exclusive upper-bound cursor; the default id (zero)
/// means "no cursor".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery<Id> {
    pub status: i32,
    pub last_id: Id,
    pub page_size: u32,
    pub page: u32,
}

impl<Id: Default> ListQuery<Id> {
    pub fn new(status: i32, page_size: u32, page: u32) -> Self {
        Self {
            status,
            last_id: Id::default(),
            page_size,
            page,
        }
    }

    #[must_use]
    pub fn after(mut self, last_id: Id) -> Self {
        self.last_id = last_id;
        self
    }

    /// Offset of the first id of the requested page, for 1-based pages.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) as usize * self.page_size as usize
    }
}

/// One page of hydrated records plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub total_page: u64,
    pub cur_page: u32,
}

impl<T> Page<T> {
    /// Assemble a page. An empty partition always reports page 1.
    pub fn new(items: Vec<T>, total: u64, page_size: u32, requested_page: u32) -> Self {
        if total == 0 {
            return Self {
                items,
                total,
                total_page: 0,
                cur_page: 1,
            };
        }
        Self {
            items,
            total,
            total_page: total.div_ceil(u64::from(page_size.max(1))),
            cur_page: requested_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_total_page_rounds_up() {
        let page: Page<i32> = Page::new(vec![1, 2, 3], 5, 3, 1);
        assert_eq!(page.total_page, 2);
        assert_eq!(page.cur_page, 1);
    }

    #[test]
    fn test_empty_total_resets_page() {
        let page: Page<i32> = Page::new(vec![], 0, 10, 7);
        assert_eq!(page.cur_page, 1);
        assert_eq!(page.total_page, 0);
    }

    #[test]
    fn test_offset() {
        let query: ListQuery<i32> = ListQuery::new(1, 3, 2);
        assert_eq!(query.offset(), 3);
        let first: ListQuery<i32> = ListQuery::new(1, 3, 1);
        assert_eq!(first.offset(), 0);
    }

    proptest! {
        #[test]
        fn prop_total_page_covers_total(total in 1u64..10_000, page_size in 1u32..500) {
            let page: Page<()> = Page::new(vec![], total, page_size, 1);
            let size = u64::from(page_size);
            prop_assert!(page.total_page * size >= total);
            prop_assert!((page.total_page - 1) * size < total);
        }
    }
}
