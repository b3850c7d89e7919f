use serde::Serialize;

pub(crate) const DEFAULT_PAGE_SIZE: i64 = 10;
pub(crate) const MAX_PAGE_SIZE: i64 = 100;

pub(crate) const fn default_limit() -> i64 {
    100
}

/// Page numbers below 1 become 1; sizes are clamped into `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageParams {
    pub(crate) page: i64,
    pub(crate) page_size: i64,
}

impl PageParams {
    pub(crate) fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub(crate) fn offset(self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub(crate) fn meta(self, total: i64) -> PaginationMeta {
        PaginationMeta {
            total,
            page: self.page,
            page_size: self.page_size,
            total_pages: (total + self.page_size - 1) / self.page_size,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PaginationMeta {
    pub(crate) total: i64,
    pub(crate) page: i64,
    pub(crate) page_size: i64,
    pub(crate) total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(PageParams::new(None, None), PageParams { page: 1, page_size: 10 });
        assert_eq!(PageParams::new(Some(0), Some(500)), PageParams { page: 1, page_size: 100 });
        assert_eq!(PageParams::new(Some(-3), Some(0)), PageParams { page: 1, page_size: 1 });
    }

    #[test]
    fn offset_and_total_pages() {
        let params = PageParams::new(Some(3), Some(10));
        assert_eq!(params.offset(), 20);
        assert_eq!(params.meta(21).total_pages, 3);
        assert_eq!(params.meta(20).total_pages, 2);
        assert_eq!(params.meta(0).total_pages, 0);
    }
}
