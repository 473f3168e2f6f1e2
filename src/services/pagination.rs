use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Raw `page` / `limit` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// 1-based page number (default 1)
    pub page: Option<u64>,
    /// Page size, clamped to the configured maximum
    pub limit: Option<u64>,
}

impl PageQuery {
    pub fn resolve(&self, default_limit: u64, max_limit: u64) -> PageParams {
        PageParams::new(self.page, self.limit, default_limit, max_limit)
    }
}

/// Normalized pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u64,
    pub limit: u64,
}

impl PageParams {
    pub fn new(page: Option<u64>, limit: Option<u64>, default_limit: u64, max_limit: u64) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, max_limit),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

/// One page of results plus the totals needed to render pagers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, params: PageParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            limit: params.limit,
            total_pages: total.div_ceil(params.limit),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, 1, 10)]
    #[case(Some(0), Some(0), 1, 1)]
    #[case(Some(3), Some(500), 3, 100)]
    #[case(Some(2), Some(25), 2, 25)]
    fn params_are_normalized(
        #[case] page: Option<u64>,
        #[case] limit: Option<u64>,
        #[case] expected_page: u64,
        #[case] expected_limit: u64,
    ) {
        let params = PageParams::new(page, limit, 10, 100);
        assert_eq!(params.page, expected_page);
        assert_eq!(params.limit, expected_limit);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let params = PageParams::new(Some(3), Some(20), 10, 100);
        assert_eq!(params.offset(), 40);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(10, 1)]
    #[case(11, 2)]
    #[case(95, 10)]
    fn total_pages_rounds_up(#[case] total: u64, #[case] pages: u64) {
        let page: Page<u8> = Page::new(vec![], total, PageParams::new(None, Some(10), 10, 100));
        assert_eq!(page.total_pages, pages);
    }
}
