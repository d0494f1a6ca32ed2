//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

const MAX_PER_PAGE: u32 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PageRequest {
    /// Page number, at least 1.
    #[must_use]
    pub fn page(&self) -> u64 {
        u64::from(self.page.max(1))
    }

    /// Calculates the offset for database queries.
    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.page() - 1) * self.limit()
    }

    /// Returns the limit for database queries, clamped to `1..=100`.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page.clamp(1, MAX_PER_PAGE))
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PageMeta,
}

/// Pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page number.
    pub page: u64,
    /// Items per page.
    pub per_page: u64,
    /// Total number of items across all pages.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl<T> PageResponse<T> {
    /// Creates a new paginated response.
    #[must_use]
    pub fn new(data: Vec<T>, request: &PageRequest, total: u64) -> Self {
        let per_page = request.limit();
        let total_pages = if total == 0 {
            1
        } else {
            total.div_ceil(per_page)
        };

        Self {
            data,
            meta: PageMeta {
                page: request.page(),
                per_page,
                total,
                total_pages,
            },
        }
    }

    /// Maps the items while keeping the metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 20, 0, 20)]
    #[case(3, 10, 20, 10)]
    #[case(0, 10, 0, 10)]
    #[case(1, 500, 0, 100)]
    #[case(2, 0, 1, 1)]
    fn test_offset_and_limit(
        #[case] page: u32,
        #[case] per_page: u32,
        #[case] offset: u64,
        #[case] limit: u64,
    ) {
        let request = PageRequest { page, per_page };
        assert_eq!(request.offset(), offset);
        assert_eq!(request.limit(), limit);
    }

    #[rstest]
    #[case(0, 1)]
    #[case(3, 1)]
    #[case(10, 1)]
    #[case(11, 2)]
    #[case(25, 3)]
    fn test_total_pages(#[case] total: u64, #[case] pages: u64) {
        let request = PageRequest {
            page: 1,
            per_page: 10,
        };
        let response: PageResponse<i32> = PageResponse::new(vec![], &request, total);
        assert_eq!(response.meta.total_pages, pages);
    }

    #[test]
    fn test_map_keeps_meta() {
        let response = PageResponse::new(vec![1, 2, 3], &PageRequest::default(), 3);
        let mapped = response.map(|n| n * 2);
        assert_eq!(mapped.data, vec![2, 4, 6]);
        assert_eq!(mapped.meta.total, 3);
    }
}
