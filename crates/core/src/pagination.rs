//! Page/limit pagination shared by every list endpoint.
//!
//! Requests carry 1-based `page` and `limit`; responses carry a
//! [`Pagination`] block computed from the total row count.

use serde::Serialize;

/// Default page size.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Maximum page size.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Clamp user input: `page` floors at 1, `limit` is bounded to
    /// `1..=MAX_PAGE_LIMIT` and defaults to [`DEFAULT_PAGE_LIMIT`].
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Row offset for SQL `OFFSET`.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Build the response block for a result set of `total` rows.
    pub fn paginate(&self, total: i64) -> Pagination {
        Pagination::new(self.page, self.limit, total)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination block of the response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total = total.max(0);
        let pages = total_pages(total, limit);
        Self {
            page,
            limit,
            total,
            pages,
            has_next: page < pages,
            has_prev: page > 1,
        }
    }
}

/// `ceil(total / limit)`; zero rows means zero pages.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 || total <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_missing() {
        let req = PageRequest::new(None, None);
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn clamps_out_of_range_values() {
        let req = PageRequest::new(Some(0), Some(1000));
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, MAX_PAGE_LIMIT);

        let req = PageRequest::new(Some(-3), Some(0));
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 1);
    }

    #[test]
    fn offset_follows_page() {
        assert_eq!(PageRequest::new(Some(3), Some(10)).offset(), 20);
    }

    #[test]
    fn pages_is_ceiling_of_total_over_limit() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(95, 20), 5);
    }

    #[test]
    fn next_and_prev_flags_hold_for_every_page() {
        for total in [0_i64, 1, 19, 20, 21, 57, 100] {
            for limit in [1_i64, 7, 20] {
                let pages = total_pages(total, limit);
                for page in 1..=pages.max(1) + 1 {
                    let p = Pagination::new(page, limit, total);
                    assert_eq!(p.pages, pages);
                    assert_eq!(p.has_next, page < pages);
                    assert_eq!(p.has_prev, page > 1);
                }
            }
        }
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(Pagination::new(2, 10, 35)).unwrap();
        assert_eq!(json["hasNext"], true);
        assert_eq!(json["hasPrev"], true);
        assert_eq!(json["pages"], 4);
    }
}
