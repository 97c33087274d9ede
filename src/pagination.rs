//! Pagination parameter normalization and page metadata.

use serde::Serialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Normalized page/limit pair. `page >= 1`, `limit` in `[1, MAX_LIMIT]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Normalizes raw query values. Non-numeric or sub-1 values fall back to
    /// the defaults; limits above `MAX_LIMIT` are clamped, not rejected.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = match page.and_then(|raw| raw.parse::<i64>().ok()) {
            Some(parsed) if parsed >= 1 => parsed,
            _ => DEFAULT_PAGE,
        };

        let limit = match limit.and_then(|raw| raw.parse::<i64>().ok()) {
            Some(parsed) if parsed >= 1 => parsed.min(MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        };

        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Page metadata included in list responses.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PageInfo {
    pub fn new(pagination: Pagination, total: i64) -> Self {
        let total_pages = (total + pagination.limit - 1) / pagination.limit;
        Self {
            page: pagination.page,
            limit: pagination.limit,
            total,
            total_pages,
            has_next_page: pagination.page < total_pages,
            has_prev_page: pagination.page > 1,
        }
    }
}
