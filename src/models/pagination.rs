//! Page/limit query parameters shared by list endpoints
//!
//! Parsing is lenient: anything that is not a number falls back to the
//! default, fractional values are floored and out-of-range values are
//! clamped. A bad `page` never turns into a 400.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u64 = 1;
pub const MIN_PAGE: u64 = 1;
/// Largest integer a JS client can represent exactly
pub const MAX_PAGE: u64 = 9_007_199_254_740_991;
pub const DEFAULT_LIMIT: u64 = 20;
pub const MIN_LIMIT: u64 = 1;
pub const MAX_LIMIT: u64 = 250;

/// Raw query string for `GET /api/v1/items`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    /// Case-insensitive substring of the item name
    pub search: Option<String>,
}

impl ItemListQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::from_raw(self.page.as_deref(), self.limit.as_deref())
    }

    /// Search term, ignoring empty or whitespace-only input
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: u64,
    pub limit: u64,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PaginationParams {
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = match parse_floor(page) {
            Some(p) if p >= MIN_PAGE as f64 => (p.min(MAX_PAGE as f64)) as u64,
            _ => DEFAULT_PAGE,
        };
        let limit = match parse_floor(limit) {
            Some(l) if l >= MIN_LIMIT as f64 => (l.min(MAX_LIMIT as f64)) as u64,
            _ => DEFAULT_LIMIT,
        };
        Self { page, limit }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Number of pages needed to show `total` rows
    pub fn pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

fn parse_floor(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(f64::floor)
}

/// Pagination block echoed back in list responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationInfo {
    pub total: u64,
    pub pages: u64,
    pub page: u64,
    pub limit: u64,
}

impl PaginationInfo {
    pub fn new(params: PaginationParams, total: u64) -> Self {
        Self {
            total,
            pages: params.pages(total),
            page: params.page,
            limit: params.limit,
        }
    }
}
