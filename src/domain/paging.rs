//! Bounds shared by the paginated listings.

/// Highest page any listing serves; larger requests are clamped to it.
pub const MAX_PAGE: i64 = 10_000;
pub const MAX_LIMIT: i64 = 100;

/// Normalises a 1-based page number and a page size.
pub fn clamp(page: i64, limit: i64) -> (i64, i64) {
    (page.clamp(1, MAX_PAGE), limit.clamp(1, MAX_LIMIT))
}

/// Rows to skip before `page`. Saturates rather than overflowing.
pub fn offset(page: i64, limit: i64) -> i64 {
    page.max(1).saturating_sub(1).saturating_mul(limit.max(0))
}
