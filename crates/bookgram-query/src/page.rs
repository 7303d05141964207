//! Slicing sorted results into pages.

use crate::QueryError;

/// Returns page `page` (1-based) of `items`, `per_page` items at a time.
///
/// A page starting exactly at the end is empty rather than an error, so the
/// first page of an empty result is always valid.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Result<&[T], QueryError> {
    let per_page = per_page.max(1);
    let last = items.len().div_ceil(per_page).max(1);
    let from = page
        .checked_sub(1)
        .and_then(|p| p.checked_mul(per_page))
        .filter(|&from| from <= items.len())
        .ok_or(QueryError::PageOutOfRange { page, last })?;
    let till = (from + per_page).min(items.len());
    Ok(&items[from..till])
}
