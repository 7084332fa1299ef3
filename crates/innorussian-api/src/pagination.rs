//! Fixed-size pages over already ordered listings.

use serde::Serialize;

use crate::error::ApiError;

pub const CATEGORIES_PER_PAGE: usize = 6;
pub const SUBCATEGORIES_PER_PAGE: usize = 6;
pub const CARDS_PER_PAGE: usize = 10;
pub const FAVOURITES_PER_PAGE: usize = 10;

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
  pub items:       Vec<T>,
  /// 1-based.
  pub page:        usize,
  pub total_pages: usize,
  pub total_items: usize,
}

/// Cut page `requested` out of `items`.
///
/// `requested` is a 1-based number or `"last"`; absent means the first page.
/// An empty listing still has one (empty) page. Anything else out of range
/// is a 404.
pub fn paginate<T>(
  items: Vec<T>,
  requested: Option<&str>,
  per_page: usize,
) -> Result<Page<T>, ApiError> {
  let total_items = items.len();
  let total_pages = total_items.div_ceil(per_page).max(1);

  let page = match requested.map(str::trim) {
    None | Some("") => 1,
    Some("last") => total_pages,
    Some(raw) => raw
      .parse::<usize>()
      .map_err(|_| ApiError::NotFound(format!("invalid page {raw:?}")))?,
  };
  if page == 0 || page > total_pages {
    return Err(ApiError::NotFound(format!("page {page} out of range")));
  }

  let items = items
    .into_iter()
    .skip((page - 1) * per_page)
    .take(per_page)
    .collect();

  Ok(Page { items, page, total_pages, total_items })
}
