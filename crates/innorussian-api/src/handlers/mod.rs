pub mod admin;
pub mod browse;
pub mod favourites;
pub mod health;
pub mod search;
pub mod users;

use innorussian_core::{
  catalog::CardListing,
  model::{SubCategory, TaggedCard},
  query::{CARD_SORT_OPTIONS, CardSort},
};
use serde::{Deserialize, Serialize};

use crate::{
  error::ApiError,
  pagination::{Page, paginate},
};

/// Query string shared by the listing routes.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  /// Local search text.
  pub q:    Option<String>,
  /// Sort directive code, e.g. `W`.
  pub sort: Option<String>,
  /// 1-based page number or `last`.
  pub page: Option<String>,
}

/// A page of cards with the sort directive that produced it.
#[derive(Debug, Serialize)]
pub struct CardsPage {
  pub q:            String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub subcategory:  Option<SubCategory>,
  pub sorted_by:    CardSort,
  pub sort_options: [CardSort; 4],
  #[serde(flatten)]
  pub page:         Page<TaggedCard>,
}

impl CardsPage {
  pub(crate) fn build(
    q: &str,
    listing: CardListing,
    page: Option<&str>,
    per_page: usize,
  ) -> Result<Self, ApiError> {
    Ok(CardsPage {
      q:            q.to_string(),
      subcategory:  listing.subcategory,
      sorted_by:    listing.sorted_by,
      sort_options: CARD_SORT_OPTIONS,
      page:         paginate(listing.cards, page, per_page)?,
    })
  }
}
