//! `GET /search`: global search across categories, subcategories and cards.

use axum::{
  Json,
  extract::{Query, State},
};
use innorussian_core::{
  catalog::{self, SearchResults},
  query::TextQuery,
  search::{SEARCH_SORT_OPTIONS, SearchSort},
  store::VocabularyStore,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, auth::MaybeUser, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub q:    Option<String>,
  /// `DF`, `CR`, `CT` or `SB`.
  pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
  #[serde(flatten)]
  pub results:      SearchResults,
  pub sort_options: [SearchSort; 4],
}

/// `GET /search?q=...[&sort=...]`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  MaybeUser(user): MaybeUser,
  Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError>
where
  S: VocabularyStore + Clone + 'static,
{
  let q = TextQuery::parse(params.q.as_deref());
  let sort = SearchSort::from_code(params.sort.as_deref());
  let results = catalog::search(&*state.store, &q, sort, user.map(|u| u.id)).await?;
  Ok(Json(SearchResponse { results, sort_options: SEARCH_SORT_OPTIONS }))
}
