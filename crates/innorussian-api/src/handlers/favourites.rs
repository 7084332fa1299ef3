//! Handlers for `/favourites` endpoints. All of them need a signed-in user.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/favourites` | `?q`, `?sort`, `?page`; 10 per page |
//! | `POST`   | `/favourites/{card_id}` | 201; 404 unknown card; 409 already a favourite |
//! | `DELETE` | `/favourites/{card_id}` | 204; 410 not a favourite |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use innorussian_core::{
  catalog,
  model::CardId,
  query::{CardSort, TextQuery},
  store::VocabularyStore,
};

use super::{CardsPage, ListParams};
use crate::{
  AppState, auth::CurrentUser, error::ApiError, pagination::FAVOURITES_PER_PAGE,
};

/// `GET /favourites[?q=...][&sort=...][&page=...]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Query(params): Query<ListParams>,
) -> Result<Json<CardsPage>, ApiError>
where
  S: VocabularyStore + Clone + 'static,
{
  let q = TextQuery::parse(params.q.as_deref());
  let sort = CardSort::from_code(params.sort.as_deref());
  let listing = catalog::favourites(&*state.store, user.id, &q, sort).await?;
  Ok(Json(CardsPage::build(
    q.as_str(),
    listing,
    params.page.as_deref(),
    FAVOURITES_PER_PAGE,
  )?))
}

/// `POST /favourites/{card_id}`
pub async fn add<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(card_id): Path<CardId>,
) -> Result<impl IntoResponse, ApiError>
where
  S: VocabularyStore + Clone + 'static,
{
  let favourite = catalog::add_favourite(&*state.store, user.id, card_id).await?;
  tracing::info!(user_id = %user.id, card_id = %card_id, "favourite added");
  Ok((StatusCode::CREATED, Json(favourite)))
}

/// `DELETE /favourites/{card_id}`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(card_id): Path<CardId>,
) -> Result<StatusCode, ApiError>
where
  S: VocabularyStore + Clone + 'static,
{
  catalog::remove_favourite(&*state.store, user.id, card_id).await?;
  tracing::info!(user_id = %user.id, card_id = %card_id, "favourite removed");
  Ok(StatusCode::NO_CONTENT)
}
