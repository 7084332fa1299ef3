//! Handlers for the browsing routes.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/categories` | `?q`, `?page`; 6 per page |
//! | `GET`  | `/categories/{id}/subcategories` | `?q`, `?page`; 404 unknown category |
//! | `GET`  | `/subcategories/{id}/cards` | `?q`, `?sort`, `?page`; 404 unknown or empty subcategory |
//! | `GET`  | `/cards/{id}` | 404 unknown card |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use innorussian_core::{
  catalog,
  model::{CardId, Category, CategoryId, SubCategory, SubCategoryId, TaggedCard},
  query::{CardSort, TextQuery},
  store::VocabularyStore,
};
use serde::Serialize;

use super::{CardsPage, ListParams};
use crate::{
  AppState,
  auth::MaybeUser,
  error::ApiError,
  pagination::{
    CARDS_PER_PAGE, CATEGORIES_PER_PAGE, Page, SUBCATEGORIES_PER_PAGE, paginate,
  },
};

// ─── Categories ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CategoriesPage {
  pub q:    String,
  #[serde(flatten)]
  pub page: Page<Category>,
}

/// `GET /categories[?q=...][&page=...]`
pub async fn categories<S>(
  State(state): State<AppState<S>>,
  MaybeUser(_): MaybeUser,
  Query(params): Query<ListParams>,
) -> Result<Json<CategoriesPage>, ApiError>
where
  S: VocabularyStore + Clone + 'static,
{
  let q = TextQuery::parse(params.q.as_deref());
  let found = catalog::categories(&*state.store, &q).await?;
  Ok(Json(CategoriesPage {
    q:    q.as_str().to_string(),
    page: paginate(found, params.page.as_deref(), CATEGORIES_PER_PAGE)?,
  }))
}

// ─── Subcategories ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SubCategoriesPage {
  pub q:        String,
  pub category: Category,
  #[serde(flatten)]
  pub page:     Page<SubCategory>,
}

/// `GET /categories/{id}/subcategories[?q=...][&page=...]`
pub async fn subcategories<S>(
  State(state): State<AppState<S>>,
  MaybeUser(_): MaybeUser,
  Path(id): Path<CategoryId>,
  Query(params): Query<ListParams>,
) -> Result<Json<SubCategoriesPage>, ApiError>
where
  S: VocabularyStore + Clone + 'static,
{
  let q = TextQuery::parse(params.q.as_deref());
  let listing = catalog::subcategories(&*state.store, id, &q).await?;
  Ok(Json(SubCategoriesPage {
    q:        q.as_str().to_string(),
    category: listing.category,
    page:     paginate(
      listing.subcategories,
      params.page.as_deref(),
      SUBCATEGORIES_PER_PAGE,
    )?,
  }))
}

// ─── Cards ────────────────────────────────────────────────────────────────────

/// `GET /subcategories/{id}/cards[?q=...][&sort=...][&page=...]`
pub async fn cards<S>(
  State(state): State<AppState<S>>,
  MaybeUser(user): MaybeUser,
  Path(id): Path<SubCategoryId>,
  Query(params): Query<ListParams>,
) -> Result<Json<CardsPage>, ApiError>
where
  S: VocabularyStore + Clone + 'static,
{
  let q = TextQuery::parse(params.q.as_deref());
  let sort = CardSort::from_code(params.sort.as_deref());
  let listing =
    catalog::cards(&*state.store, id, &q, sort, user.map(|u| u.id)).await?;
  Ok(Json(CardsPage::build(
    q.as_str(),
    listing,
    params.page.as_deref(),
    CARDS_PER_PAGE,
  )?))
}

/// `GET /cards/{id}`
pub async fn card<S>(
  State(state): State<AppState<S>>,
  MaybeUser(user): MaybeUser,
  Path(id): Path<CardId>,
) -> Result<Json<TaggedCard>, ApiError>
where
  S: VocabularyStore + Clone + 'static,
{
  let card = catalog::card(&*state.store, id, user.map(|u| u.id)).await?;
  Ok(Json(card))
}
