//! Content management routes. All of them need a staff account.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/admin/categories` | Body: [`NewCategoryBody`]; 201 |
//! | `DELETE` | `/admin/categories/{id}` | 204 |
//! | `POST`   | `/admin/subcategories` | Body: [`NewSubCategoryBody`]; 201 |
//! | `DELETE` | `/admin/subcategories/{id}` | 204 |
//! | `POST`   | `/admin/cards` | Body: [`NewCardBody`]; 201 |
//! | `DELETE` | `/admin/cards/{id}` | 204 |
//!
//! Media arrive inline as base64. Each upload is staged before the record is
//! written and renamed to the record's id afterwards; if the record cannot be
//! pointed at the renamed file, the rename is undone.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use innorussian_core::{
  model::{
    CardId, CardKind, CategoryId, NewCard, NewCategory, NewSubCategory,
    SubCategoryId,
  },
  store::VocabularyStore,
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::StaffUser,
  error::ApiError,
  media::{MediaKind, Upload},
};

// ─── Categories ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewCategoryBody {
  pub name:    String,
  /// An `.svg` file.
  pub picture: Upload,
}

/// `POST /admin/categories`
pub async fn create_category<S>(
  State(state): State<AppState<S>>,
  StaffUser(staff): StaffUser,
  Json(body): Json<NewCategoryBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: VocabularyStore + Clone + 'static,
{
  let kind = MediaKind::CategoryPicture;
  let staged = state.media.stage(kind, &body.picture).await?;

  let added = state
    .store
    .add_category(NewCategory { name: body.name, picture: staged.clone() })
    .await;
  let mut category = match added {
    Ok(c) => c,
    Err(e) => {
      state.media.discard(&staged).await;
      return Err(ApiError::store(e));
    }
  };

  let (store, id) = (&state.store, category.id);
  category.picture = state
    .media
    .commit(kind, &staged, id.0, move |picture| async move {
      store.set_category_picture(id, picture).await.map_err(ApiError::store)
    })
    .await?;

  tracing::info!(category_id = %category.id, staff_id = %staff.id, "category created");
  Ok((StatusCode::CREATED, Json(category)))
}

/// `DELETE /admin/categories/{id}`
pub async fn delete_category<S>(
  State(state): State<AppState<S>>,
  StaffUser(staff): StaffUser,
  Path(id): Path<CategoryId>,
) -> Result<StatusCode, ApiError>
where
  S: VocabularyStore + Clone + 'static,
{
  state.store.delete_category(id).await.map_err(ApiError::store)?;
  tracing::info!(category_id = %id, staff_id = %staff.id, "category deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Subcategories ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewSubCategoryBody {
  pub name:         String,
  /// An `.svg` file.
  pub picture:      Upload,
  #[serde(default)]
  pub category_ids: Vec<CategoryId>,
}

/// `POST /admin/subcategories`
pub async fn create_subcategory<S>(
  State(state): State<AppState<S>>,
  StaffUser(staff): StaffUser,
  Json(body): Json<NewSubCategoryBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: VocabularyStore + Clone + 'static,
{
  let kind = MediaKind::SubCategoryPicture;
  let staged = state.media.stage(kind, &body.picture).await?;

  let added = state
    .store
    .add_subcategory(NewSubCategory {
      name:         body.name,
      picture:      staged.clone(),
      category_ids: body.category_ids,
    })
    .await;
  let mut sub = match added {
    Ok(s) => s,
    Err(e) => {
      state.media.discard(&staged).await;
      return Err(ApiError::store(e));
    }
  };

  let (store, id) = (&state.store, sub.id);
  sub.picture = state
    .media
    .commit(kind, &staged, id.0, move |picture| async move {
      store.set_subcategory_picture(id, picture).await.map_err(ApiError::store)
    })
    .await?;

  tracing::info!(subcategory_id = %sub.id, staff_id = %staff.id, "subcategory created");
  Ok((StatusCode::CREATED, Json(sub)))
}

/// `DELETE /admin/subcategories/{id}`
pub async fn delete_subcategory<S>(
  State(state): State<AppState<S>>,
  StaffUser(staff): StaffUser,
  Path(id): Path<SubCategoryId>,
) -> Result<StatusCode, ApiError>
where
  S: VocabularyStore + Clone + 'static,
{
  state.store.delete_subcategory(id).await.map_err(ApiError::store)?;
  tracing::info!(subcategory_id = %id, staff_id = %staff.id, "subcategory deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Cards ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewCardBody {
  pub content:         String,
  /// `W`, `D` or `S`.
  #[serde(default)]
  pub kind:            CardKind,
  pub transliteration: Option<String>,
  /// An `.mp3` recording.
  pub pronunciation:   Option<Upload>,
  #[serde(default)]
  pub subcategory_ids: Vec<SubCategoryId>,
}

/// `POST /admin/cards`
pub async fn create_card<S>(
  State(state): State<AppState<S>>,
  StaffUser(staff): StaffUser,
  Json(body): Json<NewCardBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: VocabularyStore + Clone + 'static,
{
  let kind = MediaKind::CardSound;
  let staged = match &body.pronunciation {
    Some(upload) => Some(state.media.stage(kind, upload).await?),
    None => None,
  };

  let added = state
    .store
    .add_card(NewCard {
      content:         body.content,
      kind:            body.kind,
      pronunciation:   staged.clone(),
      transliteration: body.transliteration,
      subcategory_ids: body.subcategory_ids,
    })
    .await;
  let mut card = match added {
    Ok(c) => c,
    Err(e) => {
      if let Some(staged) = &staged {
        state.media.discard(staged).await;
      }
      return Err(ApiError::store(e));
    }
  };

  if let Some(staged) = staged {
    let (store, id) = (&state.store, card.id);
    let sound = state
      .media
      .commit(kind, &staged, id.0, move |sound| async move {
        store.set_card_pronunciation(id, Some(sound)).await.map_err(ApiError::store)
      })
      .await?;
    card.pronunciation = Some(sound);
  }

  tracing::info!(card_id = %card.id, staff_id = %staff.id, "card created");
  Ok((StatusCode::CREATED, Json(card)))
}

/// `DELETE /admin/cards/{id}`
pub async fn delete_card<S>(
  State(state): State<AppState<S>>,
  StaffUser(staff): StaffUser,
  Path(id): Path<CardId>,
) -> Result<StatusCode, ApiError>
where
  S: VocabularyStore + Clone + 'static,
{
  state.store.delete_card(id).await.map_err(ApiError::store)?;
  tracing::info!(card_id = %id, staff_id = %staff.id, "card deleted");
  Ok(StatusCode::NO_CONTENT)
}
