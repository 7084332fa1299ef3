//! Account routes.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/users` | Body: `{"email":"...","password":"..."}`; 201; 409 taken |
//! | `GET`    | `/users/me` | The signed-in account |
//! | `DELETE` | `/users/me` | Deletes the account and its favourites; 204 |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use innorussian_core::{
  model::{NewUser, User},
  store::VocabularyStore,
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::{CurrentUser, MIN_PASSWORD_LEN, hash_password, normalize_email},
  error::ApiError,
};

#[derive(Debug, Deserialize)]
pub struct SignUpBody {
  pub email:    String,
  pub password: String,
}

/// `POST /users`
pub async fn sign_up<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<SignUpBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: VocabularyStore + Clone + 'static,
{
  let email = normalize_email(&body.email);
  if !email.contains('@') {
    return Err(ApiError::BadRequest(format!("invalid email {email:?}")));
  }
  if body.password.chars().count() < MIN_PASSWORD_LEN {
    return Err(ApiError::BadRequest(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }

  let password_hash = hash_password(&body.password)
    .map_err(|e| ApiError::Store(format!("argon2 error: {e}").into()))?;
  let user = state
    .store
    .add_user(NewUser { email, password_hash, is_staff: false })
    .await
    .map_err(ApiError::store)?;

  tracing::info!(user_id = %user.id, "account created");
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/me`
pub async fn me<S>(CurrentUser(user): CurrentUser) -> Json<User>
where
  S: VocabularyStore + Clone + 'static,
{
  Json(user)
}

/// `DELETE /users/me`
pub async fn delete_me<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
) -> Result<StatusCode, ApiError>
where
  S: VocabularyStore + Clone + 'static,
{
  state.store.delete_user(user.id).await.map_err(ApiError::store)?;
  tracing::info!(user_id = %user.id, "account deleted");
  Ok(StatusCode::NO_CONTENT)
}
