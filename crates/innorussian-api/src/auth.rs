//! HTTP Basic-auth extractors backed by the users table.
//!
//! The username half of the credentials is the account e-mail. Passwords are
//! checked against the argon2 PHC string stored with the account.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::{self, SaltString},
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use innorussian_core::{model::User, store::VocabularyStore};
use rand_core::OsRng;

use crate::{AppState, error::ApiError};

/// Minimum length of a new account password.
pub const MIN_PASSWORD_LEN: usize = 8;

/// A signed-in, active account. Rejects with 401 otherwise.
pub struct CurrentUser(pub User);

/// The signed-in account, if credentials were sent.
///
/// Credentials that are sent but wrong still reject with 401.
pub struct MaybeUser(pub Option<User>);

/// A signed-in staff account. Rejects with 401 or 403.
pub struct StaffUser(pub User);

/// Hash `password` into an argon2 PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

/// Lowercase the domain part of an e-mail address, leaving the local part
/// as given.
pub fn normalize_email(email: &str) -> String {
  let email = email.trim();
  match email.rsplit_once('@') {
    Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
    None => email.to_string(),
  }
}

fn basic_credentials(headers: &HeaderMap) -> Result<Option<(String, String)>, ApiError> {
  let Some(value) = headers.get(header::AUTHORIZATION) else {
    return Ok(None);
  };

  let encoded = value
    .to_str()
    .ok()
    .and_then(|v| v.strip_prefix("Basic "))
    .ok_or(ApiError::Unauthorized)?;
  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds = String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;
  let (email, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  Ok(Some((email.to_string(), password.to_string())))
}

/// Resolve the request's credentials to an account.
///
/// `Ok(None)` means no `Authorization` header was sent at all.
pub async fn authenticate<S>(
  headers: &HeaderMap,
  store: &S,
) -> Result<Option<User>, ApiError>
where
  S: VocabularyStore,
{
  let Some((email, password)) = basic_credentials(headers)? else {
    return Ok(None);
  };

  let creds = store
    .find_credentials(&normalize_email(&email))
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)?;

  let parsed =
    PasswordHash::new(&creds.password_hash).map_err(|_| ApiError::Unauthorized)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .map_err(|_| ApiError::Unauthorized)?;

  if !creds.user.is_active {
    tracing::debug!(user_id = %creds.user.id, "inactive account rejected");
    return Err(ApiError::Unauthorized);
  }
  Ok(Some(creds.user))
}

impl<S> FromRequestParts<AppState<S>> for MaybeUser
where
  S: VocabularyStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    Ok(MaybeUser(authenticate(&parts.headers, &*state.store).await?))
  }
}

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: VocabularyStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    authenticate(&parts.headers, &*state.store)
      .await?
      .map(CurrentUser)
      .ok_or(ApiError::Unauthorized)
  }
}

impl<S> FromRequestParts<AppState<S>> for StaffUser
where
  S: VocabularyStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
    if !user.is_staff {
      return Err(ApiError::Forbidden);
    }
    Ok(StaffUser(user))
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn basic(user: &str, pass: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let encoded = B64.encode(format!("{user}:{pass}"));
    headers.insert(
      header::AUTHORIZATION,
      HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
    );
    headers
  }

  #[test]
  fn missing_header_is_anonymous() {
    assert!(basic_credentials(&HeaderMap::new()).unwrap().is_none());
  }

  #[test]
  fn password_may_contain_colons() {
    let (email, password) = basic_credentials(&basic("anna@example.com", "a:b:c"))
      .unwrap()
      .unwrap();
    assert_eq!(email, "anna@example.com");
    assert_eq!(password, "a:b:c");
  }

  #[test]
  fn invalid_base64_is_rejected() {
    let mut headers = HeaderMap::new();
    headers.insert(
      header::AUTHORIZATION,
      HeaderValue::from_static("Basic !!!not-base64!!!"),
    );
    assert!(matches!(basic_credentials(&headers), Err(ApiError::Unauthorized)));
  }

  #[test]
  fn bearer_scheme_is_rejected() {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
    assert!(matches!(basic_credentials(&headers), Err(ApiError::Unauthorized)));
  }

  #[test]
  fn email_domain_is_lowercased() {
    assert_eq!(normalize_email(" Anna@Example.COM "), "Anna@example.com");
    assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
  }

  #[test]
  fn hashes_verify() {
    let hash = hash_password("correct horse").unwrap();
    let parsed = PasswordHash::new(&hash).unwrap();
    assert!(Argon2::default().verify_password(b"correct horse", &parsed).is_ok());
    assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
  }
}
