//! Error types for `innorussian-core`.

use thiserror::Error;

use crate::model::{CardId, CategoryId, SubCategoryId, UserId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("category not found: {0}")]
  CategoryNotFound(CategoryId),

  #[error("subcategory not found: {0}")]
  SubCategoryNotFound(SubCategoryId),

  #[error("card not found: {0}")]
  CardNotFound(CardId),

  #[error("user not found: {0}")]
  UserNotFound(UserId),

  #[error("authentication required")]
  Unauthorized,

  #[error("card {0} is already in the favourites")]
  AlreadyFavourite(CardId),

  #[error("card {0} is not in the favourites")]
  NotFavourite(CardId),

  #[error("name already taken: {0:?}")]
  DuplicateName(String),

  #[error("email already registered: {0:?}")]
  DuplicateEmail(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
