//! The `VocabularyStore` trait, the boundary to persistent storage.
//!
//! The trait is implemented by storage backends (e.g.
//! `innorussian-store-sqlite`). The catalog functions and the HTTP layer
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  model::{
    Card, CardId, Category, CategoryId, Favourite, NewCard, NewCategory,
    NewSubCategory, NewUser, SubCategory, SubCategoryId, User, UserId,
  },
  query::TextQuery,
};

/// A user record together with its argon2 PHC password hash.
#[derive(Debug, Clone)]
pub struct UserCredentials {
  pub user:          User,
  pub password_hash: String,
}

/// Abstraction over an InnoRussian storage backend.
///
/// Deletes fan out explicitly: removing a record also removes every link and
/// favourite that refers to it, in one transaction.
///
/// Backend errors convert into [`crate::Error`] so domain failures
/// (`DuplicateName`, `AlreadyFavourite`, ...) survive the trip.
pub trait VocabularyStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  // ── Categories ────────────────────────────────────────────────────────

  /// All categories, by ascending id.
  fn list_categories(
    &self,
  ) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send + '_;

  fn get_category(
    &self,
    id: CategoryId,
  ) -> impl Future<Output = Result<Option<Category>, Self::Error>> + Send + '_;

  /// Case-insensitive substring search over category names.
  fn search_categories<'a>(
    &'a self,
    q: &'a TextQuery,
  ) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send + 'a;

  /// Returns an error if the name is already taken.
  fn add_category(
    &self,
    input: NewCategory,
  ) -> impl Future<Output = Result<Category, Self::Error>> + Send + '_;

  fn set_category_picture(
    &self,
    id: CategoryId,
    picture: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a category and its subcategory links. Subcategories survive.
  fn delete_category(
    &self,
    id: CategoryId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Subcategories ─────────────────────────────────────────────────────

  /// Subcategories by ascending id, optionally only those attached to
  /// `category`.
  fn list_subcategories(
    &self,
    category: Option<CategoryId>,
  ) -> impl Future<Output = Result<Vec<SubCategory>, Self::Error>> + Send + '_;

  fn get_subcategory(
    &self,
    id: SubCategoryId,
  ) -> impl Future<Output = Result<Option<SubCategory>, Self::Error>> + Send + '_;

  /// Whether at least one card is attached to `id`.
  fn subcategory_has_cards(
    &self,
    id: SubCategoryId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn search_subcategories<'a>(
    &'a self,
    q: &'a TextQuery,
  ) -> impl Future<Output = Result<Vec<SubCategory>, Self::Error>> + Send + 'a;

  /// Returns an error if the name is taken or a category id is unknown.
  fn add_subcategory(
    &self,
    input: NewSubCategory,
  ) -> impl Future<Output = Result<SubCategory, Self::Error>> + Send + '_;

  fn set_subcategory_picture(
    &self,
    id: SubCategoryId,
    picture: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a subcategory with its category and card links. Cards survive.
  fn delete_subcategory(
    &self,
    id: SubCategoryId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Cards ─────────────────────────────────────────────────────────────

  /// Cards by descending id, optionally only those attached to
  /// `subcategory`.
  fn list_cards(
    &self,
    subcategory: Option<SubCategoryId>,
  ) -> impl Future<Output = Result<Vec<Card>, Self::Error>> + Send + '_;

  fn get_card(
    &self,
    id: CardId,
  ) -> impl Future<Output = Result<Option<Card>, Self::Error>> + Send + '_;

  /// The cards among `ids` that exist, in no particular order.
  fn get_cards<'a>(
    &'a self,
    ids: &'a [CardId],
  ) -> impl Future<Output = Result<Vec<Card>, Self::Error>> + Send + 'a;

  fn card_exists(
    &self,
    id: CardId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Cards whose content or transliteration contains `q`, by descending id.
  fn search_cards<'a>(
    &'a self,
    q: &'a TextQuery,
  ) -> impl Future<Output = Result<Vec<Card>, Self::Error>> + Send + 'a;

  /// Returns an error if a subcategory id is unknown.
  fn add_card(
    &self,
    input: NewCard,
  ) -> impl Future<Output = Result<Card, Self::Error>> + Send + '_;

  fn set_card_pronunciation(
    &self,
    id: CardId,
    pronunciation: Option<String>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a card with its subcategory links and every favourite of it.
  fn delete_card(
    &self,
    id: CardId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Favourites ────────────────────────────────────────────────────────

  /// A user's favourites, most recently added first.
  fn favourites_of(
    &self,
    owner: UserId,
  ) -> impl Future<Output = Result<Vec<Favourite>, Self::Error>> + Send + '_;

  /// Returns an error if the card is already a favourite of `owner`.
  fn add_favourite(
    &self,
    owner: UserId,
    card: CardId,
  ) -> impl Future<Output = Result<Favourite, Self::Error>> + Send + '_;

  /// Returns an error if the card is not a favourite of `owner`.
  fn remove_favourite(
    &self,
    owner: UserId,
    card: CardId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Returns an error if the email is already registered.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Look up an account by email for authentication.
  fn find_credentials<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<UserCredentials>, Self::Error>> + Send + 'a;

  /// Delete an account and all of its favourites.
  fn delete_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
