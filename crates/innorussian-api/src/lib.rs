//! JSON HTTP API for InnoRussian.
//!
//! Exposes an axum [`Router`] backed by any
//! [`innorussian_core::store::VocabularyStore`]. Browsing and search are open
//! to anonymous callers; favourites and the account routes need HTTP Basic
//! credentials, and the `/admin` routes need a staff account.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod media;
pub mod pagination;

pub use error::{ApiError, Result};

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, post},
};
use innorussian_core::store::VocabularyStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{admin, browse, favourites, health, search, users};
use media::MediaStore;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  pub store_path:   PathBuf,
  /// Directory uploaded pictures and recordings are written under.
  pub media_root:   PathBuf,
  #[serde(default = "default_project_name")]
  pub project_name: String,
}

fn default_project_name() -> String { "InnoRussian".to_string() }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: VocabularyStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub media:  Arc<MediaStore>,
}

impl<S: VocabularyStore> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Self {
    let media = MediaStore::new(&config.media_root);
    Self {
      store:  Arc::new(store),
      config: Arc::new(config),
      media:  Arc::new(media),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the InnoRussian server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: VocabularyStore + Clone + 'static,
{
  Router::new()
    // Browsing
    .route("/categories", get(browse::categories::<S>))
    .route("/categories/{id}/subcategories", get(browse::subcategories::<S>))
    .route("/subcategories/{id}/cards", get(browse::cards::<S>))
    .route("/cards/{id}", get(browse::card::<S>))
    // Favourites
    .route("/favourites", get(favourites::list::<S>))
    .route(
      "/favourites/{card_id}",
      post(favourites::add::<S>).delete(favourites::remove::<S>),
    )
    // Search
    .route("/search", get(search::handler::<S>))
    // Accounts
    .route("/users", post(users::sign_up::<S>))
    .route("/users/me", get(users::me::<S>).delete(users::delete_me::<S>))
    // Content management
    .route("/admin/categories", post(admin::create_category::<S>))
    .route("/admin/categories/{id}", delete(admin::delete_category::<S>))
    .route("/admin/subcategories", post(admin::create_subcategory::<S>))
    .route("/admin/subcategories/{id}", delete(admin::delete_subcategory::<S>))
    .route("/admin/cards", post(admin::create_card::<S>))
    .route("/admin/cards/{id}", delete(admin::delete_card::<S>))
    .route("/health", get(health::handler::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests;
