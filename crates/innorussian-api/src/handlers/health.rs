//! `GET /health`: liveness probe.

use axum::{Json, extract::State};
use innorussian_core::store::VocabularyStore;
use serde_json::{Value, json};

use crate::AppState;

pub async fn handler<S>(State(state): State<AppState<S>>) -> Json<Value>
where
  S: VocabularyStore + Clone + 'static,
{
  Json(json!({ "status": "ok", "project": state.config.project_name }))
}
