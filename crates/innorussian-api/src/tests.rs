//! Router tests driving the full stack: extractors, handlers, catalog
//! functions and an in-memory SQLite store.

use axum::{
  body::Body,
  http::{Method, Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use innorussian_core::{
  model::{CardKind, NewCard, NewCategory, NewSubCategory, NewUser, SubCategoryId},
  store::VocabularyStore,
};
use innorussian_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt as _;

use crate::{AppState, ServerConfig, auth::hash_password, router};

const PASSWORD: &str = "correct horse";

struct Harness {
  state: AppState<SqliteStore>,
  media: TempDir,
}

async fn harness() -> Harness {
  let media = tempfile::tempdir().unwrap();
  let store = SqliteStore::open_in_memory().await.unwrap();
  let config = ServerConfig {
    host:         "127.0.0.1".to_string(),
    port:         8000,
    store_path:   ":memory:".into(),
    media_root:   media.path().to_path_buf(),
    project_name: "InnoRussian".to_string(),
  };
  Harness { state: AppState::new(store, config), media }
}

impl Harness {
  fn store(&self) -> &SqliteStore { &self.state.store }

  async fn user(&self, email: &str, is_staff: bool) {
    self
      .store()
      .add_user(NewUser {
        email: email.into(),
        password_hash: hash_password(PASSWORD).unwrap(),
        is_staff,
      })
      .await
      .unwrap();
  }

  /// Food with a Fruit subcategory holding three cards (ids 1..=3).
  async fn seed(&self) -> SubCategoryId {
    let s = self.store();
    let food = s
      .add_category(NewCategory { name: "Food".into(), picture: String::new() })
      .await
      .unwrap();
    let fruit = s
      .add_subcategory(NewSubCategory {
        name:         "Fruit".into(),
        picture:      String::new(),
        category_ids: vec![food.id],
      })
      .await
      .unwrap();
    for (content, kind) in [
      ("яблоко", CardKind::Word),
      ("Можно яблоко?", CardKind::Dialogue),
      ("груша", CardKind::Word),
    ] {
      s.add_card(NewCard {
        subcategory_ids: vec![fruit.id],
        ..NewCard::new(content, kind)
      })
      .await
      .unwrap();
    }
    fruit.id
  }

  async fn send(
    &self,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(email) = auth {
      let encoded = B64.encode(format!("{email}:{PASSWORD}"));
      builder = builder.header(header::AUTHORIZATION, format!("Basic {encoded}"));
    }
    let req = match body {
      Some(json) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = router(self.state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn get(&self, uri: &str, auth: Option<&str>) -> (StatusCode, Value) {
    self.send(Method::GET, uri, auth, None).await
  }
}

fn ids(items: &Value) -> Vec<i64> {
  items
    .as_array()
    .unwrap()
    .iter()
    .map(|i| i["id"].as_i64().unwrap())
    .collect()
}

fn codes(sections: &Value) -> Vec<&str> {
  sections
    .as_array()
    .unwrap()
    .iter()
    .map(|s| s["code"].as_str().unwrap())
    .collect()
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_project() {
  let h = harness().await;
  let (status, body) = h.get("/health", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["project"], "InnoRussian");
}

// ── Browsing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn categories_are_paginated_by_six() {
  let h = harness().await;
  for i in 0..7 {
    h.store()
      .add_category(NewCategory { name: format!("C{i}"), picture: String::new() })
      .await
      .unwrap();
  }

  let (status, body) = h.get("/categories", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["items"].as_array().unwrap().len(), 6);
  assert_eq!(body["total_pages"], 2);
  assert_eq!(body["total_items"], 7);

  let (_, body) = h.get("/categories?page=2", None).await;
  assert_eq!(ids(&body["items"]), vec![7]);

  let (status, _) = h.get("/categories?page=3", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn category_filter_is_echoed() {
  let h = harness().await;
  h.seed().await;
  let (status, body) = h.get("/categories?q=%20fo%20", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["q"], "fo");
  assert_eq!(body["items"][0]["name"], "Food");
}

#[tokio::test]
async fn unknown_category_is_404() {
  let h = harness().await;
  let (status, body) = h.get("/categories/99/subcategories", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("99"));
}

#[tokio::test]
async fn empty_subcategory_is_404() {
  let h = harness().await;
  let empty = h
    .store()
    .add_subcategory(NewSubCategory {
      name:         "Empty".into(),
      picture:      String::new(),
      category_ids: Vec::new(),
    })
    .await
    .unwrap();

  let (status, _) = h.get(&format!("/subcategories/{}/cards", empty.id), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cards_sort_by_kind() {
  let h = harness().await;
  let fruit = h.seed().await;

  let (status, body) = h.get(&format!("/subcategories/{fruit}/cards?sort=W"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(ids(&body["items"]), vec![3, 1, 2]);
  assert_eq!(body["sorted_by"]["code"], "W");
  assert_eq!(body["sort_options"].as_array().unwrap().len(), 4);
  assert_eq!(body["subcategory"]["name"], "Fruit");

  let (_, body) = h.get(&format!("/subcategories/{fruit}/cards?sort=zz"), None).await;
  assert_eq!(ids(&body["items"]), vec![3, 2, 1]);
  assert_eq!(body["sorted_by"]["code"], "DD");
}

// ── Authentication ───────────────────────────────────────────────────────────

#[tokio::test]
async fn favourites_require_credentials() {
  let h = harness().await;
  let req = Request::builder().uri("/favourites").body(Body::empty()).unwrap();
  let resp = router(h.state.clone()).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn wrong_password_is_rejected_even_on_open_routes() {
  let h = harness().await;
  h.seed().await;
  h.user("anna@example.com", false).await;

  let encoded = B64.encode("anna@example.com:nope");
  let food = h.state.store.list_categories().await.unwrap()[0].id;
  for uri in [
    "/categories".to_string(),
    format!("/categories/{food}/subcategories"),
    "/search?q=apple".to_string(),
  ] {
    let req = Request::builder()
      .uri(&uri)
      .header(header::AUTHORIZATION, format!("Basic {encoded}"))
      .body(Body::empty())
      .unwrap();
    let resp = router(h.state.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri}");
  }
}

// ── Favourites ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn favourite_lifecycle() {
  let h = harness().await;
  let fruit = h.seed().await;
  let anna = Some("anna@example.com");
  h.user("anna@example.com", false).await;

  let (status, body) = h.send(Method::POST, "/favourites/2", anna, None).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["card_id"], 2);

  let (status, _) = h.send(Method::POST, "/favourites/2", anna, None).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, _) = h.send(Method::POST, "/favourites/99", anna, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (_, body) = h.get(&format!("/subcategories/{fruit}/cards"), anna).await;
  let tagged: Vec<bool> = body["items"]
    .as_array()
    .unwrap()
    .iter()
    .map(|c| c["favourite"].as_bool().unwrap())
    .collect();
  assert_eq!(tagged, vec![false, true, false]);

  let (status, body) = h.get("/favourites", anna).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(ids(&body["items"]), vec![2]);
  assert!(body.get("subcategory").is_none());

  let (status, _) = h.send(Method::DELETE, "/favourites/2", anna, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = h.send(Method::DELETE, "/favourites/2", anna, None).await;
  assert_eq!(status, StatusCode::GONE);
}

#[tokio::test]
async fn favourites_listing_filters_and_sorts() {
  let h = harness().await;
  h.seed().await;
  let anna = Some("anna@example.com");
  h.user("anna@example.com", false).await;
  for id in [1, 2, 3] {
    h.send(Method::POST, &format!("/favourites/{id}"), anna, None).await;
  }

  let (_, body) = h.get("/favourites?q=%D1%8F%D0%B1%D0%BB%D0%BE%D0%BA%D0%BE", anna).await;
  assert_eq!(ids(&body["items"]), vec![2, 1]);

  let (_, body) = h.get("/favourites?sort=D", anna).await;
  assert_eq!(ids(&body["items"])[0], 2);
}

#[tokio::test]
async fn single_card_is_tagged_for_its_owner() {
  let h = harness().await;
  h.seed().await;
  let anna = Some("anna@example.com");
  h.user("anna@example.com", false).await;
  h.send(Method::POST, "/favourites/1", anna, None).await;

  let (_, body) = h.get("/cards/1", anna).await;
  assert_eq!(body["favourite"], true);
  assert_eq!(body["kind"], "W");
  let (_, body) = h.get("/cards/1", None).await;
  assert_eq!(body["favourite"], false);
  let (status, _) = h.get("/cards/42", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Search ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_puts_requested_section_first() {
  let h = harness().await;
  h.seed().await;

  let (status, body) = h.get("/search?q=fr&sort=CR", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(codes(&body["found"]), vec!["SB"]);
  assert_eq!(codes(&body["not_found"]), vec!["CR", "CT"]);
  assert_eq!(body["sorted_by"]["code"], "CR");
  assert_eq!(body["sort_options"].as_array().unwrap().len(), 4);

  let (_, body) = h.get("/search?q=F&sort=SB", None).await;
  assert_eq!(codes(&body["found"]), vec!["SB", "CT"]);
}

#[tokio::test]
async fn blank_search_finds_nothing() {
  let h = harness().await;
  h.seed().await;

  let (status, body) = h.get("/search?q=%20%20", None).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["found"].as_array().unwrap().is_empty());
  assert_eq!(codes(&body["not_found"]), vec!["CR", "CT", "SB"]);
  assert!(body["cards"].as_array().unwrap().is_empty());
}

// ── Accounts ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sign_up_and_fetch_account() {
  let h = harness().await;

  let (status, _) = h
    .send(
      Method::POST,
      "/users",
      None,
      Some(json!({ "email": "anna@example.com", "password": "short" })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, body) = h
    .send(
      Method::POST,
      "/users",
      None,
      Some(json!({ "email": "anna@EXAMPLE.com", "password": PASSWORD })),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["email"], "anna@example.com");
  assert_eq!(body["is_staff"], false);
  assert!(body.get("password_hash").is_none());

  let (status, _) = h
    .send(
      Method::POST,
      "/users",
      None,
      Some(json!({ "email": "anna@example.com", "password": PASSWORD })),
    )
    .await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, body) = h.get("/users/me", Some("anna@example.com")).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["email"], "anna@example.com");
}

#[tokio::test]
async fn deleted_account_can_no_longer_sign_in() {
  let h = harness().await;
  h.user("anna@example.com", false).await;
  let anna = Some("anna@example.com");

  let (status, _) = h.send(Method::DELETE, "/users/me", anna, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = h.get("/users/me", anna).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ── Content management ───────────────────────────────────────────────────────

fn upload(filename: &str, bytes: &[u8]) -> Value {
  json!({ "filename": filename, "data": B64.encode(bytes) })
}

#[tokio::test]
async fn admin_routes_need_staff() {
  let h = harness().await;
  h.user("anna@example.com", false).await;

  let body = json!({ "name": "Food", "picture": upload("food.svg", b"<svg/>") });
  let (status, _) = h
    .send(Method::POST, "/admin/categories", Some("anna@example.com"), Some(body))
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn created_category_picture_is_renamed_to_id() {
  let h = harness().await;
  h.user("staff@example.com", true).await;
  let staff = Some("staff@example.com");

  let body = json!({ "name": "Food", "picture": upload("food.svg", b"<svg/>") });
  let (status, body) = h.send(Method::POST, "/admin/categories", staff, Some(body)).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["picture"], "categories/pictures/1.svg");
  assert!(h.media.path().join("categories/pictures/1.svg").exists());

  let stored = h.store().get_category(innorussian_core::model::CategoryId(1)).await.unwrap();
  assert_eq!(stored.unwrap().picture, "categories/pictures/1.svg");

  let dup = json!({ "name": "Food", "picture": upload("again.svg", b"<svg/>") });
  let (status, _) = h.send(Method::POST, "/admin/categories", staff, Some(dup)).await;
  assert_eq!(status, StatusCode::CONFLICT);
  let staged = std::fs::read_dir(h.media.path().join("categories/pictures")).unwrap().count();
  assert_eq!(staged, 1);
}

#[tokio::test]
async fn picture_must_be_svg() {
  let h = harness().await;
  h.user("staff@example.com", true).await;

  let body = json!({ "name": "Food", "picture": upload("food.png", b"PNG") });
  let (status, _) = h
    .send(Method::POST, "/admin/categories", Some("staff@example.com"), Some(body))
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn created_card_recording_is_renamed_and_card_can_be_deleted() {
  let h = harness().await;
  let fruit = h.seed().await;
  h.user("staff@example.com", true).await;
  let staff = Some("staff@example.com");

  let body = json!({
    "content": "слива",
    "kind": "W",
    "transliteration": "sliva",
    "pronunciation": upload("sliva.mp3", b"ID3"),
    "subcategory_ids": [fruit],
  });
  let (status, body) = h.send(Method::POST, "/admin/cards", staff, Some(body)).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["id"], 4);
  assert_eq!(body["pronunciation"], "cards/sounds/4.mp3");
  assert!(h.media.path().join("cards/sounds/4.mp3").exists());

  let (status, _) = h.send(Method::DELETE, "/admin/cards/4", staff, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = h.get("/cards/4", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = h.send(Method::DELETE, "/admin/cards/4", staff, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}
