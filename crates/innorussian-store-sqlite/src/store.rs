//! [`SqliteStore`], the SQLite implementation of [`VocabularyStore`].

use std::{collections::HashMap, path::Path};

use chrono::Utc;
use innorussian_core::{
  Error as CoreError,
  model::{
    Card, CardId, Category, CategoryId, Favourite, FavouriteId, NewCard,
    NewCategory, NewSubCategory, NewUser, SubCategory, SubCategoryId, User,
    UserId,
  },
  query::{self, TextQuery},
  store::{UserCredentials, VocabularyStore},
};
use rusqlite::OptionalExtension as _;

use crate::{
  Result,
  encode::{RawCard, RawFavourite, RawUser, encode_dt, encode_kind},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An InnoRussian store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Outcome of a write that may hit a uniqueness or existence rule.
/// Decided inside the connection closure, mapped to a domain error outside.
enum Write<T> {
  Done(T),
  Duplicate,
  MissingParent(i64),
  Missing,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `SELECT 1 FROM <table> WHERE <column> = ?1`.
  async fn exists(&self, table: &'static str, column: &'static str, id: i64) -> Result<bool> {
    let found = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT 1 FROM {table} WHERE {column} = ?1 LIMIT 1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], |_| Ok(true))
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(found)
  }

  async fn all_cards(&self) -> Result<Vec<Card>> {
    let raws: Vec<RawCard> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM cards ORDER BY card_id DESC",
          RawCard::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], RawCard::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawCard::into_card).collect()
  }
}

/// Load subcategory rows, optionally restricted to one category, with their
/// category links attached.
fn query_subcategories(
  conn: &rusqlite::Connection,
  category: Option<i64>,
  only: Option<i64>,
) -> rusqlite::Result<Vec<SubCategory>> {
  let mut stmt = conn.prepare(
    "SELECT s.subcategory_id, s.name, s.picture
     FROM subcategories s
     WHERE (?1 IS NULL OR EXISTS (
              SELECT 1 FROM category_subcategories cs
              WHERE cs.subcategory_id = s.subcategory_id AND cs.category_id = ?1))
       AND (?2 IS NULL OR s.subcategory_id = ?2)
     ORDER BY s.subcategory_id",
  )?;
  let mut subs = stmt
    .query_map(rusqlite::params![category, only], |row| {
      Ok(SubCategory {
        id:           SubCategoryId(row.get(0)?),
        name:         row.get(1)?,
        picture:      row.get(2)?,
        category_ids: Vec::new(),
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut links: HashMap<i64, Vec<CategoryId>> = HashMap::new();
  let mut stmt = conn.prepare(
    "SELECT subcategory_id, category_id FROM category_subcategories
     ORDER BY category_id",
  )?;
  let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?;
  for row in rows {
    let (sub, cat) = row?;
    links.entry(sub).or_default().push(CategoryId(cat));
  }

  for sub in &mut subs {
    sub.category_ids = links.remove(&sub.id.0).unwrap_or_default();
  }
  Ok(subs)
}

fn query_categories(conn: &rusqlite::Connection) -> rusqlite::Result<Vec<Category>> {
  let mut stmt = conn.prepare(
    "SELECT category_id, name, picture FROM categories ORDER BY category_id",
  )?;
  stmt
    .query_map([], |row| {
      Ok(Category {
        id:      CategoryId(row.get(0)?),
        name:    row.get(1)?,
        picture: row.get(2)?,
      })
    })?
    .collect()
}

// ─── VocabularyStore impl ────────────────────────────────────────────────────

impl VocabularyStore for SqliteStore {
  type Error = crate::Error;

  // ── Categories ────────────────────────────────────────────────────────────

  async fn list_categories(&self) -> Result<Vec<Category>> {
    Ok(self.conn.call(|conn| Ok(query_categories(conn)?)).await?)
  }

  async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
    let category = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT category_id, name, picture FROM categories WHERE category_id = ?1",
              rusqlite::params![id.0],
              |row| {
                Ok(Category {
                  id:      CategoryId(row.get(0)?),
                  name:    row.get(1)?,
                  picture: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(category)
  }

  async fn search_categories(&self, q: &TextQuery) -> Result<Vec<Category>> {
    // SQLite's LIKE only folds ASCII; match in Rust so Cyrillic folds too.
    let all = self.list_categories().await?;
    Ok(query::filter_named(all, q))
  }

  async fn add_category(&self, input: NewCategory) -> Result<Category> {
    let name = input.name.clone();
    let outcome = self
      .conn
      .call(move |conn| {
        let taken = conn
          .query_row(
            "SELECT 1 FROM categories WHERE name = ?1",
            rusqlite::params![input.name],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(Write::Duplicate);
        }
        conn.execute(
          "INSERT INTO categories (name, picture) VALUES (?1, ?2)",
          rusqlite::params![input.name, input.picture],
        )?;
        Ok(Write::Done(Category {
          id:      CategoryId(conn.last_insert_rowid()),
          name:    input.name,
          picture: input.picture,
        }))
      })
      .await?;

    match outcome {
      Write::Done(category) => {
        tracing::debug!(category_id = %category.id, "category created");
        Ok(category)
      }
      _ => Err(CoreError::DuplicateName(name).into()),
    }
  }

  async fn set_category_picture(&self, id: CategoryId, picture: String) -> Result<()> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE categories SET picture = ?1 WHERE category_id = ?2",
          rusqlite::params![picture, id.0],
        )?)
      })
      .await?;
    if changed == 0 {
      return Err(CoreError::CategoryNotFound(id).into());
    }
    Ok(())
  }

  async fn delete_category(&self, id: CategoryId) -> Result<()> {
    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM category_subcategories WHERE category_id = ?1",
          rusqlite::params![id.0],
        )?;
        let n = tx.execute(
          "DELETE FROM categories WHERE category_id = ?1",
          rusqlite::params![id.0],
        )?;
        tx.commit()?;
        Ok(n)
      })
      .await?;
    if deleted == 0 {
      return Err(CoreError::CategoryNotFound(id).into());
    }
    tracing::info!(category_id = %id, "category deleted");
    Ok(())
  }

  // ── Subcategories ─────────────────────────────────────────────────────────

  async fn list_subcategories(
    &self,
    category: Option<CategoryId>,
  ) -> Result<Vec<SubCategory>> {
    let category = category.map(|c| c.0);
    Ok(
      self
        .conn
        .call(move |conn| Ok(query_subcategories(conn, category, None)?))
        .await?,
    )
  }

  async fn get_subcategory(&self, id: SubCategoryId) -> Result<Option<SubCategory>> {
    let mut subs = self
      .conn
      .call(move |conn| Ok(query_subcategories(conn, None, Some(id.0))?))
      .await?;
    Ok(subs.pop())
  }

  async fn subcategory_has_cards(&self, id: SubCategoryId) -> Result<bool> {
    self.exists("card_subcategories", "subcategory_id", id.0).await
  }

  async fn search_subcategories(&self, q: &TextQuery) -> Result<Vec<SubCategory>> {
    let all = self.list_subcategories(None).await?;
    Ok(query::filter_named(all, q))
  }

  async fn add_subcategory(&self, input: NewSubCategory) -> Result<SubCategory> {
    let name = input.name.clone();
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken = tx
          .query_row(
            "SELECT 1 FROM subcategories WHERE name = ?1",
            rusqlite::params![input.name],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(Write::Duplicate);
        }
        for cat in &input.category_ids {
          let known = tx
            .query_row(
              "SELECT 1 FROM categories WHERE category_id = ?1",
              rusqlite::params![cat.0],
              |_| Ok(()),
            )
            .optional()?
            .is_some();
          if !known {
            return Ok(Write::MissingParent(cat.0));
          }
        }
        tx.execute(
          "INSERT INTO subcategories (name, picture) VALUES (?1, ?2)",
          rusqlite::params![input.name, input.picture],
        )?;
        let id = tx.last_insert_rowid();
        for cat in &input.category_ids {
          tx.execute(
            "INSERT OR IGNORE INTO category_subcategories (category_id, subcategory_id)
             VALUES (?1, ?2)",
            rusqlite::params![cat.0, id],
          )?;
        }
        tx.commit()?;

        let mut category_ids = input.category_ids;
        category_ids.sort();
        category_ids.dedup();
        Ok(Write::Done(SubCategory {
          id: SubCategoryId(id),
          name: input.name,
          picture: input.picture,
          category_ids,
        }))
      })
      .await?;

    match outcome {
      Write::Done(sub) => {
        tracing::debug!(subcategory_id = %sub.id, "subcategory created");
        Ok(sub)
      }
      Write::MissingParent(cat) => Err(CoreError::CategoryNotFound(CategoryId(cat)).into()),
      Write::Duplicate | Write::Missing => Err(CoreError::DuplicateName(name).into()),
    }
  }

  async fn set_subcategory_picture(
    &self,
    id: SubCategoryId,
    picture: String,
  ) -> Result<()> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE subcategories SET picture = ?1 WHERE subcategory_id = ?2",
          rusqlite::params![picture, id.0],
        )?)
      })
      .await?;
    if changed == 0 {
      return Err(CoreError::SubCategoryNotFound(id).into());
    }
    Ok(())
  }

  async fn delete_subcategory(&self, id: SubCategoryId) -> Result<()> {
    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM category_subcategories WHERE subcategory_id = ?1",
          rusqlite::params![id.0],
        )?;
        tx.execute(
          "DELETE FROM card_subcategories WHERE subcategory_id = ?1",
          rusqlite::params![id.0],
        )?;
        let n = tx.execute(
          "DELETE FROM subcategories WHERE subcategory_id = ?1",
          rusqlite::params![id.0],
        )?;
        tx.commit()?;
        Ok(n)
      })
      .await?;
    if deleted == 0 {
      return Err(CoreError::SubCategoryNotFound(id).into());
    }
    tracing::info!(subcategory_id = %id, "subcategory deleted");
    Ok(())
  }

  // ── Cards ─────────────────────────────────────────────────────────────────

  async fn list_cards(&self, subcategory: Option<SubCategoryId>) -> Result<Vec<Card>> {
    let Some(sub) = subcategory else {
      return self.all_cards().await;
    };

    let raws: Vec<RawCard> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT c.card_id, c.content, c.kind, c.pronunciation, c.transliteration
           FROM cards c
           JOIN card_subcategories cs ON cs.card_id = c.card_id
           WHERE cs.subcategory_id = ?1
           ORDER BY c.card_id DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![sub.0], RawCard::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCard::into_card).collect()
  }

  async fn get_card(&self, id: CardId) -> Result<Option<Card>> {
    let raw: Option<RawCard> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM cards WHERE card_id = ?1", RawCard::COLUMNS),
              rusqlite::params![id.0],
              RawCard::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawCard::into_card).transpose()
  }

  async fn get_cards(&self, ids: &[CardId]) -> Result<Vec<Card>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let ids: Vec<i64> = ids.iter().map(|c| c.0).collect();

    let raws: Vec<RawCard> = self
      .conn
      .call(move |conn| {
        let placeholders = vec!["?"; ids.len()].join(", ");
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM cards WHERE card_id IN ({placeholders})",
          RawCard::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(ids.iter()), RawCard::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCard::into_card).collect()
  }

  async fn card_exists(&self, id: CardId) -> Result<bool> {
    self.exists("cards", "card_id", id.0).await
  }

  async fn search_cards(&self, q: &TextQuery) -> Result<Vec<Card>> {
    let all = self.all_cards().await?;
    Ok(query::filter_cards(all, q))
  }

  async fn add_card(&self, input: NewCard) -> Result<Card> {
    let kind = encode_kind(input.kind);
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for sub in &input.subcategory_ids {
          let known = tx
            .query_row(
              "SELECT 1 FROM subcategories WHERE subcategory_id = ?1",
              rusqlite::params![sub.0],
              |_| Ok(()),
            )
            .optional()?
            .is_some();
          if !known {
            return Ok(Err(*sub));
          }
        }
        tx.execute(
          "INSERT INTO cards (content, kind, pronunciation, transliteration)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            input.content,
            kind,
            input.pronunciation,
            input.transliteration,
          ],
        )?;
        let id = tx.last_insert_rowid();
        for sub in &input.subcategory_ids {
          tx.execute(
            "INSERT OR IGNORE INTO card_subcategories (card_id, subcategory_id)
             VALUES (?1, ?2)",
            rusqlite::params![id, sub.0],
          )?;
        }
        tx.commit()?;
        Ok(Ok(Card {
          id:              CardId(id),
          content:         input.content,
          kind:            input.kind,
          pronunciation:   input.pronunciation,
          transliteration: input.transliteration,
        }))
      })
      .await?;

    match outcome {
      Ok(card) => {
        tracing::debug!(card_id = %card.id, "card created");
        Ok(card)
      }
      Err(sub) => Err(CoreError::SubCategoryNotFound(sub).into()),
    }
  }

  async fn set_card_pronunciation(
    &self,
    id: CardId,
    pronunciation: Option<String>,
  ) -> Result<()> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE cards SET pronunciation = ?1 WHERE card_id = ?2",
          rusqlite::params![pronunciation, id.0],
        )?)
      })
      .await?;
    if changed == 0 {
      return Err(CoreError::CardNotFound(id).into());
    }
    Ok(())
  }

  async fn delete_card(&self, id: CardId) -> Result<()> {
    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM card_subcategories WHERE card_id = ?1",
          rusqlite::params![id.0],
        )?;
        tx.execute("DELETE FROM favourites WHERE card_id = ?1", rusqlite::params![id.0])?;
        let n = tx.execute("DELETE FROM cards WHERE card_id = ?1", rusqlite::params![id.0])?;
        tx.commit()?;
        Ok(n)
      })
      .await?;
    if deleted == 0 {
      return Err(CoreError::CardNotFound(id).into());
    }
    tracing::info!(card_id = %id, "card deleted");
    Ok(())
  }

  // ── Favourites ────────────────────────────────────────────────────────────

  async fn favourites_of(&self, owner: UserId) -> Result<Vec<Favourite>> {
    let raws: Vec<RawFavourite> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT favourite_id, card_id, owner_id, added_at
           FROM favourites
           WHERE owner_id = ?1
           ORDER BY added_at DESC, favourite_id DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![owner.0], |row| {
            Ok(RawFavourite {
              favourite_id: row.get(0)?,
              card_id:      row.get(1)?,
              owner_id:     row.get(2)?,
              added_at:     row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFavourite::into_favourite).collect()
  }

  async fn add_favourite(&self, owner: UserId, card: CardId) -> Result<Favourite> {
    let added_at = Utc::now();
    let at_str = encode_dt(added_at);

    let outcome = self
      .conn
      .call(move |conn| {
        let known = conn
          .query_row(
            "SELECT 1 FROM cards WHERE card_id = ?1",
            rusqlite::params![card.0],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !known {
          return Ok(Write::Missing);
        }
        // The UNIQUE (card_id, owner_id) constraint makes this atomic.
        let inserted = conn.execute(
          "INSERT OR IGNORE INTO favourites (card_id, owner_id, added_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![card.0, owner.0, at_str],
        )?;
        if inserted == 0 {
          return Ok(Write::Duplicate);
        }
        Ok(Write::Done(conn.last_insert_rowid()))
      })
      .await?;

    match outcome {
      Write::Done(id) => Ok(Favourite {
        id: FavouriteId(id),
        card_id: card,
        owner_id: owner,
        added_at,
      }),
      Write::Duplicate => Err(CoreError::AlreadyFavourite(card).into()),
      Write::Missing | Write::MissingParent(_) => Err(CoreError::CardNotFound(card).into()),
    }
  }

  async fn remove_favourite(&self, owner: UserId, card: CardId) -> Result<()> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM favourites WHERE card_id = ?1 AND owner_id = ?2",
          rusqlite::params![card.0, owner.0],
        )?)
      })
      .await?;
    if removed == 0 {
      return Err(CoreError::NotFavourite(card).into());
    }
    Ok(())
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let joined_at = Utc::now();
    let at_str = encode_dt(joined_at);
    let email = input.email.clone();
    let is_staff = input.is_staff;

    let outcome = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT OR IGNORE INTO users (email, password_hash, is_staff, is_active, joined_at)
           VALUES (?1, ?2, ?3, 1, ?4)",
          rusqlite::params![input.email, input.password_hash, input.is_staff, at_str],
        )?;
        if inserted == 0 {
          return Ok(Write::Duplicate);
        }
        Ok(Write::Done(conn.last_insert_rowid()))
      })
      .await?;

    match outcome {
      Write::Done(id) => Ok(User {
        id: UserId(id),
        email,
        is_staff,
        is_active: true,
        joined_at,
      }),
      _ => Err(CoreError::DuplicateEmail(email).into()),
    }
  }

  async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>> {
    let email = email.to_owned();
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, email, password_hash, is_staff, is_active, joined_at
               FROM users WHERE email = ?1",
              rusqlite::params![email],
              |row| {
                Ok(RawUser {
                  user_id:       row.get(0)?,
                  email:         row.get(1)?,
                  password_hash: row.get(2)?,
                  is_staff:      row.get(3)?,
                  is_active:     row.get(4)?,
                  joined_at:     row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    let Some(raw) = raw else {
      return Ok(None);
    };
    let (user, password_hash) = raw.into_parts()?;
    Ok(Some(UserCredentials { user, password_hash }))
  }

  async fn delete_user(&self, id: UserId) -> Result<()> {
    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM favourites WHERE owner_id = ?1", rusqlite::params![id.0])?;
        let n = tx.execute("DELETE FROM users WHERE user_id = ?1", rusqlite::params![id.0])?;
        tx.commit()?;
        Ok(n)
      })
      .await?;
    if deleted == 0 {
      return Err(CoreError::UserNotFound(id).into());
    }
    tracing::info!(user_id = %id, "user deleted");
    Ok(())
  }
}
