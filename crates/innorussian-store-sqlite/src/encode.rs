//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that they sort lexically. Card kinds are stored as their one-letter
//! codes.

use chrono::{DateTime, SecondsFormat, Utc};
use innorussian_core::model::{
  Card, CardId, CardKind, Favourite, FavouriteId, User, UserId,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── CardKind ────────────────────────────────────────────────────────────────

pub fn encode_kind(k: CardKind) -> &'static str { k.code() }

pub fn decode_kind(s: &str) -> Result<CardKind> {
  CardKind::from_code(s).ok_or_else(|| Error::UnknownKind(s.to_owned()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `cards` row.
pub struct RawCard {
  pub card_id:         i64,
  pub content:         String,
  pub kind:            String,
  pub pronunciation:   Option<String>,
  pub transliteration: Option<String>,
}

impl RawCard {
  pub const COLUMNS: &'static str =
    "card_id, content, kind, pronunciation, transliteration";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawCard {
      card_id:         row.get(0)?,
      content:         row.get(1)?,
      kind:            row.get(2)?,
      pronunciation:   row.get(3)?,
      transliteration: row.get(4)?,
    })
  }

  pub fn into_card(self) -> Result<Card> {
    Ok(Card {
      id:              CardId(self.card_id),
      content:         self.content,
      kind:            decode_kind(&self.kind)?,
      pronunciation:   self.pronunciation,
      transliteration: self.transliteration,
    })
  }
}

/// Raw values read directly from a `favourites` row.
pub struct RawFavourite {
  pub favourite_id: i64,
  pub card_id:      i64,
  pub owner_id:     i64,
  pub added_at:     String,
}

impl RawFavourite {
  pub fn into_favourite(self) -> Result<Favourite> {
    Ok(Favourite {
      id:       FavouriteId(self.favourite_id),
      card_id:  CardId(self.card_id),
      owner_id: UserId(self.owner_id),
      added_at: decode_dt(&self.added_at)?,
    })
  }
}

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:       i64,
  pub email:         String,
  pub password_hash: String,
  pub is_staff:      bool,
  pub is_active:     bool,
  pub joined_at:     String,
}

impl RawUser {
  pub fn into_parts(self) -> Result<(User, String)> {
    let user = User {
      id:        UserId(self.user_id),
      email:     self.email,
      is_staff:  self.is_staff,
      is_active: self.is_active,
      joined_at: decode_dt(&self.joined_at)?,
    };
    Ok((user, self.password_hash))
  }
}
