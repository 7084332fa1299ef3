//! Domain records for the vocabulary catalog.
//!
//! Users browse content sequentially: category, then subcategory, then the
//! cards of that subcategory. Categories and subcategories, and subcategories
//! and cards, are many-to-many.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Identifiers ─────────────────────────────────────────────────────────────

macro_rules! id_type {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
      Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
      }
    }
  };
}

id_type!(
  /// Row identifier of a [`Category`].
  CategoryId
);
id_type!(
  /// Row identifier of a [`SubCategory`].
  SubCategoryId
);
id_type!(
  /// Row identifier of a [`Card`]. Higher means more recently created.
  CardId
);
id_type!(UserId);
id_type!(FavouriteId);

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// A top-level grouping, e.g. "Food" or "Travel".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub id:      CategoryId,
  /// Globally unique.
  pub name:    String,
  /// Path of the `.svg` picture relative to the media root.
  pub picture: String,
}

/// A grouping of cards, attached to one or more categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCategory {
  pub id:           SubCategoryId,
  /// Globally unique.
  pub name:         String,
  pub picture:      String,
  pub category_ids: Vec<CategoryId>,
}

/// What a card's content is; also the basis of the card sort directives.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum CardKind {
  #[default]
  #[serde(rename = "W")]
  Word,
  #[serde(rename = "D")]
  Dialogue,
  #[serde(rename = "S")]
  Sentence,
}

impl CardKind {
  pub const ALL: [CardKind; 3] =
    [CardKind::Word, CardKind::Dialogue, CardKind::Sentence];

  /// The one-letter code used on the wire and in storage.
  pub fn code(self) -> &'static str {
    match self {
      Self::Word => "W",
      Self::Dialogue => "D",
      Self::Sentence => "S",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Word => "Word",
      Self::Dialogue => "Dialogue",
      Self::Sentence => "Sentence",
    }
  }

  pub fn from_code(code: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|k| k.code() == code)
  }
}

/// A single flashcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
  pub id:              CardId,
  pub content:         String,
  pub kind:            CardKind,
  /// Path of the `.mp3` recording relative to the media root.
  pub pronunciation:   Option<String>,
  /// Latin-script rendering of the pronunciation.
  pub transliteration: Option<String>,
}

/// A card annotated with the current user's favourite status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggedCard {
  #[serde(flatten)]
  pub card:      Card,
  pub favourite: bool,
}

// ─── Users and favourites ────────────────────────────────────────────────────

/// An account. Credentials live only in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:        UserId,
  pub email:     String,
  pub is_staff:  bool,
  pub is_active: bool,
  pub joined_at: DateTime<Utc>,
}

/// A user's bookmark of a card. At most one per `(card_id, owner_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favourite {
  pub id:       FavouriteId,
  pub card_id:  CardId,
  pub owner_id: UserId,
  pub added_at: DateTime<Utc>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::VocabularyStore::add_category`].
#[derive(Debug, Clone)]
pub struct NewCategory {
  pub name:    String,
  pub picture: String,
}

/// Input to [`crate::store::VocabularyStore::add_subcategory`].
#[derive(Debug, Clone)]
pub struct NewSubCategory {
  pub name:         String,
  pub picture:      String,
  pub category_ids: Vec<CategoryId>,
}

/// Input to [`crate::store::VocabularyStore::add_card`].
#[derive(Debug, Clone)]
pub struct NewCard {
  pub content:         String,
  pub kind:            CardKind,
  pub pronunciation:   Option<String>,
  pub transliteration: Option<String>,
  pub subcategory_ids: Vec<SubCategoryId>,
}

impl NewCard {
  /// A card with no recording, transliteration or subcategory.
  pub fn new(content: impl Into<String>, kind: CardKind) -> Self {
    Self {
      content: content.into(),
      kind,
      pronunciation: None,
      transliteration: None,
      subcategory_ids: Vec::new(),
    }
  }
}

/// Input to [`crate::store::VocabularyStore::add_user`].
/// `password_hash` is an argon2 PHC string; plain passwords never reach the
/// store.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  pub password_hash: String,
  pub is_staff:      bool,
}
