//! Text filtering and card ordering.
//!
//! Everything here is a pure transform over already-fetched records; the
//! store decides what the base collection is, these functions decide what
//! survives and in which order.

use serde::{Serialize, Serializer};

use crate::model::{Card, CardKind, Category, SubCategory};

// ─── Text query ──────────────────────────────────────────────────────────────

/// A trimmed free-text query. An empty query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextQuery {
  raw:    String,
  folded: String,
}

impl TextQuery {
  /// Trim `q`; `None` and whitespace-only input give the empty query.
  pub fn parse(q: Option<&str>) -> Self {
    let raw = q.map(str::trim).unwrap_or_default().to_owned();
    let folded = raw.to_lowercase();
    Self { raw, folded }
  }

  pub fn is_empty(&self) -> bool { self.raw.is_empty() }

  /// The trimmed query as the user typed it.
  pub fn as_str(&self) -> &str { &self.raw }

  /// Case-insensitive substring test. Always true for the empty query.
  pub fn matches(&self, haystack: &str) -> bool {
    self.is_empty() || haystack.to_lowercase().contains(&self.folded)
  }

  /// Whether `card` matches on its content or its transliteration.
  pub fn matches_card(&self, card: &Card) -> bool {
    self.matches(&card.content)
      || card.transliteration.as_deref().is_some_and(|t| self.matches(t))
  }
}

/// Something filtered by its display name.
pub trait Named {
  fn name(&self) -> &str;
}

impl Named for Category {
  fn name(&self) -> &str { &self.name }
}

impl Named for SubCategory {
  fn name(&self) -> &str { &self.name }
}

/// Keep the items whose name contains `q`. Order is preserved.
pub fn filter_named<T: Named>(items: Vec<T>, q: &TextQuery) -> Vec<T> {
  if q.is_empty() {
    return items;
  }
  items.into_iter().filter(|i| q.matches(i.name())).collect()
}

/// Keep the cards whose content or transliteration contains `q`. Order is
/// preserved.
pub fn filter_cards(cards: Vec<Card>, q: &TextQuery) -> Vec<Card> {
  if q.is_empty() {
    return cards;
  }
  cards.into_iter().filter(|c| q.matches_card(c)).collect()
}

// ─── Card sort directive ─────────────────────────────────────────────────────

/// User-selected ordering of a card listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CardSort {
  /// Most recently created first.
  #[default]
  Default,
  /// Cards of this kind first, then the rest; both newest first.
  Kind(CardKind),
}

/// Every card sort directive, in the order they are offered.
pub const CARD_SORT_OPTIONS: [CardSort; 4] = [
  CardSort::Default,
  CardSort::Kind(CardKind::Word),
  CardSort::Kind(CardKind::Dialogue),
  CardSort::Kind(CardKind::Sentence),
];

impl CardSort {
  pub fn code(self) -> &'static str {
    match self {
      Self::Default => "DD",
      Self::Kind(kind) => kind.code(),
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Default => "Default",
      Self::Kind(kind) => kind.label(),
    }
  }

  /// Resolve a wire code against [`CARD_SORT_OPTIONS`]. Unknown or missing
  /// codes fall back to [`CardSort::Default`].
  pub fn from_code(code: Option<&str>) -> Self {
    code
      .and_then(|c| CARD_SORT_OPTIONS.into_iter().find(|o| o.code() == c))
      .unwrap_or_default()
  }
}

impl Serialize for CardSort {
  fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    SortOption { code: self.code(), label: self.label() }.serialize(s)
  }
}

/// Wire form of a sort directive: `{"code": "W", "label": "Word"}`.
#[derive(Serialize)]
pub(crate) struct SortOption {
  pub code:  &'static str,
  pub label: &'static str,
}

/// Order `cards` by `sort`.
///
/// `Default` orders by descending id. A kind directive is a two-bucket stable
/// partition: matching kind first, then everything else, each bucket by
/// descending id.
pub fn sort_cards(cards: &mut [Card], sort: CardSort) {
  match sort {
    CardSort::Default => cards.sort_by(|a, b| b.id.cmp(&a.id)),
    CardSort::Kind(kind) => cards.sort_by(|a, b| {
      (a.kind != kind)
        .cmp(&(b.kind != kind))
        .then_with(|| b.id.cmp(&a.id))
    }),
  }
}
