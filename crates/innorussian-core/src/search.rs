//! Section bookkeeping for the global search.
//!
//! A global search runs one text filter per entity kind. Each kind that
//! yields at least one match becomes a "found" section; the others are "not
//! found". The caller picks which found section is shown first.

use serde::{Serialize, Serializer};

use crate::query::SortOption;

/// One block of the global search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
  Cards,
  Categories,
  SubCategories,
}

impl Section {
  /// All sections, in the order the search options list them.
  pub const ALL: [Section; 3] =
    [Section::Cards, Section::Categories, Section::SubCategories];

  /// The fixed order in which the kinds are scanned.
  pub const SCAN_ORDER: [Section; 3] =
    [Section::Categories, Section::SubCategories, Section::Cards];

  pub fn code(self) -> &'static str {
    match self {
      Self::Cards => "CR",
      Self::Categories => "CT",
      Self::SubCategories => "SB",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Cards => "Cards",
      Self::Categories => "Categories",
      Self::SubCategories => "Subcategories",
    }
  }
}

impl Serialize for Section {
  fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    SortOption { code: self.code(), label: self.label() }.serialize(s)
  }
}

/// Which section the user wants first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchSort {
  /// Found sections in scan order.
  #[default]
  Default,
  First(Section),
}

/// Every search sort directive, in the order they are offered.
pub const SEARCH_SORT_OPTIONS: [SearchSort; 4] = [
  SearchSort::Default,
  SearchSort::First(Section::Cards),
  SearchSort::First(Section::Categories),
  SearchSort::First(Section::SubCategories),
];

impl SearchSort {
  pub fn code(self) -> &'static str {
    match self {
      Self::Default => "DF",
      Self::First(section) => section.code(),
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Default => "Default",
      Self::First(section) => section.label(),
    }
  }

  /// Resolve a wire code against [`SEARCH_SORT_OPTIONS`], falling back to
  /// [`SearchSort::Default`].
  pub fn from_code(code: Option<&str>) -> Self {
    code
      .and_then(|c| SEARCH_SORT_OPTIONS.into_iter().find(|o| o.code() == c))
      .unwrap_or_default()
  }

  fn priority(self) -> Option<Section> {
    match self {
      Self::Default => None,
      Self::First(section) => Some(section),
    }
  }
}

impl Serialize for SearchSort {
  fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    SortOption { code: self.code(), label: self.label() }.serialize(s)
  }
}

/// Per-section presence of matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hits {
  pub cards:         bool,
  pub categories:    bool,
  pub subcategories: bool,
}

impl Hits {
  pub fn has(&self, section: Section) -> bool {
    match section {
      Section::Cards => self.cards,
      Section::Categories => self.categories,
      Section::SubCategories => self.subcategories,
    }
  }
}

/// Rendering order of the global search sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionPlan {
  /// Sections with matches, duplicate-free, in display order.
  pub found:     Vec<Section>,
  /// Sections without matches, in [`Section::ALL`] order.
  pub not_found: Vec<Section>,
}

impl SectionPlan {
  /// Order the sections that have hits.
  ///
  /// The requested section leads, but only when it has matches of its own.
  /// The rest follow in scan order.
  pub fn new(sort: SearchSort, hits: Hits) -> Self {
    let mut found = Vec::with_capacity(Section::ALL.len());
    if let Some(first) = sort.priority().filter(|s| hits.has(*s)) {
      found.push(first);
    }
    for section in Section::SCAN_ORDER {
      if hits.has(section) && !found.contains(&section) {
        found.push(section);
      }
    }
    let not_found = Section::ALL
      .into_iter()
      .filter(|s| !found.contains(s))
      .collect();
    Self { found, not_found }
  }

  /// The plan for a search that never ran: nothing found.
  pub fn empty() -> Self { Self::new(SearchSort::Default, Hits::default()) }
}
