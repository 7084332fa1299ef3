//! Read-side query functions and favourite bookkeeping.
//!
//! Each function takes the store, the caller's (optional) identity and the raw
//! request inputs, and returns a fully ordered result. HTTP status mapping is
//! left to the caller.

use serde::Serialize;

use crate::{
  Error, Result,
  favourites::{self, FavouriteSet},
  model::{
    Card, CardId, Category, CategoryId, Favourite, SubCategory, SubCategoryId,
    TaggedCard, UserId,
  },
  query::{self, CardSort, TextQuery},
  search::{Hits, SearchSort, SectionPlan},
  store::VocabularyStore,
};

// ─── Result types ────────────────────────────────────────────────────────────

/// Subcategories of one category.
#[derive(Debug, Clone, Serialize)]
pub struct SubCategoryListing {
  pub category:      Category,
  pub subcategories: Vec<SubCategory>,
}

/// An ordered card sequence with the sort directive actually applied.
#[derive(Debug, Clone, Serialize)]
pub struct CardListing {
  /// The subcategory the cards belong to; absent for the favourites view.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub subcategory: Option<SubCategory>,
  pub cards:       Vec<TaggedCard>,
  pub sorted_by:   CardSort,
}

/// Outcome of a global search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
  pub q:             String,
  pub sorted_by:     SearchSort,
  pub categories:    Vec<Category>,
  pub subcategories: Vec<SubCategory>,
  pub cards:         Vec<TaggedCard>,
  #[serde(flatten)]
  pub sections:      SectionPlan,
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

async fn favourite_set<S>(store: &S, user: Option<UserId>) -> Result<FavouriteSet>
where
  S: VocabularyStore,
{
  match user {
    Some(owner) => {
      let favs = store.favourites_of(owner).await.map_err(Into::into)?;
      Ok(FavouriteSet::from_favourites(&favs))
    }
    None => Ok(FavouriteSet::default()),
  }
}

// ─── Browsing ────────────────────────────────────────────────────────────────

/// All categories whose name contains `q`.
pub async fn categories<S>(store: &S, q: &TextQuery) -> Result<Vec<Category>>
where
  S: VocabularyStore,
{
  let all = store.list_categories().await.map_err(Into::into)?;
  Ok(query::filter_named(all, q))
}

/// Subcategories of `category` whose name contains `q`.
///
/// Returns [`Error::CategoryNotFound`] if the category does not exist.
pub async fn subcategories<S>(
  store: &S,
  category: CategoryId,
  q: &TextQuery,
) -> Result<SubCategoryListing>
where
  S: VocabularyStore,
{
  let category = store
    .get_category(category)
    .await
    .map_err(Into::into)?
    .ok_or(Error::CategoryNotFound(category))?;

  let subcategories = store
    .list_subcategories(Some(category.id))
    .await
    .map_err(Into::into)?;

  Ok(SubCategoryListing {
    category,
    subcategories: query::filter_named(subcategories, q),
  })
}

/// Cards of `subcategory`, filtered by `q` and ordered by `sort`. When `user`
/// is signed in each card carries its favourite flag.
///
/// A subcategory with no cards is reported as
/// [`Error::SubCategoryNotFound`], the same as one that does not exist.
pub async fn cards<S>(
  store: &S,
  subcategory: SubCategoryId,
  q: &TextQuery,
  sort: CardSort,
  user: Option<UserId>,
) -> Result<CardListing>
where
  S: VocabularyStore,
{
  if !store
    .subcategory_has_cards(subcategory)
    .await
    .map_err(Into::into)?
  {
    return Err(Error::SubCategoryNotFound(subcategory));
  }

  let scope = store
    .get_subcategory(subcategory)
    .await
    .map_err(Into::into)?
    .ok_or(Error::SubCategoryNotFound(subcategory))?;

  let all = store.list_cards(Some(subcategory)).await.map_err(Into::into)?;
  let mut found = query::filter_cards(all, q);
  query::sort_cards(&mut found, sort);

  let set = favourite_set(store, user).await?;

  Ok(CardListing {
    subcategory: Some(scope),
    cards:       favourites::tag_cards(found, &set),
    sorted_by:   sort,
  })
}

/// A single card, tagged for `user`.
pub async fn card<S>(
  store: &S,
  id: CardId,
  user: Option<UserId>,
) -> Result<TaggedCard>
where
  S: VocabularyStore,
{
  let card = store
    .get_card(id)
    .await
    .map_err(Into::into)?
    .ok_or(Error::CardNotFound(id))?;
  let set = favourite_set(store, user).await?;
  Ok(TaggedCard { favourite: set.contains(card.id), card })
}

// ─── Favourites ──────────────────────────────────────────────────────────────

/// The user's favourite cards.
///
/// Without a sort directive the cards follow the favourites themselves, most
/// recent bookmark first. A kind directive reorders them as for any other
/// listing. Every card is flagged favourite.
pub async fn favourites<S>(
  store: &S,
  owner: UserId,
  q: &TextQuery,
  sort: CardSort,
) -> Result<CardListing>
where
  S: VocabularyStore,
{
  let favs = store.favourites_of(owner).await.map_err(Into::into)?;
  if favs.is_empty() {
    return Ok(CardListing { subcategory: None, cards: Vec::new(), sorted_by: sort });
  }

  let ids: Vec<CardId> = favs.iter().map(|f| f.card_id).collect();
  let fetched = store.get_cards(&ids).await.map_err(Into::into)?;
  let mut found = query::filter_cards(favourites::order_by_favourites(fetched, &favs), q);
  if sort != CardSort::Default {
    query::sort_cards(&mut found, sort);
  }

  let set = FavouriteSet::from_favourites(&favs);
  Ok(CardListing {
    subcategory: None,
    cards:       favourites::tag_cards(found, &set),
    sorted_by:   sort,
  })
}

/// Bookmark `card` for `owner`.
///
/// Returns [`Error::CardNotFound`] for an unknown card and
/// [`Error::AlreadyFavourite`] if it is already bookmarked.
pub async fn add_favourite<S>(
  store: &S,
  owner: UserId,
  card: CardId,
) -> Result<Favourite>
where
  S: VocabularyStore,
{
  if !store.card_exists(card).await.map_err(Into::into)? {
    return Err(Error::CardNotFound(card));
  }
  store.add_favourite(owner, card).await.map_err(Into::into)
}

/// Remove `card` from the favourites of `owner`.
///
/// Returns [`Error::CardNotFound`] for an unknown card and
/// [`Error::NotFavourite`] if it was not bookmarked.
pub async fn remove_favourite<S>(
  store: &S,
  owner: UserId,
  card: CardId,
) -> Result<()>
where
  S: VocabularyStore,
{
  if !store.card_exists(card).await.map_err(Into::into)? {
    return Err(Error::CardNotFound(card));
  }
  store.remove_favourite(owner, card).await.map_err(Into::into)
}

// ─── Global search ───────────────────────────────────────────────────────────

/// Search categories, subcategories and cards at once.
///
/// A blank query runs no search at all and finds nothing.
pub async fn search<S>(
  store: &S,
  q: &TextQuery,
  sort: SearchSort,
  user: Option<UserId>,
) -> Result<SearchResults>
where
  S: VocabularyStore,
{
  if q.is_empty() {
    return Ok(SearchResults {
      q:             String::new(),
      sorted_by:     sort,
      categories:    Vec::new(),
      subcategories: Vec::new(),
      cards:         Vec::new(),
      sections:      SectionPlan::empty(),
    });
  }

  let categories = store.search_categories(q).await.map_err(Into::into)?;
  let subcategories = store.search_subcategories(q).await.map_err(Into::into)?;
  let cards: Vec<Card> = store.search_cards(q).await.map_err(Into::into)?;

  let hits = Hits {
    cards:         !cards.is_empty(),
    categories:    !categories.is_empty(),
    subcategories: !subcategories.is_empty(),
  };

  let set = if cards.is_empty() {
    FavouriteSet::default()
  } else {
    favourite_set(store, user).await?
  };

  Ok(SearchResults {
    q: q.as_str().to_owned(),
    sorted_by: sort,
    categories,
    subcategories,
    cards: favourites::tag_cards(cards, &set),
    sections: SectionPlan::new(sort, hits),
  })
}
