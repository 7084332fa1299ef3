//! Overlaying a user's favourites onto card listings.

use std::collections::{HashMap, HashSet};

use crate::model::{Card, CardId, Favourite, TaggedCard};

/// Membership set of favourited card ids, built once per request.
#[derive(Debug, Clone, Default)]
pub struct FavouriteSet(HashSet<CardId>);

impl FavouriteSet {
  pub fn from_favourites(favourites: &[Favourite]) -> Self {
    Self(favourites.iter().map(|f| f.card_id).collect())
  }

  pub fn contains(&self, card: CardId) -> bool { self.0.contains(&card) }
}

/// Tag every card with whether it is in `set`. Never adds or drops a card.
pub fn tag_cards(cards: Vec<Card>, set: &FavouriteSet) -> Vec<TaggedCard> {
  cards
    .into_iter()
    .map(|card| TaggedCard { favourite: set.contains(card.id), card })
    .collect()
}

/// Tag every card as not favourite, for anonymous requests.
pub fn untagged(cards: Vec<Card>) -> Vec<TaggedCard> {
  tag_cards(cards, &FavouriteSet::default())
}

/// Reorder `cards` to follow `favourites` (newest bookmark first when the
/// favourites come from the store). Cards with no favourite row go last, in
/// their incoming order.
pub fn order_by_favourites(
  mut cards: Vec<Card>,
  favourites: &[Favourite],
) -> Vec<Card> {
  let position: HashMap<CardId, usize> = favourites
    .iter()
    .enumerate()
    .map(|(i, f)| (f.card_id, i))
    .collect();
  cards.sort_by_key(|c| position.get(&c.id).copied().unwrap_or(usize::MAX));
  cards
}
