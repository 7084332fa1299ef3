//! In-memory [`VocabularyStore`] used by the catalog tests.

use std::sync::{
  Mutex,
  atomic::{AtomicUsize, Ordering},
};

use chrono::{DateTime, Utc};

use crate::{
  Error, Result,
  model::{
    Card, CardId, Category, CategoryId, Favourite, FavouriteId, NewCard,
    NewCategory, NewSubCategory, NewUser, SubCategory, SubCategoryId, User,
    UserId,
  },
  query::TextQuery,
  store::{UserCredentials, VocabularyStore},
};

#[derive(Default)]
struct State {
  /// Per-table id sequences, as in separate SQL tables.
  sequences:     [i64; 5],
  categories:    Vec<Category>,
  subcategories: Vec<SubCategory>,
  cards:         Vec<(Card, Vec<SubCategoryId>)>,
  favourites:    Vec<Favourite>,
  users:         Vec<UserCredentials>,
}

impl State {
  fn next(&mut self, table: usize) -> i64 {
    self.sequences[table] += 1;
    self.sequences[table]
  }
}

const CATEGORIES: usize = 0;
const SUBCATEGORIES: usize = 1;
const CARDS: usize = 2;
const FAVOURITES: usize = 3;
const USERS: usize = 4;

#[derive(Default)]
pub struct MemoryStore {
  state:        Mutex<State>,
  search_calls: AtomicUsize,
}

impl MemoryStore {
  pub async fn add_test_user(&self, email: &str) -> UserId {
    self
      .add_user(NewUser {
        email:         email.into(),
        password_hash: String::new(),
        is_staff:      false,
      })
      .await
      .unwrap()
      .id
  }

  pub fn insert_favourite_at(
    &self,
    owner: UserId,
    card: CardId,
    added_at: DateTime<Utc>,
  ) {
    let mut st = self.state.lock().unwrap();
    let id = FavouriteId(st.next(FAVOURITES));
    st.favourites.push(Favourite { id, card_id: card, owner_id: owner, added_at });
  }

  pub fn search_calls(&self) -> usize {
    self.search_calls.load(Ordering::SeqCst)
  }
}

impl VocabularyStore for MemoryStore {
  type Error = Error;

  async fn list_categories(&self) -> Result<Vec<Category>> {
    Ok(self.state.lock().unwrap().categories.clone())
  }

  async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
    let st = self.state.lock().unwrap();
    Ok(st.categories.iter().find(|c| c.id == id).cloned())
  }

  async fn search_categories(&self, q: &TextQuery) -> Result<Vec<Category>> {
    self.search_calls.fetch_add(1, Ordering::SeqCst);
    let st = self.state.lock().unwrap();
    Ok(st.categories.iter().filter(|c| q.matches(&c.name)).cloned().collect())
  }

  async fn add_category(&self, input: NewCategory) -> Result<Category> {
    let mut st = self.state.lock().unwrap();
    if st.categories.iter().any(|c| c.name == input.name) {
      return Err(Error::DuplicateName(input.name));
    }
    let category = Category {
      id:      CategoryId(st.next(CATEGORIES)),
      name:    input.name,
      picture: input.picture,
    };
    st.categories.push(category.clone());
    Ok(category)
  }

  async fn set_category_picture(&self, id: CategoryId, picture: String) -> Result<()> {
    let mut st = self.state.lock().unwrap();
    let category = st
      .categories
      .iter_mut()
      .find(|c| c.id == id)
      .ok_or(Error::CategoryNotFound(id))?;
    category.picture = picture;
    Ok(())
  }

  async fn delete_category(&self, id: CategoryId) -> Result<()> {
    let mut st = self.state.lock().unwrap();
    st.categories.retain(|c| c.id != id);
    for sub in &mut st.subcategories {
      sub.category_ids.retain(|c| *c != id);
    }
    Ok(())
  }

  async fn list_subcategories(
    &self,
    category: Option<CategoryId>,
  ) -> Result<Vec<SubCategory>> {
    let st = self.state.lock().unwrap();
    Ok(
      st.subcategories
        .iter()
        .filter(|s| category.is_none_or(|c| s.category_ids.contains(&c)))
        .cloned()
        .collect(),
    )
  }

  async fn get_subcategory(&self, id: SubCategoryId) -> Result<Option<SubCategory>> {
    let st = self.state.lock().unwrap();
    Ok(st.subcategories.iter().find(|s| s.id == id).cloned())
  }

  async fn subcategory_has_cards(&self, id: SubCategoryId) -> Result<bool> {
    let st = self.state.lock().unwrap();
    Ok(st.cards.iter().any(|(_, subs)| subs.contains(&id)))
  }

  async fn search_subcategories(&self, q: &TextQuery) -> Result<Vec<SubCategory>> {
    self.search_calls.fetch_add(1, Ordering::SeqCst);
    let st = self.state.lock().unwrap();
    Ok(st.subcategories.iter().filter(|s| q.matches(&s.name)).cloned().collect())
  }

  async fn add_subcategory(&self, input: NewSubCategory) -> Result<SubCategory> {
    let mut st = self.state.lock().unwrap();
    if st.subcategories.iter().any(|s| s.name == input.name) {
      return Err(Error::DuplicateName(input.name));
    }
    let sub = SubCategory {
      id:           SubCategoryId(st.next(SUBCATEGORIES)),
      name:         input.name,
      picture:      input.picture,
      category_ids: input.category_ids,
    };
    st.subcategories.push(sub.clone());
    Ok(sub)
  }

  async fn set_subcategory_picture(
    &self,
    id: SubCategoryId,
    picture: String,
  ) -> Result<()> {
    let mut st = self.state.lock().unwrap();
    let sub = st
      .subcategories
      .iter_mut()
      .find(|s| s.id == id)
      .ok_or(Error::SubCategoryNotFound(id))?;
    sub.picture = picture;
    Ok(())
  }

  async fn delete_subcategory(&self, id: SubCategoryId) -> Result<()> {
    let mut st = self.state.lock().unwrap();
    st.subcategories.retain(|s| s.id != id);
    for (_, subs) in &mut st.cards {
      subs.retain(|s| *s != id);
    }
    Ok(())
  }

  async fn list_cards(&self, subcategory: Option<SubCategoryId>) -> Result<Vec<Card>> {
    let st = self.state.lock().unwrap();
    let mut cards: Vec<Card> = st
      .cards
      .iter()
      .filter(|(_, subs)| subcategory.is_none_or(|s| subs.contains(&s)))
      .map(|(c, _)| c.clone())
      .collect();
    cards.sort_by(|a, b| b.id.cmp(&a.id));
    Ok(cards)
  }

  async fn get_card(&self, id: CardId) -> Result<Option<Card>> {
    let st = self.state.lock().unwrap();
    Ok(st.cards.iter().find(|(c, _)| c.id == id).map(|(c, _)| c.clone()))
  }

  async fn get_cards(&self, ids: &[CardId]) -> Result<Vec<Card>> {
    let st = self.state.lock().unwrap();
    Ok(
      st.cards
        .iter()
        .filter(|(c, _)| ids.contains(&c.id))
        .map(|(c, _)| c.clone())
        .collect(),
    )
  }

  async fn card_exists(&self, id: CardId) -> Result<bool> {
    Ok(self.get_card(id).await?.is_some())
  }

  async fn search_cards(&self, q: &TextQuery) -> Result<Vec<Card>> {
    self.search_calls.fetch_add(1, Ordering::SeqCst);
    let mut cards = self.list_cards(None).await?;
    cards.retain(|c| q.matches_card(c));
    Ok(cards)
  }

  async fn add_card(&self, input: NewCard) -> Result<Card> {
    let mut st = self.state.lock().unwrap();
    let card = Card {
      id:              CardId(st.next(CARDS)),
      content:         input.content,
      kind:            input.kind,
      pronunciation:   input.pronunciation,
      transliteration: input.transliteration,
    };
    st.cards.push((card.clone(), input.subcategory_ids));
    Ok(card)
  }

  async fn set_card_pronunciation(
    &self,
    id: CardId,
    pronunciation: Option<String>,
  ) -> Result<()> {
    let mut st = self.state.lock().unwrap();
    let (card, _) = st
      .cards
      .iter_mut()
      .find(|(c, _)| c.id == id)
      .ok_or(Error::CardNotFound(id))?;
    card.pronunciation = pronunciation;
    Ok(())
  }

  async fn delete_card(&self, id: CardId) -> Result<()> {
    let mut st = self.state.lock().unwrap();
    st.cards.retain(|(c, _)| c.id != id);
    st.favourites.retain(|f| f.card_id != id);
    Ok(())
  }

  async fn favourites_of(&self, owner: UserId) -> Result<Vec<Favourite>> {
    let st = self.state.lock().unwrap();
    let mut favs: Vec<Favourite> = st
      .favourites
      .iter()
      .filter(|f| f.owner_id == owner)
      .cloned()
      .collect();
    favs.sort_by(|a, b| b.added_at.cmp(&a.added_at));
    Ok(favs)
  }

  async fn add_favourite(&self, owner: UserId, card: CardId) -> Result<Favourite> {
    let mut st = self.state.lock().unwrap();
    if st.favourites.iter().any(|f| f.owner_id == owner && f.card_id == card) {
      return Err(Error::AlreadyFavourite(card));
    }
    let fav = Favourite {
      id:       FavouriteId(st.next(FAVOURITES)),
      card_id:  card,
      owner_id: owner,
      added_at: Utc::now(),
    };
    st.favourites.push(fav.clone());
    Ok(fav)
  }

  async fn remove_favourite(&self, owner: UserId, card: CardId) -> Result<()> {
    let mut st = self.state.lock().unwrap();
    let before = st.favourites.len();
    st.favourites.retain(|f| !(f.owner_id == owner && f.card_id == card));
    if st.favourites.len() == before {
      return Err(Error::NotFavourite(card));
    }
    Ok(())
  }

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let mut st = self.state.lock().unwrap();
    if st.users.iter().any(|u| u.user.email == input.email) {
      return Err(Error::DuplicateEmail(input.email));
    }
    let user = User {
      id:        UserId(st.next(USERS)),
      email:     input.email,
      is_staff:  input.is_staff,
      is_active: true,
      joined_at: Utc::now(),
    };
    st.users.push(UserCredentials {
      user:          user.clone(),
      password_hash: input.password_hash,
    });
    Ok(user)
  }

  async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>> {
    let st = self.state.lock().unwrap();
    Ok(st.users.iter().find(|u| u.user.email == email).cloned())
  }

  async fn delete_user(&self, id: UserId) -> Result<()> {
    let mut st = self.state.lock().unwrap();
    st.users.retain(|u| u.user.id != id);
    st.favourites.retain(|f| f.owner_id != id);
    Ok(())
  }
}
