//! Listing commands: create, delete, browse.

use serde::Deserialize;
use tracing::info;

use buddy_shared::constants::RECENT_LISTINGS;
use buddy_store::{timestamp, Category, Item, ItemId, ItemStatus, ItemType};

use crate::error::{ClientError, Result};
use crate::state::{lock, SharedState};

/// Fields entered in the "create listing" form. Blank fields get defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    #[serde(rename = "type")]
    pub kind: Option<ItemType>,
    pub price: Option<f64>,
    pub daily_rate: Option<f64>,
    pub images: Vec<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Listing type filter of the marketplace view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Rent,
    Buy,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketFilter {
    /// Case-insensitive substring of the title or description.
    pub search: String,
    #[serde(rename = "type")]
    pub kind: TypeFilter,
    /// `None` shows every category.
    pub category: Option<Category>,
}

impl MarketFilter {
    pub fn matches(&self, item: &Item) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = item.title.to_lowercase().contains(&needle)
            || item.description.to_lowercase().contains(&needle);

        let matches_type = match self.kind {
            TypeFilter::All => true,
            TypeFilter::Rent => item.kind.offers_rental(),
            TypeFilter::Buy => item.kind.offers_sale(),
        };

        let matches_category = self.category.map_or(true, |c| c == item.category);

        matches_search && matches_type && matches_category
    }
}

/// Publish a new listing for the signed-in user. It goes to the front of
/// the catalog.
pub fn create_listing(state: &SharedState, draft: ListingDraft) -> Result<Item> {
    let mut guard = lock(state)?;
    let seller_id = guard.current_user()?.id.clone();

    let item = Item {
        id: ItemId::generate(),
        seller_id,
        title: non_blank(draft.title).unwrap_or_else(|| "Untitled".to_string()),
        description: draft.description.unwrap_or_default(),
        category: draft.category.unwrap_or(Category::Other),
        kind: draft.kind.unwrap_or(ItemType::Rent),
        price: draft.price,
        daily_rate: draft.daily_rate,
        images: draft.images,
        status: ItemStatus::Available,
        created_at: timestamp::now(),
    };

    guard.catalog.add(item.clone())?;
    info!(item_id = %item.id, "listing created");
    Ok(item)
}

/// Delete a listing. Nothing happens unless the user `confirmed` it.
///
/// Returns false when the listing was already gone.
pub fn delete_listing(state: &SharedState, id: &ItemId, confirmed: bool) -> Result<bool> {
    if !confirmed {
        return Err(ClientError::NotConfirmed);
    }
    let mut guard = lock(state)?;
    Ok(guard.catalog.delete(id)?)
}

pub fn get_listing(state: &SharedState, id: &ItemId) -> Result<Item> {
    let guard = lock(state)?;
    guard
        .catalog
        .get(id)
        .cloned()
        .ok_or_else(|| ClientError::ListingNotFound(id.to_string()))
}

pub fn browse(state: &SharedState, filter: &MarketFilter) -> Result<Vec<Item>> {
    let guard = lock(state)?;
    Ok(guard
        .catalog
        .items()
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect())
}

/// Listings of the signed-in user.
pub fn my_listings(state: &SharedState) -> Result<Vec<Item>> {
    let guard = lock(state)?;
    let me = &guard.current_user()?.id;
    Ok(guard
        .catalog
        .items()
        .iter()
        .filter(|item| &item.seller_id == me)
        .cloned()
        .collect())
}

/// The newest listings, for the home screen.
pub fn recent_listings(state: &SharedState) -> Result<Vec<Item>> {
    let guard = lock(state)?;
    Ok(guard.catalog.items().iter().take(RECENT_LISTINGS).cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::auth;
    use crate::state::testing;
    use buddy_store::seed::{SEED_USER_EMAIL, SEED_USER_PASSWORD};

    fn signed_in() -> SharedState {
        let state = testing::state();
        auth::login(&state, SEED_USER_EMAIL, SEED_USER_PASSWORD).unwrap();
        state
    }

    fn ids(items: &[Item]) -> Vec<String> {
        items.iter().map(|i| i.id.to_string()).collect()
    }

    #[test]
    fn blank_draft_gets_defaults() {
        let state = signed_in();
        let draft = ListingDraft {
            title: Some(String::new()),
            ..ListingDraft::default()
        };
        let item = create_listing(&state, draft).unwrap();

        assert_eq!(item.title, "Untitled");
        assert_eq!(item.description, "");
        assert_eq!(item.category, Category::Other);
        assert_eq!(item.kind, ItemType::Rent);
        assert_eq!(item.status, ItemStatus::Available);
        assert_eq!(item.seller_id.as_str(), "u1");
        assert!(item.id.as_str().starts_with('i'));
    }

    #[test]
    fn new_listing_is_first_and_persisted() {
        let state = signed_in();
        let draft: ListingDraft = serde_json::from_str(
            r#"{"title":"Mini fridge","category":"Tech","type":"both","price":3000,"dailyRate":80}"#,
        )
        .unwrap();
        let item = create_listing(&state, draft).unwrap();

        assert_eq!(recent_listings(&state).unwrap()[0], item);
        let guard = lock(&state).unwrap();
        let stored = guard.database.load_items();
        assert_eq!(stored[0], item);
        assert_eq!(guard.catalog.items()[0], stored[0]);
        assert_eq!(stored[0].kind, ItemType::Both);
    }

    #[test]
    fn create_requires_sign_in() {
        let state = testing::state();
        assert!(matches!(
            create_listing(&state, ListingDraft::default()),
            Err(ClientError::NotSignedIn)
        ));
    }

    #[test]
    fn delete_needs_confirmation() {
        let state = signed_in();
        let id = ItemId::from("i1");
        assert!(matches!(
            delete_listing(&state, &id, false),
            Err(ClientError::NotConfirmed)
        ));
        assert!(get_listing(&state, &id).is_ok());

        assert!(delete_listing(&state, &id, true).unwrap());
        assert!(!delete_listing(&state, &id, true).unwrap());
        assert!(matches!(
            get_listing(&state, &id),
            Err(ClientError::ListingNotFound(_))
        ));
    }

    #[test]
    fn type_filter_treats_both_as_either() {
        let state = signed_in();
        let all = browse(&state, &MarketFilter::default()).unwrap();

        let rent = browse(
            &state,
            &MarketFilter {
                kind: TypeFilter::Rent,
                ..MarketFilter::default()
            },
        )
        .unwrap();
        let buy = browse(
            &state,
            &MarketFilter {
                kind: TypeFilter::Buy,
                ..MarketFilter::default()
            },
        )
        .unwrap();

        assert_eq!(all.len(), 5);
        assert!(rent.iter().all(|i| i.kind != ItemType::Sell));
        assert!(buy.iter().all(|i| i.kind != ItemType::Rent));
        for both in all.iter().filter(|i| i.kind == ItemType::Both) {
            assert!(rent.contains(both));
            assert!(buy.contains(both));
        }
    }

    #[test]
    fn search_and_category_combine() {
        let state = signed_in();
        let mut draft = ListingDraft {
            title: Some("Organic Chemistry, Clayden".into()),
            description: Some("Second edition, no highlights".into()),
            category: Some(Category::Textbooks),
            kind: Some(ItemType::Sell),
            price: Some(650.0),
            ..ListingDraft::default()
        };
        let book = create_listing(&state, draft.clone()).unwrap();
        draft.category = Some(Category::Other);
        create_listing(&state, draft).unwrap();

        let filter = MarketFilter {
            search: "HIGHLIGHTS".into(),
            kind: TypeFilter::All,
            category: Some(Category::Textbooks),
        };
        assert_eq!(ids(&browse(&state, &filter).unwrap()), vec![book.id.to_string()]);

        let nothing = MarketFilter {
            search: "nonexistent gadget".into(),
            ..MarketFilter::default()
        };
        assert!(browse(&state, &nothing).unwrap().is_empty());
    }

    #[test]
    fn recent_is_capped() {
        let state = signed_in();
        for n in 0..3 {
            create_listing(
                &state,
                ListingDraft {
                    title: Some(format!("Extra {n}")),
                    ..ListingDraft::default()
                },
            )
            .unwrap();
        }
        let recent = recent_listings(&state).unwrap();
        assert_eq!(recent.len(), RECENT_LISTINGS);
        assert_eq!(recent[0].title, "Extra 2");
    }

    #[test]
    fn my_listings_only_mine() {
        let state = testing::state();
        auth::register(&state, "Neha", "neha@bennett.edu.in", "pw").unwrap();
        assert!(my_listings(&state).unwrap().is_empty());

        let mine = create_listing(&state, ListingDraft::default()).unwrap();
        assert_eq!(my_listings(&state).unwrap(), vec![mine]);
    }
}
