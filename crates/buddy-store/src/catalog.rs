//! Listing catalog: a write-through mirror of `bb_items`.
//!
//! [`Catalog`] holds the in-memory list callers browse and filter. Every
//! mutation updates the mirror first, then writes the whole list back. When
//! the write fails for good the mirror keeps the mutation and the caller gets
//! [`StoreError::StorageExhausted`], which means "this change may be gone
//! after a reload".
//!
//! [`StoreError::StorageExhausted`]: crate::error::StoreError::StorageExhausted

use tracing::{debug, info, warn};

use crate::database::{read_collection, write_collection, Database, Loaded};
use crate::error::Result;
use crate::keys;
use crate::models::{timestamp, Item, ItemId};
use crate::seed;

impl Database {
    /// Read the stored catalog, falling back to the demo listings when it is
    /// missing or unreadable. Never empty on a fresh or broken store.
    pub fn load_items(&self) -> Vec<Item> {
        let loaded = self.with_substrate(|sub| read_collection::<Item>(sub, keys::ITEMS));
        match loaded {
            Loaded::Present(items) => items,
            Loaded::Missing => {
                debug!("no stored catalog, using demo listings");
                seed::demo_catalog(timestamp::now())
            }
            Loaded::Corrupt => {
                warn!("stored catalog unreadable, using demo listings");
                seed::demo_catalog(timestamp::now())
            }
        }
    }

    /// Full-replace write of the catalog.
    pub fn persist_items(&self, items: &[Item]) -> Result<()> {
        self.with_substrate(|sub| write_collection(sub, keys::ITEMS, items))
    }
}

/// In-memory catalog backed by the store.
pub struct Catalog {
    db: Database,
    items: Vec<Item>,
}

impl Catalog {
    /// Load the catalog once, at start-up.
    pub fn load(db: Database) -> Self {
        let items = db.load_items();
        info!(count = items.len(), "catalog loaded");
        Self { db, items }
    }

    /// Listings, most recently created first.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Put `item` in front of the existing listings and write back.
    pub fn add(&mut self, item: Item) -> Result<()> {
        debug!(item_id = %item.id, "adding listing");
        self.items.insert(0, item);
        self.persist()
    }

    /// Hard-delete the listing with `id`. Returns false, without writing,
    /// when there is no such listing.
    ///
    /// Messages that mention the listing are left as they are.
    pub fn delete(&mut self, id: &ItemId) -> Result<bool> {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        if self.items.len() == before {
            return Ok(false);
        }

        info!(item_id = %id, "deleted listing");
        self.persist()?;
        Ok(true)
    }

    pub fn persist(&self) -> Result<()> {
        self.db.persist_items(&self.items)
    }

    /// Drop the mirror and re-read the stored catalog.
    pub fn reload(&mut self) {
        self.items = self.db.load_items();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::{Category, ItemStatus, ItemType, UserId};
    use crate::persist::testing::FlakySubstrate;
    use crate::substrate::{MemorySubstrate, Substrate};

    fn listing(id: &str) -> Item {
        Item {
            id: ItemId::from(id),
            seller_id: UserId::from("u1"),
            title: format!("Listing {id}"),
            description: "Casio fx-991EX, works perfectly".into(),
            category: Category::Tech,
            kind: ItemType::Sell,
            price: Some(900.0),
            daily_rate: None,
            images: vec!["data:image/jpeg;base64,AAAA".into()],
            status: ItemStatus::Available,
            created_at: timestamp::now(),
        }
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn fresh_store_shows_demo_catalog() {
        let catalog = Catalog::load(Database::in_memory(64 * 1024));
        assert_eq!(ids(catalog.items()), vec!["i1", "i2", "i3", "i4", "i5"]);
    }

    #[test]
    fn add_prepends() {
        let db = Database::in_memory(64 * 1024);
        let mut catalog = Catalog::load(db.clone());
        catalog.add(listing("iA")).unwrap();
        catalog.add(listing("iB")).unwrap();

        let stored = db.load_items();
        assert_eq!(&ids(&stored)[..3], &["iB", "iA", "i1"]);
        assert_eq!(stored.len(), 7);
    }

    #[test]
    fn delete_is_idempotent() {
        let db = Database::in_memory(64 * 1024);
        let mut catalog = Catalog::load(db.clone());
        assert!(catalog.delete(&ItemId::from("i3")).unwrap());
        let after_first = db.load_items();

        assert!(!catalog.delete(&ItemId::from("i3")).unwrap());
        assert_eq!(db.load_items(), after_first);
        assert!(catalog.get(&ItemId::from("i3")).is_none());
        assert_eq!(after_first.len(), 4);
    }

    #[test]
    fn corrupt_catalog_falls_back_to_demo() {
        let db = Database::in_memory(64 * 1024);
        db.with_substrate(|sub| sub.set(keys::ITEMS, "[{\"id\":")).unwrap();
        let items = db.load_items();
        assert!(!items.is_empty());
        assert_eq!(items[0].id, ItemId::from("i1"));
    }

    #[test]
    fn timestamps_rehydrate() {
        let db = Database::in_memory(64 * 1024);
        let mut catalog = Catalog::load(db.clone());
        let item = listing("iT");
        let created = item.created_at;
        catalog.add(item).unwrap();

        let stored = db.load_items();
        assert_eq!(stored[0].created_at, created);
        assert_eq!(catalog.items()[0], stored[0]);
    }

    #[test]
    fn demo_fallback_matches_its_stored_copy() {
        let db = Database::in_memory(64 * 1024);
        let catalog = Catalog::load(db.clone());
        catalog.persist().unwrap();
        assert_eq!(catalog.items(), db.load_items().as_slice());
    }

    #[test]
    fn two_file_handles_on_one_directory() {
        let dir = tempfile::tempdir().unwrap();
        let tab_a = Database::open_at(dir.path(), 64 * 1024).unwrap();
        let tab_b = Database::open_at(dir.path(), 64 * 1024).unwrap();

        Catalog::load(tab_b.clone()).persist().unwrap();
        let mut catalog_a = Catalog::load(tab_a.clone());
        assert!(catalog_a.delete(&ItemId::from("i1")).unwrap());
        catalog_a.add(listing("iA")).unwrap();

        let mut catalog_b = Catalog::load(tab_b.clone());
        assert!(catalog_b.delete(&ItemId::from("iA")).unwrap());
        assert_eq!(tab_a.load_items().len(), 4);
        assert_eq!(tab_a.usage().0, tab_b.usage().0);
    }

    #[test]
    fn terminal_write_failure_keeps_mirror_and_reports() {
        let mut flaky = FlakySubstrate::new(MemorySubstrate::new(64 * 1024));
        flaky.always_fail_key = Some(keys::ITEMS.to_string());
        let db = Database::from_substrate(flaky);
        let mut catalog = Catalog::load(db.clone());

        let err = catalog.delete(&ItemId::from("i2")).unwrap_err();
        assert!(matches!(err, StoreError::StorageExhausted { .. }));
        assert!(catalog.get(&ItemId::from("i2")).is_none());

        // nothing durable changed: a reload shows the listing again
        catalog.reload();
        assert!(catalog.get(&ItemId::from("i2")).is_some());
    }

    #[test]
    fn second_tab_clobbers_first() {
        let tab_a = Database::in_memory(64 * 1024);
        let tab_b = tab_a.share();

        let mut catalog_a = Catalog::load(tab_a.clone());
        let mut catalog_b = Catalog::load(tab_b);

        catalog_a.add(listing("iFromA")).unwrap();
        catalog_b.add(listing("iFromB")).unwrap();

        // whole-list replace: B never saw A's listing, so it is gone
        let stored = tab_a.load_items();
        assert_eq!(stored[0].id, ItemId::from("iFromB"));
        assert!(stored.iter().all(|i| i.id != ItemId::from("iFromA")));
    }
}
