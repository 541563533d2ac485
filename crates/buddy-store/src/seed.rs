//! Built-in data: the default account and the demo catalog.

use chrono::{DateTime, Utc};

use buddy_shared::constants::DEFAULT_CAMPUS;

use crate::models::{Category, Item, ItemId, ItemStatus, ItemType, User, UserId};

/// Fixed id of the built-in account.
pub const SEED_USER_ID: &str = "u1";
pub const SEED_USER_EMAIL: &str = "arjun.mehta@bennett.edu.in";
pub const SEED_USER_PASSWORD: &str = "password123";

/// The account every fresh directory starts with.
pub fn seed_user() -> User {
    User {
        id: UserId::from(SEED_USER_ID),
        name: "Arjun Mehta".to_string(),
        email: SEED_USER_EMAIL.to_string(),
        age: Some(20),
        course: Some("B.Tech CSE".to_string()),
        avatar: "https://picsum.photos/id/64/200/200".to_string(),
        is_verified: true,
        trust_score: 4.8,
        sustainability_level: 12,
        campus: DEFAULT_CAMPUS.to_string(),
        balance: 2500.0,
    }
}

pub fn is_seed_user(id: &UserId) -> bool {
    id.as_str() == SEED_USER_ID
}

/// Listings shown when no catalog is stored or the stored one is unreadable.
pub fn demo_catalog(now: DateTime<Utc>) -> Vec<Item> {
    let listing = |id: &str,
                   seller: &str,
                   title: &str,
                   description: &str,
                   category: Category,
                   kind: ItemType,
                   amount: f64,
                   image: u32| {
        let (price, daily_rate) = match kind {
            ItemType::Sell => (Some(amount), None),
            ItemType::Rent => (None, Some(amount)),
            ItemType::Both => (Some(amount), Some(amount)),
        };
        Item {
            id: ItemId::from(id),
            seller_id: UserId::from(seller),
            title: title.to_string(),
            description: description.to_string(),
            category,
            kind,
            price,
            daily_rate,
            images: vec![format!("https://picsum.photos/id/{image}/400/400")],
            status: ItemStatus::Available,
            created_at: now,
        }
    };

    vec![
        listing(
            "i1",
            "u2",
            "Sony WH-1000XM4 Noise Canceling",
            "Great condition, barely used. Perfect for studying in loud hostels.",
            Category::Tech,
            ItemType::Rent,
            350.0,
            250,
        ),
        listing(
            "i2",
            "u3",
            "Concepts of Physics - H.C. Verma (Vol 1 & 2)",
            "No highlighting, good condition. Essential for engineering mechanics.",
            Category::Textbooks,
            ItemType::Sell,
            600.0,
            24,
        ),
        listing(
            "i3",
            "u4",
            "JBL PartyBox Speaker",
            "Massive sound for freshers parties. Battery life is 100%.",
            Category::Party,
            ItemType::Rent,
            800.0,
            145,
        ),
        listing(
            "i4",
            "u5",
            "Zara Denim Jacket (M)",
            "Bought from Myntra, doesn't fit me anymore. Super cool wash.",
            Category::Fashion,
            ItemType::Sell,
            1200.0,
            338,
        ),
        listing(
            "i5",
            "u2",
            "Badminton Set (Yonex)",
            "2 Racquets + Shuttlecocks. Great for evening games.",
            Category::Sports,
            ItemType::Rent,
            150.0,
            158,
        ),
    ]
}
