//! Domain model structs persisted in the key-value substrate.
//!
//! Field names and enum spellings are part of the on-disk layout (camelCase
//! JSON, `type` for the listing kind, ISO-8601 timestamps with millisecond
//! precision), so existing stored data keeps loading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use buddy_shared::types::{ItemId, MessageId, UserId};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A user profile as handed to callers. Never carries a credential.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Unique among registered users, compared case-insensitively.
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    /// Image URL or data URI.
    pub avatar: String,
    pub is_verified: bool,
    /// Nominally 0-5, not enforced.
    pub trust_score: f64,
    pub sustainability_level: u32,
    pub campus: String,
    pub balance: f64,
}

/// Display name used for ids that no longer resolve.
pub const UNKNOWN_USER_NAME: &str = "Unknown user";

impl User {
    /// Placeholder profile for a dangling user reference.
    pub fn unknown(id: UserId) -> Self {
        Self {
            id,
            name: UNKNOWN_USER_NAME.to_string(),
            email: String::new(),
            age: None,
            course: None,
            avatar: String::new(),
            is_verified: false,
            trust_score: 0.0,
            sustainability_level: 0,
            campus: String::new(),
            balance: 0.0,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.email.is_empty() && self.name == UNKNOWN_USER_NAME
    }

    pub fn email_matches(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }
}

/// Directory record: profile plus credential. Never leaves the crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredUser {
    #[serde(flatten)]
    pub profile: User,
    /// Salted hash, or plaintext for records written before hashing existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Tech,
    Textbooks,
    Fashion,
    Party,
    Sports,
    Other,
}

/// Whether a listing is offered for rent, for sale, or both.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Rent,
    Sell,
    Both,
}

impl ItemType {
    pub fn offers_rental(self) -> bool {
        matches!(self, ItemType::Rent | ItemType::Both)
    }

    pub fn offers_sale(self) -> bool {
        matches!(self, ItemType::Sell | ItemType::Both)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Available,
    Rented,
    Sold,
}

/// A marketplace listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    /// Weak reference: not checked against the user directory.
    pub seller_id: UserId,
    pub title: String,
    pub description: String,
    pub category: Category,
    #[serde(rename = "type")]
    pub kind: ItemType,
    /// Sale price, expected when `kind` offers a sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Rental price per day, expected when `kind` offers a rental.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_rate: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    pub status: ItemStatus,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A direct message. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub text: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Listing the conversation started from, if any. May dangle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<ItemId>,
}

impl Message {
    pub fn involves(&self, user: &UserId) -> bool {
        &self.sender_id == user || &self.receiver_id == user
    }

    /// True when the unordered pair {sender, receiver} equals {a, b}.
    pub fn is_between(&self, a: &UserId, b: &UserId) -> bool {
        (&self.sender_id == a && &self.receiver_id == b)
            || (&self.sender_id == b && &self.receiver_id == a)
    }

    /// The other party from `user`'s point of view.
    pub fn counterpart(&self, user: &UserId) -> Option<&UserId> {
        if &self.sender_id == user {
            Some(&self.receiver_id)
        } else if &self.receiver_id == user {
            Some(&self.sender_id)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// ISO-8601 with milliseconds and a `Z` suffix on write; ISO strings or epoch
/// milliseconds on read.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Current time at stored precision, so a fresh record equals its
    /// read-back.
    pub fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Millis(i64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(de::Error::custom),
            Raw::Millis(ms) => DateTime::<Utc>::from_timestamp_millis(ms)
                .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {ms}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_item() -> Item {
        Item {
            id: ItemId::from("i1"),
            seller_id: UserId::from("u2"),
            title: "Sony WH-1000XM4".into(),
            description: "Great condition".into(),
            category: Category::Tech,
            kind: ItemType::Rent,
            price: None,
            daily_rate: Some(350.0),
            images: vec!["https://picsum.photos/id/250/400/400".into()],
            status: ItemStatus::Available,
            created_at: Utc.with_ymd_and_hms(2024, 8, 1, 10, 30, 0).unwrap(),
        }
    }

    #[test]
    fn item_uses_stored_field_names() {
        let json = serde_json::to_value(sample_item()).unwrap();
        assert_eq!(json["type"], "rent");
        assert_eq!(json["sellerId"], "u2");
        assert_eq!(json["dailyRate"], 350.0);
        assert_eq!(json["status"], "available");
        assert_eq!(json["createdAt"], "2024-08-01T10:30:00.000Z");
        assert!(json.get("price").is_none());
    }

    #[test]
    fn created_at_accepts_epoch_millis() {
        let mut json = serde_json::to_value(sample_item()).unwrap();
        json["createdAt"] = serde_json::json!(1_722_508_200_000i64);
        let item: Item = serde_json::from_value(json).unwrap();
        assert_eq!(item.created_at, sample_item().created_at);
    }

    #[test]
    fn stored_user_flattens_profile() {
        let raw = r#"{"id":"u9","name":"Test","email":"t@bennett.edu.in","avatar":"",
            "isVerified":false,"trustScore":5,"sustainabilityLevel":0,
            "campus":"Bennett University","balance":0,"password":"secret"}"#;
        let stored: StoredUser = serde_json::from_str(raw).unwrap();
        assert_eq!(stored.profile.id, UserId::from("u9"));
        assert_eq!(stored.password.as_deref(), Some("secret"));

        // the public profile type drops the credential on read
        let profile: User = serde_json::from_str(raw).unwrap();
        let back = serde_json::to_value(&profile).unwrap();
        assert!(back.get("password").is_none());
    }

    #[test]
    fn message_pair_helpers() {
        let m = Message {
            id: MessageId::from("msg_1"),
            sender_id: UserId::from("a"),
            receiver_id: UserId::from("b"),
            text: "hi".into(),
            timestamp: Utc::now(),
            item_id: None,
        };
        let (a, b, c) = (UserId::from("a"), UserId::from("b"), UserId::from("c"));
        assert!(m.is_between(&b, &a));
        assert!(!m.is_between(&a, &c));
        assert_eq!(m.counterpart(&b), Some(&a));
        assert_eq!(m.counterpart(&c), None);
    }

    #[test]
    fn theme_tokens() {
        assert_eq!(Theme::parse("light"), Some(Theme::Light));
        assert_eq!(Theme::parse("Dark"), None);
        assert_eq!(Theme::Dark.toggled().as_str(), "light");
    }
}
