//! Substrate keys. Part of the stored layout; do not rename.

/// JSON array of listings.
pub const ITEMS: &str = "bb_items";

/// JSON array of directory records (profile plus credential).
pub const USERS: &str = "bb_users";

/// JSON array of messages, append-only.
pub const MESSAGES: &str = "bb_messages";

/// JSON profile of the signed-in user. Absent when logged out.
pub const SESSION: &str = "user_auth";

/// Bare `light` / `dark` token.
pub const THEME: &str = "theme";
