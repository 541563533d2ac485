/// Application name shown in logs.
pub const APP_NAME: &str = "Borrow Buddy";

/// Only addresses on this domain may sign in or register.
pub const CAMPUS_EMAIL_DOMAIN: &str = "@bennett.edu.in";

/// Campus assigned to every new account.
pub const DEFAULT_CAMPUS: &str = "Bennett University";

/// Trust score a freshly registered account starts with.
pub const DEFAULT_TRUST_SCORE: f64 = 5.0;

/// Password hash scheme tag (first field of the stored hash).
pub const PASSWORD_HASH_SCHEME: &str = "blake3";

/// Salt size in bytes for password hashes
pub const SALT_SIZE: usize = 16;

/// Key derivation contexts (BLAKE3)
pub const KDF_CONTEXT_PASSWORD: &str = "borrow-buddy-password-v1";

/// Default substrate capacity: 5 MiB, the usual local storage budget.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Number of listings shown in "recent" views.
pub const RECENT_LISTINGS: usize = 6;
