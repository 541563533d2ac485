//! Store configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the store can open with zero
//! configuration.

use std::path::PathBuf;

use buddy_shared::constants::DEFAULT_QUOTA_BYTES;

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory for the file-backed substrate.
    /// Env: `BUDDY_DATA_DIR`
    /// Default: the platform data directory.
    pub data_dir: Option<PathBuf>,

    /// Substrate capacity in bytes.
    /// Env: `BUDDY_QUOTA_BYTES`
    /// Default: 5 MiB.
    pub quota_bytes: usize,

    /// Host color-scheme preference, used when no theme is stored.
    /// Env: `BUDDY_PREFERS_LIGHT` (true/false)
    /// Default: `false`
    pub prefers_light: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            quota_bytes: DEFAULT_QUOTA_BYTES,
            prefers_light: false,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("BUDDY_DATA_DIR") {
            if !dir.is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }

        if let Some(val) = lookup("BUDDY_QUOTA_BYTES") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.quota_bytes = n,
                _ => {
                    tracing::warn!(value = %val, "Invalid BUDDY_QUOTA_BYTES, using default");
                }
            }
        }

        if let Some(val) = lookup("BUDDY_PREFERS_LIGHT") {
            config.prefers_light = val == "true" || val == "1";
        }

        config
    }
}
