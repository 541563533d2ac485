use thiserror::Error;

/// Failures reported by a key-value substrate.
#[derive(Error, Debug)]
pub enum SubstrateError {
    /// The write would take the substrate past its capacity.
    #[error("Quota exceeded writing {key}: {needed} bytes needed, {quota} bytes allowed")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },

    /// The key cannot be represented by this substrate.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Generic I/O error from a file-backed substrate.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SubstrateError {
    pub fn is_quota(&self) -> bool {
        matches!(self, SubstrateError::QuotaExceeded { .. })
    }
}

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Registration with an email that is already taken (case-insensitive).
    #[error("User with this email already exists.")]
    DuplicateEmail(String),

    /// Login with an email nobody registered.
    #[error("User not found. Please register first.")]
    UserNotFound(String),

    /// Login with the wrong password.
    #[error("Invalid password.")]
    InvalidCredential,

    /// A stored collection exists but does not parse, so writing it back
    /// would discard its records.
    #[error("Stored data under {key} is unreadable; it was left untouched.")]
    CorruptData { key: String },

    /// The substrate stayed full after the recovery cycle.
    #[error("Storage is full: changes to {key} may not persist after a reload. Free up space by deleting listings.")]
    StorageExhausted { key: String },

    /// Substrate failure other than capacity.
    #[error("Storage error: {0}")]
    Substrate(#[from] SubstrateError),

    /// A record could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the data directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// True for errors the auth flow should show to the user and let them retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StoreError::DuplicateEmail(_) | StoreError::UserNotFound(_) | StoreError::InvalidCredential
        )
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
