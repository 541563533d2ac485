use buddy_shared::constants::CAMPUS_EMAIL_DOMAIN;
use buddy_store::StoreError;
use thiserror::Error;

/// Errors surfaced to the user by client commands. The `Display` text is
/// what the user sees.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Only {} email addresses are allowed.", CAMPUS_EMAIL_DOMAIN)]
    InvalidDomain,

    #[error("Please enter your name")]
    MissingName,

    #[error("Please sign in first")]
    NotSignedIn,

    #[error("Deletion was not confirmed")]
    NotConfirmed,

    #[error("You can't chat with yourself!")]
    SelfChat,

    #[error("Message is empty")]
    EmptyMessage,

    #[error("Listing not found: {0}")]
    ListingNotFound(String),

    #[error("Application state lock poisoned")]
    StatePoisoned,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
