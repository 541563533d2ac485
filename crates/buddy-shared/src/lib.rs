//! # buddy-shared
//!
//! Types and helpers shared by the Borrow Buddy store and its client:
//! time-derived identifiers, campus constants and salted password hashing.

pub mod constants;
pub mod crypto;
pub mod error;
pub mod types;

pub use error::CryptoError;
pub use types::{ItemId, MessageId, UserId};
