//! # buddy-store
//!
//! Local persistence for Borrow Buddy, the campus marketplace.
//!
//! Every collection (users, listings, messages) lives as one JSON array under
//! a fixed key in a quota-bound key-value [`Substrate`]. The crate exposes a
//! synchronous, cloneable [`Database`] handle; each operation reads the whole
//! collection, changes it in memory and writes the whole collection back
//! under a single lock. Writes that run out of room get one recovery attempt
//! before reporting [`StoreError::StorageExhausted`].

pub mod catalog;
pub mod config;
pub mod database;
pub mod keys;
pub mod messages;
pub mod models;
pub mod seed;
pub mod session;
pub mod settings;
pub mod substrate;
pub mod users;

mod error;
pub(crate) mod persist;

pub use catalog::Catalog;
pub use config::StoreConfig;
pub use database::Database;
pub use error::{Result, StoreError, SubstrateError};
pub use messages::{SentMessage, SyncStatus};
pub use models::*;
pub use substrate::{FileSubstrate, MemorySubstrate, Substrate};
