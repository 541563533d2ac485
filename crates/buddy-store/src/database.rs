//! Store handle and the single-writer discipline.
//!
//! The [`Database`] struct owns a shared [`Substrate`] behind a mutex. Every
//! operation is one unit of work: lock, read the whole collection, mutate it
//! in memory, write the whole collection back, unlock. Holding the lock for
//! the full read-modify-write keeps each unit atomic no matter how many
//! threads share the handle.
//!
//! Two handles created from the same substrate with [`Database::share`] model
//! two browser tabs: each unit of work is still atomic, but any state a
//! caller mirrors in memory between units is not reconciled. The last
//! whole-collection write wins.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::models::Message;
use crate::persist;
use crate::substrate::{FileSubstrate, MemorySubstrate, Substrate};

/// Substrate shared by every handle of one store.
pub type SharedSubstrate = Arc<Mutex<Box<dyn Substrate>>>;

/// Handle to the local store. Cheap to clone; clones share everything.
#[derive(Clone)]
pub struct Database {
    substrate: SharedSubstrate,
    /// Sent messages whose write-back failed, oldest first.
    pub(crate) outbox: Arc<Mutex<Vec<Message>>>,
}

/// Result of reading one collection key.
#[derive(Debug)]
pub(crate) enum Loaded<T> {
    Missing,
    Corrupt,
    Present(Vec<T>),
}

impl<T> Loaded<T> {
    /// Degrade to a plain list: missing and corrupt both read as empty.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Loaded::Present(v) => v,
            Loaded::Missing | Loaded::Corrupt => Vec::new(),
        }
    }
}

impl Database {
    /// Open (or create) the default file-backed store.
    ///
    /// Uses `config.data_dir` when set, otherwise the platform data directory:
    /// - Linux:   `~/.local/share/borrowbuddy`
    /// - macOS:   `~/Library/Application Support/in.bennett.borrowbuddy`
    /// - Windows: `{FOLDERID_RoamingAppData}\bennett\borrowbuddy\data`
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let data_dir = match &config.data_dir {
            Some(dir) => dir.clone(),
            None => ProjectDirs::from("in", "bennett", "borrowbuddy")
                .ok_or(StoreError::NoDataDir)?
                .data_dir()
                .to_path_buf(),
        };
        std::fs::create_dir_all(&data_dir)?;

        tracing::info!(path = %data_dir.display(), quota = config.quota_bytes, "opening store");

        Self::open_at(&data_dir, config.quota_bytes)
    }

    /// Open (or create) a file-backed store in an explicit directory.
    pub fn open_at(dir: &Path, quota_bytes: usize) -> Result<Self> {
        let substrate = FileSubstrate::open(dir, quota_bytes)?;
        Ok(Self::from_substrate(substrate))
    }

    /// Ephemeral store, mostly for tests.
    pub fn in_memory(quota_bytes: usize) -> Self {
        Self::from_substrate(MemorySubstrate::new(quota_bytes))
    }

    pub fn from_substrate(substrate: impl Substrate + 'static) -> Self {
        let boxed: Box<dyn Substrate> = Box::new(substrate);
        Self::from_shared(Arc::new(Mutex::new(boxed)))
    }

    pub fn from_shared(substrate: SharedSubstrate) -> Self {
        Self {
            substrate,
            outbox: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A second, independent handle over the same substrate (another tab).
    ///
    /// It shares the storage but not this handle's outbox.
    pub fn share(&self) -> Self {
        Self::from_shared(Arc::clone(&self.substrate))
    }

    /// Run one unit of work with exclusive access to the substrate.
    pub(crate) fn with_substrate<T>(&self, f: impl FnOnce(&mut dyn Substrate) -> T) -> T {
        let mut guard = self.lock();
        f(&mut **guard)
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Substrate>> {
        // A panic mid-operation cannot leave a half-written key behind: every
        // write is a single `set`. The data is still consistent, so keep going.
        self.substrate.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("substrate lock poisoned, continuing");
            poisoned.into_inner()
        })
    }

    /// Bytes used and capacity, for "storage almost full" hints.
    pub fn usage(&self) -> (usize, usize) {
        self.with_substrate(|sub| (sub.usage(), sub.quota()))
    }
}

/// Read and parse the collection stored under `key`.
pub(crate) fn read_collection<T: DeserializeOwned>(sub: &dyn Substrate, key: &str) -> Loaded<T> {
    let raw = match persist::read_raw(sub, key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Loaded::Missing,
        Err(e) => {
            tracing::warn!(key, error = %e, "storage read failed");
            return Loaded::Corrupt;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(records) => Loaded::Present(records),
        Err(e) => {
            tracing::warn!(key, error = %e, "stored data does not parse, treating as empty");
            Loaded::Corrupt
        }
    }
}

/// Full-replace write of a collection.
pub(crate) fn write_collection<T: Serialize>(sub: &mut dyn Substrate, key: &str, records: &[T]) -> Result<()> {
    let json = serde_json::to_string(records)?;
    persist::write_with_recovery(sub, key, &json)
}
