//! Application state shared across all client commands.
//!
//! The [`AppState`] struct is wrapped in `Arc<Mutex<>>` ([`SharedState`]) so
//! that every command handler can reach it.

use std::sync::{Arc, Mutex, MutexGuard};

use buddy_store::{Catalog, Database, StoreConfig, Theme, User};
use tracing::info;

use crate::error::{ClientError, Result};

pub type SharedState = Arc<Mutex<AppState>>;

/// Central application state.
pub struct AppState {
    /// Handle to the local store.
    pub database: Database,

    /// The signed-in user, mirrored from the session marker.
    /// `None` while logged out.
    pub session: Option<User>,

    /// Listings mirror, loaded once at start-up.
    pub catalog: Catalog,

    pub theme: Theme,

    /// Host color-scheme preference, used when no theme is stored.
    pub prefers_light: bool,
}

impl AppState {
    /// Open the store described by `config` and restore the previous session.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let database = Database::new(config)?;
        Self::with_database(database, config.prefers_light)
    }

    /// Build the state on an already opened store.
    pub fn with_database(database: Database, prefers_light: bool) -> Result<Self> {
        database.initialize()?;

        let session = database.load_session();
        let catalog = Catalog::load(database.clone());
        let theme = database.load_theme(prefers_light);

        info!(
            signed_in = session.is_some(),
            listings = catalog.items().len(),
            theme = theme.as_str(),
            "application state ready"
        );

        Ok(Self {
            database,
            session,
            catalog,
            theme,
            prefers_light,
        })
    }

    pub fn shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    /// The signed-in user, or [`ClientError::NotSignedIn`].
    pub fn current_user(&self) -> Result<&User> {
        self.session.as_ref().ok_or(ClientError::NotSignedIn)
    }
}

/// Lock the shared state for one command.
pub fn lock(state: &SharedState) -> Result<MutexGuard<'_, AppState>> {
    state.lock().map_err(|_| ClientError::StatePoisoned)
}
