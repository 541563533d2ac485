pub mod commands;
pub mod error;
pub mod logging;
pub mod state;

use buddy_store::StoreConfig;

pub use error::ClientError;
pub use logging::init_tracing;
pub use state::{AppState, SharedState};

/// Start the client: install logging, open the store from the environment
/// and restore the previous session.
pub fn run() -> Result<SharedState, ClientError> {
    init_tracing();

    let config = StoreConfig::from_env();
    let state = AppState::new(&config)?;
    Ok(state.shared())
}
