use tracing::info;

use buddy_store::Theme;

use crate::error::Result;
use crate::state::{lock, SharedState};

pub fn get_theme(state: &SharedState) -> Result<Theme> {
    Ok(lock(state)?.theme)
}

/// Switch between light and dark and remember the choice.
pub fn toggle_theme(state: &SharedState) -> Result<Theme> {
    let mut guard = lock(state)?;
    let theme = guard.theme.toggled();
    guard.database.save_theme(theme)?;
    guard.theme = theme;

    info!(theme = theme.as_str(), "theme changed");
    Ok(theme)
}
