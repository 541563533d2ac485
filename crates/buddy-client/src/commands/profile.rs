use tracing::{info, warn};

use buddy_store::User;

use crate::error::Result;
use crate::state::{lock, SharedState};

/// Save edits to the signed-in user's profile.
///
/// The id always stays the signed-in user's. Updates the session mirror, the
/// session marker and the user directory, in that order.
pub fn update_profile(state: &SharedState, mut updated: User) -> Result<User> {
    let mut guard = lock(state)?;
    updated.id = guard.current_user()?.id.clone();

    guard.session = Some(updated.clone());
    if let Err(e) = guard.database.save_session(&updated) {
        warn!(user_id = %updated.id, error = %e, "session marker not updated");
    }
    guard.database.update_profile(&updated)?;

    info!(user_id = %updated.id, "profile updated");
    Ok(updated)
}
