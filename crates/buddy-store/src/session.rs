//! Session marker: the profile of the signed-in user under `user_auth`.

use tracing::{debug, warn};

use crate::database::Database;
use crate::error::Result;
use crate::keys;
use crate::models::User;
use crate::persist;

impl Database {
    /// Record `user` as signed in.
    pub fn save_session(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string(user)?;
        self.with_substrate(|sub| persist::write_with_recovery(sub, keys::SESSION, &json))?;
        debug!(user_id = %user.id, "session saved");
        Ok(())
    }

    /// The signed-in user, if any. An unreadable marker counts as logged out
    /// and is removed.
    pub fn load_session(&self) -> Option<User> {
        self.with_substrate(|sub| {
            let raw = match sub.get(keys::SESSION) {
                Ok(raw) => raw?,
                Err(e) => {
                    warn!(error = %e, "session read failed");
                    return None;
                }
            };
            match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "session marker does not parse, signing out");
                    if let Err(e) = sub.remove(keys::SESSION) {
                        warn!(error = %e, "could not remove session marker");
                    }
                    None
                }
            }
        })
    }

    /// Sign out.
    pub fn clear_session(&self) -> Result<()> {
        self.with_substrate(|sub| sub.remove(keys::SESSION))?;
        debug!("session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn session_round_trip() {
        let db = Database::in_memory(16 * 1024);
        assert_eq!(db.load_session(), None);

        let user = seed::seed_user();
        db.save_session(&user).unwrap();
        assert_eq!(db.load_session(), Some(user));

        db.clear_session().unwrap();
        assert_eq!(db.load_session(), None);
    }

    #[test]
    fn marker_never_contains_password() {
        let db = Database::in_memory(16 * 1024);
        db.initialize().unwrap();
        let user = db.login(seed::SEED_USER_EMAIL, seed::SEED_USER_PASSWORD).unwrap();
        db.save_session(&user).unwrap();

        let raw = db.with_substrate(|sub| sub.get(keys::SESSION)).unwrap().unwrap();
        assert!(!raw.contains("password"));
    }

    #[test]
    fn corrupt_marker_means_logged_out() {
        let db = Database::in_memory(16 * 1024);
        db.with_substrate(|sub| sub.set(keys::SESSION, "{\"id\":")).unwrap();
        assert_eq!(db.load_session(), None);
        assert_eq!(db.with_substrate(|sub| sub.get(keys::SESSION)).unwrap(), None);
    }
}
