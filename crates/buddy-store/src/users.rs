//! User directory: seeding, registration, login and profile updates.
//!
//! Credentials never leave this module. Every function that hands a [`User`]
//! to a caller builds it from [`StoredUser::profile`], which has no password
//! field.

use tracing::{debug, info, warn};

use buddy_shared::crypto::{self, PasswordCheck};

use crate::database::{read_collection, write_collection, Database, Loaded};
use crate::error::{Result, StoreError};
use crate::keys;
use crate::models::{Message, StoredUser, User, UserId};
use crate::seed;

impl Database {
    // ------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------

    /// Seed an empty store. Safe to call on every start.
    ///
    /// Writes the built-in account when no directory exists and an empty
    /// message log when no log exists. An existing but unreadable directory is
    /// left alone.
    pub fn initialize(&self) -> Result<()> {
        self.with_substrate(|sub| {
            match read_collection::<StoredUser>(sub, keys::USERS) {
                Loaded::Missing => {
                    info!("seeding user directory with the built-in account");
                    let seeded = StoredUser {
                        profile: seed::seed_user(),
                        password: Some(crypto::hash_password(seed::SEED_USER_PASSWORD)),
                    };
                    write_collection(sub, keys::USERS, &[seeded])?;
                }
                Loaded::Corrupt => warn!("user directory unreadable, not reseeding"),
                Loaded::Present(users) => debug!(count = users.len(), "user directory present"),
            }

            if matches!(read_collection::<Message>(sub, keys::MESSAGES), Loaded::Missing) {
                write_collection::<Message>(sub, keys::MESSAGES, &[])?;
            }
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Add a new account. Returns the stored profile without its credential.
    ///
    /// Nothing is committed when this returns an error. An unreadable
    /// directory is never overwritten, matching [`Database::initialize`].
    pub fn register_user(&self, user: User, password: &str) -> Result<User> {
        self.with_substrate(|sub| {
            let mut users = match read_collection::<StoredUser>(sub, keys::USERS) {
                Loaded::Present(users) => users,
                Loaded::Missing => Vec::new(),
                Loaded::Corrupt => {
                    warn!(user_id = %user.id, "user directory unreadable, refusing registration");
                    return Err(StoreError::CorruptData {
                        key: keys::USERS.to_string(),
                    });
                }
            };

            if users.iter().any(|u| u.profile.email_matches(&user.email)) {
                return Err(StoreError::DuplicateEmail(user.email));
            }

            let profile = user.clone();
            users.push(StoredUser {
                profile: user,
                password: Some(crypto::hash_password(password)),
            });
            write_collection(sub, keys::USERS, &users)?;

            info!(user_id = %profile.id, "registered user");
            Ok(profile)
        })
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Check credentials. Email matching ignores case; the password must match
    /// exactly.
    ///
    /// A record still holding a plaintext password is rehashed on success.
    pub fn login(&self, email: &str, password: &str) -> Result<User> {
        self.with_substrate(|sub| {
            let mut users = read_collection::<StoredUser>(sub, keys::USERS).into_vec();

            let index = users
                .iter()
                .position(|u| u.profile.email_matches(email))
                .ok_or_else(|| StoreError::UserNotFound(email.to_string()))?;

            let check = match users[index].password.as_deref() {
                Some(stored) => crypto::verify_password(password, stored),
                None => PasswordCheck::Invalid,
            };

            match check {
                PasswordCheck::Invalid => {
                    debug!(user_id = %users[index].profile.id, "wrong password");
                    Err(StoreError::InvalidCredential)
                }
                PasswordCheck::Valid => Ok(users[index].profile.clone()),
                PasswordCheck::ValidLegacy => {
                    let profile = users[index].profile.clone();
                    users[index].password = Some(crypto::hash_password(password));
                    match write_collection(sub, keys::USERS, &users) {
                        Ok(()) => info!(user_id = %profile.id, "upgraded plaintext credential"),
                        Err(e) => warn!(user_id = %profile.id, error = %e, "credential upgrade not saved"),
                    }
                    Ok(profile)
                }
            }
        })
    }

    /// Look up a profile by id.
    ///
    /// The built-in account resolves even when the directory is unreadable.
    pub fn get_user(&self, id: &UserId) -> Option<User> {
        let found = self.with_substrate(|sub| {
            read_collection::<StoredUser>(sub, keys::USERS)
                .into_vec()
                .into_iter()
                .find(|u| &u.profile.id == id)
                .map(|u| u.profile)
        });

        found.or_else(|| seed::is_seed_user(id).then(seed::seed_user))
    }

    /// Like [`Database::get_user`], but a dangling id yields the "Unknown
    /// user" placeholder instead of `None`.
    pub fn resolve_user(&self, id: &UserId) -> User {
        self.get_user(id).unwrap_or_else(|| User::unknown(id.clone()))
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Replace every profile field of the record with `user.id`, keeping its
    /// credential. Unknown ids are ignored.
    pub fn update_profile(&self, user: &User) -> Result<()> {
        self.with_substrate(|sub| {
            let mut users = read_collection::<StoredUser>(sub, keys::USERS).into_vec();

            let Some(record) = users.iter_mut().find(|u| u.profile.id == user.id) else {
                debug!(user_id = %user.id, "profile update for unknown user ignored");
                return Ok(());
            };
            record.profile = user.clone();

            write_collection(sub, keys::USERS, &users)?;
            debug!(user_id = %user.id, "profile updated");
            Ok(())
        })
    }
}
