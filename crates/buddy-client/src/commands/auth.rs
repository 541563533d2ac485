use tracing::{info, warn};

use buddy_shared::constants::{CAMPUS_EMAIL_DOMAIN, DEFAULT_CAMPUS, DEFAULT_TRUST_SCORE};
use buddy_store::{User, UserId};

use crate::error::{ClientError, Result};
use crate::state::{lock, AppState, SharedState};

/// Generated avatar for accounts without an uploaded picture.
pub fn avatar_url(name: &str) -> String {
    format!(
        "https://ui-avatars.com/api/?name={}&background=7C3AED&color=fff",
        urlencoding::encode(name)
    )
}

fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if email.is_empty() || password.is_empty() {
        return Err(ClientError::MissingFields);
    }
    if !email.to_lowercase().ends_with(CAMPUS_EMAIL_DOMAIN) {
        return Err(ClientError::InvalidDomain);
    }
    Ok(())
}

/// Mirror `user` as the session and write the marker.
fn start_session(app: &mut AppState, user: User) -> User {
    if let Err(e) = app.database.save_session(&user) {
        warn!(user_id = %user.id, error = %e, "session marker not saved, sign-in lasts until restart");
    }
    app.session = Some(user.clone());
    user
}

pub fn login(state: &SharedState, email: &str, password: &str) -> Result<User> {
    validate_credentials(email, password)?;

    let mut guard = lock(state)?;
    let user = guard.database.login(email, password)?;
    info!(user_id = %user.id, "signed in");
    Ok(start_session(&mut guard, user))
}

/// Create an account with the defaults every new student starts with, then
/// sign in as it.
pub fn register(state: &SharedState, name: &str, email: &str, password: &str) -> Result<User> {
    validate_credentials(email, password)?;
    if name.trim().is_empty() {
        return Err(ClientError::MissingName);
    }

    let user = User {
        id: UserId::generate(),
        name: name.to_string(),
        email: email.to_string(),
        age: None,
        course: None,
        avatar: avatar_url(name),
        is_verified: false,
        trust_score: DEFAULT_TRUST_SCORE,
        sustainability_level: 0,
        campus: DEFAULT_CAMPUS.to_string(),
        balance: 0.0,
    };

    let mut guard = lock(state)?;
    let created = guard.database.register_user(user, password)?;
    Ok(start_session(&mut guard, created))
}

pub fn logout(state: &SharedState) -> Result<()> {
    let mut guard = lock(state)?;
    guard.session = None;
    guard.database.clear_session()?;
    info!("signed out");
    Ok(())
}

pub fn current_user(state: &SharedState) -> Result<Option<User>> {
    Ok(lock(state)?.session.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing;
    use buddy_store::seed::{SEED_USER_EMAIL, SEED_USER_PASSWORD};
    use buddy_store::StoreError;

    #[test]
    fn login_with_seed_account_starts_session() {
        let state = testing::state();
        let user = login(&state, SEED_USER_EMAIL, SEED_USER_PASSWORD).unwrap();
        assert_eq!(user.name, "Arjun Mehta");

        let guard = lock(&state).unwrap();
        assert_eq!(guard.session.as_ref(), Some(&user));
        assert_eq!(guard.database.load_session(), Some(user));
    }

    #[test]
    fn empty_fields_are_rejected_before_the_store() {
        let state = testing::state();
        assert!(matches!(login(&state, "", "x"), Err(ClientError::MissingFields)));
        assert!(matches!(
            login(&state, SEED_USER_EMAIL, ""),
            Err(ClientError::MissingFields)
        ));
    }

    #[test]
    fn only_campus_addresses() {
        let state = testing::state();
        assert!(matches!(
            register(&state, "Riya", "riya@gmail.com", "pw"),
            Err(ClientError::InvalidDomain)
        ));
        // domain check ignores case
        register(&state, "Riya", "Riya@BENNETT.EDU.IN", "pw").unwrap();
    }

    #[test]
    fn register_requires_name() {
        let state = testing::state();
        assert!(matches!(
            register(&state, "  ", "riya@bennett.edu.in", "pw"),
            Err(ClientError::MissingName)
        ));
    }

    #[test]
    fn new_account_defaults() {
        let state = testing::state();
        let user = register(&state, "Riya Kapoor", "riya@bennett.edu.in", "pw").unwrap();

        assert!(user.id.as_str().starts_with("u_"));
        assert!(!user.is_verified);
        assert_eq!(user.trust_score, 5.0);
        assert_eq!(user.sustainability_level, 0);
        assert_eq!(user.campus, "Bennett University");
        assert_eq!(user.balance, 0.0);
        assert_eq!(
            user.avatar,
            "https://ui-avatars.com/api/?name=Riya%20Kapoor&background=7C3AED&color=fff"
        );
        assert_eq!(current_user(&state).unwrap(), Some(user));
    }

    #[test]
    fn store_errors_pass_through() {
        let state = testing::state();
        let err = login(&state, SEED_USER_EMAIL, "wrong").unwrap_err();
        assert!(matches!(err, ClientError::Store(StoreError::InvalidCredential)));
        assert_eq!(err.to_string(), "Invalid password.");

        let err = register(&state, "Arjun", SEED_USER_EMAIL, "pw").unwrap_err();
        assert!(matches!(err, ClientError::Store(StoreError::DuplicateEmail(_))));
    }

    #[test]
    fn logout_clears_marker() {
        let state = testing::state();
        login(&state, SEED_USER_EMAIL, SEED_USER_PASSWORD).unwrap();
        logout(&state).unwrap();

        assert_eq!(current_user(&state).unwrap(), None);
        assert_eq!(lock(&state).unwrap().database.load_session(), None);
    }
}
