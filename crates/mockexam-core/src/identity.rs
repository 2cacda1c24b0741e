//! Sign-up, login, and the active session identity.
//!
//! Credentials are compared in plaintext against the stored user list. The
//! active identity is just the signed-in user's profile, persisted under
//! [`RecordKey::CurrentUser`] so it survives restarts.

use uuid::Uuid;

use crate::error::{IdentityError, StoreError};
use crate::model::{User, UserProfile};
use crate::store::{RecordKey, RecordStore};

/// Register a new user and make them the active identity.
pub fn register<S: RecordStore>(
    store: &mut S,
    name: &str,
    email: &str,
    password: &str,
) -> Result<UserProfile, IdentityError> {
    let mut users: Vec<User> = store.load_or_default(&RecordKey::Users)?;

    if users.iter().any(|u| u.email == email) {
        return Err(IdentityError::DuplicateEmail(email.to_string()));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    };
    let profile = user.profile();

    users.push(user);
    store.save(&RecordKey::Users, &users)?;
    store.save(&RecordKey::CurrentUser, &profile)?;

    tracing::info!(user_id = %profile.id, "registered new user");
    Ok(profile)
}

/// Log in with an email/password pair and make that user the active identity.
///
/// Unknown email and wrong password are deliberately indistinguishable.
pub fn authenticate<S: RecordStore>(
    store: &mut S,
    email: &str,
    password: &str,
) -> Result<UserProfile, IdentityError> {
    let users: Vec<User> = store.load_or_default(&RecordKey::Users)?;

    let profile = users
        .iter()
        .find(|u| u.email == email && u.password == password)
        .map(User::profile)
        .ok_or(IdentityError::InvalidCredentials)?;

    store.save(&RecordKey::CurrentUser, &profile)?;
    tracing::info!(user_id = %profile.id, "user logged in");
    Ok(profile)
}

/// Clear the active identity. Calling it with nobody signed in is fine.
pub fn end_session<S: RecordStore>(store: &mut S) -> Result<(), StoreError> {
    store.remove(&RecordKey::CurrentUser)
}

/// The active identity, if someone is signed in.
pub fn current_user<S: RecordStore>(store: &S) -> Result<Option<UserProfile>, StoreError> {
    store.load(&RecordKey::CurrentUser)
}
