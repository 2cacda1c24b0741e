//! Account commands: signup, login, logout, whoami.

use anyhow::{Context, Result};
use mockexam_core::error::IdentityError;
use mockexam_core::identity;

use super::Workspace;

pub fn signup(ws: &mut Workspace, name: &str, email: &str, password: &str) -> Result<()> {
    anyhow::ensure!(!name.trim().is_empty(), "name must not be empty");
    anyhow::ensure!(!email.trim().is_empty(), "email must not be empty");
    anyhow::ensure!(!password.is_empty(), "password must not be empty");

    let profile = identity::register(&mut ws.store, name, email, password)
        .map_err(account_error)?;
    println!("Welcome, {}! You are now logged in.", profile.name);
    Ok(())
}

pub fn login(ws: &mut Workspace, email: &str, password: &str) -> Result<()> {
    let profile = identity::authenticate(&mut ws.store, email, password)
        .map_err(account_error)?;
    println!("Logged in as {} <{}>", profile.name, profile.email);
    Ok(())
}

/// Input mistakes are reported as-is; storage failures get context.
fn account_error(e: IdentityError) -> anyhow::Error {
    if e.is_user_error() {
        anyhow::Error::new(e)
    } else {
        anyhow::Error::new(e).context("failed to update account records")
    }
}

pub fn logout(ws: &mut Workspace) -> Result<()> {
    let was = identity::current_user(&ws.store)?;
    identity::end_session(&mut ws.store).context("failed to clear session")?;
    match was {
        Some(profile) => println!("Logged out {}.", profile.email),
        None => println!("Not logged in."),
    }
    Ok(())
}

pub fn whoami(ws: &Workspace) -> Result<()> {
    let profile = ws.require_user()?;
    println!("{} <{}>", profile.name, profile.email);
    println!("id: {}", profile.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockexam_core::error::StoreError;

    #[test]
    fn user_errors_pass_through() {
        let err = account_error(IdentityError::InvalidCredentials);
        assert_eq!(format!("{err:#}"), "invalid email or password");
    }

    #[test]
    fn storage_failures_get_context() {
        let store = StoreError::Io {
            key: "users".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let err = account_error(IdentityError::from(store));
        assert!(format!("{err:#}").starts_with("failed to update account records: "));
    }
}
