//! Error types for the record store and identity operations.
//!
//! Ingestion problems are not errors in this sense: they are collected as
//! data in [`crate::ingest::IngestResult`] and never raised.

use thiserror::Error;

/// Errors that can occur when reading or writing a record.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("record '{key}' I/O failed: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The record exists but does not hold the expected shape.
    #[error("record '{key}' could not be (de)serialized: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors returned by sign-up and login.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Another user already registered this email.
    #[error("an account with email '{0}' already exists")]
    DuplicateEmail(String),

    /// No user matches the email/password pair.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The user list could not be loaded or saved.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IdentityError {
    /// Returns `true` if the user can fix this by changing their input.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            IdentityError::DuplicateEmail(_) | IdentityError::InvalidCredentials
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_errors_are_classified() {
        assert!(IdentityError::InvalidCredentials.is_user_error());
        assert!(IdentityError::DuplicateEmail("a@b.c".into()).is_user_error());

        let io = StoreError::Io {
            key: "users".into(),
            source: std::io::Error::other("disk full"),
        };
        assert!(!IdentityError::from(io).is_user_error());
    }

    #[test]
    fn messages_name_the_record() {
        let err = StoreError::Io {
            key: "stats_42".into(),
            source: std::io::Error::other("denied"),
        };
        assert!(err.to_string().contains("stats_42"));
    }
}
