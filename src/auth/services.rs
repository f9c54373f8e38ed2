use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::{error, instrument, warn};

use super::password::verify_password;
use crate::store::{ProgramStore, User};

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Emails are compared exactly by the store, so normalize before storing or
/// looking one up.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Login failure. Wrong email and wrong password look the same to callers.
#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("{0}")]
    Internal(String),
}

/// Check an email/password pair against the stored argon2 hash.
#[instrument(skip(store, password))]
pub async fn verify_credentials(
    store: &dyn ProgramStore,
    email: &str,
    password: &str,
) -> Result<User, AuthFailure> {
    let user = match store.find_user_by_email(email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email, "login unknown email");
            return Err(AuthFailure::InvalidCredentials);
        }
        Err(e) => {
            error!(error = %e, "find_user_by_email failed");
            return Err(AuthFailure::Internal(e.to_string()));
        }
    };

    let ok = verify_password(password, &user.password_hash).map_err(|e| {
        error!(error = %e, user_id = %user.id, "verify_password failed");
        AuthFailure::Internal(e.to_string())
    })?;

    if !ok {
        warn!(email, user_id = %user.id, "login invalid password");
        return Err(AuthFailure::InvalidCredentials);
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::store::{InMemoryProgramStore, NewUser};

    async fn store_with_jane() -> InMemoryProgramStore {
        let store = InMemoryProgramStore::new();
        store
            .create_user(NewUser {
                name: "Jane".into(),
                email: "jane@x.com".into(),
                password_hash: hash_password("secret").unwrap(),
                age: 30,
                experience: None,
                goals: None,
            })
            .await
            .unwrap();
        store
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("jane@x.com"));
        assert!(!is_valid_email("jane"));
        assert!(!is_valid_email("jane@x"));
        assert!(!is_valid_email("ja ne@x.com"));
    }

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Jane@X.com "), "jane@x.com");
    }

    #[tokio::test]
    async fn correct_password_yields_the_user() {
        let store = store_with_jane().await;
        let user = verify_credentials(&store, "jane@x.com", "secret")
            .await
            .unwrap();
        assert_eq!(user.name, "Jane");
    }

    #[tokio::test]
    async fn wrong_email_and_wrong_password_fail_alike() {
        let store = store_with_jane().await;
        let unknown = verify_credentials(&store, "nobody@x.com", "secret")
            .await
            .unwrap_err();
        let wrong = verify_credentials(&store, "jane@x.com", "guess")
            .await
            .unwrap_err();
        assert!(matches!(unknown, AuthFailure::InvalidCredentials));
        assert!(matches!(wrong, AuthFailure::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }
}
