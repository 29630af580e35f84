use std::collections::BTreeMap;
use std::path::PathBuf;

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use async_trait::async_trait;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::backend::local::{read_json_or_default, write_atomic};
use crate::backend::{AuthProvider, BackendError, MIN_PASSWORD_LEN};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    uid: String,
    password_hash: String,
}

/// Email/password accounts kept in a single JSON file.
///
/// Passwords are stored as argon2 hashes. Emails are compared after trimming
/// and lowercasing.
pub struct LocalAuth {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LocalAuth {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<BTreeMap<String, Account>, BackendError> {
        read_json_or_default(&self.path).await
    }
}

fn normalize_email(email: &str) -> Result<String, BackendError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(BackendError::InvalidEmail),
    }
}

async fn hash_password(password: String) -> Result<String, BackendError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| BackendError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| BackendError::Hashing(e.to_string()))?
}

async fn verify_password(password: String, hash: String) -> Result<bool, BackendError> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&hash).map_err(|e| BackendError::Hashing(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| BackendError::Hashing(e.to_string()))?
}

#[async_trait]
impl AuthProvider for LocalAuth {
    async fn create_account(&self, email: &str, password: &str) -> Result<String, BackendError> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(BackendError::WeakPassword);
        }

        let _guard = self.lock.lock().await;
        let mut accounts = self.load().await?;
        if accounts.contains_key(&email) {
            return Err(BackendError::EmailAlreadyInUse);
        }

        let account = Account {
            uid: Uuid::new_v4().simple().to_string(),
            password_hash: hash_password(password.to_string()).await?,
        };
        let uid = account.uid.clone();
        accounts.insert(email, account);
        write_atomic(&self.path, &serde_json::to_vec_pretty(&accounts)?).await?;
        debug!(%uid, "Created account");
        Ok(uid)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<String, BackendError> {
        let email = normalize_email(email)?;
        let accounts = self.load().await?;
        let Some(account) = accounts.get(&email) else {
            warn!("Sign-in attempt for unknown account");
            return Err(BackendError::InvalidCredentials);
        };
        if verify_password(password.to_string(), account.password_hash.clone()).await? {
            Ok(account.uid.clone())
        } else {
            warn!(uid = %account.uid, "Sign-in attempt with wrong password");
            Err(BackendError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(dir: &tempfile::TempDir) -> LocalAuth {
        LocalAuth::new(dir.path().join("accounts.json"))
    }

    #[tokio::test]
    async fn test_create_and_sign_in() {
        let dir = tempfile::tempdir().unwrap();
        let auth = auth(&dir);

        let uid = auth.create_account("Lan@Example.com ", "secret1").await.unwrap();
        let signed_in = auth.sign_in("lan@example.com", "secret1").await.unwrap();

        assert_eq!(uid, signed_in);
    }

    #[tokio::test]
    async fn test_password_is_not_stored_in_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        auth(&dir).create_account("lan@example.com", "secret1").await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("accounts.json")).unwrap();
        assert!(!raw.contains("secret1"));
        assert!(raw.contains("$argon2"));
    }

    #[tokio::test]
    async fn test_rejections() {
        let dir = tempfile::tempdir().unwrap();
        let auth = auth(&dir);
        auth.create_account("lan@example.com", "secret1").await.unwrap();

        assert!(matches!(
            auth.create_account("lan@example.com", "another1").await,
            Err(BackendError::EmailAlreadyInUse)
        ));
        assert!(matches!(
            auth.create_account("new@example.com", "12345").await,
            Err(BackendError::WeakPassword)
        ));
        assert!(matches!(
            auth.create_account("not-an-email", "secret1").await,
            Err(BackendError::InvalidEmail)
        ));
        assert!(matches!(
            auth.sign_in("lan@example.com", "wrong-pass").await,
            Err(BackendError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.sign_in("nobody@example.com", "secret1").await,
            Err(BackendError::InvalidCredentials)
        ));
    }
}
