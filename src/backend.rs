//! Backend access.
//!
//! The client never talks to a concrete database. Pages go through
//! [`BookingClient`], which is built on two traits:
//! - [`DocumentStore`] - Named collections of JSON documents
//! - [`AuthProvider`] - Account creation and sign-in
//!
//! [`open_local`] wires both traits to files in a data directory.

mod auth;
mod client;
mod local;
pub mod seed;
#[cfg(test)]
pub mod testing;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use auth::LocalAuth;
pub use client::BookingClient;
pub use local::LocalStore;

/// Field data of a document.
pub type Fields = serde_json::Map<String, Value>;

/// Minimum password length accepted by the auth provider.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A document read from a collection: its store-assigned id and its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    /// Decode the document fields into a typed value.
    ///
    /// # Errors
    /// Returns an error if the fields do not match the target type.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, BackendError> {
        Ok(serde_json::from_value(Value::Object(self.fields))?)
    }
}

/// Encode a typed value into document fields.
///
/// # Errors
/// Returns an error if the value does not serialize to a JSON object.
pub fn encode<T: Serialize>(value: &T) -> Result<Fields, BackendError> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        other => Err(BackendError::NotAnObject(other.to_string())),
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Document payload must be an object, got {0}")]
    NotAnObject(String),
    #[error("The email address is already in use by another account.")]
    EmailAlreadyInUse,
    #[error("The email address is badly formatted.")]
    InvalidEmail,
    #[error("Password should be at least 6 characters.")]
    WeakPassword,
    #[error("The email or password is incorrect.")]
    InvalidCredentials,
    #[error("No profile found for account {0}.")]
    ProfileNotFound(String),
    #[error("Could not process password: {0}")]
    Hashing(String),
}

/// Named collections of JSON documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch every document of a collection.
    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>, BackendError>;

    /// Fetch a single document, `None` if it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, BackendError>;

    /// Create or overwrite the document with the given id.
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), BackendError>;

    /// Add a document under a generated id and return that id.
    async fn add(&self, collection: &str, fields: Fields) -> Result<String, BackendError>;
}

/// Email/password accounts.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account and return its id.
    async fn create_account(&self, email: &str, password: &str) -> Result<String, BackendError>;

    /// Check the credentials and return the account id.
    async fn sign_in(&self, email: &str, password: &str) -> Result<String, BackendError>;
}

/// Open the file-backed backend rooted at `data_dir`.
pub fn open_local(data_dir: &Path) -> BookingClient {
    BookingClient::new(
        Arc::new(LocalStore::new(data_dir)),
        Arc::new(LocalAuth::new(data_dir.join("accounts.json"))),
    )
}
