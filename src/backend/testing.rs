//! In-memory backend for tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::backend::{
    AuthProvider, BackendError, BookingClient, Document, DocumentStore, Fields, MIN_PASSWORD_LEN,
};

/// A backend call, recorded in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchAll(String),
    Get(String, String),
    Set {
        collection: String,
        id: String,
        fields: Fields,
    },
    Add(String),
    CreateAccount(String),
    SignIn(String),
}

#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    documents: Mutex<BTreeMap<String, BTreeMap<String, Fields>>>,
    accounts: Mutex<BTreeMap<String, (String, String)>>,
    next_id: AtomicU64,
    fail_fetch: AtomicBool,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn client(self: &Arc<Self>) -> BookingClient {
        BookingClient::new(self.clone(), self.clone())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn insert(&self, collection: &str, id: &str, value: Value) {
        let Value::Object(fields) = value else {
            panic!("document must be an object");
        };
        self.documents
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    /// Register credentials without writing a profile document.
    pub fn add_account(&self, email: &str, password: &str) -> String {
        let uid = self.generate_id("uid");
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), (uid.clone(), password.to_string()));
        uid
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn generate_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl DocumentStore for FakeBackend {
    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>, BackendError> {
        self.record(Call::FetchAll(collection.to_string()));
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(BackendError::Io(std::io::Error::other("fetch failed")));
        }
        let documents = self.documents.lock().unwrap();
        Ok(documents
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, BackendError> {
        self.record(Call::Get(collection.to_string(), id.to_string()));
        let documents = self.documents.lock().unwrap();
        Ok(documents
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            }))
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), BackendError> {
        self.record(Call::Set {
            collection: collection.to_string(),
            id: id.to_string(),
            fields: fields.clone(),
        });
        self.documents
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
        Ok(())
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, BackendError> {
        self.record(Call::Add(collection.to_string()));
        let id = self.generate_id("doc");
        self.documents
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }
}

#[async_trait]
impl AuthProvider for FakeBackend {
    async fn create_account(&self, email: &str, password: &str) -> Result<String, BackendError> {
        self.record(Call::CreateAccount(email.to_string()));
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(BackendError::WeakPassword);
        }
        if self.accounts.lock().unwrap().contains_key(email) {
            return Err(BackendError::EmailAlreadyInUse);
        }
        Ok(self.add_account(email, password))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<String, BackendError> {
        self.record(Call::SignIn(email.to_string()));
        match self.accounts.lock().unwrap().get(email) {
            Some((uid, stored)) if stored == password => Ok(uid.clone()),
            _ => Err(BackendError::InvalidCredentials),
        }
    }
}
