use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backend::{AuthProvider, BackendError, DocumentStore, encode};
use crate::model::{
    Price, Role, SERVICES_COLLECTION, ServiceRecord, USERS_COLLECTION, UserProfile,
};

/// Typed access to services and accounts.
#[derive(Clone)]
pub struct BookingClient {
    store: Arc<dyn DocumentStore>,
    auth: Arc<dyn AuthProvider>,
}

impl BookingClient {
    pub fn new(store: Arc<dyn DocumentStore>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { store, auth }
    }

    /// Fetch every service record.
    ///
    /// Documents whose fields cannot be decoded are skipped with a warning.
    pub async fn list_services(&self) -> Result<Vec<ServiceRecord>, BackendError> {
        let documents = self.store.fetch_all(SERVICES_COLLECTION).await?;
        let mut services = Vec::with_capacity(documents.len());
        for document in documents {
            let id = document.id.clone();
            match document.decode::<ServiceRecord>() {
                Ok(record) => services.push(record.with_id(id)),
                Err(error) => warn!(%id, %error, "Skipping malformed service document"),
            }
        }
        debug!(count = services.len(), "Fetched services");
        Ok(services)
    }

    /// Add a new service and return it with its generated id.
    pub async fn add_service(&self, name: &str, amount: i64) -> Result<ServiceRecord, BackendError> {
        let record = ServiceRecord::new(name.trim(), Price::whole(amount));
        let id = self.store.add(SERVICES_COLLECTION, encode(&record)?).await?;
        info!(%id, name = %record.name, "Added service");
        Ok(record.with_id(id))
    }

    /// Create a customer account and its profile document.
    ///
    /// The account is created first; the profile is only written once the
    /// auth provider has returned the new account id.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<UserProfile, BackendError> {
        self.create_account(email, password, name, Role::User).await
    }

    pub(super) async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: Role,
    ) -> Result<UserProfile, BackendError> {
        let id = self.auth.create_account(email, password).await?;
        let profile = UserProfile {
            id,
            email: email.to_string(),
            name: name.to_string(),
            role,
        };
        self.store
            .set(USERS_COLLECTION, &profile.id, encode(&profile)?)
            .await?;
        info!(id = %profile.id, %role, "Registered account");
        Ok(profile)
    }

    /// Sign in and load the profile of the account.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile, BackendError> {
        let id = self.auth.sign_in(email, password).await?;
        let document = self
            .store
            .get(USERS_COLLECTION, &id)
            .await?
            .ok_or_else(|| BackendError::ProfileNotFound(id.clone()))?;
        let mut profile: UserProfile = document.decode()?;
        profile.id = id;
        info!(id = %profile.id, role = %profile.role, "Signed in");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{Call, FakeBackend};
    use serde_json::json;

    #[tokio::test]
    async fn test_list_services_merges_ids() {
        let fake = FakeBackend::new();
        fake.insert(SERVICES_COLLECTION, "b", json!({ "service": "Manicure", "prices": 150_000 }));
        fake.insert(SERVICES_COLLECTION, "a", json!({ "service": "Haircut", "prices": "100000" }));
        fake.insert(SERVICES_COLLECTION, "c", json!({ "service": 42 }));

        let services = fake.client().list_services().await.unwrap();

        let ids: Vec<_> = services.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(services[0].name, "Haircut");
    }

    #[tokio::test]
    async fn test_register_creates_account_then_profile() {
        let fake = FakeBackend::new();
        let profile = fake
            .client()
            .register("lan@example.com", "secret1", "Lan")
            .await
            .unwrap();

        assert_eq!(profile.role, Role::User);
        let calls = fake.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], Call::CreateAccount("lan@example.com".to_string()));
        let Call::Set { collection, id, fields } = &calls[1] else {
            panic!("expected profile write, got {:?}", calls[1]);
        };
        assert_eq!(collection, USERS_COLLECTION);
        assert_eq!(id, &profile.id);
        assert!(!fields.contains_key("password"));
        assert_eq!(fields.get("role"), Some(&json!("user")));
    }

    #[tokio::test]
    async fn test_register_skips_profile_when_account_fails() {
        let fake = FakeBackend::new();
        fake.client()
            .register("lan@example.com", "secret1", "Lan")
            .await
            .unwrap();

        let result = fake
            .client()
            .register("lan@example.com", "secret2", "Lan again")
            .await;

        assert!(matches!(result, Err(BackendError::EmailAlreadyInUse)));
        let writes = fake
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Set { .. }))
            .count();
        assert_eq!(writes, 1);
    }

    #[tokio::test]
    async fn test_sign_in_loads_profile() {
        let fake = FakeBackend::new();
        let client = fake.client();
        let created = client
            .create_account("boss@example.com", "admin123", "Boss", Role::Admin)
            .await
            .unwrap();

        let profile = client.sign_in("boss@example.com", "admin123").await.unwrap();

        assert_eq!(profile, created);
        assert!(profile.is_admin());
    }

    #[tokio::test]
    async fn test_sign_in_without_profile() {
        let fake = FakeBackend::new();
        fake.add_account("ghost@example.com", "secret1");

        let result = fake.client().sign_in("ghost@example.com", "secret1").await;

        assert!(matches!(result, Err(BackendError::ProfileNotFound(_))));
    }

    #[tokio::test]
    async fn test_add_service_trims_name() {
        let fake = FakeBackend::new();
        let record = fake.client().add_service("  Pedicure ", 180_000).await.unwrap();

        assert_eq!(record.name, "Pedicure");
        assert!(!record.id.is_empty());
        let services = fake.client().list_services().await.unwrap();
        assert_eq!(services, vec![record]);
    }
}
