//! Demo data for a fresh data directory.

use tracing::info;

use crate::backend::{BackendError, BookingClient};
use crate::model::Role;

pub const DEMO_ADMIN_EMAIL: &str = "admin@example.com";
pub const DEMO_ADMIN_PASSWORD: &str = "admin123";

const DEMO_SERVICES: &[(&str, i64)] = &[
    ("Haircut", 100_000),
    ("Hair wash", 50_000),
    ("Manicure", 150_000),
    ("Pedicure", 180_000),
    ("Facial care", 350_000),
    ("Hair coloring", 1_200_000),
];

/// Add the demo services and the demo admin account.
///
/// Services are only added to an empty collection, and an existing admin
/// account is left untouched, so seeding twice is harmless.
pub async fn seed_demo(client: &BookingClient) -> Result<(), BackendError> {
    if client.list_services().await?.is_empty() {
        for (name, amount) in DEMO_SERVICES {
            client.add_service(name, *amount).await?;
        }
        info!(count = DEMO_SERVICES.len(), "Seeded demo services");
    }

    match client
        .create_account(DEMO_ADMIN_EMAIL, DEMO_ADMIN_PASSWORD, "Admin", Role::Admin)
        .await
    {
        Ok(_) => info!(email = DEMO_ADMIN_EMAIL, "Seeded demo admin"),
        Err(BackendError::EmailAlreadyInUse) => {}
        Err(error) => return Err(error),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::FakeBackend;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let fake = FakeBackend::new();
        let client = fake.client();

        seed_demo(&client).await.unwrap();
        seed_demo(&client).await.unwrap();

        assert_eq!(client.list_services().await.unwrap().len(), DEMO_SERVICES.len());
        let admin = client
            .sign_in(DEMO_ADMIN_EMAIL, DEMO_ADMIN_PASSWORD)
            .await
            .unwrap();
        assert!(admin.is_admin());
    }
}
