//! Domain models for lazybook.
//!
//! This module contains core domain types that are not UI-specific:
//! - [`ServiceRecord`] - A bookable service with its price
//! - [`UserProfile`] - The profile document stored for each account
//! - [`Price`] - Stored price values and their display formatting

pub mod price;
pub mod service;
pub mod user;

pub use price::{Price, parse_price_input};
pub use service::ServiceRecord;
pub use user::{Role, UserProfile};

/// Collection holding [`ServiceRecord`] documents.
pub const SERVICES_COLLECTION: &str = "services";

/// Collection holding [`UserProfile`] documents, keyed by account id.
pub const USERS_COLLECTION: &str = "user";
