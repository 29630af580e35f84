use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::price::{Price, format_price};

/// Placeholder shown for prices that cannot be formatted.
pub const MISSING_PRICE: &str = "—";

/// A bookable service as stored in the `services` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Document id assigned by the store. Not part of the stored fields.
    #[serde(skip)]
    pub id: String,
    #[serde(rename = "service", default)]
    pub name: String,
    #[serde(rename = "prices", default)]
    pub price: Option<Price>,
}

impl ServiceRecord {
    pub fn new(name: impl Into<String>, price: Price) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            price: Some(price),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Price formatted for display, or [`MISSING_PRICE`] if it is malformed.
    pub fn display_price(&self, currency: &str) -> String {
        let Some(price) = &self.price else {
            return MISSING_PRICE.to_string();
        };
        format_price(price, currency).unwrap_or_else(|error| {
            warn!(service = %self.id, %error, "Cannot format service price");
            MISSING_PRICE.to_string()
        })
    }
}

impl Display for ServiceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_field_names() {
        let record = ServiceRecord::new("Haircut", Price::whole(100_000)).with_id("abc");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, serde_json::json!({ "service": "Haircut", "prices": 100_000 }));
    }

    #[test]
    fn test_missing_fields_default() {
        let record: ServiceRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record.name, "");
        assert_eq!(record.display_price("VND"), MISSING_PRICE);
    }

    #[test]
    fn test_display_price() {
        let record: ServiceRecord =
            serde_json::from_str(r#"{ "service": "Facial", "prices": "350000" }"#).unwrap();
        assert_eq!(record.display_price("VND"), "350.000 VND");

        let broken: ServiceRecord =
            serde_json::from_str(r#"{ "service": "Facial", "prices": "free" }"#).unwrap();
        assert_eq!(broken.display_price("VND"), MISSING_PRICE);
    }
}
