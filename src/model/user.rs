use std::fmt;

use serde::{Deserialize, Serialize};

/// Access level of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::User => "Customer",
            Self::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Profile document stored in the `user` collection under the account id.
///
/// Credentials are held by the auth provider only; the profile never carries
/// a password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(skip)]
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl UserProfile {
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_fields_have_no_password() {
        let profile = UserProfile {
            id: "uid".to_string(),
            email: "lan@example.com".to_string(),
            name: "Lan".to_string(),
            role: Role::User,
        };
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "email": "lan@example.com", "name": "Lan", "role": "user" })
        );
    }

    #[test]
    fn test_role_parsing() {
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert!(serde_json::from_str::<Role>("\"owner\"").is_err());
    }
}
