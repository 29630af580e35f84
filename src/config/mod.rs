pub mod actions;
pub mod key;
pub mod keybindings;
pub mod loader;
pub mod resolver;

use std::path::PathBuf;

pub use actions::*;
use keybindings::KeybindingsConfig;
pub use loader::{load, save_last_email, save_theme};
pub use resolver::KeyResolver;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Suffix appended to formatted prices.
    pub currency: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency: "VND".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Where collections and accounts are stored.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Email of the last successful sign-in.
    #[serde(default)]
    pub last_email: Option<String>,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

impl AppConfig {
    /// The configured data directory, or the platform default.
    pub fn data_dir(&self) -> PathBuf {
        self.backend
            .data_dir
            .clone()
            .unwrap_or_else(loader::default_data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.theme.name, "Catppuccin Mocha");
        assert_eq!(config.display.currency, "VND");
        assert!(config.backend.data_dir.is_none());
        assert!(config.last_email.is_none());
    }

    #[test]
    fn test_partial_file() {
        let config: AppConfig = toml::from_str(
            r#"
            last_email = "lan@example.com"

            [display]
            currency = "EUR"

            [backend]
            data_dir = "/tmp/lazybook"

            [keybindings.services]
            add = "n"
            "#,
        )
        .unwrap();

        assert_eq!(config.last_email.as_deref(), Some("lan@example.com"));
        assert_eq!(config.display.currency, "EUR");
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/lazybook"));
        assert_eq!(config.keybindings.services.add.display(), "n");
        assert_eq!(config.keybindings.services.profile.display(), "p");
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = AppConfig::default();
        config.last_email = Some("admin@example.com".to_string());
        let text = toml::to_string_pretty(&config).unwrap();
        let back: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.last_email, config.last_email);
        assert_eq!(back.theme.name, config.theme.name);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(toml::from_str::<AppConfig>("[display]\ncurrency = 5").is_err());
    }
}
