//! Client configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_API_URL, DEFAULT_CEP_URL};
use crate::error::{EventDevError, EventDevResult};

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_cep_url() -> String {
    DEFAULT_CEP_URL.to_string()
}

fn is_default_api_url(url: &String) -> bool {
    url == DEFAULT_API_URL
}

fn is_default_cep_url(url: &String) -> bool {
    url == DEFAULT_CEP_URL
}

/// Configuration at ~/.config/eventdev/config.toml
///
/// Every key can be overridden with an `EVENTDEV_`-prefixed environment
/// variable (`EVENTDEV_API_URL=...`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EventDevConfig {
    /// Base URL of the REST backend, including the version prefix.
    #[serde(default = "default_api_url", skip_serializing_if = "is_default_api_url")]
    pub api_url: String,

    /// Postal-code lookup service.
    #[serde(default = "default_cep_url", skip_serializing_if = "is_default_cep_url")]
    pub cep_url: String,

    /// Pre-filled e-mail for `login`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Default for EventDevConfig {
    fn default() -> Self {
        EventDevConfig {
            api_url: default_api_url(),
            cep_url: default_cep_url(),
            email: None,
        }
    }
}

impl EventDevConfig {
    /// Load from the default location, creating a commented template on first run.
    pub fn load() -> EventDevResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from `path` (missing is fine) layered with the environment.
    pub fn load_from(path: &Path) -> EventDevResult<Self> {
        let config: EventDevConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("EVENTDEV"))
            .build()
            .map_err(|e| EventDevError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| EventDevError::Config(e.to_string()))?;

        Ok(config.normalized())
    }

    fn normalized(mut self) -> Self {
        self.api_url = self.api_url.trim_end_matches('/').to_string();
        self.cep_url = self.cep_url.trim_end_matches('/').to_string();
        self
    }

    pub fn config_path() -> EventDevResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| EventDevError::Config("Could not determine config directory".into()))?
            .join("eventdev");

        Ok(config_dir.join("config.toml"))
    }

    /// Save the current config to ~/.config/eventdev/config.toml
    pub fn save(&self) -> EventDevResult<()> {
        let config_path = Self::config_path()?;

        let content =
            toml::to_string_pretty(self).map_err(|e| EventDevError::Config(e.to_string()))?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&config_path, content)
            .map_err(|e| EventDevError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> EventDevResult<()> {
        let contents = format!(
            "\
# eventdev configuration

# EventDev backend:
# api_url = \"{}\"

# Postal code (CEP) lookup service:
# cep_url = \"{}\"

# E-mail suggested by `eventdev login`:
# email = \"you@example.com\"
",
            DEFAULT_API_URL, DEFAULT_CEP_URL
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EventDevError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| EventDevError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("eventdev-config-{}-{}", std::process::id(), name))
            .join("config.toml")
    }

    #[test]
    fn test_default_template_parses_to_defaults() {
        let path = temp_path("template");
        EventDevConfig::create_default_config(&path).unwrap();

        let config = EventDevConfig::load_from(&path).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.cep_url, DEFAULT_CEP_URL);
        assert!(config.email.is_none());

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_file_values_and_trailing_slash() {
        let path = temp_path("values");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "api_url = \"https://api.eventdev.example/api/v1/\"\nemail = \"ana@example.com\"\n",
        )
        .unwrap();

        let config = EventDevConfig::load_from(&path).unwrap();
        assert_eq!(config.api_url, "https://api.eventdev.example/api/v1");
        assert_eq!(config.email.as_deref(), Some("ana@example.com"));

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_defaults_are_not_serialized() {
        let content = toml::to_string_pretty(&EventDevConfig::default()).unwrap();
        assert!(content.trim().is_empty());
    }
}
