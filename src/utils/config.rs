use crate::cert::Zone;
use crate::utils::errors::{CloudPkiError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const PROGRAM_NAME: &str = "cloud-pki-rs";
const CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Connection settings, read from `~/.config/cloud-pki-rs/config.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Service URL; empty selects the public service
    pub base_url: String,
    pub api_key: Option<String>,
    /// Default zone, `<application>\<template alias>`
    pub zone: Option<String>,
    /// Reported to the service as the client identifier
    pub client_identifier: String,
    pub http_timeout_secs: u64,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            zone: None,
            client_identifier: "localhost".to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl ConnectorConfig {
    /// Get the config directory: ~/.config/cloud-pki-rs/
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(PROGRAM_NAME))
            .ok_or_else(|| CloudPkiError::Config("Cannot determine config directory".to_string()))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load the default config file, or defaults when it does not exist
    pub fn load() -> Result<Self> {
        let path = Self::config_file()?;
        if path.exists() {
            Self::from_file(&path)
        } else {
            tracing::trace!("No configuration file at {}", path.display());
            Ok(Self::default())
        }
    }

    /// Apply command line / environment values on top of the file
    pub fn with_overrides(
        mut self,
        base_url: Option<String>,
        api_key: Option<String>,
        zone: Option<String>,
    ) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        if api_key.is_some() {
            self.api_key = api_key;
        }
        if zone.is_some() {
            self.zone = zone;
        }
        self
    }

    /// Explicit zone if given, else the configured default
    pub fn resolve_zone(&self, explicit: Option<&str>) -> Result<Zone> {
        match explicit.or(self.zone.as_deref()) {
            Some(zone) => Zone::parse(zone),
            None => Err(CloudPkiError::Config(
                "no zone given and no default zone configured".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ConnectorConfig::from_yaml_str(
            "base_url: https://eu.example.test\nzone: \"Payments\\\\Web\"\n",
        )
        .unwrap();
        assert_eq!(config.base_url, "https://eu.example.test");
        assert_eq!(config.http_timeout_secs, DEFAULT_HTTP_TIMEOUT_SECS);
        assert_eq!(config.api_key, None);

        let zone = config.resolve_zone(None).unwrap();
        assert_eq!(zone.application_name(), "Payments");
        assert_eq!(zone.template_alias(), "Web");
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(
            ConnectorConfig::from_yaml_str("").unwrap(),
            ConnectorConfig::default()
        );
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            ConnectorConfig::from_yaml_str("http_timeout_secs: soon"),
            Err(CloudPkiError::Yaml(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = ConnectorConfig {
            api_key: Some("from-file".to_string()),
            zone: Some("Payments".to_string()),
            ..Default::default()
        }
        .with_overrides(Some("api.example.test".to_string()), None, Some("Billing".to_string()));

        assert_eq!(config.base_url, "api.example.test");
        assert_eq!(config.api_key.as_deref(), Some("from-file"));
        assert_eq!(
            config.resolve_zone(None).unwrap().application_name(),
            "Billing"
        );
        assert_eq!(
            config.resolve_zone(Some("Other")).unwrap().application_name(),
            "Other"
        );
    }

    #[test]
    fn test_missing_zone() {
        assert!(matches!(
            ConnectorConfig::default().resolve_zone(None),
            Err(CloudPkiError::Config(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!(
            "cloud-pki-rs-config-{}.yaml",
            std::process::id()
        ));
        fs::write(&path, "client_identifier: build-agent-3\nhttp_timeout_secs: 5\n").unwrap();

        let config = ConnectorConfig::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.client_identifier, "build-agent-3");
        assert_eq!(config.http_timeout_secs, 5);
    }
}
