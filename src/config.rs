//! Provider configuration.
//!
//! The access token and base URL come from the provider configuration block
//! or, when absent there, from environment variables:
//!
//! - `PHARE_API_TOKEN`: access token (required one way or the other)
//! - `PHARE_BASE_URL`: API endpoint, defaults to [`DEFAULT_BASE_URL`]
//!
//! Explicit configuration always takes precedence over the environment.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::{PhareClient, DEFAULT_BASE_URL};
use crate::error::ProviderError;
use crate::value::AttrValue;

/// Environment variable holding the access token.
pub const API_TOKEN_ENV: &str = "PHARE_API_TOKEN";

/// Environment variable holding the base URL override.
pub const BASE_URL_ENV: &str = "PHARE_BASE_URL";

/// The provider configuration block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Access token. Sensitive.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub api_token: AttrValue<String>,
    /// API endpoint override.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub base_url: AttrValue<String>,
}

/// Fully resolved client settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Access token.
    pub api_token: String,
    /// API endpoint.
    pub base_url: String,
}

impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ProviderConfig {
    /// Parse the configuration block handed over by the orchestrator.
    ///
    /// A JSON `null` is treated as an empty block.
    pub fn from_value(config: serde_json::Value) -> Result<Self, ProviderError> {
        if config.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(config).map_err(|e| {
            ProviderError::Configuration(format!("invalid provider configuration: {}", e))
        })
    }

    /// Resolve settings against the process environment.
    pub fn resolve(&self) -> Result<ClientSettings, ProviderError> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve settings using `env` to look up environment variables.
    pub fn resolve_with<F>(&self, env: F) -> Result<ClientSettings, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_token = match &self.api_token {
            AttrValue::Value(token) => token.clone(),
            AttrValue::Unset | AttrValue::Null => env(API_TOKEN_ENV).unwrap_or_default(),
        };
        if api_token.is_empty() {
            return Err(ProviderError::Configuration(format!(
                "API token must be configured either via the provider configuration or the {} environment variable",
                API_TOKEN_ENV
            )));
        }

        let base_url = match &self.base_url {
            AttrValue::Value(url) => url.clone(),
            AttrValue::Unset | AttrValue::Null => env(BASE_URL_ENV)
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        };

        Ok(ClientSettings { api_token, base_url })
    }
}

impl ClientSettings {
    /// Build the API client for these settings.
    pub fn build_client(&self) -> Result<PhareClient, ProviderError> {
        debug!(base_url = %self.base_url, "Configuring Phare API client");
        Ok(PhareClient::new(self.api_token.clone(), Some(&self.base_url))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_explicit_config_wins() {
        let config = ProviderConfig::from_value(json!({
            "api_token": "from-config",
            "base_url": "https://staging.phare.io"
        }))
        .unwrap();
        let settings = config
            .resolve_with(env_of(&[(API_TOKEN_ENV, "from-env"), (BASE_URL_ENV, "https://env")]))
            .unwrap();
        assert_eq!(settings.api_token, "from-config");
        assert_eq!(settings.base_url, "https://staging.phare.io");
    }

    #[test]
    fn test_environment_fallback() {
        let config = ProviderConfig::from_value(json!({"api_token": null})).unwrap();
        let settings = config
            .resolve_with(env_of(&[(API_TOKEN_ENV, "from-env"), (BASE_URL_ENV, "https://env")]))
            .unwrap();
        assert_eq!(settings.api_token, "from-env");
        assert_eq!(settings.base_url, "https://env");
    }

    #[test]
    fn test_default_base_url() {
        let config = ProviderConfig::from_value(serde_json::Value::Null).unwrap();
        let settings = config.resolve_with(env_of(&[(API_TOKEN_ENV, "t")])).unwrap();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let err = ProviderConfig::default().resolve_with(env_of(&[])).unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
        assert!(err.to_string().contains(API_TOKEN_ENV));

        // An explicitly empty token does not fall back to the environment.
        let config = ProviderConfig::from_value(json!({"api_token": ""})).unwrap();
        assert!(config.resolve_with(env_of(&[(API_TOKEN_ENV, "from-env")])).is_err());
    }

    #[test]
    fn test_invalid_config_block() {
        let err = ProviderConfig::from_value(json!({"api_token": 12})).unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[test]
    fn test_settings_debug_redacts_token() {
        let settings = ClientSettings {
            api_token: "super-secret".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        };
        assert!(!format!("{:?}", settings).contains("super-secret"));
    }
}
