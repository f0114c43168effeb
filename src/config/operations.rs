//! Config loading, layering, validation, and conversion.

use super::model::StepConfig;
use crate::client::CallConfig;
use crate::error::{Result, StepError};
use reqwest::Url;
use std::path::Path;
use std::time::Duration;

/// Values that take precedence over the config file.
///
/// The CLI fills these from flags, falling back to `PROMPTSTEP_*`
/// environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub timeout_ms: Option<u64>,
    pub max_retries: Option<u32>,
    pub backoff_base_ms: Option<u64>,
}

impl StepConfig {
    /// Load config from a YAML file without validating it.
    ///
    /// The file may leave out `endpoint` when it is supplied by an override;
    /// call [`StepConfig::validate`] once overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            StepError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::parse_yaml(&content)
    }

    /// Parse and validate config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config = Self::parse_yaml(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn parse_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit; treat it as all defaults.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
            .map_err(|e| StepError::ConfigError(format!("failed to parse config YAML: {}", e)))
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| StepError::ConfigError(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Build the effective config: defaults or `path`, then `overrides`,
    /// then validation.
    pub fn resolve(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(endpoint) = &overrides.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.timeout_ms = timeout_ms;
        }
        if let Some(max_retries) = overrides.max_retries {
            self.max_retries = max_retries;
        }
        if let Some(backoff_base_ms) = overrides.backoff_base_ms {
            self.backoff_base_ms = backoff_base_ms;
        }
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `endpoint` must be set and be an `http` or `https` URL
    /// - `timeout_ms` must be positive
    /// - `step_name` must be non-empty
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(StepError::ConfigError(
                "endpoint is required (set it in the config file, PROMPTSTEP_ENDPOINT, or --endpoint)"
                    .to_string(),
            ));
        }

        let url = Url::parse(endpoint).map_err(|e| {
            StepError::ConfigError(format!("endpoint '{}' is not a valid URL: {}", endpoint, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(StepError::ConfigError(format!(
                "endpoint '{}' must use http or https (found '{}')",
                endpoint,
                url.scheme()
            )));
        }

        if self.timeout_ms == 0 {
            return Err(StepError::ConfigError(
                "timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.step_name.trim().is_empty() {
            return Err(StepError::ConfigError(
                "step_name must be non-empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Call policy for the client.
    pub fn call_config(&self) -> CallConfig {
        CallConfig::new(self.endpoint.trim())
            .with_timeout(self.timeout())
            .with_max_retries(self.max_retries)
            .with_backoff_base(Duration::from_millis(self.backoff_base_ms))
    }

    /// Read the bearer token named by `api_key_env`.
    ///
    /// Returns `Ok(None)` when no variable is configured and an error when
    /// one is configured but unset or empty.
    pub fn api_key(&self) -> Result<Option<String>> {
        let Some(var) = &self.api_key_env else {
            return Ok(None);
        };
        match std::env::var(var) {
            Ok(value) if !value.is_empty() => Ok(Some(value)),
            _ => Err(StepError::ConfigError(format!(
                "api_key_env names '{}', but that environment variable is not set",
                var
            ))),
        }
    }
}
