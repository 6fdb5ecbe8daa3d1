//! Loader types
//!
//! Declarative provider definition types for YAML parsing.

use crate::config::{TapConfig, START_DATE_KEY};
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::stream::StreamDescriptor;
use crate::template::{self, TemplateContext};
use crate::types::StringMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Provider Definition
// ============================================================================

/// Top-level provider definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDefinition {
    /// Provider name
    pub name: String,
    /// Definition version
    #[serde(default = "default_version")]
    pub version: String,
    /// Base URL for all requests (template)
    pub base_url: String,
    /// Config keys that must be present, besides `start_date`
    #[serde(default)]
    pub required_config: Vec<String>,
    /// Headers sent with every request (templates)
    #[serde(default)]
    pub headers: StringMap,
    /// Query parameters sent with every request (templates)
    #[serde(default)]
    pub params: StringMap,
    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpDefinition,
    /// Stream definitions
    pub streams: Vec<StreamDescriptor>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

impl ProviderDefinition {
    /// Every config key the definition needs, `start_date` excluded
    pub fn required_keys(&self) -> Vec<String> {
        let mut keys = self.required_config.clone();
        for stream in &self.streams {
            if let Some(key) = stream.partitions.config_key() {
                if !keys.iter().any(|k| k == key) {
                    keys.push(key.to_string());
                }
            }
        }
        keys
    }

    /// Get a stream by name
    pub fn stream(&self, name: &str) -> Result<&StreamDescriptor> {
        self.streams
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::StreamNotFound {
                stream: name.to_string(),
            })
    }

    /// Streams to sync: the named ones in definition order, or every
    /// stream selected by default when no names are given
    pub fn select(&self, names: &[String]) -> Result<Vec<&StreamDescriptor>> {
        if names.is_empty() {
            return Ok(self
                .streams
                .iter()
                .filter(|s| s.selected_by_default)
                .collect());
        }

        for name in names {
            self.stream(name)?;
        }
        Ok(self
            .streams
            .iter()
            .filter(|s| names.contains(&s.name))
            .collect())
    }

    /// HTTP client configuration, with the base URL rendered against `config`
    pub fn http_client_config(&self, config: &TapConfig) -> Result<HttpClientConfig> {
        let context = TemplateContext::with_config(config.as_value());
        let base_url = template::render(&self.base_url, &context)?;

        let mut builder = HttpClientConfig::builder()
            .base_url(base_url)
            .timeout(Duration::from_secs(self.http.timeout_secs))
            .max_retries(self.http.max_retries);

        builder = match self.http.rate_limit_rps {
            Some(rps) => builder.rate_limit(RateLimiterConfig::per_second(rps)),
            None => builder.no_rate_limit(),
        };
        if let Some(agent) = &self.http.user_agent {
            builder = builder.user_agent(agent.clone());
        }

        Ok(builder.build())
    }

    /// Config keys referenced by a template, `partition` excluded
    pub(crate) fn config_references(template: &str) -> Vec<String> {
        template::extract_variables(template)
            .into_iter()
            .filter_map(|var| {
                let mut parts = var.split('.');
                match parts.next()? {
                    "partition" => None,
                    "config" => parts.next().map(ToString::to_string),
                    bare => Some(bare.to_string()),
                }
            })
            .collect()
    }

    /// Whether `key` is guaranteed present in a validated config
    pub(crate) fn declares(&self, key: &str) -> bool {
        key == START_DATE_KEY || self.required_keys().iter().any(|k| k == key)
    }
}

// ============================================================================
// HTTP Definition
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpDefinition {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Maximum retries of transient failures
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Rate limit (requests per second)
    #[serde(default)]
    pub rate_limit_rps: Option<u32>,
    /// User agent
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpDefinition {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            rate_limit_rps: None,
            user_agent: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    3
}
