//! Configuration
//!
//! Layered configuration: built-in defaults, then an optional config file,
//! then `CODEWELD__`-prefixed environment variables (double underscore as the
//! section separator, e.g. `CODEWELD__REGISTRY__BASE_URL`).

use crate::error::AssemblyError;
use crate::registry::DEFAULT_REGISTRY_URL;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Registry client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// NuGet v3 flat-container base URL
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        RegistrySettings {
            base_url: DEFAULT_REGISTRY_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Manifest template settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaffoldSettings {
    pub target_framework: String,
    pub nullable: bool,
    pub implicit_usings: bool,
}

impl Default for ScaffoldSettings {
    fn default() -> Self {
        ScaffoldSettings {
            target_framework: "net8.0".to_string(),
            nullable: true,
            implicit_usings: true,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level filter (trace, debug, info, warn, error, off)
    pub level: String,
    /// Output format (text, json)
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub registry: RegistrySettings,
    pub scaffold: ScaffoldSettings,
    pub logging: LoggingSettings,
}

impl EngineConfig {
    /// Load configuration from an optional file plus environment overrides
    pub fn load(config_file: Option<&Path>) -> Result<Self, AssemblyError> {
        let mut builder = config::Config::builder();
        if let Some(path) = config_file {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("CODEWELD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );
        builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| AssemblyError::Config(e.to_string()))
    }
}
