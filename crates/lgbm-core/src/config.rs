use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::params::Parameters;

/// Environment variable that overrides the engine library path.
pub const LIBRARY_ENV: &str = "LGBM_BRIDGE_LIB";

/// Environment variable that points at a config file (used by the C ABI).
pub const CONFIG_ENV: &str = "LGBM_BRIDGE_CONFIG";

/// Top-level bridge configuration, loaded from lgbm-bridge.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub params: ParamsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Explicit path to the engine library (None = search platform names)
    pub path: Option<String>,
}

/// Default parameters layered under every call-specific parameter string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParamsConfig {
    /// Applied when constructing datasets
    #[serde(default)]
    pub dataset: Parameters,
    /// Applied when creating boosters
    #[serde(default)]
    pub booster: Parameters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter used when LGBM_BRIDGE_LOG is unset
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, CoreError> {
        toml::from_str(content).map_err(|e| CoreError::ConfigError(e.to_string()))
    }

    /// Load configuration from file if it exists, otherwise return defaults.
    pub fn load_or_default(path: &str) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(CoreError::Io(_)) => Self::default(),
            Err(e) => {
                tracing::warn!("ignoring config {}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Engine library path: `LGBM_BRIDGE_LIB` wins over the config file.
    pub fn library_path(&self) -> Option<String> {
        std::env::var(LIBRARY_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .or_else(|| self.library.path.clone())
    }

    /// Configured dataset defaults with `call` applied on top, rendered.
    pub fn dataset_params(&self, call: &str) -> Result<String, CoreError> {
        Ok(self.params.dataset.merged(&Parameters::parse(call)?).render())
    }

    /// Configured booster defaults with `call` applied on top, rendered.
    pub fn booster_params(&self, call: &str) -> Result<String, CoreError> {
        Ok(self.params.booster.merged(&Parameters::parse(call)?).render())
    }
}

/// Returns the default config file path based on platform conventions.
/// Search order:
/// 1. `LGBM_BRIDGE_CONFIG`
/// 2. System-wide config: `%PROGRAMDATA%\lgbm-bridge\lgbm-bridge.toml` (Windows) or `/etc/lgbm-bridge/lgbm-bridge.toml`
/// 3. Local fallback: `./lgbm-bridge.toml`
pub fn default_config_path() -> String {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.is_empty() {
            return path;
        }
    }
    #[cfg(windows)]
    {
        let programdata = std::env::var("PROGRAMDATA")
            .unwrap_or_else(|_| r"C:\ProgramData".to_string());
        let system_path = format!(r"{}\lgbm-bridge\lgbm-bridge.toml", programdata);
        if std::path::Path::new(&system_path).exists() {
            return system_path;
        }
    }
    #[cfg(not(windows))]
    {
        let system_path = "/etc/lgbm-bridge/lgbm-bridge.toml";
        if std::path::Path::new(system_path).exists() {
            return system_path.to_string();
        }
    }
    "lgbm-bridge.toml".to_string()
}

fn default_filter() -> String {
    "info".to_string()
}
