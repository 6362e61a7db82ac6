//! Configuration traits and utilities.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{BridgeError, Result};
use crate::{CarbonConfig, LoggingConfig};

/// Trait for bridge configuration types.
///
/// Implement this trait for your bridge's configuration struct to get
/// automatic loading, validation, and access to common config fields.
///
/// # Example
///
/// ```ignore
/// use serde::Deserialize;
/// use pfgraph_bridge_framework::{BridgeConfig, CarbonConfig, LoggingConfig};
///
/// #[derive(Debug, Default, Deserialize)]
/// pub struct MyBridgeConfig {
///     #[serde(default)]
///     pub carbon: CarbonConfig,
///     #[serde(default)]
///     pub logging: LoggingConfig,
/// }
///
/// impl BridgeConfig for MyBridgeConfig {
///     fn carbon(&self) -> &CarbonConfig {
///         &self.carbon
///     }
///
///     fn logging(&self) -> &LoggingConfig {
///         &self.logging
///     }
/// }
/// ```
pub trait BridgeConfig: Sized + DeserializeOwned {
    /// Get the Carbon delivery configuration.
    fn carbon(&self) -> &CarbonConfig;

    /// Get the logging configuration.
    fn logging(&self) -> &LoggingConfig;

    /// Validate the configuration.
    ///
    /// Called automatically after loading. Implementations adding their own
    /// checks should call [`validate_carbon`] too.
    fn validate(&self) -> Result<()> {
        validate_carbon(self.carbon())
    }

    /// Load configuration from a file path.
    ///
    /// Supports JSON5 format. Calls [`validate`](Self::validate) after loading.
    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BridgeError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = pfgraph_common::parse_config(&content)
            .map_err(|e| BridgeError::ConfigParse(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` when given, otherwise use the defaults.
    fn load_or_default(path: Option<&Path>) -> Result<Self>
    where
        Self: Default,
    {
        match path {
            Some(path) => Self::load(path),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }
}

/// Checks shared by every bridge's Carbon section.
pub fn validate_carbon(carbon: &CarbonConfig) -> Result<()> {
    if carbon.port == 0 {
        return Err(BridgeError::validation("carbon.port must be > 0"));
    }
    Ok(())
}
