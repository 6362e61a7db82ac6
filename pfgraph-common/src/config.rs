use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::serialization::Format;

/// Default port of Carbon's pickle receiver.
pub const DEFAULT_CARBON_PORT: u16 = 2004;

/// Common Carbon delivery configuration.
///
/// The target host is always given on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarbonConfig {
    /// Port of the Carbon receiver.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Ingestion format: "pickle" or "plaintext".
    #[serde(default)]
    pub format: Format,
}

fn default_port() -> u16 {
    DEFAULT_CARBON_PORT
}

impl Default for CarbonConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            format: Format::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Common logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Load a configuration from a JSON5 string.
pub fn parse_config<T: for<'de> Deserialize<'de>>(content: &str) -> Result<T> {
    json5::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct TestConfig {
        #[serde(default)]
        carbon: CarbonConfig,
        #[serde(default)]
        logging: LoggingConfig,
    }

    #[test]
    fn test_parse_common_sections() {
        let json5 = r#"
        {
            carbon: {
                port: 2003,
                format: "plaintext",
            },
            logging: {
                level: "debug",
            },
        }
        "#;

        let config: TestConfig = parse_config(json5).unwrap();

        assert_eq!(config.carbon.port, 2003);
        assert_eq!(config.carbon.format, Format::Plaintext);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_default_config() {
        let config: TestConfig = parse_config("{}").unwrap();

        assert_eq!(config.carbon.port, DEFAULT_CARBON_PORT);
        assert_eq!(config.carbon.format, Format::Pickle);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_json_logging_format() {
        let json5 = r#"{ logging: { level: "debug", format: "json" } }"#;
        let config: TestConfig = parse_config(json5).unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_parse_error() {
        let result: Result<TestConfig> = parse_config("{ carbon: ");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
