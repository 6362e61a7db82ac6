//! Configuration for the pf bridge.

use std::collections::BTreeMap;
use std::path::Path;

use pfgraph_bridge_framework::{
    BridgeConfig, BridgeError, CarbonConfig, LoggingConfig, Result, validate_carbon,
};
use pfgraph_common::{ByteOrder, DEFAULT_NAMESPACE};
use serde::{Deserialize, Serialize};

use crate::device::DEFAULT_DEVICE;
use crate::metrics::MetricSpec;

/// Complete bridge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PfBridgeConfig {
    /// Carbon delivery settings.
    #[serde(default)]
    pub carbon: CarbonConfig,

    /// pf collection settings.
    #[serde(default)]
    pub pf: PfConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// pf collection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PfConfig {
    /// Control device (default: "/dev/pf").
    #[serde(default = "default_device")]
    pub device: String,

    /// Hostname used as the first path segment.
    /// Use "auto" to detect automatically (default).
    #[serde(default = "default_hostname")]
    pub hostname: String,

    /// Segment between hostname and metric (default: "pf").
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Byte order of the status record (default: native).
    #[serde(default)]
    pub byte_order: ByteOrder,

    /// Metric name to field name. Replaces the built-in table when set.
    #[serde(default)]
    pub metrics: Option<BTreeMap<String, String>>,
}

impl Default for PfConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            hostname: default_hostname(),
            namespace: default_namespace(),
            byte_order: ByteOrder::default(),
            metrics: None,
        }
    }
}

fn default_device() -> String {
    DEFAULT_DEVICE.to_string()
}

fn default_hostname() -> String {
    "auto".to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl PfConfig {
    /// Metric table to publish.
    pub fn metric_spec(&self) -> MetricSpec {
        match &self.metrics {
            Some(map) => MetricSpec::from_map(map.clone()),
            None => MetricSpec::default(),
        }
    }
}

impl PfBridgeConfig {
    /// Get the hostname to use, resolving "auto" if needed.
    pub fn get_hostname(&self) -> String {
        if self.pf.hostname == "auto" {
            hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_else(|| "unknown".to_string())
        } else {
            self.pf.hostname.clone()
        }
    }

    /// Replace the configured device, then validate again.
    pub fn with_device_override(mut self, device: Option<&Path>) -> Result<Self> {
        if let Some(device) = device {
            self.pf.device = device.display().to_string();
            self.validate()?;
        }
        Ok(self)
    }
}

impl BridgeConfig for PfBridgeConfig {
    fn carbon(&self) -> &CarbonConfig {
        &self.carbon
    }

    fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    fn validate(&self) -> Result<()> {
        validate_carbon(&self.carbon)?;

        if self.pf.device.is_empty() {
            return Err(BridgeError::validation("pf.device must not be empty"));
        }

        let namespace = &self.pf.namespace;
        if namespace.is_empty() || namespace.contains('.') || namespace.contains(char::is_whitespace)
        {
            return Err(BridgeError::validation(format!(
                "pf.namespace '{}' must be a single non-empty path segment",
                namespace
            )));
        }

        if let Some(metrics) = &self.pf.metrics {
            if metrics.is_empty() {
                return Err(BridgeError::validation("pf.metrics must not be empty"));
            }
            if let Some((name, _)) = metrics.iter().find(|(m, f)| m.is_empty() || f.is_empty()) {
                return Err(BridgeError::validation(format!(
                    "pf.metrics entry '{}' needs a metric and a field name",
                    name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pfgraph_bridge_framework::Format;
    use pfgraph_common::parse_config;

    #[test]
    fn test_parse_minimal_config() {
        let config: PfBridgeConfig = parse_config("{}").unwrap();
        config.validate().unwrap();

        assert_eq!(config.carbon.port, 2004);
        assert_eq!(config.carbon.format, Format::Pickle);
        assert_eq!(config.pf.device, "/dev/pf");
        assert_eq!(config.pf.hostname, "auto");
        assert_eq!(config.pf.namespace, "pf");
        assert_eq!(config.pf.byte_order, ByteOrder::Native);
        assert_eq!(config.pf.metric_spec(), MetricSpec::default());
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            carbon: { port: 2003, format: "plaintext" },
            pf: {
                device: "/dev/pf0",
                hostname: "fw01",
                namespace: "firewall",
                byte_order: "little",
                metrics: { "states.current": "state_current" },
            },
            logging: { level: "debug" },
        }"#;

        let config: PfBridgeConfig = parse_config(json).unwrap();
        config.validate().unwrap();

        assert_eq!(config.carbon.port, 2003);
        assert_eq!(config.carbon.format, Format::Plaintext);
        assert_eq!(config.pf.device, "/dev/pf0");
        assert_eq!(config.get_hostname(), "fw01");
        assert_eq!(config.pf.byte_order, ByteOrder::Little);
        assert_eq!(config.pf.metric_spec().len(), 1);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_auto_hostname_resolves() {
        let config = PfBridgeConfig::default();
        let hostname = config.get_hostname();
        assert!(!hostname.is_empty());
        assert_ne!(hostname, "auto");
    }

    #[test]
    fn test_validate_rejects_dotted_namespace() {
        let mut config = PfBridgeConfig::default();
        config.pf.namespace = "pf.v4".to_string();
        assert!(matches!(
            config.validate(),
            Err(BridgeError::ConfigValidation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_device() {
        let mut config = PfBridgeConfig::default();
        config.pf.device.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_device_override_is_validated() {
        let config = PfBridgeConfig::default()
            .with_device_override(Some(Path::new("/dev/pf1")))
            .unwrap();
        assert_eq!(config.pf.device, "/dev/pf1");

        let untouched = PfBridgeConfig::default().with_device_override(None).unwrap();
        assert_eq!(untouched.pf.device, "/dev/pf");

        let err = PfBridgeConfig::default()
            .with_device_override(Some(Path::new("")))
            .unwrap_err();
        assert!(matches!(err, BridgeError::ConfigValidation(_)));
    }

    #[test]
    fn test_validate_rejects_bad_metrics() {
        let mut config = PfBridgeConfig::default();
        config.pf.metrics = Some(BTreeMap::new());
        assert!(config.validate().is_err());

        config.pf.metrics = Some(BTreeMap::from([("bytes.in".to_string(), String::new())]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = PfBridgeConfig::default();
        config.carbon.port = 0;
        assert!(config.validate().is_err());
    }
}
