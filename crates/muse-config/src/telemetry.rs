use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// Telemetry configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Service name reported with every span and metric
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Deployment environment, e.g. `production`
    #[serde(default)]
    pub environment: Option<String>,
    /// Default log filter when `RUST_LOG` is unset
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Extra resource attributes
    #[serde(default)]
    pub resource_attributes: HashMap<String, String>,
    /// OTLP exporter for traces and generation metrics
    #[serde(default)]
    pub exporter: Option<ExporterConfig>,
    /// Trace sampling rate (0.0 to 1.0)
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: f64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            environment: None,
            log_level: None,
            log_format: LogFormat::default(),
            resource_attributes: HashMap::new(),
            exporter: None,
            sampling_rate: default_sampling_rate(),
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// OTLP collector connection
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub endpoint: Url,
    #[serde(default)]
    pub protocol: ExportProtocol,
    /// Headers sent with every export; only honoured over `http_proto`
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Seconds between metric exports
    #[serde(default = "default_export_interval")]
    pub export_interval_secs: u64,
    /// Seconds before a single export is abandoned
    #[serde(default = "default_export_timeout")]
    pub timeout_secs: u64,
}

impl ExporterConfig {
    pub const fn export_interval(&self) -> Duration {
        Duration::from_secs(self.export_interval_secs)
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// OTLP transport
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExportProtocol {
    #[default]
    Grpc,
    HttpProto,
}

fn default_service_name() -> String {
    "muse".to_owned()
}

#[allow(clippy::missing_const_for_fn)]
fn default_sampling_rate() -> f64 {
    1.0
}

const fn default_export_interval() -> u64 {
    30
}

const fn default_export_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exporter_defaults() {
        let config: TelemetryConfig = toml::from_str(
            r#"
            environment = "staging"

            [exporter]
            endpoint = "http://collector:4317"
            "#,
        )
        .unwrap();

        assert_eq!(config.service_name, "muse");
        assert_eq!(config.environment.as_deref(), Some("staging"));
        assert_eq!(config.log_format, LogFormat::Text);

        let exporter = config.exporter.unwrap();
        assert_eq!(exporter.protocol, ExportProtocol::Grpc);
        assert_eq!(exporter.export_interval(), Duration::from_secs(30));
        assert_eq!(exporter.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn http_exporter_with_headers() {
        let config: TelemetryConfig = toml::from_str(
            r#"
            log_format = "json"

            [exporter]
            endpoint = "https://otlp.example.com/v1"
            protocol = "http_proto"
            headers = { authorization = "Bearer abc" }
            "#,
        )
        .unwrap();

        let exporter = config.exporter.unwrap();
        assert_eq!(exporter.protocol, ExportProtocol::HttpProto);
        assert_eq!(exporter.headers["authorization"], "Bearer abc");
    }
}
