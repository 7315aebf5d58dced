use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub relay: RelaySettings,
    pub upstreams: UpstreamsSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub environment: String,
}

/// Knobs of the forwarding pipeline itself.
#[derive(Debug, Deserialize, Clone)]
pub struct RelaySettings {
    /// Deadline for one upstream call, in seconds.
    pub request_timeout_secs: u64,
    /// Largest inbound body the relay will buffer, in bytes.
    pub max_body_bytes: usize,
}

/// One entry per proxied backend.
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamsSettings {
    pub ehr: UpstreamConfig,
    pub demographic: UpstreamConfig,
    pub provenance: UpstreamConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// Base URL that rendered relative URLs are appended to.
    pub base_url: String,
    #[serde(default)]
    pub tls: UpstreamTlsConfig,
}

/// Per-upstream TLS overrides for the outbound client.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UpstreamTlsConfig {
    /// When false, accept any upstream certificate (testing only).
    pub verify_certificate: bool,
    /// Validate against this CA bundle instead of the native roots.
    pub ca_certificate_path: Option<PathBuf>,
}

impl Default for UpstreamTlsConfig {
    fn default() -> Self {
        Self {
            verify_certificate: true,
            ca_certificate_path: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("application.host", "0.0.0.0")?
            .set_default("application.port", 8080)?
            .set_default("application.environment", environment.clone())?
            .set_default("relay.request_timeout_secs", 30)?
            .set_default("relay.max_body_bytes", 10 * 1024 * 1024)?
            .set_default("upstreams.ehr.base_url", "http://localhost:8081")?
            .set_default("upstreams.demographic.base_url", "http://localhost:8082")?
            .set_default("upstreams.provenance.base_url", "http://localhost:8083")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            // Add configuration file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix
            .add_source(Environment::with_prefix("EHR_GATEWAY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new().expect("Failed to load configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_can_be_loaded() {
        let settings = Settings::new();
        assert!(settings.is_ok());
    }

    #[test]
    fn test_default_upstreams_are_http() {
        let settings = Settings::new().unwrap();
        assert!(settings.upstreams.ehr.base_url.starts_with("http://"));
        assert!(settings.upstreams.demographic.base_url.starts_with("http://"));
        assert!(settings.upstreams.provenance.base_url.starts_with("http://"));
    }

    #[test]
    fn test_tls_defaults_to_verification() {
        let tls = UpstreamTlsConfig::default();
        assert!(tls.verify_certificate);
        assert!(tls.ca_certificate_path.is_none());
    }
}
