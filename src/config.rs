//! Runtime settings.
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! settings file (TOML, YAML or JSON by extension), then `CREWWATCH_*`
//! environment variables. Command-line flags are applied on top by the
//! binary.
//!
//! ```toml
//! refresh = "60s"
//!
//! [gateway]
//! base_url = "http://localhost:5000"
//! timeout = "10s"
//!
//! [alerts]
//! sound = true
//! sustained_critical = true
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::gateway::DEFAULT_ENDPOINT;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GatewaySettings {
    pub base_url: String,
    /// Request timeout, e.g. "10s".
    pub timeout: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlertSettings {
    /// Play an audible cue with each alert.
    pub sound: bool,
    /// Re-alert on members that stay CRITICO after the modal is dismissed.
    pub sustained_critical: bool,
}

/// All settings of the dashboard.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub gateway: GatewaySettings,
    /// Polling interval, e.g. "60s".
    pub refresh: String,
    pub alerts: AlertSettings,
}

impl Settings {
    /// Load defaults, the optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("gateway.base_url", DEFAULT_ENDPOINT)?
            .set_default("gateway.timeout", "10s")?
            .set_default("refresh", "60s")?
            .set_default("alerts.sound", true)?
            .set_default("alerts.sustained_critical", true)?;

        if let Some(path) = path {
            if !path.exists() {
                bail!("Settings file not found: {}", path.display());
            }
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("CREWWATCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read settings")?;

        config
            .try_deserialize()
            .context("Invalid settings")
    }

    /// Polling interval. Must be non-zero.
    pub fn refresh_interval(&self) -> Result<Duration> {
        let refresh = parse_duration(&self.refresh)
            .with_context(|| format!("Invalid refresh interval: {}", self.refresh))?;
        if refresh.is_zero() {
            bail!("Refresh interval must be greater than zero");
        }
        Ok(refresh)
    }

    /// Per-request timeout. Must be non-zero.
    pub fn request_timeout(&self) -> Result<Duration> {
        let timeout = parse_duration(&self.gateway.timeout)
            .with_context(|| format!("Invalid request timeout: {}", self.gateway.timeout))?;
        if timeout.is_zero() {
            bail!("Request timeout must be greater than zero");
        }
        Ok(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn settings_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load(None).unwrap();
        assert!(settings.alerts.sound);
        assert!(settings.alerts.sustained_critical);
        assert!(settings.refresh_interval().is_ok());
        assert!(settings.request_timeout().is_ok());
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        let file = settings_file(
            ".toml",
            r#"
refresh = "15s"

[gateway]
base_url = "http://gateway.station:8080"

[alerts]
sustained_critical = false
"#,
        );

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.gateway.base_url, "http://gateway.station:8080");
        assert_eq!(settings.gateway.timeout, "10s");
        assert_eq!(settings.refresh_interval().unwrap(), Duration::from_secs(15));
        assert!(!settings.alerts.sustained_critical);
        assert!(settings.alerts.sound);
    }

    #[test]
    fn test_json_file() {
        let file = settings_file(".json", r#"{"alerts": {"sound": false}}"#);
        let settings = Settings::load(Some(file.path())).unwrap();
        assert!(!settings.alerts.sound);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/crewwatch.toml"))).is_err());
    }

    #[test]
    fn test_zero_refresh_rejected() {
        let file = settings_file(".toml", "refresh = \"0s\"\n");
        let settings = Settings::load(Some(file.path())).unwrap();
        assert!(settings.refresh_interval().is_err());
    }
}
