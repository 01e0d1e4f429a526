use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use modelfeed::upstream::MODELS_DEV_API_URL;

/// Server settings, layered from `modelfeed.toml` (optional) and
/// `MODELFEED_SERVER__*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    /// Six-field cron expression for the scheduled resolution run.
    pub refresh_cron: String,

    /// models.dev-style upstream document URL.
    pub upstream_url: String,

    /// Where the manifest blob is persisted. In-memory when unset.
    pub data_dir: Option<PathBuf>,

    /// Curated override file. The bundled set is used when unset.
    pub overrides_file: Option<PathBuf>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 7877)?
            // Top of every hour.
            .set_default("refresh_cron", "0 0 * * * *")?
            .set_default("upstream_url", MODELS_DEV_API_URL)?
            .add_source(File::with_name("modelfeed").required(false))
            .add_source(
                Environment::with_prefix("MODELFEED_SERVER")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn manifest_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join("manifest.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = Settings::new().unwrap();
        assert_eq!(settings.socket_addr(), "127.0.0.1:7877");
        assert_eq!(settings.upstream_url, MODELS_DEV_API_URL);
        assert!(settings.manifest_path().is_none());
    }
}
