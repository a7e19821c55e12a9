use crate::banking::{CustomerIdentity, NumberFormat};
use crate::cli::Cli;
use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub application_name: String,
    pub accounts_base_url: String,
    pub accounts_api_key: Option<String>,
    pub session_file: Option<PathBuf>,
    pub guest_customer_id: i64,
    pub guest_customer_name: String,
    pub capture_delay_ms: u64,
    pub locale: String,
    pub account_number: String,
    pub dark_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            application_name: "BankLens".to_string(),
            accounts_base_url: "http://localhost:54321/rest/v1".to_string(),
            accounts_api_key: None,
            session_file: Self::default_session_path(),
            guest_customer_id: 101,
            guest_customer_name: "Ahmed Mohammed".to_string(),
            capture_delay_ms: 500,
            locale: "en-US".to_string(),
            account_number: "AE59 1234 5678 9012 3456".to_string(),
            dark_mode: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AppConfig {
    pub fn load(cli: &Cli) -> Result<Self, AppConfigError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("application_name", defaults.application_name.clone())?
            .set_default("accounts_base_url", defaults.accounts_base_url.clone())?
            .set_default("guest_customer_id", defaults.guest_customer_id)?
            .set_default("guest_customer_name", defaults.guest_customer_name.clone())?
            .set_default("capture_delay_ms", defaults.capture_delay_ms)?
            .set_default("locale", defaults.locale.clone())?
            .set_default("account_number", defaults.account_number.clone())?
            .set_default("dark_mode", defaults.dark_mode)?;

        if let Some(session) = &defaults.session_file {
            builder = builder.set_default("session_file", session.to_string_lossy().into_owned())?;
        }

        if let Some(profile) = &cli.profile {
            let profile_file_name = format!("banklens.{profile}.toml");
            if let Some(path) = Self::config_dir_path(&profile_file_name) {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        if let Some(config_path) = &cli.config {
            builder = builder.add_source(File::from(config_path.clone()).required(true));
        } else if let Some(path) = Self::config_dir_path("banklens.toml") {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder = builder.add_source(Environment::with_prefix("BANKLENS").separator("__"));

        let built = builder.build()?;
        Ok(built.try_deserialize::<AppConfig>()?)
    }

    pub fn guest_identity(&self) -> CustomerIdentity {
        CustomerIdentity::new(self.guest_customer_id, self.guest_customer_name.clone())
    }

    pub fn capture_delay(&self) -> Duration {
        Duration::from_millis(self.capture_delay_ms)
    }

    pub fn number_format(&self) -> NumberFormat {
        NumberFormat::for_locale(&self.locale)
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "DigitalDataCo", "BankLens")
    }

    fn config_dir_path(file_name: &str) -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(file_name))
    }

    fn default_session_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_local_dir().join("current_customer.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn explicit_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "accounts_base_url = \"https://db.example.com/rest/v1\"\ncapture_delay_ms = 250\nlocale = \"de-DE\""
        )
        .unwrap();

        let cli = Cli::parse_from(["banklens", "--config", file.path().to_str().unwrap()]);
        let config = AppConfig::load(&cli).unwrap();

        assert_eq!(config.accounts_base_url, "https://db.example.com/rest/v1");
        assert_eq!(config.capture_delay(), Duration::from_millis(250));
        assert_eq!(config.number_format().decimal_separator, ',');
        assert_eq!(config.guest_identity(), CustomerIdentity::new(101, "Ahmed Mohammed"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let cli = Cli::parse_from(["banklens", "--config", "/nonexistent/banklens.toml"]);
        assert!(AppConfig::load(&cli).is_err());
    }
}
