//! Account configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ACCOUNTS_DATABASE_URL` - `PostgreSQL` connection string
//!
//! ## Optional
//! - `ACCOUNTS_MEDIA_ROOT` - Directory uploaded media is stored under (default: `media`)
//! - `ACCOUNTS_AVATARS_PATH` - Pool of stock avatars for new superusers
//!   (default: `static/images/avatars`)

use std::fmt;
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_MEDIA_ROOT: &str = "media";
const DEFAULT_AVATARS_PATH: &str = "static/images/avatars";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Account configuration.
#[derive(Clone)]
pub struct AccountsConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Root directory for stored media
    pub media_root: PathBuf,
    /// Directory holding the stock avatar pool
    pub avatars_path: PathBuf,
}

impl fmt::Debug for AccountsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountsConfig")
            .field("database_url", &"[REDACTED]")
            .field("media_root", &self.media_root)
            .field("avatars_path", &self.avatars_path)
            .finish()
    }
}

impl AccountsConfig {
    /// Load configuration from the process environment (and `.env`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `ACCOUNTS_DATABASE_URL` is unset,
    /// `ConfigError::InvalidEnvVar` if a variable is set but empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("ACCOUNTS_DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("ACCOUNTS_DATABASE_URL".to_owned()))?;
        if database_url.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "ACCOUNTS_DATABASE_URL".to_owned(),
                "must not be empty".to_owned(),
            ));
        }

        let path_or = |key: &str, default: &str| -> Result<PathBuf, ConfigError> {
            match lookup(key) {
                None => Ok(PathBuf::from(default)),
                Some(v) if v.trim().is_empty() => Err(ConfigError::InvalidEnvVar(
                    key.to_owned(),
                    "must not be empty".to_owned(),
                )),
                Some(v) => Ok(PathBuf::from(v)),
            }
        };

        Ok(Self {
            database_url: SecretString::from(database_url),
            media_root: path_or("ACCOUNTS_MEDIA_ROOT", DEFAULT_MEDIA_ROOT)?,
            avatars_path: path_or("ACCOUNTS_AVATARS_PATH", DEFAULT_AVATARS_PATH)?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            AccountsConfig::from_lookup(lookup(&[("ACCOUNTS_DATABASE_URL", "postgres://db")])).unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://db");
        assert_eq!(config.media_root, PathBuf::from("media"));
        assert_eq!(config.avatars_path, PathBuf::from("static/images/avatars"));
    }

    #[test]
    fn test_overrides() {
        let config = AccountsConfig::from_lookup(lookup(&[
            ("ACCOUNTS_DATABASE_URL", "postgres://db"),
            ("ACCOUNTS_MEDIA_ROOT", "/srv/media"),
            ("ACCOUNTS_AVATARS_PATH", "/srv/avatars"),
        ]))
        .unwrap();
        assert_eq!(config.media_root, PathBuf::from("/srv/media"));
        assert_eq!(config.avatars_path, PathBuf::from("/srv/avatars"));
    }

    #[test]
    fn test_missing_database_url() {
        assert!(matches!(
            AccountsConfig::from_lookup(lookup(&[])),
            Err(ConfigError::MissingEnvVar(var)) if var == "ACCOUNTS_DATABASE_URL"
        ));
    }

    #[test]
    fn test_empty_values_rejected() {
        assert!(matches!(
            AccountsConfig::from_lookup(lookup(&[("ACCOUNTS_DATABASE_URL", " ")])),
            Err(ConfigError::InvalidEnvVar(..))
        ));
        assert!(matches!(
            AccountsConfig::from_lookup(lookup(&[
                ("ACCOUNTS_DATABASE_URL", "postgres://db"),
                ("ACCOUNTS_MEDIA_ROOT", ""),
            ])),
            Err(ConfigError::InvalidEnvVar(var, _)) if var == "ACCOUNTS_MEDIA_ROOT"
        ));
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config =
            AccountsConfig::from_lookup(lookup(&[("ACCOUNTS_DATABASE_URL", "postgres://u:pw@db")]))
                .unwrap();
        assert!(!format!("{config:?}").contains("pw@db"));
    }
}
