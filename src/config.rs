//! Configuration module - JSON file configuration and shared state

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::HeaderValue;
use serde::Deserialize;
use thiserror::Error;

use crate::auth::TokenKeys;
use crate::db::{Db, Dialect};

/// Errors raised while loading or validating the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("jwt_secret is required")]
    MissingSecret,

    #[error("allowed_origins is required unless debug is enabled")]
    MissingOrigins,

    #[error("invalid CORS origin {0:?}")]
    InvalidOrigin(String),

    #[error("allowed_origins must list explicit origins; \"*\" is only allowed through debug mode")]
    WildcardOrigin,

    #[error("bcrypt_cost must be between {min} and {max}, got {got}")]
    InvalidHashCost { got: u32, min: u32, max: u32 },
}

/// Application configuration loaded from a JSON file
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Enables debug routes, verbose error bodies and permissive CORS.
    #[serde(default)]
    pub debug: bool,

    pub db_dialect: Dialect,
    pub db_dsn: String,

    /// HMAC secret for signing auth tokens.
    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default)]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Directory holding the bootstrap CSV files.
    #[serde(default = "default_seed_dir")]
    pub seed_dir: PathBuf,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_seed_dir() -> PathBuf {
    PathBuf::from("bootstrapping")
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl Config {
    /// Read and parse a config file. Call [`Config::validate`] once any
    /// command-line overrides have been applied.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reject configurations the server must not start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if !self.debug && self.allowed_origins.is_empty() {
            return Err(ConfigError::MissingOrigins);
        }
        self.origin_headers()?;

        // Same bounds bcrypt itself enforces.
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::InvalidHashCost {
                got: self.bcrypt_cost,
                min: 4,
                max: 31,
            });
        }
        Ok(())
    }

    /// Allowed origins as header values for the CORS layer.
    pub fn origin_headers(&self) -> Result<Vec<HeaderValue>, ConfigError> {
        self.allowed_origins
            .iter()
            .map(|origin| {
                if origin.trim() == "*" {
                    return Err(ConfigError::WildcardOrigin);
                }
                HeaderValue::from_str(origin)
                    .map_err(|_| ConfigError::InvalidOrigin(origin.clone()))
            })
            .collect()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("debug", &self.debug)
            .field("db_dialect", &self.db_dialect)
            .field("db_dsn", &self.db_dsn)
            .field("jwt_secret", &"<redacted>")
            .field("allowed_origins", &self.allowed_origins)
            .field("bind_addr", &self.bind_addr)
            .field("seed_dir", &self.seed_dir)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Db,
    pub tokens: Arc<TokenKeys>,
}

impl AppState {
    pub fn new(config: Config, db: Db) -> Self {
        let tokens = TokenKeys::new(&config.jwt_secret);

        Self {
            config: Arc::new(config),
            db,
            tokens: Arc::new(tokens),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "db_dialect": "sqlite3",
        "db_dsn": "sqlite::memory:",
        "jwt_secret": "s3cret",
        "allowed_origins": ["https://recipes.example.com"]
    }"#;

    #[test]
    fn defaults_fill_optional_fields() {
        let config = Config::from_json(MINIMAL).unwrap();
        assert!(!config.debug);
        assert_eq!(config.db_dialect, Dialect::Sqlite);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.seed_dir, PathBuf::from("bootstrapping"));
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        config.validate().unwrap();
    }

    #[test]
    fn secret_is_mandatory() {
        let config = Config::from_json(
            r#"{"db_dialect": "mysql", "db_dsn": "mysql://root@localhost/recipes", "allowed_origins": ["http://a"]}"#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::MissingSecret)));
    }

    #[test]
    fn origins_are_mandatory_outside_debug() {
        let mut config = Config::from_json(MINIMAL).unwrap();
        config.allowed_origins.clear();
        assert!(matches!(config.validate(), Err(ConfigError::MissingOrigins)));

        config.debug = true;
        config.validate().unwrap();
    }

    #[test]
    fn bad_origin_is_rejected() {
        let mut config = Config::from_json(MINIMAL).unwrap();
        config.allowed_origins = vec!["bad\norigin".into()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidOrigin(_))
        ));
    }

    #[test]
    fn wildcard_origin_is_rejected() {
        let mut config = Config::from_json(MINIMAL).unwrap();
        config.allowed_origins = vec!["*".into()];
        assert!(matches!(config.validate(), Err(ConfigError::WildcardOrigin)));

        config.allowed_origins = vec!["https://recipes.example.com".into(), " * ".into()];
        assert!(matches!(config.validate(), Err(ConfigError::WildcardOrigin)));
    }

    #[test]
    fn unknown_dialect_fails_to_parse() {
        let err = Config::from_json(r#"{"db_dialect": "oracle", "db_dsn": "x"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn debug_output_hides_secret() {
        let config = Config::from_json(MINIMAL).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("s3cret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::load(Path::new("/nonexistent/recipe-box.config")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
