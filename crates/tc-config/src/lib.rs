//! TalentCircle Configuration System
//!
//! TOML-based configuration with environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub mongodb: MongoConfig,
    pub store: StoreConfig,
    pub auth: AuthSettings,

    /// Enable development mode (relaxes secret requirements)
    pub dev_mode: bool,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub host: String,
    /// Allowed CORS origins; `*` allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// MongoDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "talentcircle".to_string(),
        }
    }
}

/// Which store backend the server wires its services to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Mongo,
    /// Process-local store, for development and demos only
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(Self::Mongo),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::ValidationError(format!("unknown store backend '{}'", other))),
        }
    }
}

/// Store access configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Upper bound for every single store call, in milliseconds
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Mongo,
            timeout_ms: 5000,
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HS256 signing secret for session tokens
    pub jwt_secret: String,
    pub jwt_issuer: String,
    /// Token lifetime; tokens never expire when unset
    pub token_expiry_secs: Option<i64>,
    /// Shared secret required in the `secret` header for signup and password reset
    pub signup_secret: Option<String>,
    pub argon2: Argon2Settings,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: "talentcircle".to_string(),
            token_expiry_secs: None,
            signup_secret: None,
            argon2: Argon2Settings::default(),
        }
    }
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Argon2Settings {
    pub memory_kib: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for Argon2Settings {
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Check the invariants the server relies on at startup
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.timeout_ms == 0 {
            return Err(ConfigError::ValidationError("store.timeout_ms must be positive".to_string()));
        }

        if self.auth.jwt_secret.is_empty() && !self.dev_mode {
            return Err(ConfigError::ValidationError(
                "auth.jwt_secret is required outside dev mode".to_string(),
            ));
        }

        if let Some(expiry) = self.auth.token_expiry_secs {
            if expiry <= 0 {
                return Err(ConfigError::ValidationError(
                    "auth.token_expiry_secs must be positive when set".to_string(),
                ));
            }
        }

        let argon2 = &self.auth.argon2;
        if argon2.time_cost == 0 || argon2.parallelism == 0 {
            return Err(ConfigError::ValidationError(
                "auth.argon2 time_cost and parallelism must be at least 1".to_string(),
            ));
        }
        // Argon2 requires at least 8 KiB per lane
        if argon2.memory_kib < 8 * argon2.parallelism {
            return Err(ConfigError::ValidationError(format!(
                "auth.argon2.memory_kib must be at least {}",
                8 * argon2.parallelism
            )));
        }

        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# TalentCircle Configuration
# Environment variables (TC_*) override these settings

dev_mode = false

[http]
port = 8080
host = "0.0.0.0"
cors_origins = ["*"]

[mongodb]
uri = "mongodb://localhost:27017"
database = "talentcircle"

[store]
backend = "mongo"  # mongo or memory
timeout_ms = 5000

[auth]
jwt_secret = "change-me"
jwt_issuer = "talentcircle"
# token_expiry_secs = 86400
# signup_secret = "shared-secret"

[auth.argon2]
memory_kib = 65536
time_cost = 3
parallelism = 4
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.store.backend, StoreBackend::Mongo);
        assert_eq!(config.store.timeout_ms, 5000);
        assert!(config.auth.token_expiry_secs.is_none());
        assert!(config.auth.signup_secret.is_none());
    }

    #[test]
    fn test_example_toml_parses_and_validates() {
        let config: AppConfig = toml::from_str(&AppConfig::example_toml()).unwrap();
        assert_eq!(config.mongodb.database, "talentcircle");
        assert_eq!(config.auth.jwt_secret, "change-me");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store]\nbackend = \"memory\"\n\n[auth]\njwt_secret = \"s3cret\"").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.timeout_ms, 5000);
        assert_eq!(config.auth.jwt_issuer, "talentcircle");
        assert_eq!(config.auth.argon2.memory_kib, 65536);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store\nbackend = ").unwrap();

        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_validation_requires_secret_outside_dev_mode() {
        let mut config = AppConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        config.dev_mode = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_costs() {
        let mut config = AppConfig { dev_mode: true, ..AppConfig::default() };
        config.store.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig { dev_mode: true, ..AppConfig::default() };
        config.auth.argon2.memory_kib = 16;
        assert!(config.validate().is_err());

        let mut config = AppConfig { dev_mode: true, ..AppConfig::default() };
        config.auth.token_expiry_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_backend_from_str() {
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!("MongoDB".parse::<StoreBackend>().unwrap(), StoreBackend::Mongo);
        assert!("redis".parse::<StoreBackend>().is_err());
    }
}
