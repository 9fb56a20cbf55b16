//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "talentcircle.toml",
    "./config/config.toml",
    "/etc/talentcircle/config.toml",
];

/// Env var naming an explicit config file
const CONFIG_PATH_ENV: &str = "TALENTCIRCLE_CONFIG";

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found), apply environment overrides and validate
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_overrides(&mut config, |key| env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvError(format!("{} has an invalid value '{}'", key, value)))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::EnvError(format!("{} has an invalid value '{}'", key, value))),
    }
}

/// Apply `TC_*` overrides read through `lookup`
pub(crate) fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // HTTP
    if let Some(val) = lookup("TC_HTTP_PORT") {
        config.http.port = parse_var("TC_HTTP_PORT", &val)?;
    }
    if let Some(val) = lookup("TC_HTTP_HOST") {
        config.http.host = val;
    }
    if let Some(val) = lookup("TC_CORS_ORIGINS") {
        config.http.cors_origins = val.split(',').map(|s| s.trim().to_string()).collect();
    }

    // MongoDB
    if let Some(val) = lookup("TC_MONGODB_URI") {
        config.mongodb.uri = val;
    }
    if let Some(val) = lookup("TC_MONGODB_DATABASE") {
        config.mongodb.database = val;
    }

    // Store
    if let Some(val) = lookup("TC_STORE_BACKEND") {
        config.store.backend = val.parse()?;
    }
    if let Some(val) = lookup("TC_STORE_TIMEOUT_MS") {
        config.store.timeout_ms = parse_var("TC_STORE_TIMEOUT_MS", &val)?;
    }

    // Auth
    if let Some(val) = lookup("TC_JWT_SECRET") {
        config.auth.jwt_secret = val;
    }
    if let Some(val) = lookup("TC_JWT_ISSUER") {
        config.auth.jwt_issuer = val;
    }
    if let Some(val) = lookup("TC_TOKEN_EXPIRY_SECS") {
        config.auth.token_expiry_secs = if val.trim().is_empty() {
            None
        } else {
            Some(parse_var("TC_TOKEN_EXPIRY_SECS", &val)?)
        };
    }
    if let Some(val) = lookup("TC_SIGNUP_SECRET") {
        config.auth.signup_secret = Some(val).filter(|s| !s.is_empty());
    }
    if let Some(val) = lookup("TC_ARGON2_MEMORY_KIB") {
        config.auth.argon2.memory_kib = parse_var("TC_ARGON2_MEMORY_KIB", &val)?;
    }
    if let Some(val) = lookup("TC_ARGON2_TIME_COST") {
        config.auth.argon2.time_cost = parse_var("TC_ARGON2_TIME_COST", &val)?;
    }
    if let Some(val) = lookup("TC_ARGON2_PARALLELISM") {
        config.auth.argon2.parallelism = parse_var("TC_ARGON2_PARALLELISM", &val)?;
    }

    // General
    if let Some(val) = lookup("TC_DEV_MODE") {
        config.dev_mode = parse_flag("TC_DEV_MODE", &val)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreBackend;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_apply() {
        let mut config = AppConfig::default();
        let lookup = lookup_from(&[
            ("TC_HTTP_PORT", "9000"),
            ("TC_CORS_ORIGINS", "http://a.test, http://b.test"),
            ("TC_STORE_BACKEND", "memory"),
            ("TC_STORE_TIMEOUT_MS", "250"),
            ("TC_JWT_SECRET", "from-env"),
            ("TC_TOKEN_EXPIRY_SECS", "3600"),
            ("TC_SIGNUP_SECRET", "letmein"),
            ("TC_DEV_MODE", "1"),
        ]);

        apply_overrides(&mut config, lookup).unwrap();

        assert_eq!(config.http.port, 9000);
        assert_eq!(config.http.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.timeout_ms, 250);
        assert_eq!(config.auth.jwt_secret, "from-env");
        assert_eq!(config.auth.token_expiry_secs, Some(3600));
        assert_eq!(config.auth.signup_secret.as_deref(), Some("letmein"));
        assert!(config.dev_mode);
    }

    #[test]
    fn test_invalid_env_value_is_reported() {
        let mut config = AppConfig::default();
        let err = apply_overrides(&mut config, lookup_from(&[("TC_HTTP_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::EnvError(msg) if msg.contains("TC_HTTP_PORT")));

        let err = apply_overrides(&mut config, lookup_from(&[("TC_DEV_MODE", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::EnvError(_)));
    }

    #[test]
    fn test_empty_signup_secret_disables_check() {
        let mut config = AppConfig::default();
        config.auth.signup_secret = Some("old".to_string());
        apply_overrides(&mut config, lookup_from(&[("TC_SIGNUP_SECRET", "")])).unwrap();
        assert!(config.auth.signup_secret.is_none());
    }

    #[test]
    fn test_explicit_path_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "dev_mode = true\n\n[mongodb]\ndatabase = \"circle_test\"").unwrap();

        let loader = ConfigLoader::with_path(file.path());
        assert_eq!(loader.find_config_file().as_deref(), Some(file.path()));

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.mongodb.database, "circle_test");
        assert!(config.dev_mode);
    }
}
