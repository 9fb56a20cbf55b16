//! Password Hashing Service
//!
//! Salted Argon2id hashing in PHC string format.

use argon2::{
    password_hash::{
        rand_core::OsRng,
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2, Algorithm, Params, Version,
};
use tracing::{debug, warn};

use crate::shared::error::{PlatformError, Result};

/// Upper bound on accepted plaintext size, in bytes
const MAX_PASSWORD_BYTES: usize = 1024;

/// Argon2id configuration
#[derive(Debug, Clone)]
pub struct Argon2Config {
    /// Memory cost in KiB (default: 65536 = 64 MiB)
    pub memory_cost: u32,
    /// Time cost (iterations) (default: 3)
    pub time_cost: u32,
    /// Parallelism (default: 4)
    pub parallelism: u32,
    /// Output hash length in bytes (default: 32)
    pub output_len: usize,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost: 65536, // 64 MiB
            time_cost: 3,
            parallelism: 4,
            output_len: 32,
        }
    }
}

impl Argon2Config {
    /// Low memory config for testing (faster but less secure)
    pub fn testing() -> Self {
        Self {
            memory_cost: 4096, // 4 MiB
            time_cost: 1,
            parallelism: 1,
            output_len: 32,
        }
    }

    fn to_params(&self) -> Result<Params> {
        Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(self.output_len),
        )
        .map_err(|e| PlatformError::internal(format!("Invalid Argon2 params: {}", e)))
    }
}

/// Password hashing service
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    pub fn new(config: Argon2Config) -> Result<Self> {
        let params = config.to_params()?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        Ok(Self { argon2 })
    }

    /// Hash a password with a fresh random salt
    pub fn hash_password(&self, password: &str) -> Result<String> {
        if password.is_empty() {
            return Err(PlatformError::validation("Password must not be empty"));
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(PlatformError::validation(format!(
                "Password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }

        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PlatformError::internal(format!("Failed to hash password: {}", e)))?;

        debug!("Password hashed successfully");
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash.
    ///
    /// Mismatches and unparsable stored hashes both yield `false`.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => true,
            Err(argon2::password_hash::Error::Password) => {
                debug!("Password verification failed: incorrect password");
                false
            }
            Err(e) => {
                warn!(error = %e, "Password verification error");
                false
            }
        }
    }
}
