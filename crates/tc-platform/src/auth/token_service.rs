//! Session Token Service
//!
//! HS256 JWT issuance and validation. Tokens carry the subject as `userId`
//! and are time-unbounded unless an expiry is configured.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::shared::error::{PlatformError, Result};

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    #[serde(rename = "userId")]
    pub user_id: String,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp), absent for non-expiring tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Immutable token configuration, built once at startup
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for HS256
    pub secret_key: String,

    /// Token issuer
    pub issuer: String,

    /// Token lifetime in seconds; `None` issues tokens without `exp`
    pub token_expiry_secs: Option<i64>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            issuer: "talentcircle".to_string(),
            token_expiry_secs: None,
        }
    }
}

pub struct TokenService {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret_key.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret_key.as_bytes());

        info!(
            issuer = %config.issuer,
            expiring = config.token_expiry_secs.is_some(),
            "TokenService initialized with HS256"
        );

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue a token for the given subject
    pub fn issue(&self, user_id: &str) -> Result<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            user_id: user_id.to_string(),
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: self
                .config
                .token_expiry_secs
                .map(|secs| (now + Duration::seconds(secs)).timestamp()),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| PlatformError::internal(format!("Failed to encode JWT: {}", e)))
    }

    /// Validate a token and return its subject
    pub fn verify(&self, token: &str) -> Result<String> {
        self.validate_claims(token).map(|claims| claims.user_id)
    }

    pub fn validate_claims(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        if self.config.token_expiry_secs.is_none() {
            validation.validate_exp = false;
            validation.required_spec_claims.clear();
        }

        let claims = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => PlatformError::TokenExpired,
                _ => PlatformError::InvalidToken { message: e.to_string() },
            })?;

        if claims.user_id.is_empty() {
            return Err(PlatformError::InvalidToken { message: "token has no subject".to_string() });
        }
        Ok(claims)
    }
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::ErrorKind;

    fn config(expiry: Option<i64>) -> AuthConfig {
        AuthConfig {
            secret_key: "test-secret".to_string(),
            issuer: "talentcircle".to_string(),
            token_expiry_secs: expiry,
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let service = TokenService::new(config(None));
        let token = service.issue("0HZXEQ5Y8JY5Z").unwrap();

        assert_eq!(service.verify(&token).unwrap(), "0HZXEQ5Y8JY5Z");
        let claims = service.validate_claims(&token).unwrap();
        assert!(claims.exp.is_none());
    }

    #[test]
    fn test_expiring_token_carries_exp() {
        let service = TokenService::new(config(Some(3600)));
        let token = service.issue("user-1").unwrap();

        let claims = service.validate_claims(&token).unwrap();
        let exp = claims.exp.unwrap();
        assert!(exp > claims.iat);
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = TokenService::new(config(Some(60)));
        let past = Utc::now().timestamp() - 3600;
        let claims = SessionClaims {
            user_id: "user-1".to_string(),
            iss: "talentcircle".to_string(),
            iat: past - 60,
            exp: Some(past),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &service.encoding_key).unwrap();

        let err = service.verify(&token).unwrap_err();
        assert!(matches!(err, PlatformError::TokenExpired));
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenService::new(config(None));
        let other = TokenService::new(AuthConfig { secret_key: "other".to_string(), ..config(None) });

        let token = issuer.issue("user-1").unwrap();
        assert!(matches!(other.verify(&token), Err(PlatformError::InvalidToken { .. })));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let issuer = TokenService::new(AuthConfig { issuer: "elsewhere".to_string(), ..config(None) });
        let verifier = TokenService::new(config(None));

        let token = issuer.issue("user-1").unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_malformed_token_rejected() {
        let service = TokenService::new(config(None));
        let err = service.verify("not.a.jwt").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("bearer abc123"), None);
        assert_eq!(extract_bearer_token("Basic abc123"), None);
    }
}
