//! JWT token utilities for authentication and authorization.
//!
//! Provides token creation and validation for the access/refresh token
//! pair. Tokens are stateless bearer credentials: a signed claim set with
//! a subject, an expiry, and a declared type. Validation never reports why
//! a token was rejected; callers treat the absence of claims as an
//! authentication failure.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::ServiceError;

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// JWT claims carried by both access and refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user's email
    pub sub: String,
    /// Token expiration timestamp
    pub exp: usize,
    /// Token issued at timestamp
    pub iat: usize,
    /// Declared token type, "access" or "refresh"
    #[serde(rename = "type")]
    pub token_type: String,
}

impl Claims {
    pub fn subject(&self) -> &str {
        &self.sub
    }

    pub fn is_access(&self) -> bool {
        self.token_type == TOKEN_TYPE_ACCESS
    }

    pub fn is_refresh(&self) -> bool {
        self.token_type == TOKEN_TYPE_REFRESH
    }
}

/// JWT token utility for creating and validating tokens
pub struct JwtUtils {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtUtils {
    /// Create a new JwtUtils instance from the injected configuration.
    pub fn new(config: &Config) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // No leeway: a token is expired the instant its exp passes.
        validation.leeway = 0;

        JwtUtils {
            encoding_key,
            decoding_key,
            validation,
            access_ttl: Duration::minutes(config.access_token_expire_minutes),
            refresh_ttl: Duration::days(config.refresh_token_expire_days),
        }
    }

    /// Generate a signed access token for the given subject.
    ///
    /// `ttl` overrides the configured access-token lifetime when provided.
    pub fn generate_access_token(
        &self,
        subject: &str,
        ttl: Option<Duration>,
    ) -> Result<String, ServiceError> {
        self.generate(subject, ttl.unwrap_or(self.access_ttl), TOKEN_TYPE_ACCESS)
    }

    /// Generate a signed refresh token (longer expiration).
    pub fn generate_refresh_token(&self, subject: &str) -> Result<String, ServiceError> {
        self.generate(subject, self.refresh_ttl, TOKEN_TYPE_REFRESH)
    }

    fn generate(
        &self,
        subject: &str,
        ttl: Duration,
        token_type: &str,
    ) -> Result<String, ServiceError> {
        let now = Utc::now();
        let exp = now + ttl;

        let claims = Claims {
            sub: subject.to_string(),
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
            token_type: token_type.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::internal(format!("Token generation failed: {e}")))
    }

    /// Validate signature and expiry, returning the claims on success.
    ///
    /// Any failure (bad signature, malformed token, expired) yields `None`.
    pub fn verify_token(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .ok()
    }

    /// Returns the subject of a valid token of type "access", `None`
    /// otherwise. A refresh token never passes this check, which prevents
    /// it from being used as an access credential.
    pub fn access_token_subject(&self, token: &str) -> Option<String> {
        self.verify_token(token)
            .filter(Claims::is_access)
            .map(|claims| claims.sub)
    }

    /// Configured refresh-token lifetime.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout_seconds: 3,
            server_port: 3000,
            jwt_secret: "unit-test-secret".to_string(),
            access_token_expire_minutes: 30,
            refresh_token_expire_days: 7,
            otp_expire_minutes: 10,
            otp_code_length: 6,
            password_min_length: 8,
            max_login_attempts: 5,
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            from_email: None,
            from_name: "AuthGate".to_string(),
        }
    }

    #[test]
    fn test_access_token_roundtrip() {
        let jwt_utils = JwtUtils::new(&test_config());
        let token = jwt_utils.generate_access_token("a@x.com", None).unwrap();

        let claims = jwt_utils.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "a@x.com");
        assert_eq!(claims.token_type, TOKEN_TYPE_ACCESS);
        assert!(claims.is_access());
        assert_eq!(
            jwt_utils.access_token_subject(&token),
            Some("a@x.com".to_string())
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        let jwt_utils = JwtUtils::new(&test_config());
        let token = jwt_utils
            .generate_access_token("a@x.com", Some(Duration::seconds(-10)))
            .unwrap();

        assert!(jwt_utils.verify_token(&token).is_none());
    }

    #[test]
    fn test_refresh_token_is_not_an_access_credential() {
        let jwt_utils = JwtUtils::new(&test_config());
        let token = jwt_utils.generate_refresh_token("a@x.com").unwrap();

        let claims = jwt_utils.verify_token(&token).unwrap();
        assert!(claims.is_refresh());
        assert_eq!(jwt_utils.access_token_subject(&token), None);
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let jwt_utils = JwtUtils::new(&test_config());
        let mut other_config = test_config();
        other_config.jwt_secret = "a-different-secret".to_string();
        let other = JwtUtils::new(&other_config);

        let token = other.generate_access_token("a@x.com", None).unwrap();
        assert!(jwt_utils.verify_token(&token).is_none());
        assert!(jwt_utils.verify_token("not-a-token").is_none());
    }
}
