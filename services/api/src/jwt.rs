//! JWT service for session token generation and verification
//!
//! Session tokens are self-contained: the claims carry everything the
//! authorization gate needs, so nothing is stored server-side and nothing
//! can be revoked before expiry.

use anyhow::Result;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::models::Account;

/// Session token lifetime in seconds (7 days)
pub const DEFAULT_TOKEN_EXPIRY: u64 = 604_800;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret used to sign and verify tokens
    pub secret: String,
    /// Token lifetime in seconds
    pub token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `AUTH_TOKEN_SECRET`: token signing secret (required)
    /// - `AUTH_TOKEN_EXPIRY`: token lifetime in seconds (default: 604800)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("AUTH_TOKEN_SECRET")
            .map_err(|_| anyhow::anyhow!("AUTH_TOKEN_SECRET environment variable not set"))?;

        let token_expiry = std::env::var("AUTH_TOKEN_EXPIRY")
            .unwrap_or_else(|_| DEFAULT_TOKEN_EXPIRY.to_string())
            .parse()
            .unwrap_or(DEFAULT_TOKEN_EXPIRY);

        Ok(JwtConfig {
            secret,
            token_expiry,
        })
    }
}

/// Claims embedded in a session token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID
    pub sub: Uuid,
    /// Account email
    pub email: String,
    /// Display name
    pub name: String,
    /// Whether the account is verified
    pub verified: bool,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;

        JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    /// Mint a session token for an account
    pub fn generate_token(&self, account: &Account) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        let claims = Claims {
            sub: account.id,
            email: account.email.clone(),
            name: account.name.clone(),
            verified: account.verified,
            iat: now,
            exp: now + self.config.token_expiry,
        };

        let token = encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?;
        Ok(token)
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Verify a token, treating every failure mode (bad signature, expiry,
    /// garbage input) uniformly as "not authenticated"
    pub fn verify(&self, token: &str) -> Option<Claims> {
        self.validate_token(token).ok()
    }

    /// Token lifetime in seconds
    pub fn token_expiry(&self) -> u64 {
        self.config.token_expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test_signing_secret_32_bytes_min".to_string(),
            token_expiry: 3600,
        })
    }

    fn test_account() -> Account {
        Account {
            id: Uuid::new_v4(),
            email: "jane@x.com".to_string(),
            name: "Jane Doe".to_string(),
            password_hash: "irrelevant".to_string(),
            verified: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let service = test_service();
        let account = test_account();

        let token = service.generate_token(&account).unwrap();
        let claims = service.verify(&token).expect("freshly minted token verifies");

        assert_eq!(claims.sub, account.id);
        assert_eq!(claims.email, account.email);
        assert_eq!(claims.name, account.name);
        assert!(!claims.verified);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_tampered_token_fails() {
        let service = test_service();
        let token = service.generate_token(&test_account()).unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        tampered.push('x');

        assert!(service.verify(&tampered).is_none());
        assert!(service.verify("not-a-token").is_none());
        assert!(service.verify("").is_none());
    }

    #[test]
    fn test_wrong_secret_fails() {
        let service = test_service();
        let other = JwtService::new(JwtConfig {
            secret: "a_completely_different_secret!!!".to_string(),
            token_expiry: 3600,
        });

        let token = service.generate_token(&test_account()).unwrap();
        assert!(other.verify(&token).is_none());
    }

    #[test]
    fn test_expired_token_fails() {
        let service = test_service();
        let account = test_account();

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        // Encode an already-expired claim set with the service's secret,
        // past the default validation leeway.
        let claims = Claims {
            sub: account.id,
            email: account.email.clone(),
            name: account.name.clone(),
            verified: false,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("test_signing_secret_32_bytes_min".as_bytes()),
        )
        .unwrap();

        assert!(service.verify(&token).is_none());
    }
}
