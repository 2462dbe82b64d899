//! Session cookie management
//!
//! The session credential is a self-contained JWT carried in an HTTP-only
//! cookie; there is no server-side session store. Logout clears the cookie
//! on the client and revokes nothing.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use crate::jwt::DEFAULT_TOKEN_EXPIRY;

/// Name of the session cookie
pub const AUTH_COOKIE: &str = "auth-token";

/// Session cookie configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Send the cookie only over HTTPS
    pub secure: bool,
    /// Cookie lifetime in seconds
    pub max_age: u64,
}

impl SessionConfig {
    /// Create a new SessionConfig from environment variables
    ///
    /// # Environment Variables
    /// - `APP_ENV`: cookies are marked Secure when set to "production"
    /// - `COOKIE_SECURE`: explicit override for the Secure attribute
    /// - `AUTH_TOKEN_EXPIRY`: cookie lifetime in seconds (default: 604800)
    pub fn from_env() -> Self {
        let production = std::env::var("APP_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);

        let secure = std::env::var("COOKIE_SECURE")
            .map(|v| v == "true")
            .unwrap_or(production);

        let max_age = std::env::var("AUTH_TOKEN_EXPIRY")
            .unwrap_or_else(|_| DEFAULT_TOKEN_EXPIRY.to_string())
            .parse()
            .unwrap_or(DEFAULT_TOKEN_EXPIRY);

        SessionConfig { secure, max_age }
    }

    /// Build the session cookie carrying a freshly minted token
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((AUTH_COOKIE, token))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .path("/")
            .max_age(Duration::seconds(self.max_age as i64))
            .build()
    }

    /// Build an already-expired cookie that clears the session on the client
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((AUTH_COOKIE, ""))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .path("/")
            .max_age(Duration::ZERO)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SessionConfig {
        SessionConfig {
            secure: false,
            max_age: 604_800,
        }
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = test_config().session_cookie("tok123".to_string());

        assert_eq!(cookie.name(), AUTH_COOKIE);
        assert_eq!(cookie.value(), "tok123");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(604_800)));
    }

    #[test]
    fn test_secure_flag_follows_config() {
        let config = SessionConfig {
            secure: true,
            max_age: 60,
        };
        assert_eq!(config.session_cookie("t".to_string()).secure(), Some(true));
        assert_eq!(test_config().session_cookie("t".to_string()).secure(), Some(false));
    }

    #[test]
    fn test_removal_cookie_expires_immediately() {
        let cookie = test_config().removal_cookie();

        assert_eq!(cookie.name(), AUTH_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
}
