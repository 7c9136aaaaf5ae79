use serde::{Deserialize, Serialize};

use crate::auth::DEFAULT_TOKEN_TTL_HOURS;

/// Default HTTP bind address.
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Token and credential settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Lifetime of issued tokens, in hours
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    /// bcrypt cost for new password hashes
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    /// Record every issued token in the session table
    #[serde(default = "default_record_sessions")]
    pub record_sessions: bool,
}

fn default_token_ttl_hours() -> i64 {
    DEFAULT_TOKEN_TTL_HOURS
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_record_sessions() -> bool {
    true
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_hours: default_token_ttl_hours(),
            bcrypt_cost: default_bcrypt_cost(),
            record_sessions: default_record_sessions(),
        }
    }
}

impl AuthConfig {
    /// `None` when the hour count does not fit a duration.
    pub fn token_ttl(&self) -> Option<chrono::Duration> {
        chrono::Duration::try_hours(self.token_ttl_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.token_ttl_hours, 24);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert!(config.record_sessions);
        assert_eq!(config.token_ttl(), Some(chrono::Duration::hours(24)));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AuthConfig = serde_json::from_str(r#"{"token_ttl_hours": 1}"#).unwrap();
        assert_eq!(config.token_ttl_hours, 1);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert!(config.record_sessions);
    }
}
