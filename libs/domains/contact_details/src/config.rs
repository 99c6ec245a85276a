use chrono::Duration;
use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or_default};

/// Email verification settings.
#[derive(Debug, Clone)]
pub struct VerificationConfig {
    /// Lifetime of an issued token
    pub token_ttl: Duration,
    /// Prefix of the verification link sent to users
    pub base_url: String,
    /// Extra dispatch attempts after a failed one
    pub dispatch_retries: u32,
    /// Period of the expired-token purge
    pub cleanup_interval: std::time::Duration,
}

impl VerificationConfig {
    /// `{base}/api/contactDetails/{user_id}/verifications/{token_id}`
    pub fn verification_link(&self, user_id: uuid::Uuid, token_id: uuid::Uuid) -> String {
        format!(
            "{}/api/contactDetails/{}/verifications/{}",
            self.base_url.trim_end_matches('/'),
            user_id,
            token_id
        )
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            token_ttl: Duration::hours(24),
            base_url: "http://localhost:8080".to_string(),
            dispatch_retries: 2,
            cleanup_interval: std::time::Duration::from_secs(3600),
        }
    }
}

impl FromEnv for VerificationConfig {
    /// - EMAIL_VERIFICATION_TOKEN_TTL_HOURS: defaults to 24, must be positive
    /// - EMAIL_VERIFICATION_BASE_URL: defaults to http://localhost:8080
    /// - EMAIL_VERIFICATION_DISPATCH_RETRIES: defaults to 2
    /// - EMAIL_VERIFICATION_CLEANUP_INTERVAL_SECS: defaults to 3600, must be positive
    fn from_env() -> Result<Self, ConfigError> {
        let ttl_hours: i64 = env_parse_or_default("EMAIL_VERIFICATION_TOKEN_TTL_HOURS", "24")?;
        if ttl_hours <= 0 {
            return Err(ConfigError::ParseError {
                key: "EMAIL_VERIFICATION_TOKEN_TTL_HOURS".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }

        let cleanup_secs: u64 =
            env_parse_or_default("EMAIL_VERIFICATION_CLEANUP_INTERVAL_SECS", "3600")?;
        if cleanup_secs == 0 {
            return Err(ConfigError::ParseError {
                key: "EMAIL_VERIFICATION_CLEANUP_INTERVAL_SECS".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            token_ttl: Duration::hours(ttl_hours),
            base_url: env_or_default("EMAIL_VERIFICATION_BASE_URL", "http://localhost:8080"),
            dispatch_retries: env_parse_or_default("EMAIL_VERIFICATION_DISPATCH_RETRIES", "2")?,
            cleanup_interval: std::time::Duration::from_secs(cleanup_secs),
        })
    }
}
