use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_or_default, server::ServerConfig};
use database::postgres::PostgresConfig;
use domain_contact_details::{Locale, VerificationConfig};
use strum::{Display, EnumString};

pub use core_config::Environment;

/// Where contact details, tokens and notifications are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Process memory; nothing survives a restart
    Memory,
}

/// Application-specific configuration
/// Composes shared config components from the `core_config` and `database` libraries
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub storage: StorageBackend,
    /// Present only with the Postgres backend
    pub database: Option<PostgresConfig>,
    pub verification: VerificationConfig,
    pub default_locale: Locale,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self::load()?)
    }

    fn load() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let storage = parse_env::<StorageBackend>("STORAGE_BACKEND", "postgres")?;

        // Required only when storing in Postgres
        let database = match storage {
            StorageBackend::Postgres => Some(PostgresConfig::from_env()?),
            StorageBackend::Memory => None,
        };

        Ok(Self {
            app: app_info!(),
            environment,
            server,
            storage,
            database,
            verification: VerificationConfig::from_env()?,
            default_locale: parse_env::<Locale>("DEFAULT_LOCALE", "en")?,
        })
    }
}

fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    let raw = env_or_default(key, default);
    raw.trim().parse().map_err(|_| ConfigError::ParseError {
        key: key.to_string(),
        details: format!("unsupported value '{raw}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend_needs_no_database_url() {
        temp_env::with_vars(
            [
                ("STORAGE_BACKEND", Some("memory")),
                ("DATABASE_URL", None),
                ("DEFAULT_LOCALE", Some("FR")),
            ],
            || {
                let config = Config::load().unwrap();
                assert_eq!(config.storage, StorageBackend::Memory);
                assert!(config.database.is_none());
                assert_eq!(config.default_locale, Locale::Fr);
            },
        );
    }

    #[test]
    fn test_postgres_backend_is_default_and_requires_url() {
        temp_env::with_vars(
            [("STORAGE_BACKEND", None::<&str>), ("DATABASE_URL", None)],
            || {
                let err = Config::load().unwrap_err();
                assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "DATABASE_URL"));
            },
        );
    }

    #[test]
    fn test_postgres_backend_reads_pool_settings() {
        temp_env::with_vars(
            [
                ("STORAGE_BACKEND", Some("postgres")),
                ("DATABASE_URL", Some("postgres://localhost/notification")),
                ("DB_MAX_CONNECTIONS", Some("5")),
            ],
            || {
                let config = Config::load().unwrap();
                let database = config.database.unwrap();
                assert_eq!(database.url, "postgres://localhost/notification");
                assert_eq!(database.max_connections, 5);
            },
        );
    }

    #[test]
    fn test_unknown_values_are_rejected() {
        temp_env::with_vars(
            [("STORAGE_BACKEND", Some("mongo")), ("DEFAULT_LOCALE", None)],
            || {
                let err = Config::load().unwrap_err();
                assert!(err.to_string().contains("STORAGE_BACKEND"));
            },
        );

        temp_env::with_vars(
            [("STORAGE_BACKEND", Some("memory")), ("DEFAULT_LOCALE", Some("de"))],
            || {
                let err = Config::load().unwrap_err();
                assert!(err.to_string().contains("DEFAULT_LOCALE"));
            },
        );
    }
}
