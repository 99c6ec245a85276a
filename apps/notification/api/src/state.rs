use sea_orm::DatabaseConnection;

use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` with the in-memory backend
    pub db: Option<DatabaseConnection>,
}
