// Core modules
mod config;
pub mod api;
pub mod db;
pub mod auth;
pub mod messages;
pub mod types;

// Re-export key types and functions
pub use api::{AppState, ApiError, create_router};
pub use config::{AuthConfig, DEFAULT_BIND};
pub use db::{DatabaseConfig, Db, create_connection, ensure_schema, ping};
pub use db::schema::{MessageRecord, SessionRecord, UserRecord};

use std::sync::Arc;
use anyhow::Result;
use auth::SigningKeys;

/// Convenience function to create a fully wired HTTP application.
///
/// Connects to the database, applies the schema and returns the router
/// with public and bearer-protected routes mounted.
pub async fn create_app(
    db_config: DatabaseConfig,
    keys: Arc<SigningKeys>,
    auth_config: &AuthConfig,
) -> Result<axum::Router> {
    let db = create_connection(db_config).await?;
    ensure_schema(&db).await?;

    let state = AppState::new(db, keys, auth_config)?;
    Ok(create_router(state))
}
