use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;

pub type Db = Surreal<Any>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: env::var("SURREALDB_URL")
                .unwrap_or_else(|_| "memory".to_string()),
            namespace: env::var("SURREALDB_NAMESPACE")
                .unwrap_or_else(|_| "mailgate".to_string()),
            database: env::var("SURREALDB_DATABASE")
                .unwrap_or_else(|_| "mailgate".to_string()),
            username: env::var("SURREALDB_USERNAME").ok(),
            password: env::var("SURREALDB_PASSWORD").ok(),
        }
    }
}

pub async fn create_connection(config: DatabaseConfig) -> Result<Db> {
    let db = surrealdb::engine::any::connect(config.url).await?;

    // Sign in if credentials are provided
    if let (Some(username), Some(password)) = (config.username, config.password) {
        db.signin(Root {
            username: &username,
            password: &password,
        })
        .await?;
    }

    db.use_ns(config.namespace).use_db(config.database).await?;

    Ok(db)
}

pub async fn ensure_schema(db: &Db) -> Result<()> {
    let schema_queries = [
        // Accounts. The password hash never leaves the store layer.
        "DEFINE TABLE IF NOT EXISTS user SCHEMAFULL;
         DEFINE FIELD IF NOT EXISTS user_id ON TABLE user TYPE string;
         DEFINE FIELD IF NOT EXISTS username ON TABLE user TYPE string;
         DEFINE FIELD IF NOT EXISTS password_hash ON TABLE user TYPE string;
         DEFINE FIELD IF NOT EXISTS created_at ON TABLE user VALUE time::now();",

        // Issued tokens, kept for audit.
        "DEFINE TABLE IF NOT EXISTS session SCHEMAFULL;
         DEFINE FIELD IF NOT EXISTS token_id ON TABLE session TYPE string;
         DEFINE FIELD IF NOT EXISTS user_id ON TABLE session TYPE string;
         DEFINE FIELD IF NOT EXISTS issued_at ON TABLE session TYPE int;
         DEFINE FIELD IF NOT EXISTS expires_at ON TABLE session TYPE int;",

        // Mailboxes
        "DEFINE TABLE IF NOT EXISTS message SCHEMALESS;
         DEFINE FIELD IF NOT EXISTS message_id ON TABLE message TYPE string;
         DEFINE FIELD IF NOT EXISTS sender ON TABLE message TYPE string;
         DEFINE FIELD IF NOT EXISTS recipient ON TABLE message TYPE string;
         DEFINE FIELD IF NOT EXISTS content ON TABLE message TYPE object;
         DEFINE FIELD IF NOT EXISTS sent_at ON TABLE message TYPE string;",

        "DEFINE INDEX IF NOT EXISTS user_username ON TABLE user COLUMNS username UNIQUE;
         DEFINE INDEX IF NOT EXISTS user_user_id ON TABLE user COLUMNS user_id UNIQUE;
         DEFINE INDEX IF NOT EXISTS session_token_id ON TABLE session COLUMNS token_id UNIQUE;
         DEFINE INDEX IF NOT EXISTS session_user_id ON TABLE session COLUMNS user_id;
         DEFINE INDEX IF NOT EXISTS message_recipient ON TABLE message COLUMNS recipient;",
    ];

    for query in schema_queries {
        db.query(query).await?.check()?;
    }

    Ok(())
}

/// Cheap round trip used by the health endpoint.
pub async fn ping(db: &Db) -> Result<()> {
    db.query("RETURN true").await?.check()?;
    Ok(())
}
