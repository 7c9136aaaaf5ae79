use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use mailgate::auth::password::{MAX_PASSWORD_LENGTH, hash_password};
use mailgate::auth::{DEFAULT_TOKEN_TTL_HOURS, SECRET_ENV_VAR, SigningKeys, UserStore};
use mailgate::types::Username;
use mailgate::{AuthConfig, DEFAULT_BIND, DatabaseConfig};

#[derive(Parser)]
#[command(name = "mailgate")]
#[command(about = "Private messaging service with token authentication")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Server {
        /// Bind address, e.g. 0.0.0.0:8080
        #[arg(long, env = "MAILGATE_BIND", default_value = DEFAULT_BIND)]
        bind: String,
        #[arg(long, env = "SURREALDB_URL", default_value = "memory")]
        db_url: String,
        /// HMAC secret used to sign and verify tokens
        #[arg(long, env = SECRET_ENV_VAR, hide_env_values = true)]
        jwt_secret: String,
        /// Lifetime of issued tokens
        #[arg(long, default_value_t = DEFAULT_TOKEN_TTL_HOURS)]
        token_ttl_hours: i64,
        /// Do not record issued tokens in the session table
        #[arg(long, default_value_t = false)]
        no_sessions: bool,
    },
    /// Initialize the database
    Init {
        #[arg(long, env = "SURREALDB_URL", default_value = "memory")]
        db_url: String,
    },
    /// Register a user without going through the HTTP API
    CreateUser {
        username: String,
        #[arg(long, env = "MAILGATE_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, env = "SURREALDB_URL", default_value = "memory")]
        db_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("mailgate=info".parse()?)
                .add_directive("surrealdb=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server {
            bind,
            db_url,
            jwt_secret,
            token_ttl_hours,
            no_sessions,
        } => {
            // Fails on an empty secret; the server must not start without one.
            let keys = Arc::new(SigningKeys::from_secret(jwt_secret.as_bytes())?);

            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url for server: {}", db_config.url);

            let auth_config = AuthConfig {
                token_ttl_hours,
                record_sessions: !no_sessions,
                ..Default::default()
            };

            let app = mailgate::create_app(db_config, keys, &auth_config).await?;

            let listener = tokio::net::TcpListener::bind(&bind).await?;
            info!("Server listening on http://{}", bind);

            axum::serve(listener, app).await?;
        }
        Commands::Init { db_url } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url for initialization: {}", db_config.url);

            info!("Initializing database...");
            let db = mailgate::create_connection(db_config).await?;
            mailgate::ensure_schema(&db).await?;
            info!("Database initialized successfully");
        }
        Commands::CreateUser {
            username,
            password,
            db_url,
        } => {
            if username.is_empty() || password.is_empty() {
                bail!("username and password must not be empty");
            }
            if password.len() > MAX_PASSWORD_LENGTH {
                bail!("password must be at most {} bytes", MAX_PASSWORD_LENGTH);
            }

            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            let db = mailgate::create_connection(db_config).await?;
            mailgate::ensure_schema(&db).await?;

            let users = UserStore::new(db);
            let username = Username::new(username);
            if users.get_user_by_username(&username).await?.is_some() {
                bail!("user {} already exists", username);
            }

            let password_hash = hash_password(&password, None).await?;
            let user = users.create_user(&username, &password_hash).await?;

            println!("Created user {}", user.username);
            println!("  id: {}", user.user_id);
        }
    }

    Ok(())
}
