//! Account registration and login.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

use crate::auth::directory::UserDirectory;
use crate::auth::error::AuthError;
use crate::auth::issuer::TokenIssuer;
use crate::auth::password::{
    BCRYPT_COST, MAX_PASSWORD_LENGTH, hash_password, verify_password_blocking,
};
use crate::auth::user_store::UserStore;
use crate::types::{UserId, Username};

/// Password hashed once and checked against when the username is unknown,
/// so a miss costs as much as a wrong password.
const DECOY_PASSWORD: &str = "mailgate-decoy-password";

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub id: UserId,
    pub token: String,
}

/// Why a registration was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    InvalidUsername,
    InvalidPassword,
    UserExists,
    Internal(String),
}

impl std::fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUsername => write!(f, "Invalid username"),
            Self::InvalidPassword => write!(f, "Invalid password"),
            Self::UserExists => write!(f, "User already exists"),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for RegistrationError {}

/// Credential verification in front of the token issuer.
#[derive(Clone)]
pub struct AuthService {
    users: UserStore,
    directory: Arc<dyn UserDirectory>,
    issuer: TokenIssuer,
    bcrypt_cost: u32,
    decoy_hash: Arc<OnceCell<String>>,
}

impl AuthService {
    pub fn new(users: UserStore, issuer: TokenIssuer) -> Self {
        Self {
            directory: Arc::new(users.clone()),
            users,
            issuer,
            bcrypt_cost: BCRYPT_COST,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Override the bcrypt cost used for new password hashes.
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Create an account. Usernames are unique and case-sensitive.
    ///
    /// Passwords longer than [`MAX_PASSWORD_LENGTH`] bytes are refused.
    pub async fn register(&self, username: &str, password: &str) -> Result<UserId, RegistrationError> {
        if username.is_empty() {
            return Err(RegistrationError::InvalidUsername);
        }
        if password.is_empty() || password.len() > MAX_PASSWORD_LENGTH {
            return Err(RegistrationError::InvalidPassword);
        }

        let username = Username::new(username);
        let password_hash = hash_password(password, Some(self.bcrypt_cost))
            .await
            .map_err(|e| RegistrationError::Internal(e.to_string()))?;

        // The unique index on `user.username` decides between racing registrations.
        let user = match self.users.create_user(&username, &password_hash).await {
            Ok(user) => user,
            Err(e) => return Err(self.classify_create_failure(&username, e).await),
        };

        info!("Registered user {} as {}", user.username, user.user_id);
        Ok(user.user_id)
    }

    async fn classify_create_failure(&self, username: &Username, cause: anyhow::Error) -> RegistrationError {
        match self.directory.find_user_by_username(username).await {
            Ok(Some(_)) => {
                warn!("Registration refused: username {} is taken", username);
                RegistrationError::UserExists
            }
            _ => {
                error!("Failed to create user {}: {}", username, cause);
                RegistrationError::Internal(cause.to_string())
            }
        }
    }

    /// Verify credentials and issue a token.
    ///
    /// Unknown usernames and wrong passwords produce the same error.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        if username.is_empty() || password.is_empty() || password.len() > MAX_PASSWORD_LENGTH {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .directory
            .find_user_by_username(&Username::new(username))
            .await
            .map_err(|e| {
                error!("User lookup failed during login: {}", e);
                AuthError::internal("user lookup failed")
            })?;

        let Some(user) = user else {
            self.burn_decoy(password).await;
            warn!("Login failed: unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password_blocking(&user.password_hash, password).await {
            warn!("Login failed: wrong password for {}", user.user_id);
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.issuer.issue(&user.user_id).await?;

        info!("User {} logged in", user.user_id);
        Ok(LoginOutcome {
            id: user.user_id,
            token: issued.token,
        })
    }

    async fn burn_decoy(&self, password: &str) {
        let cost = self.bcrypt_cost;
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| hash_password(DECOY_PASSWORD, Some(cost)))
            .await;

        if let Ok(decoy) = decoy {
            let _ = verify_password_blocking(decoy, password).await;
        }
    }
}
