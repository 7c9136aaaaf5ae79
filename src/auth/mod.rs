//! Authentication and authorization.
//!
//! Login and request handling flow through these pieces:
//!
//! - **password**: bcrypt hashing and verification of credentials
//! - **issuer**: signs fixed-lifetime HS256 tokens for a verified principal,
//!   recording each one in the session registry
//! - **validator** / **middleware**: authenticate `Authorization: Bearer`
//!   requests and attach an [`AuthContext`]
//! - **guard**: ownership checks run by handlers against the context
//!
//! ## Security Model
//!
//! - The signing secret is loaded once at startup and never mutated
//! - Only HS256 is accepted; any other header algorithm is rejected
//! - Tokens are checked for signature and expiry without storage, then the
//!   principal is confirmed to still exist (strict mode)
//! - Rejection reasons are logged, never returned to the client
//!
//! ## Usage
//!
//! ```ignore
//! let keys = Arc::new(SigningKeys::from_secret(secret.as_bytes())?);
//! let validator = TokenValidator::new(keys.clone(), Arc::new(UserStore::new(db)));
//!
//! let ctx = validator.authenticate(Some("Bearer eyJ...")).await?;
//! authorize(&ctx, &recipient, Access::Read)?;
//! ```

mod claims;
mod context;
mod directory;
mod error;
mod guard;
mod issuer;
mod keys;
pub mod middleware;
pub mod password;
mod service;
mod session_store;
mod user_store;
mod validator;

pub use claims::TokenClaims;
pub use context::AuthContext;
pub use directory::{SessionRegistry, StoreFuture, UserDirectory};
pub use error::AuthError;
pub use guard::{Access, authorize};
pub use issuer::{DEFAULT_TOKEN_TTL_HOURS, IssuedToken, MAX_TOKEN_TTL_HOURS, TokenIssuer};
pub use keys::{SECRET_ENV_VAR, SigningKeys, TOKEN_ALGORITHM};
pub use service::{AuthService, LoginOutcome, RegistrationError};
pub use session_store::SessionStore;
pub use user_store::UserStore;
pub use validator::{BEARER_PREFIX, TokenValidator, extract_bearer, fingerprint};
