//! Authenticated identity for request-scoped use.

use axum::extract::FromRequestParts;
use http::request::Parts;

use crate::api::ApiError;
use crate::auth::error::AuthError;
use crate::types::{TokenId, UserId, Username};

/// Identity resolved by the token validator for the current request.
///
/// Only the validator constructs these; handlers receive one through the
/// request extensions and trust it for the rest of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    principal: UserId,
    username: Username,
    token_id: Option<TokenId>,
}

impl AuthContext {
    pub(crate) fn new(principal: UserId, username: Username, token_id: Option<TokenId>) -> Self {
        Self {
            principal,
            username,
            token_id,
        }
    }

    /// The authenticated principal.
    pub fn principal(&self) -> &UserId {
        &self.principal
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    /// `jti` of the token that authenticated this request, if it had one.
    pub fn token_id(&self) -> Option<&TokenId> {
        self.token_id.as_ref()
    }
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Present only when the auth middleware ran on this route.
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| AuthError::unauthorized("route is not behind auth middleware").into())
    }
}
