//! axum middleware gating protected routes.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use http::header::AUTHORIZATION;

use crate::api::ApiError;
use crate::auth::validator::TokenValidator;

/// Authenticate the request, then hand it on with an [`AuthContext`]
/// extension. Rejected requests never reach the handler.
///
/// [`AuthContext`]: crate::auth::AuthContext
pub async fn require_auth(
    State(validator): State<Arc<TokenValidator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // A header that is not valid UTF-8 is treated as absent.
    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let ctx = validator.authenticate(authorization.as_deref()).await?;

    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}
