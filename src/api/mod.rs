// REST API endpoints for mailgate

mod error;

pub use error::{ApiError, ErrorResponse};

use axum::{
    Router,
    extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
    middleware::from_fn_with_state,
    response::Json,
    routing::post,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::auth::middleware::require_auth;
use crate::auth::{
    AuthContext, AuthService, LoginOutcome, SessionStore, SigningKeys, TokenIssuer, TokenValidator,
    UserStore,
};
use crate::config::AuthConfig;
use crate::db::schema::MessageRecord;
use crate::db::{Db, ping};
use crate::messages::{Content, MessageService, MessageStore};
use crate::types::{MessageId, UserId};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub auth: AuthService,
    pub messages: MessageService,
    pub validator: Arc<TokenValidator>,
}

impl AppState {
    /// Wire stores, issuer and validator over one database handle.
    ///
    /// Fails when the configured token lifetime is out of range.
    pub fn new(db: Db, keys: Arc<SigningKeys>, config: &AuthConfig) -> anyhow::Result<Self> {
        let users = UserStore::new(db.clone());

        let ttl = config
            .token_ttl()
            .ok_or_else(|| anyhow::anyhow!("token_ttl_hours {} is out of range", config.token_ttl_hours))?;
        let mut issuer = TokenIssuer::new(keys.clone()).with_ttl(ttl)?;
        if config.record_sessions {
            issuer = issuer.with_session_registry(Arc::new(SessionStore::new(db.clone())));
        }

        let auth = AuthService::new(users.clone(), issuer).with_bcrypt_cost(config.bcrypt_cost);
        let validator = Arc::new(TokenValidator::new(keys, Arc::new(users.clone())));
        let messages = MessageService::new(MessageStore::new(db.clone()), users);

        Ok(Self {
            db,
            auth,
            messages,
            validator,
        })
    }
}

pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/messages", post(send_message).get(get_messages))
        .route_layer(from_fn_with_state(state.validator.clone(), require_auth));

    Router::new()
        .route("/check", post(health_check))
        .route("/users", post(create_user))
        .route("/login", post(login))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub sender: UserId,
    pub recipient: UserId,
    pub content: ContentRequest,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub id: MessageId,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct ReadMessagesParams {
    pub recipient: Option<UserId>,
    pub start: Option<u64>,
    pub limit: Option<u64>,
}

/// A stored message as returned by `GET /messages`.
#[derive(Debug, Serialize)]
pub struct MessageView {
    pub id: MessageId,
    pub timestamp: String,
    pub sender: UserId,
    pub recipient: UserId,
    pub content: Content,
}

impl From<MessageRecord> for MessageView {
    fn from(record: MessageRecord) -> Self {
        Self {
            id: record.message_id,
            timestamp: record.sent_at,
            sender: record.sender,
            recipient: record.recipient,
            content: record.content,
        }
    }
}

async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    ping(&state.db).await.map_err(|e| {
        warn!("Health check failed: {}", e);
        ApiError::ServiceUnavailable
    })?;

    Ok(Json(serde_json::json!({ "health": "ok" })))
}

async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::bad_request("invalid request body"))?;

    let id = state.auth.register(&req.username, &req.password).await?;

    Ok(Json(serde_json::json!({ "id": id })))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<LoginOutcome>, ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::bad_request("invalid request body"))?;

    let outcome = state.auth.login(&req.username, &req.password).await?;

    Ok(Json(outcome))
}

async fn send_message(
    State(state): State<AppState>,
    ctx: AuthContext,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::bad_request("invalid request body"))?;
    let content = Content::parse(&req.content.kind, req.content.text)?;

    let message = state
        .messages
        .send(&ctx, &req.sender, &req.recipient, content)
        .await?;

    Ok(Json(SendMessageResponse {
        id: message.message_id,
        timestamp: message.sent_at,
    }))
}

async fn get_messages(
    State(state): State<AppState>,
    ctx: AuthContext,
    params: Result<Query<ReadMessagesParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = params.map_err(|_| ApiError::bad_request("invalid query parameters"))?;
    let recipient = params
        .recipient
        .ok_or_else(|| ApiError::bad_request("invalid recipient"))?;

    let messages: Vec<MessageView> = state
        .messages
        .list(&ctx, &recipient, params.start.unwrap_or(0), params.limit)
        .await?
        .into_iter()
        .map(MessageView::from)
        .collect();

    Ok(Json(serde_json::json!({ "messages": messages })))
}
