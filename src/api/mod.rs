//! REST API: routing, auth middleware and request handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Extension, Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::{Router, body::Body};
use http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::auth::{Claim, Principal, TokenAuthScheme, known_claims};
use crate::chat::{ChatRequest, ChatService, TaskType};
use crate::config::{UserEntry, hash_password};
use crate::errors::AppError;

const MAX_QUERY_CHARS: usize = 5000;
const MAX_CONTEXT_CHARS: usize = 2000;

pub struct AppState {
    pub auth: TokenAuthScheme,
    pub chat: ChatService,
    pub users: Vec<UserEntry>,
}

pub type SharedState = Arc<AppState>;

pub fn create_router(state: SharedState) -> Router {
    let protected = Router::new()
        .route("/api/v1/auth/me", get(me))
        .route("/api/v1/chat/query", post(chat_query))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/logout", post(logout))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Authenticates the request and injects its [`Principal`], or short-circuits
/// with the scheme's challenge.
async fn require_auth(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.auth.authenticate(request.headers()) {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(err) => {
            let mut response = err.into_response();
            state.auth.challenge(&mut response);
            response
        }
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response<Body>, AppError> {
    let digest = hash_password(&payload.password);
    let user = state
        .users
        .iter()
        .find(|u| u.username == payload.username && u.password_sha256 == digest)
        .ok_or_else(|| {
            warn!(username = %payload.username, "login rejected");
            AppError::AuthenticationFailed("invalid username or password".to_string())
        })?;

    let mut claims = vec![Claim::new(known_claims::SUBJECT, &user.username)];
    if let Some(role) = &user.role {
        claims.push(Claim::new(known_claims::ROLE, role));
    }

    let mut response = Json(json!({ "username": user.username, "role": user.role }))
        .into_response();
    if let Err(e) = state.auth.sign_in(Principal::new(claims), &mut response) {
        error!("failed to issue access token: {}", e);
        return Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response());
    }

    info!(username = %user.username, "user signed in");
    Ok(response)
}

async fn logout(State(state): State<SharedState>) -> Response<Body> {
    let mut response = Json(json!({ "status": "signed_out" })).into_response();
    state.auth.sign_out(&mut response);
    response
}

async fn me(Extension(principal): Extension<Principal>) -> Json<Value> {
    let claims: Vec<Value> = principal
        .claims()
        .iter()
        .map(|c| json!({ "kind": c.kind, "value": c.value }))
        .collect();
    Json(json!({
        "subject": principal.subject(),
        "claims": claims
    }))
}

/// Wire shape of a chat query. Task type defaults to `answer` when omitted;
/// the provider must be named explicitly so a misconfigured caller never
/// gets silently answered by a different backend.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatQueryRequest {
    query: String,
    context: Option<String>,
    task_type: Option<TaskType>,
    provider: Option<String>,
}

async fn chat_query(
    State(state): State<SharedState>,
    Json(payload): Json<ChatQueryRequest>,
) -> Result<Json<Value>, AppError> {
    let request_id = new_request_id();
    let started = Instant::now();

    let query = payload.query.trim();
    if query.is_empty() {
        return Err(AppError::ValidationFailed(
            "query must not be empty".to_string(),
        ));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(AppError::ValidationFailed(format!(
            "query must be at most {} characters",
            MAX_QUERY_CHARS
        )));
    }
    if let Some(context) = &payload.context
        && context.chars().count() > MAX_CONTEXT_CHARS
    {
        return Err(AppError::ValidationFailed(format!(
            "context must be at most {} characters",
            MAX_CONTEXT_CHARS
        )));
    }

    let provider = match payload.provider {
        Some(p) if !p.trim().is_empty() => p,
        _ => {
            return Err(AppError::ValidationFailed(
                "provider must be specified".to_string(),
            ));
        }
    };

    let request = ChatRequest {
        query: query.to_string(),
        context: payload.context,
        task_type: payload.task_type.unwrap_or(TaskType::Answer),
        provider,
    };

    info!(
        request_id = %request_id,
        provider = %request.provider,
        task = %request.task_type,
        "chat query started"
    );

    let outcome = state.chat.query(&request).await?;
    let duration_ms = started.elapsed().as_millis() as u64;

    info!(request_id = %request_id, duration_ms, "chat query completed");

    Ok(Json(json!({
        "result": outcome.output,
        "meta": {
            "durationMs": duration_ms,
            "taskType": request.task_type.to_string(),
            "requestId": request_id,
        }
    })))
}

fn new_request_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}
