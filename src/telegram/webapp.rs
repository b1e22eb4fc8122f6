//! HTTP API used by the Mini App

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::core::error::AppError;
use crate::core::review::PublishedReview;
use crate::core::ReviewService;
use crate::telegram::webapp_auth::WebAppAuthenticator;

/// Header carrying the Mini App's signed init data
pub const TELEGRAM_DATA_HEADER: &str = "x-telegram-data";

// ============================================================================
// API TYPES
// ============================================================================

/// Body of `POST /api/createInvoiceLink`. Fields are optional so a missing
/// field is reported as invalid data rather than a deserialization error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLinkRequest {
    pub text: Option<String>,
    pub target_user_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLinkResponse {
    pub success: bool,
    pub invoice_link: String,
}

// ============================================================================
// APPLICATION STATE
// ============================================================================

/// Shared state for all endpoints
#[derive(Clone)]
pub struct WebAppState {
    pub service: Arc<ReviewService>,
    pub authenticator: Arc<WebAppAuthenticator>,
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    BadRequest(&'static str),
    Internal(String),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation(_) => ApiError::BadRequest("Invalid data"),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.to_string()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// ============================================================================
// ROUTER
// ============================================================================

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(TELEGRAM_DATA_HEADER)])
}

/// Builds the Mini App API router
pub fn create_webapp_router(state: WebAppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/createInvoiceLink", post(handle_create_invoice_link))
        .route("/api/reviews", get(handle_get_reviews))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Serves the Mini App API until the task is cancelled
pub async fn run_webapp_server(addr: SocketAddr, router: Router) -> anyhow::Result<()> {
    log::info!("Starting Mini App API server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

// ============================================================================
// API HANDLERS
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "jobs-bot"
    }))
}

async fn handle_create_invoice_link(
    State(state): State<Arc<WebAppState>>,
    headers: HeaderMap,
    body: Result<Json<InvoiceLinkRequest>, JsonRejection>,
) -> Result<Json<InvoiceLinkResponse>, ApiError> {
    let init_data = headers
        .get(TELEGRAM_DATA_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let auth = state.authenticator.authenticate(init_data).map_err(|e| {
        log::debug!("Rejected Mini App request: {}", e);
        ApiError::Unauthorized
    })?;

    let Json(request) = body.map_err(|e| {
        log::debug!("Unreadable invoice request body: {}", e);
        ApiError::BadRequest("Invalid data")
    })?;

    let author = auth.user.map(|u| u.id).ok_or(ApiError::BadRequest("Invalid data"))?;
    let text = request
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or(ApiError::BadRequest("Invalid data"))?;
    let target = request.target_user_id.ok_or(ApiError::BadRequest("Invalid data"))?;

    let ticket = state.service.request_invoice(author, target, &text).await?;

    Ok(Json(InvoiceLinkResponse {
        success: true,
        invoice_link: ticket.invoice_link,
    }))
}

async fn handle_get_reviews(
    State(state): State<Arc<WebAppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<PublishedReview>>, ApiError> {
    let user_id = params
        .get("user_id")
        .and_then(|v| v.trim().parse::<i64>().ok())
        .ok_or(ApiError::BadRequest("Missing user_id"))?;

    let reviews = state.service.reviews_for(user_id).await?;
    Ok(Json(reviews))
}
