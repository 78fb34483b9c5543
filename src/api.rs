//! REST API server for notarychain
//!
//! HTTP endpoints for chain inspection, record submission (mine-then-append)
//! and fingerprint lookup, plus health and statistics.

use axum::{
    extract::{Path, Request, State},
    http::{self, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::error::ChainError;
use crate::ledger::{Block, Record};
use crate::node::{Node, NodeState};

/// Transport-facing wrapper around the orchestrator node: observes the same
/// shared ledger and node state, and keeps request statistics on top.
#[derive(Clone)]
pub struct ApiNode {
    pub node: Arc<Node>,
    api_stats: Arc<RwLock<ApiStats>>,
}

/// API statistics and monitoring
#[derive(Debug, Default)]
struct ApiStats {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    records_submitted: u64,
    start_time: Option<Instant>,
}

impl ApiStats {
    fn new() -> Self {
        ApiStats {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    fn record_request(&mut self, success: bool) {
        self.total_requests += 1;
        if success {
            self.successful_requests += 1;
        } else {
            self.failed_requests += 1;
        }
    }
}

impl ApiNode {
    /// Create an API node that shares the orchestrator's ledger and state,
    /// so the HTTP surface and any embedder observe the same chain.
    pub fn new_shared(node: Arc<Node>) -> Self {
        Self {
            node,
            api_stats: Arc::new(RwLock::new(ApiStats::new())),
        }
    }

    /// Get API statistics together with a chain summary.
    pub async fn get_stats(&self) -> ApiStatsResponse {
        let stats = self.api_stats.read().await;
        let uptime = stats.start_time.map(|t| t.elapsed().as_secs()).unwrap_or(0);

        let ledger = self.node.ledger.read().await;
        ApiStatsResponse {
            total_requests: stats.total_requests,
            successful_requests: stats.successful_requests,
            failed_requests: stats.failed_requests,
            records_submitted: stats.records_submitted,
            uptime_seconds: uptime,
            chain_height: ledger.height(),
            total_blocks: ledger.len() as u64,
            difficulty: ledger.difficulty(),
            mining_in_flight: self.node.mining_in_flight(),
        }
    }
}

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    ChainRejection(ChainError),
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::ChainRejection(e) => {
                let status = match &e {
                    ChainError::InvalidBlock(_) | ChainError::InvalidProofOfWork => {
                        StatusCode::CONFLICT
                    }
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        ApiError::ChainRejection(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Record submission body. Missing fields decode to empty strings; no
/// content validation happens here, the chain admits whatever is paid for
/// with proof-of-work.
#[derive(Deserialize)]
pub struct SubmitRecordRequest {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub fingerprint: String,
}

#[derive(Serialize)]
pub struct ApiStatsResponse {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub records_submitted: u64,
    pub uptime_seconds: u64,
    pub chain_height: u64,
    pub total_blocks: u64,
    pub difficulty: u32,
    pub mining_in_flight: u64,
}

// ============================================================================
// Middleware
// ============================================================================

/// Request statistics middleware
async fn stats_middleware(State(api): State<Arc<ApiNode>>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    let success = response.status().is_success();
    let mut stats = api.api_stats.write().await;
    stats.record_request(success);

    response
}

/// Detailed request logging middleware. Logs method, path, status, duration
/// and current `NodeState`.
async fn logging_middleware(
    State(api): State<Arc<ApiNode>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();
    let node_state = format!("{:?}", api.node.state.read().await.clone());

    tracing::info!(
        method = %method,
        path = %path,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        node_state = %node_state,
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

/// Build the API router with all endpoints
pub fn build_api_router(api: Arc<ApiNode>) -> Router {
    // CORS configuration - allow all origins with credentials
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request()) // Reflect the request's origin
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::OPTIONS,
        ]) // Explicitly allow methods
        .allow_headers(vec![http::header::CONTENT_TYPE]) // Explicitly allow headers
        .allow_credentials(true);

    // API routes
    let api_routes = Router::new()
        // Chain endpoints
        .route("/chain", get(get_chain))
        .route("/chain/tip", get(get_chain_tip))
        // Record endpoints
        .route("/records", post(submit_record))
        .route("/records/:fingerprint", get(lookup_record))
        // System endpoints
        .route("/health", get(health_check))
        .route("/stats", get(get_api_stats))
        // logging before stats so we always record timing and node-state
        .layer(middleware::from_fn_with_state(api.clone(), logging_middleware))
        .layer(middleware::from_fn_with_state(api.clone(), stats_middleware))
        .with_state(api);

    Router::new().nest("/api", api_routes).layer(cors)
}

/// Run the API server until the process exits.
pub async fn run_api_server(api: Arc<ApiNode>, port: u16) -> Result<(), ChainError> {
    let app = build_api_router(api);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    println!("🚀 API server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn health_check(State(api): State<Arc<ApiNode>>) -> impl IntoResponse {
    let state = api.node.state.read().await.clone();
    match state {
        NodeState::Ready => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "healthy",
                "node_state": format!("{:?}", state),
                "timestamp": chrono::Utc::now().to_rfc3339()
            })),
        )
            .into_response(),
        _ => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "unhealthy",
                "node_state": format!("{:?}", state),
                "timestamp": chrono::Utc::now().to_rfc3339()
            })),
        )
            .into_response(),
    }
}

/// The whole chain as an ordered JSON array, genesis first.
async fn get_chain(State(api): State<Arc<ApiNode>>) -> Json<Vec<Block>> {
    Json(api.node.chain().await)
}

async fn get_chain_tip(State(api): State<Arc<ApiNode>>) -> Json<Block> {
    let ledger = api.node.ledger.read().await;
    Json(ledger.tip().clone())
}

/// Mine a block for the submitted record and append it. Responds 201 with
/// the accepted block, or 409 when the candidate lost a concurrent append
/// race and validation rejected it.
async fn submit_record(
    State(api): State<Arc<ApiNode>>,
    Json(req): Json<SubmitRecordRequest>,
) -> Result<(StatusCode, Json<Block>), ApiError> {
    let record = Record {
        author: req.author,
        fingerprint: req.fingerprint,
    };

    let block = api.node.submit_record(record).await?;

    // Update stats
    {
        let mut stats = api.api_stats.write().await;
        stats.records_submitted += 1;
    }

    Ok((StatusCode::CREATED, Json(block)))
}

async fn lookup_record(
    State(api): State<Arc<ApiNode>>,
    Path(fingerprint): Path<String>,
) -> Result<Json<Record>, ApiError> {
    api.node
        .lookup_by_fingerprint(&fingerprint)
        .await
        .map(Json)
        .ok_or_else(|| {
            ApiError::NotFound(format!("No record with fingerprint {} found", fingerprint))
        })
}

async fn get_api_stats(State(api): State<Arc<ApiNode>>) -> impl IntoResponse {
    Json(api.get_stats().await)
}
