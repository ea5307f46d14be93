//! HTTP router and handlers
//!
//! Every failure is caught at the handler boundary and converted into a
//! structured JSON response; nothing here terminates the process.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{Path, RawQuery, State},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tower_http::{catch_panic::CatchPanicLayer, compression::CompressionLayer, trace::TraceLayer};
use tracing::warn;

use crate::Error;
use crate::aws::{AwsStatus, CostInventory};
use crate::registry::{PublicServer, UpstreamRegistry};
use crate::relay::{Relay, RelayRequest};
use crate::static_files;

/// Shared application state
pub struct AppState {
    /// Configured upstreams
    pub registry: Arc<UpstreamRegistry>,
    /// Proxy engine
    pub relay: Arc<Relay>,
    /// Cost/inventory source
    pub aws: Arc<dyn CostInventory>,
    /// Dashboard asset directory
    pub static_dir: PathBuf,
}

/// Create the router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/servers", get(list_servers_handler))
        .route("/api/aws/status", get(aws_status_handler))
        .route("/api/aws/instances", get(aws_instances_handler))
        .route("/api/aws/costs", get(aws_costs_handler))
        .route("/api/aws/autoscaler", get(aws_autoscaler_handler))
        .route(
            "/proxy/{server_id}/{*endpoint}",
            get(proxy_handler)
                .post(proxy_handler)
                .put(proxy_handler)
                .delete(proxy_handler),
        )
        .route("/{*path}", get(static_handler))
        .layer(CatchPanicLayer::new())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - dashboard entry document
async fn index_handler(State(state): State<Arc<AppState>>) -> Response {
    static_files::serve(&state.static_dir, "index.html").await
}

/// GET /{*path} - dashboard asset
async fn static_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Response {
    static_files::serve(&state.static_dir, &path).await
}

/// GET /api/servers - token-free upstream listing
async fn list_servers_handler(State(state): State<Arc<AppState>>) -> Json<Vec<PublicServer>> {
    Json(state.registry.list_public())
}

/// /proxy/{server_id}/{*endpoint} - the request relay, all four methods
async fn proxy_handler(
    State(state): State<Arc<AppState>>,
    Path((server_id, endpoint)): Path<(String, String)>,
    method: Method,
    RawQuery(raw_query): RawQuery,
    body: Bytes,
) -> Response {
    let Some(server) = state.registry.get(&server_id) else {
        return into_error_response(&Error::ServerNotFound(server_id));
    };

    let body = if matches!(method, Method::POST | Method::PUT) && !body.is_empty() {
        match serde_json::from_slice(&body) {
            Ok(value) => Some(value),
            Err(e) => return into_error_response(&Error::Json(e)),
        }
    } else {
        None
    };

    let request = RelayRequest {
        method,
        endpoint,
        raw_query,
        body,
    };
    match state.relay.forward(server, request).await {
        Ok(upstream) => {
            match Response::builder()
                .status(upstream.status)
                .header(header::CONTENT_TYPE, upstream.content_type)
                .body(Body::from(upstream.body))
            {
                Ok(response) => response,
                Err(e) => error_response(
                    StatusCode::BAD_GATEWAY,
                    &format!("Invalid upstream response: {e}"),
                ),
            }
        }
        Err(e) => {
            warn!(server = %server_id, error = %e, "Proxy request failed");
            into_error_response(&e)
        }
    }
}

/// GET /api/aws/status
async fn aws_status_handler(State(state): State<Arc<AppState>>) -> Json<AwsStatus> {
    Json(state.aws.status())
}

/// GET /api/aws/instances
async fn aws_instances_handler(State(state): State<Arc<AppState>>) -> Response {
    json_or_error(state.aws.instances().await)
}

/// GET /api/aws/costs
async fn aws_costs_handler(State(state): State<Arc<AppState>>) -> Response {
    json_or_error(state.aws.costs().await)
}

/// GET /api/aws/autoscaler
async fn aws_autoscaler_handler(State(state): State<Arc<AppState>>) -> Response {
    json_or_error(state.aws.autoscaler().await)
}

fn json_or_error(result: crate::Result<serde_json::Value>) -> Response {
    match result {
        Ok(value) => Json(value).into_response(),
        Err(e) => into_error_response(&e),
    }
}

/// Stable JSON error shape: `{"error": <message>}`.
fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Map an error to its boundary status code and client-visible message.
fn into_error_response(err: &Error) -> Response {
    let (status, message) = match err {
        Error::ServerNotFound(_) => (StatusCode::NOT_FOUND, "Server not found".to_string()),
        Error::UpstreamTransport(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
        Error::Json(e) => (StatusCode::BAD_REQUEST, format!("Invalid JSON body: {e}")),
        Error::AwsDisabled => (StatusCode::BAD_REQUEST, "AWS not configured".to_string()),
        Error::Aws(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    };
    error_response(status, &message)
}
