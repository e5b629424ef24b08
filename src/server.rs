//! HTTP surface for the matrix editor
//!
//! Endpoints:
//!   GET  /health                                   Health check
//!   GET  /permissions/roles                        Roles for the target picker
//!   GET  /permissions/users                        Users for the target picker
//!   GET  /permissions/catalog                      Categories and items
//!   GET  /permissions/matrix/:mode/:target_id      Current matrix of a role or user
//!   POST /permissions/:mode/:target_id/update      Replace the target's grants
//!
//! Effective-permission checks are a library call (`Store::effective`), not an endpoint.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::error::Error;
use crate::types::{
    Matrix, Mode, PermissionCategory, PermissionEntry, PermissionItem, RoleRecord, UserRecord,
};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct CatalogResponse {
    categories: Vec<PermissionCategory>,
    items: Vec<PermissionItem>,
}

// ============================================================================
// Error mapping
// ============================================================================

impl Error {
    /// Map error to HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Storage(_) | Error::Config(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = if status.is_server_error() {
            tracing::error!(error = %self, retryable = self.is_retryable(), "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn list_roles(State(store): State<Store>) -> Result<Json<Vec<RoleRecord>>, Error> {
    Ok(Json(store.list_roles()?))
}

async fn list_users(State(store): State<Store>) -> Result<Json<Vec<UserRecord>>, Error> {
    Ok(Json(store.list_users()?))
}

async fn get_catalog(State(store): State<Store>) -> Result<Json<CatalogResponse>, Error> {
    Ok(Json(CatalogResponse {
        categories: store.list_categories()?,
        items: store.list_items()?,
    }))
}

async fn get_matrix(
    State(store): State<Store>,
    Path((mode, target_id)): Path<(String, String)>,
) -> Result<Json<Matrix>, Error> {
    let mode = Mode::parse(&mode, &target_id)?;
    Ok(Json(store.get_matrix(&mode)?))
}

async fn save_matrix(
    State(store): State<Store>,
    Path((mode, target_id)): Path<(String, String)>,
    body: Result<Json<Vec<PermissionEntry>>, JsonRejection>,
) -> Result<StatusCode, Error> {
    let mode = Mode::parse(&mode, &target_id)?;
    // Malformed bodies are validation failures (400), not the extractor's default 422
    let Json(entries) = body.map_err(|e| Error::Validation(e.body_text()))?;
    store.save_matrix(&mode, &entries)?;
    Ok(StatusCode::OK)
}

// ============================================================================
// Router
// ============================================================================

/// Build the application router over `store`
pub fn router(store: Store) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/permissions/roles", get(list_roles))
        .route("/permissions/users", get(list_users))
        .route("/permissions/catalog", get(get_catalog))
        .route("/permissions/matrix/:mode/:target_id", get(get_matrix))
        .route("/permissions/:mode/:target_id/update", post(save_matrix))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

/// Bind `config.server` and serve until the listener fails
pub async fn serve(config: &Config, store: Store) -> crate::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Io(format!("cannot bind {addr}: {e}")))?;
    tracing::info!(%addr, version = env!("CARGO_PKG_VERSION"), "grantmatrix-server listening");
    axum::serve(listener, router(store))
        .await
        .map_err(|e| Error::Io(format!("server stopped: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    async fn render(e: Error) -> (StatusCode, Value) {
        let res = e.into_response();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn server_side_errors_hide_their_message() {
        for e in [
            Error::Storage("map full".into()),
            Error::Config("bad file".into()),
            Error::Io("cannot bind".into()),
        ] {
            let (status, body) = render(e).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, json!({"error": "Internal server error"}));
        }
    }

    #[tokio::test]
    async fn client_errors_carry_their_message() {
        let (status, body) = render(Error::NotFound("role 'ghost'".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Not found: role 'ghost'"}));

        let e = Error::Validation("duplicate permission item 'a'".into());
        let (status, body) = render(e).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Validation failed: duplicate permission item 'a'"}));
    }
}
