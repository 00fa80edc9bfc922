//! HTTP route handlers

use super::protocol::{ErrorResponse, HealthResponse};
use super::ws::ws_handler;
use super::AppState;
use crate::bookings::BookingRecord;
use crate::runtime::PortError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

/// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .route("/version", get(get_version))
        .route("/bookings", get(list_bookings))
        .route("/bookings/:id", get(get_booking))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        ts: chrono::Utc::now(),
    })
}

async fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

async fn list_bookings(State(state): State<AppState>) -> Result<Json<Vec<BookingRecord>>, AppError> {
    Ok(Json(state.ledger.list_bookings().await?))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookingRecord>, AppError> {
    state
        .ledger
        .get_booking(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Booking not found: {id}")))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    NotFound(String),
    Internal(String),
}

impl From<PortError> for AppError {
    fn from(e: PortError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookings::testing::new_booking;
    use crate::runtime::testing::MockPorts;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn state(mocks: &MockPorts) -> AppState {
        AppState::new(Arc::new(mocks.orchestrator()), mocks.ledger.clone(), std::time::Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_health() {
        let mocks = MockPorts::new();
        let (status, body) = get_json(create_router(state(&mocks)), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_and_get_bookings() {
        let mocks = MockPorts::new();
        let app_state = state(&mocks);
        let record = app_state.ledger.create_booking(new_booking("s-1")).await.unwrap();

        let (status, body) = get_json(create_router(app_state.clone()), "/bookings").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["sessionId"], "s-1");

        let uri = format!("/bookings/{}", record.id);
        let (status, body) = get_json(create_router(app_state.clone()), &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], record.id.as_str());
        assert_eq!(body["totalEstimate"], 1950);

        let (status, body) = get_json(create_router(app_state), "/bookings/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Booking not found: missing");
    }
}
