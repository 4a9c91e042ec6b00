use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::engine::{EngineError, LandmarkInfo, ResolutionSession, SessionSnapshot};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── GET /api/route ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RouteQuery {
    pub origin: Option<String>,
    pub destination: Option<String>,
}

pub async fn route(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RouteQuery>,
) -> Result<Json<SessionSnapshot>, Response> {
    let start = Instant::now();

    let origin = params.origin.as_deref().unwrap_or("").trim();
    let destination = params.destination.as_deref().unwrap_or("").trim();
    if origin.is_empty() && destination.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Provide 'origin' and/or 'destination' parameters",
        )
        .into_response());
    }

    // Sessions are per address pair; each request gets a fresh one.
    let session = ResolutionSession::new(Arc::clone(&state.resolver), Arc::clone(&state.distance));
    let snapshot = session
        .resolve_pair(non_empty(origin), non_empty(destination))
        .await
        .map_err(|e| match e {
            EngineError::ServiceUnavailable(_) => {
                api_error(StatusCode::BAD_GATEWAY, format!("{}", e)).into_response()
            }
            other => {
                api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("{}", other)).into_response()
            }
        })?;

    let elapsed = start.elapsed();
    eprintln!(
        "GET /api/route origin='{}' destination='{}' -> resolved={} ({:.1}ms)",
        origin,
        destination,
        !snapshot.is_unresolved,
        elapsed.as_secs_f64() * 1000.0,
    );

    Ok(Json(snapshot))
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

// ─── GET /api/landmarks ──────────────────────────────────────────

pub async fn landmarks(State(state): State<Arc<AppState>>) -> Json<Vec<LandmarkInfo>> {
    Json(state.gazetteer.landmark_list())
}
