//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use tracing::{error, info, warn};

use super::AppState;
use super::types::ErrorResponse;
use crate::dispatch::DispatchError;
use crate::payload::{Payload, PayloadError, PlantOutput, plan_outputs};

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Computes the production plan for a payload.
///
/// `POST /productionplan` → 200 + `Vec<PlantOutput>` JSON
/// malformed body → 400/415/422 + `ErrorResponse`
/// out-of-range values → 422 + `ErrorResponse` with one detail per violation
/// load not coverable → 400 + `ErrorResponse`
///
/// The optimizer runs on the blocking pool; a failed task → 500.
pub async fn production_plan(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Payload>, JsonRejection>,
) -> Result<Json<Vec<PlantOutput>>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!(status = %rejection.status(), "rejected payload");
        (
            rejection.status(),
            Json(ErrorResponse::new(rejection.body_text())),
        )
    })?;

    let request = payload.into_request().map_err(|err| {
        warn!(%err, "invalid payload");
        let body = match err {
            PayloadError::Invalid(errors) => ErrorResponse::new("invalid payload")
                .with_details(errors.iter().map(ToString::to_string).collect()),
            other => ErrorResponse::new(other.to_string()),
        };
        (StatusCode::UNPROCESSABLE_ENTITY, Json(body))
    })?;

    let load_mw = request.load_mw;
    let outcome = tokio::task::spawn_blocking(move || state.optimizer.optimize(&request))
        .await
        .map_err(|err| {
            error!(%err, "optimizer task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("internal error while computing the plan")),
            )
        })?;

    match outcome {
        Ok(plan) => {
            info!(load_mw, units = plan.len(), "production plan computed");
            Ok(Json(plan_outputs(&plan)))
        }
        Err(DispatchError::InsufficientCapacity { shortfall_mw }) => {
            warn!(load_mw, shortfall_mw, "insufficient capacity");
            Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Insufficient capacity to meet load")),
            ))
        }
    }
}

/// Liveness probe.
///
/// `GET /health` → 200 + `ok`
pub async fn health() -> &'static str {
    "ok"
}
