//! RSVP handlers

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use http::StatusCode;
use serde::Serialize;
use shared::error::{ApiResponse, AppError, AppResult};
use shared::models::SubmissionResult;
use shared::validation::{MSG_VALIDATION_FAILED, RsvpForm, validate_form};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PhotoAlbum {
    pub link: String,
}

/// POST /api/rsvp
///
/// The body is parsed here rather than through `Json<T>` so that malformed
/// JSON answers in the `{ success, error }` shape like any other failure.
pub async fn submit(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "RSVP body is not valid JSON");
            return (
                StatusCode::BAD_REQUEST,
                Json(SubmissionResult::failed(MSG_VALIDATION_FAILED)),
            )
                .into_response();
        }
    };

    match state.service.submit_checked(payload, Utc::now()).await {
        Ok(()) => Json(SubmissionResult::ok()).into_response(),
        Err(e) => (e.http_status(), Json(SubmissionResult::failed(e.message))).into_response(),
    }
}

/// POST /api/rsvp/validate
///
/// Field checks only, for inline form feedback. No token is required and
/// nothing is stored.
pub async fn validate(body: Bytes) -> AppResult<ApiResponse<()>> {
    let form: RsvpForm = serde_json::from_slice(&body)
        .map_err(|_| AppError::validation(MSG_VALIDATION_FAILED))?;
    validate_form(&form)?;
    Ok(ApiResponse::ok())
}

/// GET /api/photo-album
pub async fn photo_album(State(state): State<AppState>) -> ApiResponse<PhotoAlbum> {
    ApiResponse::success(PhotoAlbum {
        link: state.service.photo_album_link().await,
    })
}
