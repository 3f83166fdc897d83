//! HTTP route handlers for Axum.

use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, warn};

use crate::{
    api::types::{DetectRequest, DetectResponse, ErrorDto, ExtractRequest, ExtractResponse},
    nlp::{DetectError, Detection},
    scrape::ExtractionFailure,
};

use super::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorDto>)>;

pub async fn health() -> &'static str {
    "ok"
}

pub async fn extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> ApiResult<ExtractResponse> {
    match state.extractor.extract(&request.url).await {
        Ok(extraction) => Ok(Json(ExtractResponse {
            text: extraction.text,
            strategy: extraction.strategy,
        })),
        Err(failure @ ExtractionFailure::InvalidUrl { .. }) => {
            Err((StatusCode::BAD_REQUEST, Json(ErrorDto::new(failure))))
        }
        Err(failure) => {
            warn!(%failure, "extraction exhausted all strategies");
            let dto = ErrorDto {
                error: failure.to_string(),
                attempts: failure.attempts().to_vec(),
            };
            Err((StatusCode::UNPROCESSABLE_ENTITY, Json(dto)))
        }
    }
}

pub async fn detect(
    State(state): State<AppState>,
    Json(request): Json<DetectRequest>,
) -> ApiResult<DetectResponse> {
    match run_detection(&state, request.text, request.extra_locations).await {
        Ok(detection) => Ok(Json(DetectResponse {
            entities: detection.entities,
            tokens: detection.tokens,
        })),
        Err(DetectError::EmptyInput) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorDto::new(DetectError::EmptyInput)),
        )),
        Err(err) => {
            error!(%err, "entity detection failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorDto::new(err))))
        }
    }
}

/// Run detection off the async workers; inference is CPU-bound.
pub(crate) async fn run_detection(
    state: &AppState,
    text: String,
    extra_locations: String,
) -> Result<Detection, DetectError> {
    let ner = state.ner.clone();
    match tokio::task::spawn_blocking(move || ner.detect(&text, &extra_locations)).await {
        Ok(result) => result,
        Err(join_err) => Err(DetectError::Model(
            crate::nlp::model::ModelError::Inference(join_err.to_string()),
        )),
    }
}
