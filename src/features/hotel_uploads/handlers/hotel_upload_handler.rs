use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::hotel_uploads::dtos::{CreateHotelUploadDto, IngestionOutcome};
use crate::features::hotel_uploads::services::HotelUploadService;
use crate::shared::types::ApiResponse;

/// Ingest a hotel invoice upload
///
/// The body is taken as a raw field mapping and validated by the service,
/// so shape errors and disallowed URLs come back as 400 with the reason.
#[utoipa::path(
    post,
    path = "/api/hotel-uploads",
    tag = "hotel-uploads",
    request_body = CreateHotelUploadDto,
    responses(
        (status = 201, description = "Upload stored", body = ApiResponse<IngestionOutcome>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "An upload with the same file_hash already exists"),
        (status = 503, description = "Store unavailable after retries")
    )
)]
pub async fn create_hotel_upload(
    State(service): State<Arc<HotelUploadService>>,
    AppJson(raw): AppJson<Value>,
) -> Result<(StatusCode, Json<ApiResponse<IngestionOutcome>>)> {
    let outcome = service.store(raw).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(outcome),
            Some("Upload stored".to_string()),
        )),
    ))
}
