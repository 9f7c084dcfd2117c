use utoipa::{Modify, OpenApi};

use crate::features::hotel_uploads::{dtos as hotel_uploads_dtos, handlers as hotel_uploads_handlers};
use crate::shared::types::ApiResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Hotel uploads
        hotel_uploads_handlers::create_hotel_upload,
    ),
    components(
        schemas(
            hotel_uploads_dtos::CreateHotelUploadDto,
            hotel_uploads_dtos::IngestionOutcome,
            hotel_uploads_dtos::IngestionStatus,
            ApiResponse<hotel_uploads_dtos::IngestionOutcome>,
        )
    ),
    tags(
        (name = "hotel-uploads", description = "Hotel invoice upload ingestion"),
    ),
    info(
        title = "Hotel Upload API",
        version = "0.1.0",
        description = "Hotel invoice upload ingestion",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct DocsInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for DocsInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
