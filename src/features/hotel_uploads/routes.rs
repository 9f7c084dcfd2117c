use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::sync::Arc;

use crate::features::hotel_uploads::handlers::create_hotel_upload;
use crate::features::hotel_uploads::services::HotelUploadService;

/// Create routes for the hotel uploads feature
pub fn routes(service: Arc<HotelUploadService>, max_body_size: usize) -> Router {
    Router::new()
        .route(
            "/api/hotel-uploads",
            post(create_hotel_upload).layer(DefaultBodyLimit::max(max_body_size)),
        )
        .with_state(service)
}
