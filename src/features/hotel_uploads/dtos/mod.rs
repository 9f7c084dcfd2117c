mod hotel_upload_dto;

pub use hotel_upload_dto::{CreateHotelUploadDto, IngestionOutcome, IngestionStatus};
