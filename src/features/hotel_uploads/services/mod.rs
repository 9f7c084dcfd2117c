mod hotel_upload_service;

pub use hotel_upload_service::HotelUploadService;
