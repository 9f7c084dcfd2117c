pub mod hotel_upload_handler;

pub use hotel_upload_handler::{__path_create_hotel_upload, create_hotel_upload};
