//! Hotel invoice upload ingestion.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/hotel-uploads` | Validate and store one upload record |

pub mod dtos;
mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use error::UploadError;
pub use routes::routes;
pub use services::HotelUploadService;
pub use store::{HotelInvoiceStore, PgHotelInvoiceStore};
