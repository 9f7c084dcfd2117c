//! Hotel invoice upload ingestion.
//!
//! Validates upload records (shape and cloud storage provenance), rejects
//! files whose content hash is already stored, and inserts new records into
//! PostgreSQL with bounded exponential-backoff retries.
//!
//! The entry point is [`HotelUploadService::store`]; `main.rs` embeds it in
//! an axum service.

pub mod core;
pub mod features;
pub mod shared;

pub use crate::core::clock::{Clock, FixedClock, SystemClock};
pub use crate::core::config::{Config, IngestionConfig};
pub use crate::features::hotel_uploads::dtos::{IngestionOutcome, IngestionStatus};
pub use crate::features::hotel_uploads::{
    HotelInvoiceStore, HotelUploadService, PgHotelInvoiceStore, UploadError,
};
pub use crate::shared::retry::{with_retry, RetryPolicy};
pub use crate::shared::validation::is_allowed_cloud_url;
