//! Persistence seam for uploads.
//!
//! The workflow only needs a duplicate count and an insert-returning
//! write. `hotel_invoice.file_hash` must carry a unique constraint; the
//! count is advisory and the constraint is what actually keeps hashes
//! unique under concurrent writers.

mod pg_store;

use async_trait::async_trait;

use crate::features::hotel_uploads::models::{HotelInvoice, UploadRecord};
use crate::features::hotel_uploads::UploadError;

pub use pg_store::PgHotelInvoiceStore;

#[async_trait]
pub trait HotelInvoiceStore: Send + Sync {
    /// Number of stored rows with this content hash.
    ///
    /// Fails with [`UploadError::StoreConnectionFailed`].
    async fn count_by_file_hash(&self, file_hash: &str) -> Result<i64, UploadError>;

    /// Persist the record and return the row as stored.
    ///
    /// Fails with [`UploadError::DuplicateConflict`] on a unique violation,
    /// [`UploadError::StoreConnectionFailed`] when no connection can be had,
    /// and [`UploadError::InsertFailed`] otherwise.
    async fn insert(&self, record: &UploadRecord) -> Result<HotelInvoice, UploadError>;
}
