use async_trait::async_trait;
use sqlx::PgPool;

use super::HotelInvoiceStore;
use crate::features::hotel_uploads::models::{HotelInvoice, UploadRecord};
use crate::features::hotel_uploads::UploadError;

/// PostgreSQL error code for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// `hotel_invoice` table over a caller-owned pool.
///
/// Each call checks out its own connection and returns it to the pool
/// when the call finishes, whether it succeeded or not.
#[derive(Clone)]
pub struct PgHotelInvoiceStore {
    pool: PgPool,
}

impl std::fmt::Debug for PgHotelInvoiceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgHotelInvoiceStore")
            .field("pool", &"<PgPool>")
            .finish()
    }
}

impl PgHotelInvoiceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

/// Map an insert failure onto the upload error taxonomy
fn handle_insert_error(e: sqlx::Error, file_hash: &str) -> UploadError {
    if is_unique_violation(&e) {
        return UploadError::DuplicateConflict {
            file_hash: file_hash.to_string(),
        };
    }

    UploadError::InsertFailed(e.to_string())
}

#[async_trait]
impl HotelInvoiceStore for PgHotelInvoiceStore {
    async fn count_by_file_hash(&self, file_hash: &str) -> Result<i64, UploadError> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            tracing::error!("Failed to acquire connection for duplicate check: {:?}", e);
            UploadError::StoreConnectionFailed(format!(
                "could not acquire connection for file_hash duplicate check: {}",
                e
            ))
        })?;

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM hotel_invoice WHERE file_hash = $1")
                .bind(file_hash)
                .fetch_one(&mut *conn)
                .await
                .map_err(|e| {
                    tracing::error!("file_hash duplicate check failed: {:?}", e);
                    UploadError::StoreConnectionFailed(format!(
                        "file_hash duplicate check failed: {}",
                        e
                    ))
                })?;

        Ok(count)
    }

    async fn insert(&self, record: &UploadRecord) -> Result<HotelInvoice, UploadError> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            tracing::error!("Failed to acquire connection for insert: {:?}", e);
            UploadError::StoreConnectionFailed(format!(
                "could not acquire connection for insert: {}",
                e
            ))
        })?;

        let row = sqlx::query_as::<_, HotelInvoice>(
            r#"
            INSERT INTO hotel_invoice
                (id, file_url, source, source_id, client_name, file_hash, status, created_on, updated_on)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, file_url, source, source_id, client_name, file_hash, status, created_on, updated_on
            "#,
        )
        .bind(record.id())
        .bind(record.file_url())
        .bind(record.source())
        .bind(record.source_id())
        .bind(record.client_name())
        .bind(record.file_hash())
        .bind(record.status())
        .bind(record.created_on())
        .bind(record.updated_on())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            tracing::error!("Insert into hotel_invoice failed: {:?}", e);
            handle_insert_error(e, record.file_hash())
        })?;

        row.ok_or_else(|| UploadError::InsertFailed("no row returned".to_string()))
    }
}
