use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::core::clock::Clock;
use crate::features::hotel_uploads::dtos::CreateHotelUploadDto;

/// Database model for `hotel_invoice` rows
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct HotelInvoice {
    pub id: String,
    pub file_url: String,
    pub source: String,
    pub source_id: String,
    pub client_name: String,
    pub file_hash: String,
    pub status: String,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

/// A validated upload, ready to be checked against the store and inserted.
///
/// Only built through the upload service after validation succeeds, and
/// never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    id: String,
    file_url: String,
    source: String,
    source_id: String,
    client_name: String,
    file_hash: String,
    status: String,
    created_on: DateTime<Utc>,
    updated_on: DateTime<Utc>,
}

impl UploadRecord {
    /// Caller must have run `dto.validate()` already.
    pub(crate) fn from_validated(dto: CreateHotelUploadDto, clock: &dyn Clock) -> Self {
        let now = clock.now();
        Self {
            id: dto.id,
            file_url: dto.file_url,
            source: dto.source,
            source_id: dto.source_id,
            client_name: dto.client_name,
            file_hash: dto.file_hash,
            status: dto.status,
            created_on: dto.created_on.unwrap_or(now),
            updated_on: dto.updated_on.unwrap_or(now),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn file_url(&self) -> &str {
        &self.file_url
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn file_hash(&self) -> &str {
        &self.file_hash
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn created_on(&self) -> DateTime<Utc> {
        self.created_on
    }

    pub fn updated_on(&self) -> DateTime<Utc> {
        self.updated_on
    }
}

impl From<&UploadRecord> for HotelInvoice {
    fn from(record: &UploadRecord) -> Self {
        Self {
            id: record.id.clone(),
            file_url: record.file_url.clone(),
            source: record.source.clone(),
            source_id: record.source_id.clone(),
            client_name: record.client_name.clone(),
            file_hash: record.file_hash.clone(),
            status: record.status.clone(),
            created_on: record.created_on,
            updated_on: record.updated_on,
        }
    }
}
