use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::shared::validation::validate_cloud_url;

/// Inbound upload description
///
/// Unknown fields are ignored. Timestamps default to the service clock.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateHotelUploadDto {
    /// Caller-assigned record identifier
    #[validate(length(min = 1, message = "id must not be empty"))]
    #[schema(example = "inv-0001")]
    pub id: String,

    /// Location of the invoice file on S3, CloudFront or Azure Blob Storage
    #[validate(custom(function = "validate_cloud_url"))]
    #[schema(example = "https://bucket.s3.amazonaws.com/invoices/a.pdf")]
    pub file_url: String,

    /// Free-form provenance tag
    pub source: String,

    #[validate(length(min = 1, message = "source_id must not be empty"))]
    pub source_id: String,

    pub client_name: String,

    /// Content hash of the file; used for duplicate detection
    #[validate(length(min = 1, message = "file_hash must not be empty"))]
    pub file_hash: String,

    /// Lifecycle tag, stored as given
    pub status: String,

    /// RFC 3339, or a naive `YYYY-MM-DD[T ]HH:MM:SS[.ffffff]` read as UTC
    #[serde(default, deserialize_with = "deserialize_created_on")]
    pub created_on: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "deserialize_updated_on")]
    pub updated_on: Option<DateTime<Utc>>,
}

const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an upload timestamp; values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(
    deserializer: D,
    field: &'static str,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    parse_timestamp(&raw).map(Some).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "{} must be an ISO 8601 timestamp, got '{}'",
            field, raw
        ))
    })
}

fn deserialize_created_on<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_timestamp(deserializer, "created_on")
}

fn deserialize_updated_on<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_timestamp(deserializer, "updated_on")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum IngestionStatus {
    Success,
}

/// Result of a successful ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IngestionOutcome {
    pub status: IngestionStatus,
    /// `file_hash` of the stored row
    pub upload_id: String,
}

impl IngestionOutcome {
    pub fn success(upload_id: impl Into<String>) -> Self {
        Self {
            status: IngestionStatus::Success,
            upload_id: upload_id.into(),
        }
    }
}
