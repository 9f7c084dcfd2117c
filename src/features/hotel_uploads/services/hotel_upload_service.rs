use std::sync::Arc;

use serde_json::Value;
use validator::Validate;

use crate::core::clock::{Clock, SystemClock};
use crate::features::hotel_uploads::dtos::{CreateHotelUploadDto, IngestionOutcome};
use crate::features::hotel_uploads::models::UploadRecord;
use crate::features::hotel_uploads::store::HotelInvoiceStore;
use crate::features::hotel_uploads::UploadError;
use crate::shared::retry::{with_retry, RetryPolicy};

/// Ingests hotel invoice uploads: validate, check for a duplicate hash, insert.
pub struct HotelUploadService {
    store: Arc<dyn HotelInvoiceStore>,
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for HotelUploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotelUploadService")
            .field("store", &"<HotelInvoiceStore>")
            .field("retry", &self.retry)
            .finish()
    }
}

impl HotelUploadService {
    pub fn new(store: Arc<dyn HotelInvoiceStore>, retry: RetryPolicy) -> Self {
        Self::with_clock(store, retry, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn HotelInvoiceStore>,
        retry: RetryPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            retry,
            clock,
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Turn a raw field mapping into a validated record. Touches no store.
    pub fn build_record(&self, raw: Value) -> Result<UploadRecord, UploadError> {
        let dto: CreateHotelUploadDto = serde_json::from_value(raw)
            .map_err(|e| UploadError::ValidationFailed(format!("Invalid upload payload: {}", e)))?;

        dto.validate()
            .map_err(|e| UploadError::ValidationFailed(e.to_string()))?;

        Ok(UploadRecord::from_validated(dto, self.clock.as_ref()))
    }

    /// Validate, reject known hashes, then insert.
    ///
    /// The duplicate check and the insert each run under the retry policy.
    /// Nothing is rolled back: a successful insert is final.
    pub async fn store(&self, raw: Value) -> Result<IngestionOutcome, UploadError> {
        let record = self.build_record(raw).inspect_err(|e| {
            tracing::debug!("Rejected upload: {}", e);
        })?;

        let file_hash = record.file_hash();

        let existing = with_retry(&self.retry, || self.store.count_by_file_hash(file_hash)).await?;
        if existing > 0 {
            tracing::warn!(
                "Duplicate upload rejected: file_hash={} source_id={}",
                file_hash,
                record.source_id()
            );
            return Err(UploadError::DuplicateError {
                file_hash: file_hash.to_string(),
            });
        }

        let row = with_retry(&self.retry, || self.store.insert(&record))
            .await
            .inspect_err(|e| {
                if e.is_duplicate() {
                    tracing::warn!("Insert lost a duplicate race: {}", e);
                } else {
                    tracing::error!("Failed to store upload {}: {}", record.id(), e);
                }
            })?;

        tracing::info!(
            "Stored hotel upload id={} file_hash={} source={}",
            row.id,
            row.file_hash,
            row.source
        );

        Ok(IngestionOutcome::success(row.file_hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::features::hotel_uploads::dtos::IngestionStatus;
    use crate::shared::test_helpers::{scenario_input, InMemoryStore};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::time::Duration;

    fn policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(500))
    }

    fn service(store: Arc<InMemoryStore>) -> HotelUploadService {
        HotelUploadService::new(store, policy())
    }

    #[tokio::test(start_paused = true)]
    async fn test_stores_new_upload() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store.clone());

        let outcome = service.store(scenario_input()).await.unwrap();

        assert_eq!(outcome.status, IngestionStatus::Success);
        assert_eq!(outcome.upload_id, "h1");
        assert_eq!(store.count_calls(), 1);
        assert_eq!(store.insert_calls(), 1);
        assert_eq!(store.rows().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_is_duplicate() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store.clone());

        service.store(scenario_input()).await.unwrap();
        let err = service.store(scenario_input()).await.unwrap_err();

        assert!(matches!(err, UploadError::DuplicateError { .. }));
        assert!(err.to_string().contains("h1"));
        assert_eq!(store.insert_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeded_hash_never_reaches_insert() {
        let store = Arc::new(InMemoryStore::new());
        store.seed_hash("H");
        let service = service(store.clone());

        for (id, source_id) in [("a", "s-a"), ("b", "s-b"), ("c", "s-c")] {
            let mut input = scenario_input();
            input["id"] = json!(id);
            input["source_id"] = json!(source_id);
            input["file_hash"] = json!("H");

            let err = service.store(input).await.unwrap_err();
            assert_eq!(
                err,
                UploadError::DuplicateError {
                    file_hash: "H".to_string()
                }
            );
        }

        assert_eq!(store.insert_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disallowed_url_touches_no_store() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store.clone());

        let mut input = scenario_input();
        input["file_url"] = json!("https://evil.com/file.pdf");

        let err = service.store(input).await.unwrap_err();

        match err {
            UploadError::ValidationFailed(msg) => {
                assert!(msg.contains("https://evil.com/file.pdf"))
            }
            other => panic!("expected ValidationFailed, got {:?}", other),
        }
        assert_eq!(store.count_calls(), 0);
        assert_eq!(store.insert_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_insert_failures_are_retried() {
        let store = Arc::new(InMemoryStore::new());
        store.fail_next_inserts(
            2,
            UploadError::StoreConnectionFailed("connection refused".to_string()),
        );
        let service = service(store.clone());

        let outcome = service.store(scenario_input()).await.unwrap();

        assert_eq!(outcome.upload_id, "h1");
        assert_eq!(store.insert_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_insert_retries_surface_last_error() {
        let store = Arc::new(InMemoryStore::new());
        store.fail_next_inserts(5, UploadError::InsertFailed("disk full".to_string()));
        let service = service(store.clone());

        let err = service.store(scenario_input()).await.unwrap_err();

        assert_eq!(err, UploadError::InsertFailed("disk full".to_string()));
        assert_eq!(store.insert_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_check_outage_is_retried_then_surfaced() {
        let store = Arc::new(InMemoryStore::new());
        store.fail_next_counts(3, UploadError::StoreConnectionFailed("timeout".to_string()));
        let service = service(store.clone());

        let err = service.store(scenario_input()).await.unwrap_err();

        assert!(matches!(err, UploadError::StoreConnectionFailed(_)));
        assert_eq!(store.count_calls(), 3);
        assert_eq!(store.insert_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lost_race_surfaces_conflict() {
        let store = Arc::new(InMemoryStore::new());
        // Another writer lands the same hash between check and insert
        store.hide_hash_from_count("h1");
        store.seed_hash("h1");
        let service = service(store.clone());

        let err = service.store(scenario_input()).await.unwrap_err();

        assert_eq!(
            err,
            UploadError::DuplicateConflict {
                file_hash: "h1".to_string()
            }
        );
        assert!(err.is_duplicate());
        // Conflicts go through the same retry path as any other failure
        assert_eq!(store.insert_calls(), 3);
    }

    #[test]
    fn test_build_record_requires_hash_and_source_id() {
        let service = service(Arc::new(InMemoryStore::new()));

        for field in ["source_id", "file_hash"] {
            let mut missing = scenario_input();
            missing.as_object_mut().unwrap().remove(field);
            assert!(matches!(
                service.build_record(missing),
                Err(UploadError::ValidationFailed(_))
            ));

            let mut empty = scenario_input();
            empty[field] = json!("");
            assert!(matches!(
                service.build_record(empty),
                Err(UploadError::ValidationFailed(_))
            ));
        }
    }

    #[test]
    fn test_build_record_rejects_every_missing_required_field() {
        let service = service(Arc::new(InMemoryStore::new()));
        let required = [
            "id",
            "file_url",
            "source",
            "source_id",
            "client_name",
            "file_hash",
            "status",
        ];

        for field in required {
            let mut input = scenario_input();
            input.as_object_mut().unwrap().remove(field);
            let err = service.build_record(input).unwrap_err();
            assert!(
                err.to_string().contains(field),
                "error for missing {} was: {}",
                field,
                err
            );
        }
    }

    #[test]
    fn test_build_record_rejects_non_objects() {
        let service = service(Arc::new(InMemoryStore::new()));
        assert!(service.build_record(json!(null)).is_err());
        assert!(service.build_record(json!(["id", "1"])).is_err());
        assert!(service.build_record(json!("h1")).is_err());
    }

    #[test]
    fn test_build_record_defaults_timestamps_from_clock() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 15, 8, 30, 0).unwrap();
        let service = HotelUploadService::with_clock(
            Arc::new(InMemoryStore::new()),
            policy(),
            Arc::new(FixedClock(instant)),
        );

        let record = service.build_record(scenario_input()).unwrap();
        assert_eq!(record.created_on(), instant);
        assert_eq!(record.updated_on(), instant);
        assert_eq!(record.file_hash(), "h1");
        assert_eq!(record.source_id(), "s1");
    }

    #[test]
    fn test_build_record_keeps_supplied_timestamps() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 15, 8, 30, 0).unwrap();
        let service = HotelUploadService::with_clock(
            Arc::new(InMemoryStore::new()),
            policy(),
            Arc::new(FixedClock(instant)),
        );

        let mut input = scenario_input();
        input["created_on"] = json!("2024-03-01T10:00:00Z");

        let record = service.build_record(input).unwrap();
        assert_eq!(
            record.created_on(),
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
        );
        assert_eq!(record.updated_on(), instant);
    }

    #[test]
    fn test_build_record_accepts_timestamps_without_offset() {
        let service = service(Arc::new(InMemoryStore::new()));

        let mut input = scenario_input();
        input["created_on"] = json!("2024-03-01T10:00:00");
        input["updated_on"] = json!("2024-03-01 10:00:00.123456");

        let record = service.build_record(input).unwrap();
        assert_eq!(
            record.created_on(),
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
        );
        assert_eq!(record.updated_on().timestamp_subsec_micros(), 123_456);
    }

    #[test]
    fn test_build_record_unparseable_timestamp_names_field() {
        let service = service(Arc::new(InMemoryStore::new()));

        let mut input = scenario_input();
        input["created_on"] = json!("last tuesday");

        match service.build_record(input).unwrap_err() {
            UploadError::ValidationFailed(msg) => assert!(msg.contains("created_on")),
            other => panic!("expected ValidationFailed, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_uploads_of_same_hash() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store.clone());

        let (first, second) = tokio::join!(
            service.store(scenario_input()),
            service.store(scenario_input())
        );

        let results = [first, second];
        let stored = results.iter().filter(|r| r.is_ok()).count();
        let duplicates = results
            .iter()
            .filter(|r| matches!(r, Err(e) if e.is_duplicate()))
            .count();

        assert_eq!(stored, 1);
        assert_eq!(duplicates, 1);
        assert_eq!(store.rows().len(), 1);
        // Both passed the duplicate check before either inserted
        assert_eq!(store.count_calls(), 2);
    }
}
