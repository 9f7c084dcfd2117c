use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::features::hotel_uploads::models::{HotelInvoice, UploadRecord};
use crate::features::hotel_uploads::store::HotelInvoiceStore;
use crate::features::hotel_uploads::UploadError;

/// The canonical valid upload used across tests
pub fn scenario_input() -> Value {
    json!({
        "id": "1",
        "file_url": "https://bucket.s3.amazonaws.com/a.pdf",
        "source": "x",
        "source_id": "s1",
        "client_name": "c",
        "file_hash": "h1",
        "status": "new"
    })
}

/// Store double that enforces hash uniqueness like the real table and
/// can be scripted to fail.
#[derive(Default)]
pub struct InMemoryStore {
    rows: Mutex<Vec<HotelInvoice>>,
    seeded_hashes: Mutex<HashSet<String>>,
    hidden_from_count: Mutex<HashSet<String>>,
    count_failures: Mutex<VecDeque<UploadError>>,
    insert_failures: Mutex<VecDeque<UploadError>>,
    count_calls: AtomicUsize,
    insert_calls: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend a row with this hash already exists
    pub fn seed_hash(&self, file_hash: &str) {
        self.seeded_hashes
            .lock()
            .unwrap()
            .insert(file_hash.to_string());
    }

    /// Make the duplicate count miss this hash, as if a concurrent writer
    /// committed it right after the check.
    pub fn hide_hash_from_count(&self, file_hash: &str) {
        self.hidden_from_count
            .lock()
            .unwrap()
            .insert(file_hash.to_string());
    }

    pub fn fail_next_counts(&self, times: usize, err: UploadError) {
        let mut failures = self.count_failures.lock().unwrap();
        failures.extend((0..times).map(|_| err.clone()));
    }

    pub fn fail_next_inserts(&self, times: usize, err: UploadError) {
        let mut failures = self.insert_failures.lock().unwrap();
        failures.extend((0..times).map(|_| err.clone()));
    }

    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn rows(&self) -> Vec<HotelInvoice> {
        self.rows.lock().unwrap().clone()
    }

    fn contains_hash(&self, file_hash: &str) -> bool {
        self.seeded_hashes.lock().unwrap().contains(file_hash)
            || self
                .rows
                .lock()
                .unwrap()
                .iter()
                .any(|row| row.file_hash == file_hash)
    }
}

#[async_trait]
impl HotelInvoiceStore for InMemoryStore {
    async fn count_by_file_hash(&self, file_hash: &str) -> Result<i64, UploadError> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.count_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        let count = if self.hidden_from_count.lock().unwrap().contains(file_hash) {
            0
        } else {
            i64::from(self.contains_hash(file_hash))
        };

        // Let concurrent callers run between the check and the insert
        tokio::task::yield_now().await;

        Ok(count)
    }

    async fn insert(&self, record: &UploadRecord) -> Result<HotelInvoice, UploadError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.insert_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        if self.contains_hash(record.file_hash()) {
            return Err(UploadError::DuplicateConflict {
                file_hash: record.file_hash().to_string(),
            });
        }

        let row = HotelInvoice::from(record);
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }
}
