use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::ObjectStore;
use crate::error::RelayError;
use crate::object::{CannedAcl, ObjectSummary, PutObject};

const DEFAULT_PAGE_SIZE: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
    pub acl: CannedAcl,
    pub content_disposition: String,
}

/// In-process object store with S3 overwrite and first-page listing semantics.
///
/// Failures can be injected per key or per bucket so callers can exercise
/// upstream error paths without a network.
pub struct MemoryStore {
    buckets: Mutex<HashMap<String, BTreeMap<String, StoredObject>>>,
    failing_keys: Mutex<HashSet<String>>,
    failing_buckets: Mutex<HashSet<String>>,
    page_size: usize,
    put_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            failing_keys: Mutex::new(HashSet::new()),
            failing_buckets: Mutex::new(HashSet::new()),
            page_size,
            put_calls: AtomicUsize::new(0),
        }
    }

    /// Makes every subsequent put of `key` fail.
    pub fn fail_puts_for(&self, key: &str) {
        lock(&self.failing_keys).insert(key.to_string());
    }

    /// Makes every subsequent operation against `bucket` fail.
    pub fn fail_bucket(&self, bucket: &str) {
        lock(&self.failing_buckets).insert(bucket.to_string());
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        lock(&self.buckets)
            .get(bucket)
            .and_then(|objects| objects.get(key).cloned())
    }

    pub fn object_count(&self, bucket: &str) -> usize {
        lock(&self.buckets).get(bucket).map_or(0, BTreeMap::len)
    }

    /// Number of put attempts, successful or not.
    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    fn check_bucket(&self, bucket: &str) -> Result<(), RelayError> {
        if lock(&self.failing_buckets).contains(bucket) {
            return Err(RelayError::upstream(
                format!("bucket {bucket} is unavailable"),
                "injected bucket failure",
            ));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(&self, object: PutObject) -> Result<(), RelayError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        self.check_bucket(&object.bucket)?;
        if lock(&self.failing_keys).contains(&object.key) {
            return Err(RelayError::upstream(
                format!("failed to store object {}", object.key),
                "injected put failure",
            ));
        }

        let stored = StoredObject {
            body: object.body,
            content_type: object.content_type,
            acl: object.acl,
            content_disposition: object.content_disposition.to_string(),
        };
        lock(&self.buckets)
            .entry(object.bucket)
            .or_default()
            .insert(object.key, stored);
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>, RelayError> {
        self.check_bucket(bucket)?;
        let buckets = lock(&self.buckets);
        let Some(objects) = buckets.get(bucket) else {
            return Ok(Vec::new());
        };
        Ok(objects
            .iter()
            .take(self.page_size)
            .map(|(key, object)| ObjectSummary {
                key: key.clone(),
                size: object.body.len() as u64,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
