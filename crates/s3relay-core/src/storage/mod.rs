#[cfg(any(test, feature = "testing"))]
mod memory;
mod s3;

#[cfg(any(test, feature = "testing"))]
pub use memory::{MemoryStore, StoredObject};
pub use s3::S3Store;

use crate::error::RelayError;
use crate::object::{ObjectSummary, PutObject};
use async_trait::async_trait;

/// Remote object storage the relay forwards to.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes one object, replacing any object stored under the same key.
    async fn put_object(&self, object: PutObject) -> Result<(), RelayError>;

    /// Lists the first page of objects in a bucket. Further pages are not fetched.
    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>, RelayError>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}
