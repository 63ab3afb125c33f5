use bytes::Bytes;

pub const INLINE: &str = "inline";

/// Returns the MIME type for a filename based on its extension.
pub fn content_type_for(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CannedAcl {
    PublicRead,
}

impl CannedAcl {
    pub fn as_str(&self) -> &'static str {
        match self {
            CannedAcl::PublicRead => "public-read",
        }
    }
}

/// A single object write. Keys are used verbatim, so an existing object
/// with the same key is replaced.
#[derive(Debug, Clone)]
pub struct PutObject {
    pub bucket: String,
    pub key: String,
    pub body: Bytes,
    pub content_type: String,
    pub acl: CannedAcl,
    pub content_disposition: &'static str,
}

impl PutObject {
    /// Publicly readable object rendered inline by browsers, typed from the key's extension.
    pub fn public_inline(bucket: &str, key: impl Into<String>, body: Bytes) -> Self {
        let key = key.into();
        Self {
            bucket: bucket.to_string(),
            content_type: content_type_for(&key),
            key,
            body,
            acl: CannedAcl::PublicRead,
            content_disposition: INLINE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
}
