use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::RequestChecksumCalculation;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use std::error::Error as StdError;

use super::ObjectStore;
use crate::config::Config;
use crate::error::RelayError;
use crate::object::{CannedAcl, ObjectSummary, PutObject};

/// S3-compatible storage reached through the AWS SDK.
///
/// Works against AWS S3 and compatible services such as DigitalOcean Spaces
/// or MinIO, using the static credentials from [`Config`].
pub struct S3Store {
    client: Client,
    endpoint: String,
}

impl S3Store {
    pub async fn connect(config: &Config) -> Self {
        let credentials = aws_sdk_s3::config::Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "s3relay-config",
        );

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        // Many S3-compatible providers reject the SDK's default request checksums.
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .endpoint_url(&config.endpoint)
            .force_path_style(config.path_style)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            endpoint: config.endpoint.clone(),
        }
    }
}

/// Renders an SDK failure for clients: the service's error code and message
/// when there is one, otherwise the `Display` chain of the error's sources.
fn describe<E, R>(err: &SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + StdError + 'static,
    R: std::fmt::Debug + 'static,
{
    match (err.code(), err.message()) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (Some(code), None) => code.to_string(),
        _ => display_chain(err),
    }
}

fn display_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        // Some wrappers repeat their source's message.
        if !parts.last().is_some_and(|last| last.contains(&text)) {
            parts.push(text);
        }
        source = inner.source();
    }
    parts.join(": ")
}

fn canned_acl(acl: CannedAcl) -> ObjectCannedAcl {
    match acl {
        CannedAcl::PublicRead => ObjectCannedAcl::PublicRead,
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(&self, object: PutObject) -> Result<(), RelayError> {
        let size = object.body.len();
        self.client
            .put_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .body(ByteStream::from(object.body))
            .content_type(&object.content_type)
            .content_disposition(object.content_disposition)
            .acl(canned_acl(object.acl))
            .send()
            .await
            .map_err(|e| {
                RelayError::upstream(
                    format!("failed to store object {}", object.key),
                    describe(&e),
                )
            })?;

        tracing::debug!(
            bucket = %object.bucket,
            key = %object.key,
            size_bytes = size,
            content_type = %object.content_type,
            "object stored"
        );
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>, RelayError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| {
                RelayError::upstream(
                    format!("failed to list objects in bucket {bucket}"),
                    describe(&e),
                )
            })?;

        if output.is_truncated().unwrap_or(false) {
            tracing::warn!(bucket, "listing truncated; only the first page is returned");
        }

        Ok(output
            .contents()
            .iter()
            .filter_map(|object| {
                object.key().map(|key| ObjectSummary {
                    key: key.to_string(),
                    size: object.size().unwrap_or(0).max(0) as u64,
                })
            })
            .collect())
    }

    fn name(&self) -> &str {
        &self.endpoint
    }
}
