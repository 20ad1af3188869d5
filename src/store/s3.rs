use async_trait::async_trait;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::{GetObjectError, GetObjectOutput};
use aws_sdk_s3::primitives::DateTimeFormat;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::debug;

use super::{BlobMetadata, BlobObject, BlobStore, KvStore};
use crate::error::StoreError;

/// S3-backed implementation of [`BlobStore`].
///
/// The storage key is used verbatim as the object key within the bucket.
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Get the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn get(&self, key: &str) -> Result<Option<BlobObject>, StoreError> {
        let Some(output) = get_object(&self.client, &self.bucket, key).await? else {
            return Ok(None);
        };

        let metadata = BlobMetadata {
            content_type: output.content_type().map(str::to_string),
            content_encoding: output.content_encoding().map(str::to_string),
            content_language: output.content_language().map(str::to_string),
            content_disposition: output.content_disposition().map(str::to_string),
            last_modified: output
                .last_modified()
                .and_then(|t| t.fmt(DateTimeFormat::HttpDate).ok()),
        };
        let etag = output.e_tag().map(str::to_string);
        let data = collect_body(output).await?;

        Ok(Some(BlobObject {
            data,
            metadata,
            etag,
        }))
    }
}

/// S3-backed implementation of [`KvStore`].
///
/// Registry listings and latest pointers are plain objects; only their bytes
/// are returned.
#[derive(Clone)]
pub struct S3KvStore {
    client: Client,
    bucket: String,
}

impl S3KvStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Get the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl KvStore for S3KvStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        match get_object(&self.client, &self.bucket, key).await? {
            Some(output) => Ok(Some(collect_body(output).await?)),
            None => Ok(None),
        }
    }
}

/// Issue a GetObject, mapping a missing key to `None`.
async fn get_object(
    client: &Client,
    bucket: &str,
    key: &str,
) -> Result<Option<GetObjectOutput>, StoreError> {
    match client.get_object().bucket(bucket).key(key).send().await {
        Ok(output) => Ok(Some(output)),
        Err(e) if is_not_found(&e) => {
            debug!(bucket = bucket, key = key, "Object not found");
            Ok(None)
        }
        Err(SdkError::DispatchFailure(e)) => Err(StoreError::Connection(format!("{:?}", e))),
        Err(SdkError::TimeoutError(_)) => {
            Err(StoreError::Connection(format!("timed out reading s3://{}/{}", bucket, key)))
        }
        Err(e) => Err(StoreError::S3(e.to_string())),
    }
}

fn is_not_found(e: &SdkError<GetObjectError, HttpResponse>) -> bool {
    if e
        .as_service_error()
        .map(|se| se.is_no_such_key())
        .unwrap_or(false)
    {
        return true;
    }

    // Some S3-compatible services answer 404 without a NoSuchKey code
    e.raw_response()
        .map(|r| r.status().as_u16() == 404)
        .unwrap_or(false)
}

async fn collect_body(output: GetObjectOutput) -> Result<Bytes, StoreError> {
    output
        .body
        .collect()
        .await
        .map(|data| data.into_bytes())
        .map_err(|e| StoreError::Connection(e.to_string()))
}

/// Create an S3 client with optional custom endpoint and region.
///
/// Use a custom endpoint for S3-compatible services like MinIO or R2:
/// ```ignore
/// let client = create_s3_client(Some("http://localhost:9000"), "us-east-1").await;
/// ```
pub async fn create_s3_client(endpoint_url: Option<&str>, region: &str) -> Client {
    let region = aws_config::Region::new(region.to_string());
    let mut config_loader =
        aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);

    if let Some(endpoint) = endpoint_url {
        config_loader = config_loader.endpoint_url(endpoint);
    }

    let sdk_config = config_loader.load().await;

    // S3-compatible services generally need path-style addressing
    let s3_config = if endpoint_url.is_some() {
        aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build()
    } else {
        aws_sdk_s3::config::Builder::from(&sdk_config).build()
    };

    Client::from_conf(s3_config)
}
