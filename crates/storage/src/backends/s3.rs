//! S3-compatible storage backend (AWS S3, Cloudflare R2, MinIO).

use crate::error::{StorageError, StorageResult};
use crate::traits::{ListPage, ListRequest, ObjectRecord, ObjectStore, PutOptions};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::SdkError;
use aws_smithy_http_client::Builder as SmithyHttpClientBuilder;
use bytes::Bytes;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::instrument;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);
const HEALTH_CHECK_KEY: &str = ".locker-health-check";

/// S3-compatible object storage backend.
pub struct S3Backend {
    client: Client,
    bucket: String,
    /// Key prefix within the bucket, without a trailing slash.
    prefix: Option<String>,
}

impl S3Backend {
    /// Create a backend for `bucket`.
    ///
    /// With explicit credentials both halves must be present; otherwise the
    /// standard AWS credential chain (env, profile, IMDS) is used. Custom
    /// endpoints cover R2 and MinIO; plain-http endpoints get a plain-http
    /// client so local MinIO works without TLS.
    pub async fn new(
        bucket: &str,
        endpoint: Option<String>,
        region: Option<String>,
        prefix: Option<String>,
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
        force_path_style: bool,
    ) -> StorageResult<Self> {
        if access_key_id.is_some() ^ secret_access_key.is_some() {
            return Err(StorageError::Config(
                "s3 config requires both access_key_id and secret_access_key when either is set"
                    .to_string(),
            ));
        }

        let resolved_region = region.unwrap_or_else(|| "us-east-1".to_string());
        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(aws_config::Region::new(resolved_region.clone()));

        if let (Some(key_id), Some(secret)) = (access_key_id, secret_access_key) {
            let credentials =
                aws_sdk_s3::config::Credentials::new(key_id, secret, None, None, "locker-config");
            builder = builder.credentials_provider(credentials);
        } else {
            let shared = aws_config::defaults(BehaviorVersion::latest())
                .region(aws_config::Region::new(resolved_region))
                .load()
                .await;
            if let Some(provider) = shared.credentials_provider() {
                builder = builder.credentials_provider(provider);
            }
        }

        if let Some(raw_endpoint) = endpoint {
            let normalized = normalize_endpoint(&raw_endpoint);
            // Plain-http endpoints (local MinIO) get an http-only client so
            // SDK initialization doesn't depend on native trust roots.
            if normalized.starts_with("http://") {
                builder = builder.http_client(SmithyHttpClientBuilder::new().build_http());
            }
            builder = builder.endpoint_url(normalized);
        }

        if force_path_style {
            builder = builder.force_path_style(true);
        }

        let client = Client::from_conf(builder.build());
        let prefix = prefix
            .map(|p| p.trim_end_matches('/').to_string())
            .filter(|p| !p.is_empty());

        Ok(Self {
            client,
            bucket: bucket.to_string(),
            prefix,
        })
    }

    /// Key as stored in the bucket, with the configured prefix applied.
    fn full_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}/{key}"),
            None => key.to_string(),
        }
    }

    /// Bucket key back to the caller's view, prefix stripped.
    fn strip_prefix<'a>(&self, key: &'a str) -> &'a str {
        match &self.prefix {
            Some(prefix) => key
                .strip_prefix(prefix.as_str())
                .map(|rest| rest.strip_prefix('/').unwrap_or(rest))
                .unwrap_or(key),
            None => key,
        }
    }

    fn map_sdk_error<E>(err: SdkError<E>, key: &str) -> StorageError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        if let SdkError::ServiceError(ref service_err) = err
            && service_err.raw().status().as_u16() == 404
        {
            return StorageError::NotFound(key.to_string());
        }
        StorageError::S3(Box::new(err))
    }
}

/// Accept bare hosts ("minio:9000") by defaulting the scheme to http.
fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

#[async_trait]
impl ObjectStore for S3Backend {
    #[instrument(skip(self, data, options), fields(backend = "s3", size = data.len()))]
    async fn put(&self, key: &str, data: Bytes, options: &PutOptions) -> StorageResult<()> {
        let full_key = self.full_key(key);
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .body(data.into());

        if let Some(content_type) = &options.content_type {
            request = request.content_type(content_type);
        }
        if let Some(cache_control) = &options.cache_control {
            request = request.cache_control(cache_control);
        }
        for (name, value) in &options.metadata {
            request = request.metadata(name, value);
        }

        request
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(e, key))?;
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "s3"))]
    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let full_key = self.full_key(key);
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(e, key))?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::S3(Box::new(e)))?;
        Ok(data.into_bytes())
    }

    #[instrument(skip(self), fields(backend = "s3"))]
    async fn head(&self, key: &str) -> StorageResult<ObjectRecord> {
        let full_key = self.full_key(key);
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(e, key))?;

        Ok(ObjectRecord {
            key: key.to_string(),
            size: output.content_length().unwrap_or(0).max(0) as u64,
            uploaded: output
                .last_modified()
                .and_then(|t| OffsetDateTime::from_unix_timestamp(t.secs()).ok()),
            content_type: output.content_type().map(str::to_string),
        })
    }

    #[instrument(skip(self), fields(backend = "s3"))]
    async fn delete(&self, key: &str) -> StorageResult<()> {
        let full_key = self.full_key(key);
        if let Err(err) = self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .send()
            .await
        {
            // S3 deletes are idempotent; treat a 404 as success anyway for
            // parity with the other backends.
            match Self::map_sdk_error(err, key) {
                StorageError::NotFound(_) => {}
                other => return Err(other),
            }
        }
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "s3"))]
    async fn list(&self, request: &ListRequest) -> StorageResult<ListPage> {
        let full_prefix = self.full_key(&request.prefix);
        let mut sdk_request = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(&full_prefix)
            .max_keys(request.normalized_limit() as i32);

        if let Some(delimiter) = &request.delimiter {
            sdk_request = sdk_request.delimiter(delimiter);
        }
        if let Some(cursor) = &request.cursor {
            sdk_request = sdk_request.continuation_token(cursor);
        }

        let output = sdk_request
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(e, &request.prefix))?;

        let mut objects = Vec::new();
        for object in output.contents() {
            let Some(bucket_key) = object.key() else {
                continue;
            };
            objects.push(ObjectRecord {
                key: self.strip_prefix(bucket_key).to_string(),
                size: object.size().unwrap_or(0).max(0) as u64,
                uploaded: object
                    .last_modified()
                    .and_then(|t| OffsetDateTime::from_unix_timestamp(t.secs()).ok()),
                // ListObjectsV2 does not return content types.
                content_type: None,
            });
        }

        let delimited_prefixes = output
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix())
            .map(|p| self.strip_prefix(p).to_string())
            .collect();

        let truncated = output.is_truncated() == Some(true);
        let cursor = if truncated {
            output.next_continuation_token().map(|t| t.to_string())
        } else {
            None
        };

        Ok(ListPage {
            objects,
            delimited_prefixes,
            truncated,
            cursor,
        })
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }

    /// Writes and removes a marker object, under a timeout so a hung
    /// endpoint fails startup instead of stalling it.
    async fn health_check(&self) -> StorageResult<()> {
        let marker = self.full_key(HEALTH_CHECK_KEY);
        let check = async {
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(&marker)
                .body(Bytes::new().into())
                .send()
                .await
                .map_err(|e| Self::map_sdk_error(e, HEALTH_CHECK_KEY))?;
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(&marker)
                .send()
                .await
                .map_err(|e| Self::map_sdk_error(e, HEALTH_CHECK_KEY))?;
            Ok(())
        };

        match tokio::time::timeout(HEALTH_CHECK_TIMEOUT, check).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "s3 health check timed out",
            ))),
        }
    }
}
