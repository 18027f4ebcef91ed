//! S3 storage backend
//!
//! Implements [`StorageBackend`] on top of an [`S3Api`]. Every path is joined
//! onto the configured prefix before it reaches S3 and stripped again before
//! it is returned.

use std::sync::Arc;

use async_trait::async_trait;
use aws_credential_types::Credentials;
use gos_core::{
    Context, Error, ErrorCode, ListError, ListResult, Object, Operation, Provider, Result,
    StorageBackend, path,
};
use tracing::{debug, warn};

use crate::api::{FetchedObject, S3Api, S3ApiError};
use crate::client::{ClientOptions, SdkS3Api};

const fn error_code(operation: Operation) -> ErrorCode {
    ErrorCode::new(Provider::S3, operation)
}

/// Whether an S3 error means the key (or bucket) does not exist
///
/// Structured metadata is checked first. Errors that lost it (dispatch
/// failures, errors rendered by intermediaries) fall back to matching
/// `NoSuchKey`, `NotFound` or `404` in the rendered message, which can
/// misfire on unrelated text containing those tokens.
pub fn is_not_found(err: &S3ApiError) -> bool {
    if matches!(err.code.as_deref(), Some("NoSuchKey" | "NotFound")) || err.status == Some(404) {
        return true;
    }

    let text = err.to_string();
    text.contains("NoSuchKey") || text.contains("NotFound") || text.contains("404")
}

fn classify(code: ErrorCode, err: S3ApiError) -> Error {
    let not_found = is_not_found(&err);
    code.classify(err, not_found)
}

/// Storage backend for Amazon S3 and S3-compatible services
pub struct S3Backend {
    bucket: String,
    prefix: String,
    api: Arc<dyn S3Api>,
}

impl S3Backend {
    /// Create a backend using the default credential chain
    pub async fn new(
        bucket: impl Into<String>,
        prefix: &str,
        region: &str,
        disable_ssl: bool,
    ) -> Result<Self> {
        let api = SdkS3Api::connect(ClientOptions {
            region: region.to_string(),
            endpoint: None,
            disable_ssl,
            credentials: None,
        })
        .await?;
        Ok(Self::from_api(bucket, prefix, Arc::new(api)))
    }

    /// Create a backend with explicit credentials
    pub async fn with_credentials(
        bucket: impl Into<String>,
        prefix: &str,
        region: &str,
        disable_ssl: bool,
        credentials: Credentials,
    ) -> Result<Self> {
        let api = SdkS3Api::connect(ClientOptions {
            region: region.to_string(),
            endpoint: None,
            disable_ssl,
            credentials: Some(credentials),
        })
        .await?;
        Ok(Self::from_api(bucket, prefix, Arc::new(api)))
    }

    /// Create a backend for an S3-compatible endpoint (MinIO, RustFS, ...)
    ///
    /// Path-style addressing is always used.
    pub async fn with_endpoint(
        bucket: impl Into<String>,
        prefix: &str,
        region: &str,
        endpoint: &str,
        disable_ssl: bool,
        credentials: Credentials,
    ) -> Result<Self> {
        let api = SdkS3Api::connect(ClientOptions {
            region: region.to_string(),
            endpoint: Some(endpoint.to_string()),
            disable_ssl,
            credentials: Some(credentials),
        })
        .await?;
        Ok(Self::from_api(bucket, prefix, Arc::new(api)))
    }

    /// Create a backend over any [`S3Api`] implementation
    pub fn from_api(bucket: impl Into<String>, prefix: &str, api: Arc<dyn S3Api>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: path::clean_prefix(prefix),
            api,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Normalized prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn key(&self, object_path: &str) -> String {
        path::join(&[&self.prefix, object_path])
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    fn name(&self) -> &'static str {
        "s3"
    }

    async fn get_object(&self, ctx: &Context, object_path: &str) -> Result<Object> {
        let code = error_code(Operation::GetObject);
        let key = self.key(object_path);
        debug!(bucket = %self.bucket, key = %key, "Getting S3 object");

        let FetchedObject {
            body,
            last_modified,
        } = ctx
            .run(self.api.get_object(&self.bucket, &key))
            .await
            .map_err(|e| code.internal(e))?
            .map_err(|e| classify(code, e))?;

        let content = ctx
            .run(body.collect())
            .await
            .map_err(|e| code.internal(e))?
            .map_err(|e| code.internal(e))?
            .into_bytes()
            .to_vec();

        Ok(Object::with_content(object_path, content, last_modified))
    }

    async fn get_objects(&self, ctx: &Context, prefix: &str) -> ListResult {
        let code = error_code(Operation::GetObjects);
        let full_prefix = path::join(&[&self.prefix, prefix]);
        debug!(bucket = %self.bucket, prefix = %full_prefix, "Listing S3 objects");

        let mut objects = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let page = match ctx
                .run(self.api.list_objects(&self.bucket, &full_prefix, marker.clone()))
                .await
            {
                Ok(Ok(page)) => page,
                Ok(Err(e)) => return Err(abort_listing(objects, classify(code, e))),
                Err(e) => return Err(abort_listing(objects, code.internal(e))),
            };

            let next_marker = page
                .entries
                .last()
                .map(|entry| entry.key.clone())
                .or(page.next_marker);

            objects.extend(page.entries.into_iter().map(|entry| {
                Object::entry(
                    path::strip_prefix(&full_prefix, &entry.key),
                    entry.last_modified,
                )
            }));

            if !page.is_truncated {
                break;
            }
            match next_marker {
                Some(next) => marker = Some(next),
                None => {
                    return Err(abort_listing(
                        objects,
                        code.internal("truncated listing without a marker"),
                    ));
                }
            }
        }

        debug!(count = objects.len(), "Listed S3 objects");
        Ok(objects)
    }

    async fn put_object(&self, ctx: &Context, object_path: &str, content: &[u8]) -> Result<()> {
        let code = error_code(Operation::PutObject);
        let key = self.key(object_path);
        debug!(bucket = %self.bucket, key = %key, size = content.len(), "Putting S3 object");

        ctx.run(self.api.put_object(&self.bucket, &key, content.to_vec()))
            .await
            .map_err(|e| code.internal(e))?
            .map_err(|e| code.internal(e))
    }

    async fn delete_object(&self, ctx: &Context, object_path: &str) -> Result<()> {
        let code = error_code(Operation::DeleteObject);
        let key = self.key(object_path);
        debug!(bucket = %self.bucket, key = %key, "Deleting S3 object");

        ctx.run(self.api.delete_object(&self.bucket, &key))
            .await
            .map_err(|e| code.internal(e))?
            .map_err(|e| classify(code, e))
    }

    async fn copy_object(&self, ctx: &Context, src_path: &str, dst_path: &str) -> Result<()> {
        let code = error_code(Operation::CopyObject);
        let source = path::join(&[&self.bucket, &self.prefix, src_path]);
        let copy_source = urlencoding::encode(&source).into_owned();
        let key = self.key(dst_path);
        debug!(bucket = %self.bucket, source = %source, key = %key, "Copying S3 object");

        ctx.run(self.api.copy_object(&self.bucket, &copy_source, &key))
            .await
            .map_err(|e| code.internal(e))?
            .map_err(|e| classify(code, e))
    }
}

fn abort_listing(partial: Vec<Object>, error: Error) -> ListError {
    warn!(
        count = partial.len(),
        error = %error,
        "S3 listing failed, returning partial results"
    );
    ListError::new(partial, error)
}
