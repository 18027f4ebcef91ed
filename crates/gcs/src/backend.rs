//! Google Cloud Storage backend

use std::sync::Arc;

use async_trait::async_trait;
use gos_core::{
    Context, Error, ErrorCode, ListError, ListResult, Object, Operation, Provider, Result,
    StorageBackend, path,
};
use tracing::{debug, warn};

use crate::api::{GcsApi, GcsApiError};
use crate::client::BucketHandle;
use crate::iter::{IterError, ObjectIterator};

const fn error_code(operation: Operation) -> ErrorCode {
    ErrorCode::new(Provider::Gcs, operation)
}

/// Whether a Cloud Storage error is the object-does-not-exist sentinel
pub fn is_not_found(err: &GcsApiError) -> bool {
    *err == GcsApiError::ObjectNotExist
}

fn classify(code: ErrorCode, err: GcsApiError) -> Error {
    let not_found = is_not_found(&err);
    code.classify(err, not_found)
}

/// Storage backend for Google Cloud Storage
///
/// Every operation except [`copy_object`](StorageBackend::copy_object)
/// resolves paths against the configured prefix. Copy passes both paths to
/// the bucket unchanged, so callers supply full object names there.
pub struct GcsBackend {
    prefix: String,
    api: Arc<dyn GcsApi>,
}

impl GcsBackend {
    /// Create a backend using Application Default Credentials
    pub async fn new(ctx: &Context, bucket: impl Into<String>, prefix: &str) -> Result<Self> {
        let handle = ctx
            .run(BucketHandle::connect(bucket))
            .await
            .map_err(|e| error_code(Operation::InitClient).internal(e))??;
        debug!(bucket = %handle.bucket(), "Connected to GCS");
        Ok(Self::from_api(prefix, Arc::new(handle)))
    }

    /// Create a backend over any [`GcsApi`] implementation
    pub fn from_api(prefix: &str, api: Arc<dyn GcsApi>) -> Self {
        Self {
            prefix: path::clean_prefix(prefix),
            api,
        }
    }

    /// Normalized prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn object_name(&self, object_path: &str) -> String {
        path::join(&[&self.prefix, object_path])
    }
}

#[async_trait]
impl StorageBackend for GcsBackend {
    fn name(&self) -> &'static str {
        "gcs"
    }

    async fn get_object(&self, ctx: &Context, object_path: &str) -> Result<Object> {
        let code = error_code(Operation::GetObject);
        let name = self.object_name(object_path);
        debug!(object = %name, "Getting GCS object");

        let attrs = ctx
            .run(self.api.object_attrs(&name))
            .await
            .map_err(|e| code.internal(e))?
            .map_err(|e| classify(code, e))?;

        let content = ctx
            .run(self.api.read_object(&name))
            .await
            .map_err(|e| code.internal(e))?
            .map_err(|e| code.internal(e))?;

        Ok(Object::with_content(object_path, content, attrs.updated))
    }

    async fn get_objects(&self, ctx: &Context, prefix: &str) -> ListResult {
        let code = error_code(Operation::GetObjects);
        let full_prefix = path::join(&[&self.prefix, prefix]);
        debug!(prefix = %full_prefix, "Listing GCS objects");

        let mut objects = Vec::new();
        let mut it = ObjectIterator::new(self.api.as_ref(), full_prefix.as_str());

        loop {
            match it.next(ctx).await {
                Ok(Some(attrs)) => objects.push(Object::entry(
                    path::strip_prefix(&full_prefix, &attrs.name),
                    attrs.updated,
                )),
                Ok(None) => break,
                Err(IterError::Api(e)) => {
                    return Err(abort_listing(objects, classify(code, e)));
                }
                Err(IterError::Context(e)) => {
                    return Err(abort_listing(objects, code.internal(e)));
                }
            }
        }

        debug!(count = objects.len(), "Listed GCS objects");
        Ok(objects)
    }

    async fn put_object(&self, ctx: &Context, object_path: &str, content: &[u8]) -> Result<()> {
        let code = error_code(Operation::PutObject);
        let name = self.object_name(object_path);
        debug!(object = %name, size = content.len(), "Putting GCS object");

        ctx.run(self.api.write_object(&name, content.to_vec()))
            .await
            .map_err(|e| code.internal(e))?
            .map_err(|e| code.internal(e))
    }

    async fn delete_object(&self, ctx: &Context, object_path: &str) -> Result<()> {
        let code = error_code(Operation::DeleteObject);
        let name = self.object_name(object_path);
        debug!(object = %name, "Deleting GCS object");

        ctx.run(self.api.delete_object(&name))
            .await
            .map_err(|e| code.internal(e))?
            .map_err(|e| classify(code, e))
    }

    async fn copy_object(&self, ctx: &Context, src_path: &str, dst_path: &str) -> Result<()> {
        let code = error_code(Operation::CopyObject);
        // Paths are used as given, without the configured prefix
        debug!(source = %src_path, destination = %dst_path, "Copying GCS object");

        ctx.run(self.api.copy_object(src_path, dst_path))
            .await
            .map_err(|e| code.internal(e))?
            .map_err(|e| classify(code, e))
    }
}

fn abort_listing(partial: Vec<Object>, error: Error) -> ListError {
    warn!(
        count = partial.len(),
        error = %error,
        "GCS listing failed, returning partial results"
    );
    ListError::new(partial, error)
}
