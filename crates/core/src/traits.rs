//! Storage backend contract
//!
//! Each cloud provider adapter implements [`StorageBackend`]. Callers hold
//! adapters as `Box<dyn StorageBackend>` or `Arc<dyn StorageBackend>` and see
//! identical semantics whichever provider sits underneath.

use async_trait::async_trait;
use thiserror::Error;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::object::Object;

/// A listing that failed part way through
///
/// `partial` holds the objects gathered from the pages that succeeded
/// before `error` ended the listing.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct ListError {
    pub partial: Vec<Object>,
    #[source]
    pub error: Error,
}

impl ListError {
    pub fn new(partial: Vec<Object>, error: Error) -> Self {
        Self { partial, error }
    }

    pub fn is_not_found(&self) -> bool {
        self.error.is_not_found()
    }
}

impl From<ListError> for Error {
    fn from(err: ListError) -> Self {
        err.error
    }
}

/// Result of [`StorageBackend::get_objects`]
pub type ListResult = std::result::Result<Vec<Object>, ListError>;

/// Operations every storage backend provides
///
/// Paths are relative to the backend's configured prefix. Every call takes
/// the [`Context`] bounding it; implementations issue provider calls through
/// [`Context::run`].
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Provider name, e.g. "s3" or "gcs"
    fn name(&self) -> &'static str;

    /// Fetch a single object with its content
    async fn get_object(&self, ctx: &Context, path: &str) -> Result<Object>;

    /// List every object under `prefix`, without content
    ///
    /// Follows provider pagination until exhausted.
    async fn get_objects(&self, ctx: &Context, prefix: &str) -> ListResult;

    /// Upload `content` to `path`, overwriting any existing object
    async fn put_object(&self, ctx: &Context, path: &str, content: &[u8]) -> Result<()>;

    /// Delete the object at `path`
    async fn delete_object(&self, ctx: &Context, path: &str) -> Result<()>;

    /// Copy an object to a new path within the same bucket
    async fn copy_object(&self, ctx: &Context, src_path: &str, dst_path: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCode, Operation, Provider};

    #[test]
    fn test_list_error_keeps_partial_results() {
        let code = ErrorCode::new(Provider::S3, Operation::GetObjects);
        let err = ListError::new(vec![Object::entry("a.txt", None)], code.internal("timeout"));

        assert_eq!(err.partial.len(), 1);
        assert!(!err.is_not_found());
        assert_eq!(
            err.to_string(),
            "ERR_OS_S3_2001 error while getting objects from s3 bucket: timeout"
        );

        let err: Error = err.into();
        assert_eq!(err.code(), Some(code));
    }
}
