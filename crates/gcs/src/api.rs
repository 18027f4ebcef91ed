//! Cloud Storage capability interface
//!
//! A bucket-scoped view of the GCS calls the backend issues. The real
//! implementation is [`BucketHandle`](crate::BucketHandle); tests swap in
//! in-memory or mocked implementations.

use async_trait::async_trait;
use jiff::Timestamp;
use thiserror::Error;

/// Attributes of a stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectAttrs {
    pub name: String,
    pub updated: Option<Timestamp>,
}

/// One page of an objects listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub items: Vec<ObjectAttrs>,
    pub next_page_token: Option<String>,
}

/// Failure reported by a Cloud Storage call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GcsApiError {
    /// The object does not exist (HTTP 404)
    #[error("storage: object doesn't exist")]
    ObjectNotExist,

    #[error("{message}")]
    Request {
        status: Option<u16>,
        message: String,
    },
}

impl GcsApiError {
    pub fn request(message: impl Into<String>) -> Self {
        GcsApiError::Request {
            status: None,
            message: message.into(),
        }
    }
}

/// The Cloud Storage calls the backend needs, scoped to one bucket
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GcsApi: Send + Sync {
    async fn object_attrs(&self, name: &str) -> Result<ObjectAttrs, GcsApiError>;

    async fn read_object(&self, name: &str) -> Result<Vec<u8>, GcsApiError>;

    /// Fetch one listing page, continuing from `page_token`
    async fn list_objects(
        &self,
        prefix: &str,
        page_token: Option<String>,
    ) -> Result<ObjectPage, GcsApiError>;

    async fn write_object(&self, name: &str, content: Vec<u8>) -> Result<(), GcsApiError>;

    async fn delete_object(&self, name: &str) -> Result<(), GcsApiError>;

    /// Server-side copy of `src` to `dst` within the bucket
    async fn copy_object(&self, src: &str, dst: &str) -> Result<(), GcsApiError>;
}
