//! S3 capability interface
//!
//! [`S3Backend`](crate::S3Backend) talks to S3 only through [`S3Api`], so
//! tests can substitute an in-memory or mocked implementation for the real
//! SDK client in [`SdkS3Api`](crate::SdkS3Api).

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use jiff::Timestamp;
use thiserror::Error;

/// A key returned by a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: String,
    pub last_modified: Option<Timestamp>,
}

/// One page of a ListObjects response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub entries: Vec<ObjectEntry>,
    pub is_truncated: bool,
    /// `NextMarker` as reported by the service, if any
    pub next_marker: Option<String>,
}

/// A fetched object whose body has not been read yet
#[derive(Debug)]
pub struct FetchedObject {
    pub body: ByteStream,
    pub last_modified: Option<Timestamp>,
}

/// Failure reported by an S3 call
///
/// `code` and `status` carry the service error code and HTTP status when
/// the SDK exposed them; `message` is the full rendered error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct S3ApiError {
    pub code: Option<String>,
    pub status: Option<u16>,
    pub message: String,
}

impl S3ApiError {
    /// An error with no structured metadata
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            status: None,
            message: message.into(),
        }
    }

    /// A service error with code and HTTP status
    pub fn service(code: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            status: Some(status),
            message: message.into(),
        }
    }
}

/// The S3 calls the backend needs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait S3Api: Send + Sync {
    /// ListObjects (v1) starting after `marker`
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        marker: Option<String>,
    ) -> Result<ObjectPage, S3ApiError>;

    async fn get_object(&self, bucket: &str, key: &str) -> Result<FetchedObject, S3ApiError>;

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), S3ApiError>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), S3ApiError>;

    /// Server-side copy; `copy_source` is the URL-encoded `bucket/key`
    async fn copy_object(
        &self,
        bucket: &str,
        copy_source: &str,
        key: &str,
    ) -> Result<(), S3ApiError>;
}
