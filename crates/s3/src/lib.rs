//! gos-s3: Amazon S3 adapter for gos
//!
//! This crate implements the `StorageBackend` trait from gos-core using the
//! aws-sdk-s3 crate. It is the only crate that directly depends on the AWS
//! SDK.

pub mod api;
pub mod backend;
pub mod client;

#[cfg(test)]
mod memory;

pub use api::{FetchedObject, ObjectEntry, ObjectPage, S3Api, S3ApiError};
pub use aws_credential_types::Credentials;
pub use backend::{S3Backend, is_not_found};
pub use client::{ClientOptions, SdkS3Api, static_credentials};
