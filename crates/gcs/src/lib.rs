//! gos-gcs: Google Cloud Storage adapter for gos
//!
//! This crate implements the `StorageBackend` trait from gos-core using the
//! google-cloud-storage crate. It is the only crate that directly depends
//! on the Cloud Storage SDK.

pub mod api;
pub mod backend;
pub mod client;
pub mod iter;

#[cfg(test)]
mod memory;

pub use api::{GcsApi, GcsApiError, ObjectAttrs, ObjectPage};
pub use backend::{GcsBackend, is_not_found};
pub use client::BucketHandle;
pub use iter::{IterError, ObjectIterator};
