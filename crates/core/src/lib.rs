//! gos-core: Core library for generic object storage
//!
//! This crate provides the provider-independent pieces of gos:
//! - The `Object` model exchanged with callers
//! - The `StorageBackend` contract every adapter implements
//! - Error classification shared by all adapters
//! - Execution contexts, path helpers and backend configuration
//!
//! It does not depend on any cloud SDK; the `gos-s3` and `gos-gcs` crates
//! supply the adapters.

pub mod config;
pub mod context;
pub mod error;
pub mod object;
pub mod path;
pub mod traits;

pub use config::{BackendConfig, GcsConfig, S3Config};
pub use context::{CancelHandle, Context, ContextError};
pub use error::{BoxError, Error, ErrorCode, Operation, Provider, Result};
pub use object::{Metadata, Object};
pub use traits::{ListError, ListResult, StorageBackend};
