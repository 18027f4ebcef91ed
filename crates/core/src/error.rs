//! Error types for gos
//!
//! Every provider failure is reported as either `NotFound` or `Internal`,
//! tagged with an [`ErrorCode`] naming the provider and the operation that
//! produced it.

use std::fmt;

use thiserror::Error;

/// Boxed error carried as the source of a storage failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for gos operations
pub type Result<T> = std::result::Result<T, Error>;

/// Cloud provider an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Gcs,
    S3,
}

impl Provider {
    /// Tag used inside error identifiers (`GCS`, `S3`)
    pub fn tag(&self) -> &'static str {
        match self {
            Provider::Gcs => "GCS",
            Provider::S3 => "S3",
        }
    }

    /// Lowercase provider name used in error descriptions
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gcs => "gcs",
            Provider::S3 => "s3",
        }
    }

    fn base(&self) -> u16 {
        match self {
            Provider::Gcs => 1000,
            Provider::S3 => 2000,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Storage operation an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    InitClient,
    GetObjects,
    GetObject,
    PutObject,
    DeleteObject,
    CopyObject,
}

impl Operation {
    fn offset(&self) -> u16 {
        match self {
            Operation::InitClient => 0,
            Operation::GetObjects => 1,
            Operation::GetObject => 2,
            Operation::PutObject => 3,
            Operation::DeleteObject => 4,
            Operation::CopyObject => 5,
        }
    }
}

/// Identifies the provider and operation behind a failure
///
/// Renders as `ERR_OS_<PROVIDER>_<NUMBER>`, e.g. `ERR_OS_S3_2002` for a
/// failed S3 object fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    pub provider: Provider,
    pub operation: Operation,
}

impl ErrorCode {
    pub const fn new(provider: Provider, operation: Operation) -> Self {
        Self {
            provider,
            operation,
        }
    }

    /// Numeric part of the identifier
    pub fn number(&self) -> u16 {
        self.provider.base() + self.operation.offset()
    }

    /// Stable identifier, e.g. `ERR_OS_GCS_1001`
    pub fn id(&self) -> String {
        format!("ERR_OS_{}_{}", self.provider.tag(), self.number())
    }

    /// Human readable description of the failed operation
    pub fn description(&self) -> String {
        let p = self.provider.name();
        match self.operation {
            Operation::InitClient => format!("failed to initialise the {p} client"),
            Operation::GetObjects => format!("error while getting objects from {p} bucket"),
            Operation::GetObject => format!("error while getting object from {p} bucket"),
            Operation::PutObject => format!("error while putting object to {p} bucket"),
            Operation::DeleteObject => format!("error while deleting object from {p} bucket"),
            Operation::CopyObject => format!("error while copying object in {p} bucket"),
        }
    }

    /// Build an `Internal` error for this operation
    pub fn internal(self, source: impl Into<BoxError>) -> Error {
        Error::Internal {
            code: self,
            source: source.into(),
        }
    }

    /// Build a `NotFound` error for this operation
    pub fn not_found(self, source: impl Into<BoxError>) -> Error {
        Error::NotFound {
            code: self,
            source: source.into(),
        }
    }

    /// Build `NotFound` when `not_found` holds, `Internal` otherwise
    pub fn classify(self, source: impl Into<BoxError>, not_found: bool) -> Error {
        if not_found {
            self.not_found(source)
        } else {
            self.internal(source)
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ERR_OS_{}_{}", self.provider.tag(), self.number())
    }
}

/// Main error type for gos
#[derive(Error, Debug)]
pub enum Error {
    /// The target object or key does not exist
    #[error("{code} {}: {source}", .code.description())]
    NotFound { code: ErrorCode, source: BoxError },

    /// Any other provider failure
    #[error("{code} {}: {source}", .code.description())]
    Internal { code: ErrorCode, source: BoxError },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Provider/operation code, if the error came from an adapter
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Error::NotFound { code, .. } | Error::Internal { code, .. } => Some(*code),
            Error::Config(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// HTTP-like status of the failure: 404 for not-found, 500 otherwise
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Internal { .. } | Error::Config(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_ids() {
        let cases = [
            (Provider::Gcs, Operation::InitClient, "ERR_OS_GCS_1000"),
            (Provider::Gcs, Operation::GetObjects, "ERR_OS_GCS_1001"),
            (Provider::Gcs, Operation::CopyObject, "ERR_OS_GCS_1005"),
            (Provider::S3, Operation::InitClient, "ERR_OS_S3_2000"),
            (Provider::S3, Operation::GetObject, "ERR_OS_S3_2002"),
            (Provider::S3, Operation::DeleteObject, "ERR_OS_S3_2004"),
        ];
        for (provider, operation, expected) in cases {
            let code = ErrorCode::new(provider, operation);
            assert_eq!(code.id(), expected);
            assert_eq!(code.to_string(), expected);
        }
    }

    #[test]
    fn test_error_code_descriptions() {
        assert_eq!(
            ErrorCode::new(Provider::Gcs, Operation::InitClient).description(),
            "failed to initialise the gcs client"
        );
        assert_eq!(
            ErrorCode::new(Provider::S3, Operation::PutObject).description(),
            "error while putting object to s3 bucket"
        );
        assert_eq!(
            ErrorCode::new(Provider::S3, Operation::CopyObject).description(),
            "error while copying object in s3 bucket"
        );
    }

    #[test]
    fn test_classify() {
        let code = ErrorCode::new(Provider::S3, Operation::GetObject);

        let err = code.classify("NoSuchKey", true);
        assert!(err.is_not_found());
        assert_eq!(err.http_status(), 404);
        assert_eq!(err.code(), Some(code));

        let err = code.classify("connection reset", false);
        assert!(!err.is_not_found());
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn test_error_display() {
        let err = ErrorCode::new(Provider::Gcs, Operation::DeleteObject).not_found("gone");
        assert_eq!(
            err.to_string(),
            "ERR_OS_GCS_1004 error while deleting object from gcs bucket: gone"
        );

        let err = Error::Config("missing bucket".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing bucket");
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_source_is_preserved() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let err = ErrorCode::new(Provider::S3, Operation::PutObject).internal(io);
        let source = err.source().expect("source");
        assert_eq!(source.to_string(), "timed out");
    }
}
