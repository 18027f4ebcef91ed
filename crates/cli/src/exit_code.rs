//! Process exit codes
//!
//! Scripts can rely on these values staying stable.

use gos_core::Error;

/// Exit status of a `gos` invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    /// Bad arguments or configuration
    UsageError = 2,
    NotFound = 5,
}

impl ExitCode {
    /// Map a storage error to the exit code reported for it
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::NotFound { .. } => ExitCode::NotFound,
            Error::Config(_) => ExitCode::UsageError,
            Error::Internal { .. } => ExitCode::GeneralError,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}
