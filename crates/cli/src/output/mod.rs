//! Output formatting for the CLI

mod formatter;

pub use formatter::Formatter;

/// Output settings shared by every command
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Emit JSON instead of human-readable text
    pub json: bool,
    pub no_color: bool,
    /// Suppress non-error output
    pub quiet: bool,
}
