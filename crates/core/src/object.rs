//! Object model shared by every storage backend

use jiff::Timestamp;

/// Additional information about an object
///
/// Not populated by the bundled adapters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub name: String,
    pub version: String,
}

/// A storage object with its path, content and modification time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Object {
    /// Metadata (unused extension point)
    pub meta: Metadata,

    /// Path relative to the backend's configured prefix
    pub path: String,

    /// Raw content, empty for objects returned by a listing
    pub content: Vec<u8>,

    /// Last modification time as reported by the provider
    pub last_modified: Option<Timestamp>,
}

impl Object {
    /// Create a listing entry (metadata only, no content)
    pub fn entry(path: impl Into<String>, last_modified: Option<Timestamp>) -> Self {
        Self {
            meta: Metadata::default(),
            path: path.into(),
            content: Vec::new(),
            last_modified,
        }
    }

    /// Create an object carrying its content
    pub fn with_content(
        path: impl Into<String>,
        content: Vec<u8>,
        last_modified: Option<Timestamp>,
    ) -> Self {
        Self {
            meta: Metadata::default(),
            path: path.into(),
            content,
            last_modified,
        }
    }

    /// Content size in bytes
    pub fn size(&self) -> usize {
        self.content.len()
    }
}
