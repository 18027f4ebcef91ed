//! In-memory backend for command tests

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use gos_core::{
    Context, ErrorCode, ListError, ListResult, Object, Operation, Provider, Result,
    StorageBackend, path,
};
use jiff::Timestamp;

const fn error_code(operation: Operation) -> ErrorCode {
    ErrorCode::new(Provider::Gcs, operation)
}

/// Backend keeping objects in a map, with optional injected listing failure
#[derive(Default)]
pub(crate) struct MemoryBackend {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    fail_listing_after: Option<usize>,
}

impl MemoryBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Listing fails after returning `n` entries
    pub(crate) fn failing_listing_after(n: usize) -> Self {
        Self {
            fail_listing_after: Some(n),
            ..Self::default()
        }
    }

    pub(crate) fn insert(&self, path: &str, content: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_vec());
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_object(&self, _ctx: &Context, path: &str) -> Result<Object> {
        let objects = self.objects.lock().unwrap();
        match objects.get(path) {
            Some(content) => Ok(Object::with_content(
                path,
                content.clone(),
                Some(Timestamp::UNIX_EPOCH),
            )),
            None => Err(error_code(Operation::GetObject).not_found(format!("{path} not found"))),
        }
    }

    async fn get_objects(&self, _ctx: &Context, prefix: &str) -> ListResult {
        let prefix = path::clean_prefix(prefix);
        let objects = self.objects.lock().unwrap();
        let mut listed = Vec::new();
        for key in objects.keys().filter(|k| k.starts_with(&prefix)) {
            if self.fail_listing_after == Some(listed.len()) {
                return Err(ListError::new(
                    listed,
                    error_code(Operation::GetObjects).internal("listing interrupted"),
                ));
            }
            listed.push(Object::entry(
                path::strip_prefix(&prefix, key),
                Some(Timestamp::UNIX_EPOCH),
            ));
        }
        Ok(listed)
    }

    async fn put_object(&self, _ctx: &Context, path: &str, content: &[u8]) -> Result<()> {
        self.insert(path, content);
        Ok(())
    }

    async fn delete_object(&self, _ctx: &Context, path: &str) -> Result<()> {
        match self.objects.lock().unwrap().remove(path) {
            Some(_) => Ok(()),
            None => Err(error_code(Operation::DeleteObject).not_found(format!("{path} not found"))),
        }
    }

    async fn copy_object(&self, _ctx: &Context, src_path: &str, dst_path: &str) -> Result<()> {
        let mut objects = self.objects.lock().unwrap();
        let content = objects.get(src_path).cloned().ok_or_else(|| {
            error_code(Operation::CopyObject).not_found(format!("{src_path} not found"))
        })?;
        objects.insert(dst_path.to_string(), content);
        Ok(())
    }
}
