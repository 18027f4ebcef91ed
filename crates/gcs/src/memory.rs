//! In-memory Cloud Storage double used by the backend tests

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use jiff::Timestamp;

use crate::api::{GcsApi, GcsApiError, ObjectAttrs, ObjectPage};

/// Default `maxResults` of the objects.list API
const PAGE_SIZE: usize = 1000;

pub(crate) struct MemoryGcs {
    objects: Mutex<BTreeMap<String, (Vec<u8>, Timestamp)>>,
    list_calls: AtomicUsize,
}

impl MemoryGcs {
    pub(crate) fn new() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            list_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GcsApi for MemoryGcs {
    async fn object_attrs(&self, name: &str) -> Result<ObjectAttrs, GcsApiError> {
        let objects = self.objects.lock().unwrap();
        let (_, updated) = objects.get(name).ok_or(GcsApiError::ObjectNotExist)?;
        Ok(ObjectAttrs {
            name: name.to_string(),
            updated: Some(*updated),
        })
    }

    async fn read_object(&self, name: &str) -> Result<Vec<u8>, GcsApiError> {
        let objects = self.objects.lock().unwrap();
        let (content, _) = objects.get(name).ok_or(GcsApiError::ObjectNotExist)?;
        Ok(content.clone())
    }

    async fn list_objects(
        &self,
        prefix: &str,
        page_token: Option<String>,
    ) -> Result<ObjectPage, GcsApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        // The page token is the last name of the previous page
        let objects = self.objects.lock().unwrap();
        let mut matching = objects
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .filter(|(name, _)| page_token.as_deref().is_none_or(|t| name.as_str() > t));

        let items: Vec<ObjectAttrs> = matching
            .by_ref()
            .take(PAGE_SIZE)
            .map(|(name, (_, updated))| ObjectAttrs {
                name: name.clone(),
                updated: Some(*updated),
            })
            .collect();

        let next_page_token = match matching.next() {
            Some(_) => items.last().map(|attrs| attrs.name.clone()),
            None => None,
        };

        Ok(ObjectPage {
            items,
            next_page_token,
        })
    }

    async fn write_object(&self, name: &str, content: Vec<u8>) -> Result<(), GcsApiError> {
        self.objects
            .lock()
            .unwrap()
            .insert(name.to_string(), (content, Timestamp::now()));
        Ok(())
    }

    async fn delete_object(&self, name: &str) -> Result<(), GcsApiError> {
        self.objects
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or(GcsApiError::ObjectNotExist)
    }

    async fn copy_object(&self, src: &str, dst: &str) -> Result<(), GcsApiError> {
        let mut objects = self.objects.lock().unwrap();
        let (content, _) = objects
            .get(src)
            .cloned()
            .ok_or(GcsApiError::ObjectNotExist)?;
        objects.insert(dst.to_string(), (content, Timestamp::now()));
        Ok(())
    }
}
