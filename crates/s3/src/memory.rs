//! In-memory S3 double used by the backend tests
//!
//! Mirrors the service behaviors the backend depends on: ordered ListObjects
//! pages with a marker, `NoSuchKey` errors, silent deletes of missing keys.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use jiff::Timestamp;

use crate::api::{FetchedObject, ObjectEntry, ObjectPage, S3Api, S3ApiError};

/// Keys returned per ListObjects page by S3
const PAGE_SIZE: usize = 1000;

pub(crate) struct MemoryS3 {
    bucket: String,
    objects: Mutex<BTreeMap<String, (Vec<u8>, Timestamp)>>,
    list_calls: AtomicUsize,
}

impl MemoryS3 {
    pub(crate) fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            objects: Mutex::new(BTreeMap::new()),
            list_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn check_bucket(&self, bucket: &str) -> Result<(), S3ApiError> {
        if bucket == self.bucket {
            Ok(())
        } else {
            Err(S3ApiError::service(
                "NoSuchBucket",
                404,
                "NoSuchBucket: The specified bucket does not exist",
            ))
        }
    }
}

fn no_such_key() -> S3ApiError {
    S3ApiError::service("NoSuchKey", 404, "NoSuchKey: The specified key does not exist.")
}

#[async_trait]
impl S3Api for MemoryS3 {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        marker: Option<String>,
    ) -> Result<ObjectPage, S3ApiError> {
        self.check_bucket(bucket)?;
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let objects = self.objects.lock().unwrap();
        let mut matching = objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .filter(|(key, _)| marker.as_deref().is_none_or(|m| key.as_str() > m));

        let entries: Vec<ObjectEntry> = matching
            .by_ref()
            .take(PAGE_SIZE)
            .map(|(key, (_, modified))| ObjectEntry {
                key: key.clone(),
                last_modified: Some(*modified),
            })
            .collect();
        let is_truncated = matching.next().is_some();

        Ok(ObjectPage {
            entries,
            is_truncated,
            next_marker: None,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<FetchedObject, S3ApiError> {
        self.check_bucket(bucket)?;
        let objects = self.objects.lock().unwrap();
        let (content, modified) = objects.get(key).ok_or_else(no_such_key)?;
        Ok(FetchedObject {
            body: ByteStream::from(content.clone()),
            last_modified: Some(*modified),
        })
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), S3ApiError> {
        self.check_bucket(bucket)?;
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (body, Timestamp::now()));
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), S3ApiError> {
        self.check_bucket(bucket)?;
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn copy_object(
        &self,
        bucket: &str,
        copy_source: &str,
        key: &str,
    ) -> Result<(), S3ApiError> {
        self.check_bucket(bucket)?;
        let source = urlencoding::decode(copy_source)
            .map_err(|e| S3ApiError::service("InvalidArgument", 400, e.to_string()))?;
        let (source_bucket, source_key) = source
            .split_once('/')
            .ok_or_else(|| S3ApiError::service("InvalidArgument", 400, "bad copy source"))?;
        self.check_bucket(source_bucket)?;

        let mut objects = self.objects.lock().unwrap();
        let (content, _) = objects.get(source_key).cloned().ok_or_else(no_such_key)?;
        objects.insert(key.to_string(), (content, Timestamp::now()));
        Ok(())
    }
}
