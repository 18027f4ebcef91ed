//! Cloud Storage client implementation
//!
//! Wraps google-cloud-storage and implements the [`GcsApi`] capability for
//! a single bucket.

use async_trait::async_trait;
use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::Error as HttpError;
use google_cloud_storage::http::objects::Object;
use google_cloud_storage::http::objects::copy::CopyObjectRequest;
use google_cloud_storage::http::objects::delete::DeleteObjectRequest;
use google_cloud_storage::http::objects::download::Range;
use google_cloud_storage::http::objects::get::GetObjectRequest;
use google_cloud_storage::http::objects::list::ListObjectsRequest;
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};
use gos_core::{ErrorCode, Operation, Provider, Result};
use jiff::Timestamp;

use crate::api::{GcsApi, GcsApiError, ObjectAttrs, ObjectPage};

const INIT_CLIENT: ErrorCode = ErrorCode::new(Provider::Gcs, Operation::InitClient);

/// Cloud Storage capability for one bucket
pub struct BucketHandle {
    client: Client,
    bucket: String,
}

impl BucketHandle {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client from Application Default Credentials
    pub async fn connect(bucket: impl Into<String>) -> Result<Self> {
        let config = ClientConfig::default()
            .with_auth()
            .await
            .map_err(|e| INIT_CLIENT.internal(e.to_string()))?;
        Ok(Self::new(Client::new(config), bucket))
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn get_request(&self, name: &str) -> GetObjectRequest {
        GetObjectRequest {
            bucket: self.bucket.clone(),
            object: name.to_string(),
            ..Default::default()
        }
    }
}

fn attrs(object: Object) -> ObjectAttrs {
    let updated = object
        .updated
        .and_then(|t| Timestamp::new(t.unix_timestamp(), t.nanosecond() as i32).ok());
    ObjectAttrs {
        name: object.name,
        updated,
    }
}

/// Which sentinel a 404 maps to depends on what the request addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// A single existing object: 404 means the object does not exist
    Object,
    /// The bucket (listing, upload): 404 means the bucket is missing
    Bucket,
}

fn status_of(err: &HttpError) -> Option<u16> {
    match err {
        HttpError::Response(response) => Some(response.code as u16),
        HttpError::HttpClient(http_err) => http_err.status().map(|s| s.as_u16()),
        _ => None,
    }
}

fn api_error(scope: Scope, status: Option<u16>, message: String) -> GcsApiError {
    match (scope, status) {
        (Scope::Object, Some(404)) => GcsApiError::ObjectNotExist,
        _ => GcsApiError::Request { status, message },
    }
}

fn object_error(err: HttpError) -> GcsApiError {
    api_error(Scope::Object, status_of(&err), err.to_string())
}

fn bucket_error(err: HttpError) -> GcsApiError {
    api_error(Scope::Bucket, status_of(&err), err.to_string())
}

#[async_trait]
impl GcsApi for BucketHandle {
    async fn object_attrs(&self, name: &str) -> std::result::Result<ObjectAttrs, GcsApiError> {
        let object = self
            .client
            .get_object(&self.get_request(name))
            .await
            .map_err(object_error)?;
        Ok(attrs(object))
    }

    async fn read_object(&self, name: &str) -> std::result::Result<Vec<u8>, GcsApiError> {
        let data = self
            .client
            .download_object(&self.get_request(name), &Range::default())
            .await
            .map_err(object_error)?;
        Ok(data)
    }

    async fn list_objects(
        &self,
        prefix: &str,
        page_token: Option<String>,
    ) -> std::result::Result<ObjectPage, GcsApiError> {
        let request = ListObjectsRequest {
            bucket: self.bucket.clone(),
            prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
            page_token,
            ..Default::default()
        };
        let response = self
            .client
            .list_objects(&request)
            .await
            .map_err(bucket_error)?;

        Ok(ObjectPage {
            items: response
                .items
                .unwrap_or_default()
                .into_iter()
                .map(attrs)
                .collect(),
            next_page_token: response.next_page_token,
        })
    }

    async fn write_object(
        &self,
        name: &str,
        content: Vec<u8>,
    ) -> std::result::Result<(), GcsApiError> {
        let upload_type = UploadType::Simple(Media::new(name.to_string()));
        let request = UploadObjectRequest {
            bucket: self.bucket.clone(),
            ..Default::default()
        };
        self.client
            .upload_object(&request, content, &upload_type)
            .await
            .map_err(bucket_error)?;
        Ok(())
    }

    async fn delete_object(&self, name: &str) -> std::result::Result<(), GcsApiError> {
        let request = DeleteObjectRequest {
            bucket: self.bucket.clone(),
            object: name.to_string(),
            ..Default::default()
        };
        self.client
            .delete_object(&request)
            .await
            .map_err(object_error)?;
        Ok(())
    }

    async fn copy_object(&self, src: &str, dst: &str) -> std::result::Result<(), GcsApiError> {
        let request = CopyObjectRequest {
            source_bucket: self.bucket.clone(),
            source_object: src.to_string(),
            destination_bucket: self.bucket.clone(),
            destination_object: dst.to_string(),
            ..Default::default()
        };
        self.client
            .copy_object(&request)
            .await
            .map_err(object_error)?;
        Ok(())
    }
}
