//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the [`S3Api`] capability.

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use aws_smithy_types::DateTime;
use gos_core::{ErrorCode, Operation, Provider, Result};
use jiff::Timestamp;

use crate::api::{FetchedObject, ObjectEntry, ObjectPage, S3Api, S3ApiError};

const INIT_CLIENT: ErrorCode = ErrorCode::new(Provider::S3, Operation::InitClient);

/// Build static credentials for an S3 client
pub fn static_credentials(
    access_key: impl Into<String>,
    secret_key: impl Into<String>,
    session_token: Option<String>,
) -> Credentials {
    Credentials::new(
        access_key,
        secret_key,
        session_token,
        None, // expiry
        "gos-static-credentials",
    )
}

/// Connection options for building an SDK client
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub region: String,
    pub endpoint: Option<String>,
    pub disable_ssl: bool,
    pub credentials: Option<Credentials>,
}

/// S3 capability backed by the AWS SDK
#[derive(Debug, Clone)]
pub struct SdkS3Api {
    inner: aws_sdk_s3::Client,
}

impl SdkS3Api {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { inner: client }
    }

    /// Build an SDK client from connection options
    ///
    /// Without explicit credentials the default provider chain is used
    /// (environment, shared config, instance role). A custom endpoint
    /// forces path-style addressing.
    pub async fn connect(options: ClientOptions) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(options.region.clone()));

        if let Some(credentials) = options.credentials {
            loader = loader.credentials_provider(credentials);
        }

        let config = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&config);

        match options.endpoint.as_deref() {
            Some(endpoint) => {
                let url = endpoint_url(endpoint, options.disable_ssl)?;
                builder = builder.endpoint_url(url).force_path_style(true);
            }
            None if options.disable_ssl => {
                builder = builder.endpoint_url(format!("http://s3.{}.amazonaws.com", options.region));
            }
            None => {}
        }

        Ok(Self::new(aws_sdk_s3::Client::from_conf(builder.build())))
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }
}

/// Validate an endpoint, adding a scheme when none is given
fn endpoint_url(endpoint: &str, disable_ssl: bool) -> Result<String> {
    let endpoint = endpoint.trim().trim_end_matches('/');
    let endpoint = if endpoint.contains("://") {
        endpoint.to_string()
    } else if disable_ssl {
        format!("http://{endpoint}")
    } else {
        format!("https://{endpoint}")
    };

    let parsed = url::Url::parse(&endpoint)
        .map_err(|e| INIT_CLIENT.internal(format!("invalid endpoint '{endpoint}': {e}")))?;
    if parsed.host_str().is_none() {
        return Err(INIT_CLIENT.internal(format!("endpoint '{endpoint}' has no host")));
    }

    Ok(endpoint)
}

fn to_timestamp(dt: &DateTime) -> Option<Timestamp> {
    Timestamp::new(dt.secs(), dt.subsec_nanos() as i32).ok()
}

impl S3ApiError {
    /// Normalize an SDK error, keeping its service code and HTTP status
    fn from_sdk<E>(error: SdkError<E, HttpResponse>) -> Self
    where
        E: ProvideErrorMetadata + std::fmt::Display + std::fmt::Debug,
    {
        let code = error
            .as_service_error()
            .and_then(|e| e.code())
            .map(str::to_string);
        let status = error.raw_response().map(|r| r.status().as_u16());

        Self {
            code,
            status,
            message: format_sdk_error(&error),
        }
    }
}

/// Format AWS SDK error into a detailed error message
fn format_sdk_error<E>(error: &SdkError<E, HttpResponse>) -> String
where
    E: ProvideErrorMetadata + std::fmt::Display + std::fmt::Debug,
{
    match error {
        SdkError::ServiceError(service_err) => {
            let err = service_err.err();
            let status = service_err.raw().status().as_u16();
            let mut msg = format!("Service error: {err} (status: {status})");
            if let Some(code) = err.code() {
                msg.push_str(&format!(" (code: {code})"));
            }
            msg
        }
        SdkError::ConstructionFailure(err) => {
            format!("Request construction failed: {err:?}")
        }
        SdkError::TimeoutError(_) => "Request timeout".to_string(),
        SdkError::DispatchFailure(err) => {
            format!("Network dispatch error: {err:?}")
        }
        SdkError::ResponseError(err) => {
            format!("Response error: {err:?}")
        }
        _ => error.to_string(),
    }
}

#[async_trait]
impl S3Api for SdkS3Api {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        marker: Option<String>,
    ) -> std::result::Result<ObjectPage, S3ApiError> {
        let response = self
            .inner
            .list_objects()
            .bucket(bucket)
            .prefix(prefix)
            .set_marker(marker)
            .send()
            .await
            .map_err(S3ApiError::from_sdk)?;

        let entries = response
            .contents()
            .iter()
            .map(|object| ObjectEntry {
                key: object.key().unwrap_or_default().to_string(),
                last_modified: object.last_modified().and_then(to_timestamp),
            })
            .collect();

        Ok(ObjectPage {
            entries,
            is_truncated: response.is_truncated().unwrap_or(false),
            next_marker: response.next_marker().map(str::to_string),
        })
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> std::result::Result<FetchedObject, S3ApiError> {
        let response = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(S3ApiError::from_sdk)?;

        let last_modified = response.last_modified().and_then(to_timestamp);
        Ok(FetchedObject {
            body: response.body,
            last_modified,
        })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> std::result::Result<(), S3ApiError> {
        self.inner
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(S3ApiError::from_sdk)?;

        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> std::result::Result<(), S3ApiError> {
        self.inner
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(S3ApiError::from_sdk)?;

        Ok(())
    }

    async fn copy_object(
        &self,
        bucket: &str,
        copy_source: &str,
        key: &str,
    ) -> std::result::Result<(), S3ApiError> {
        self.inner
            .copy_object()
            .copy_source(copy_source)
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(S3ApiError::from_sdk)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_adds_scheme() {
        assert_eq!(
            endpoint_url("localhost:9000", true).unwrap(),
            "http://localhost:9000"
        );
        assert_eq!(
            endpoint_url("minio.internal:9000/", false).unwrap(),
            "https://minio.internal:9000"
        );
        assert_eq!(
            endpoint_url("http://127.0.0.1:9000", false).unwrap(),
            "http://127.0.0.1:9000"
        );
    }

    #[test]
    fn test_endpoint_url_rejects_garbage() {
        let err = endpoint_url("http://", false).unwrap_err();
        assert_eq!(err.code(), Some(INIT_CLIENT));
    }

    #[test]
    fn test_to_timestamp() {
        let dt = DateTime::from_secs(1_700_000_000);
        assert_eq!(
            to_timestamp(&dt),
            Some(Timestamp::from_second(1_700_000_000).unwrap())
        );
    }

    #[test]
    fn test_static_credentials() {
        let creds = static_credentials("ak", "sk", Some("token".to_string()));
        assert_eq!(creds.access_key_id(), "ak");
        assert_eq!(creds.secret_access_key(), "sk");
        assert_eq!(creds.session_token(), Some("token"));
    }
}
