//! Backend construction from a resolved configuration

use std::sync::Arc;

use gos_core::{BackendConfig, Context, Result, StorageBackend};
use gos_gcs::GcsBackend;
use gos_s3::{ClientOptions, S3Backend, SdkS3Api, static_credentials};

/// Connect to the backend described by `config`
pub async fn connect(ctx: &Context, config: &BackendConfig) -> Result<Box<dyn StorageBackend>> {
    match config {
        BackendConfig::S3(c) => {
            let credentials = c.static_credentials().map(|(access, secret, token)| {
                static_credentials(access, secret, token.map(str::to_string))
            });
            tracing::debug!(
                bucket = %c.bucket,
                region = %c.region,
                endpoint = ?c.endpoint,
                static_credentials = credentials.is_some(),
                "Connecting to s3"
            );
            let api = SdkS3Api::connect(ClientOptions {
                region: c.region.clone(),
                endpoint: c.endpoint.clone(),
                disable_ssl: c.disable_ssl,
                credentials,
            })
            .await?;
            Ok(Box::new(S3Backend::from_api(
                c.bucket.clone(),
                &c.prefix,
                Arc::new(api),
            )))
        }
        BackendConfig::Gcs(c) => {
            tracing::debug!(bucket = %c.bucket, "Connecting to gcs");
            let backend = GcsBackend::new(ctx, c.bucket.clone(), &c.prefix).await?;
            Ok(Box::new(backend))
        }
    }
}
