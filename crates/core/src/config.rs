//! Backend configuration
//!
//! A backend is described either by a TOML file or by environment
//! variables. The file form looks like:
//!
//! ```toml
//! type = "s3"
//! bucket = "my-bucket"
//! prefix = "data"
//! region = "eu-west-1"
//! endpoint = "http://localhost:9000"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Region used when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

/// Connection settings for an S3 or S3-compatible store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket: String,

    #[serde(default)]
    pub prefix: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint for S3-compatible services (path-style addressing)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub disable_ssl: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl S3Config {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: String::new(),
            region: default_region(),
            endpoint: None,
            disable_ssl: false,
            access_key: None,
            secret_key: None,
            session_token: None,
        }
    }

    /// Static credentials, when both keys are configured
    pub fn static_credentials(&self) -> Option<(&str, &str, Option<&str>)> {
        match (self.access_key.as_deref(), self.secret_key.as_deref()) {
            (Some(access), Some(secret)) if !access.is_empty() && !secret.is_empty() => {
                Some((access, secret, self.session_token.as_deref()))
            }
            _ => None,
        }
    }
}

/// Connection settings for Google Cloud Storage
///
/// Credentials always come from Application Default Credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcsConfig {
    pub bucket: String,

    #[serde(default)]
    pub prefix: String,
}

/// Which backend to build and how to reach it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    S3(S3Config),
    Gcs(GcsConfig),
}

impl BackendConfig {
    pub fn bucket(&self) -> &str {
        match self {
            BackendConfig::S3(c) => &c.bucket,
            BackendConfig::Gcs(c) => &c.bucket,
        }
    }

    pub fn prefix(&self) -> &str {
        match self {
            BackendConfig::S3(c) => &c.prefix,
            BackendConfig::Gcs(c) => &c.prefix,
        }
    }

    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "Loaded backend config");
        Self::from_toml(&content)
    }

    /// Default config file location (`<config dir>/gos/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gos").join("config.toml"))
    }

    /// Build a config from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup
    ///
    /// `STORAGE_TYPE` selects the backend (`s3` or `gcs`). S3 reads
    /// `S3_BUCKET`, `S3_PREFIX`, `S3_ENDPOINT`, `S3_DISABLE_SSL`, `AWS_REGION`,
    /// `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and `AWS_SESSION_TOKEN`;
    /// GCS reads `GCS_BUCKET` and `GCS_PREFIX`.
    pub fn from_env_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let storage_type = var("STORAGE_TYPE").ok_or_else(|| {
            Error::Config("STORAGE_TYPE must be set to 's3' or 'gcs'".to_string())
        })?;

        let config = match storage_type.to_lowercase().as_str() {
            "s3" => {
                let bucket = var("S3_BUCKET").ok_or_else(|| {
                    Error::Config("S3_BUCKET environment variable is required".to_string())
                })?;
                let disable_ssl = match var("S3_DISABLE_SSL") {
                    Some(v) => parse_bool(&v)?,
                    None => false,
                };
                BackendConfig::S3(S3Config {
                    bucket,
                    prefix: var("S3_PREFIX").unwrap_or_default(),
                    region: var("AWS_REGION").unwrap_or_else(default_region),
                    endpoint: var("S3_ENDPOINT"),
                    disable_ssl,
                    access_key: var("AWS_ACCESS_KEY_ID"),
                    secret_key: var("AWS_SECRET_ACCESS_KEY"),
                    session_token: var("AWS_SESSION_TOKEN"),
                })
            }
            "gcs" => {
                let bucket = var("GCS_BUCKET").ok_or_else(|| {
                    Error::Config("GCS_BUCKET environment variable is required".to_string())
                })?;
                BackendConfig::Gcs(GcsConfig {
                    bucket,
                    prefix: var("GCS_PREFIX").unwrap_or_default(),
                })
            }
            other => {
                return Err(Error::Config(format!(
                    "Unsupported storage type '{other}', expected 's3' or 'gcs'"
                )));
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Check required fields
    pub fn validate(&self) -> Result<()> {
        if self.bucket().trim().is_empty() {
            return Err(Error::Config("Bucket name cannot be empty".to_string()));
        }
        if let BackendConfig::S3(c) = self {
            if c.region.is_empty() {
                return Err(Error::Config("Region cannot be empty".to_string()));
            }
            if c.access_key.is_some() != c.secret_key.is_some() {
                return Err(Error::Config(
                    "Access key and secret key must be set together".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("Invalid boolean value: {value}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_s3_from_env_defaults() {
        let config =
            BackendConfig::from_env_with(env(&[("STORAGE_TYPE", "s3"), ("S3_BUCKET", "b")]))
                .unwrap();
        assert_eq!(config, BackendConfig::S3(S3Config::new("b")));
    }

    #[test]
    fn test_s3_from_env_full() {
        let config = BackendConfig::from_env_with(env(&[
            ("STORAGE_TYPE", "S3"),
            ("S3_BUCKET", "b"),
            ("S3_PREFIX", "/data/"),
            ("S3_ENDPOINT", "http://localhost:9000"),
            ("S3_DISABLE_SSL", "true"),
            ("AWS_REGION", "eu-west-1"),
            ("AWS_ACCESS_KEY_ID", "ak"),
            ("AWS_SECRET_ACCESS_KEY", "sk"),
        ]))
        .unwrap();

        let BackendConfig::S3(c) = config else {
            panic!("expected s3 config");
        };
        assert_eq!(c.prefix, "/data/");
        assert_eq!(c.region, "eu-west-1");
        assert_eq!(c.endpoint.as_deref(), Some("http://localhost:9000"));
        assert!(c.disable_ssl);
        assert_eq!(c.static_credentials(), Some(("ak", "sk", None)));
    }

    #[test]
    fn test_gcs_from_env() {
        let config = BackendConfig::from_env_with(env(&[
            ("STORAGE_TYPE", "gcs"),
            ("GCS_BUCKET", "g"),
            ("GCS_PREFIX", "p"),
        ]))
        .unwrap();
        assert_eq!(config.bucket(), "g");
        assert_eq!(config.prefix(), "p");
    }

    #[test]
    fn test_from_env_errors() {
        assert!(matches!(
            BackendConfig::from_env_with(env(&[])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            BackendConfig::from_env_with(env(&[("STORAGE_TYPE", "azure")])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            BackendConfig::from_env_with(env(&[("STORAGE_TYPE", "gcs")])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            BackendConfig::from_env_with(env(&[
                ("STORAGE_TYPE", "s3"),
                ("S3_BUCKET", "b"),
                ("S3_DISABLE_SSL", "maybe"),
            ])),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_from_toml() {
        let config = BackendConfig::from_toml(
            r#"
type = "s3"
bucket = "my-bucket"
prefix = "data"
endpoint = "http://localhost:9000"
"#,
        )
        .unwrap();

        let BackendConfig::S3(c) = config else {
            panic!("expected s3 config");
        };
        assert_eq!(c.bucket, "my-bucket");
        assert_eq!(c.region, DEFAULT_REGION);
        assert!(!c.disable_ssl);
    }

    #[test]
    fn test_from_toml_rejects_half_credentials() {
        let result = BackendConfig::from_toml(
            r#"
type = "s3"
bucket = "b"
access_key = "ak"
"#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_file_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let config = BackendConfig::Gcs(GcsConfig {
            bucket: "g".to_string(),
            prefix: "p".to_string(),
        });
        std::fs::write(&path, toml::to_string(&config).unwrap()).unwrap();

        assert_eq!(BackendConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = BackendConfig::load(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
