//! Command line definition and backend resolution

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use gos_core::{BackendConfig, Error, Result};

use crate::commands::object::{CpArgs, GetArgs, LsArgs, PutArgs, RmArgs};
use crate::output::OutputConfig;

/// gos - one interface for Amazon S3 and Google Cloud Storage
#[derive(Parser, Debug)]
#[command(name = "gos", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Abort provider calls after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            json: self.json,
            no_color: self.no_color,
            quiet: self.quiet,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch an object
    Get(GetArgs),

    /// List objects under a prefix
    Ls(LsArgs),

    /// Store a local file (or stdin) as an object
    Put(PutArgs),

    /// Delete an object
    Rm(RmArgs),

    /// Copy an object within the bucket
    Cp(CpArgs),

    /// Store, fetch, list, copy and delete a sample object
    Demo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageType {
    S3,
    Gcs,
}

impl StorageType {
    fn as_str(self) -> &'static str {
        match self {
            StorageType::S3 => "s3",
            StorageType::Gcs => "gcs",
        }
    }

    fn matches(self, config: &BackendConfig) -> bool {
        matches!(
            (self, config),
            (StorageType::S3, BackendConfig::S3(_)) | (StorageType::Gcs, BackendConfig::Gcs(_))
        )
    }
}

/// Flags selecting and configuring the backend
#[derive(Args, Debug, Default)]
pub struct BackendArgs {
    /// Backend config file (TOML)
    #[arg(long, global = true, value_name = "FILE", env = "GOS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Storage provider
    #[arg(long = "type", global = true, value_enum)]
    pub storage_type: Option<StorageType>,

    #[arg(long, global = true)]
    pub bucket: Option<String>,

    /// Key prefix every path is relative to
    #[arg(long, global = true)]
    pub prefix: Option<String>,

    /// AWS region (S3 only)
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// S3-compatible endpoint URL (S3 only)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Use plain HTTP (S3 only)
    #[arg(long, global = true)]
    pub disable_ssl: bool,
}

impl BackendArgs {
    /// Resolve the backend configuration
    ///
    /// Sources in order: `--config`, `--type` or `STORAGE_TYPE` (flags
    /// layered over the environment), then the default config file. Flags
    /// always win over file values.
    pub fn resolve<F>(&self, lookup: F) -> Result<BackendConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = &self.config {
            return self.load_file(path);
        }

        let overlay = |key: &str| self.flag_value(key).or_else(|| lookup(key));
        if overlay("STORAGE_TYPE").is_some_and(|v| !v.is_empty()) {
            return BackendConfig::from_env_with(overlay);
        }

        match BackendConfig::default_path().filter(|p| p.exists()) {
            Some(path) => self.load_file(&path),
            None => Err(Error::Config(
                "No backend configured: pass --config or --type, or set STORAGE_TYPE".to_string(),
            )),
        }
    }

    fn load_file(&self, path: &std::path::Path) -> Result<BackendConfig> {
        let mut config = BackendConfig::load(path)?;
        if let Some(kind) = self.storage_type
            && !kind.matches(&config)
        {
            return Err(Error::Config(format!(
                "--type {} conflicts with the backend in {}",
                kind.as_str(),
                path.display()
            )));
        }
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Flag value standing in for an environment variable
    fn flag_value(&self, key: &str) -> Option<String> {
        match key {
            "STORAGE_TYPE" => self.storage_type.map(|t| t.as_str().to_string()),
            "S3_BUCKET" | "GCS_BUCKET" => self.bucket.clone(),
            "S3_PREFIX" | "GCS_PREFIX" => self.prefix.clone(),
            "AWS_REGION" => self.region.clone(),
            "S3_ENDPOINT" => self.endpoint.clone(),
            "S3_DISABLE_SSL" => self.disable_ssl.then(|| "true".to_string()),
            _ => None,
        }
    }

    fn apply_overrides(&self, config: &mut BackendConfig) {
        match config {
            BackendConfig::S3(c) => {
                if let Some(bucket) = &self.bucket {
                    c.bucket = bucket.clone();
                }
                if let Some(prefix) = &self.prefix {
                    c.prefix = prefix.clone();
                }
                if let Some(region) = &self.region {
                    c.region = region.clone();
                }
                if let Some(endpoint) = &self.endpoint {
                    c.endpoint = Some(endpoint.clone());
                }
                if self.disable_ssl {
                    c.disable_ssl = true;
                }
            }
            BackendConfig::Gcs(c) => {
                if let Some(bucket) = &self.bucket {
                    c.bucket = bucket.clone();
                }
                if let Some(prefix) = &self.prefix {
                    c.prefix = prefix.clone();
                }
                if self.region.is_some() || self.endpoint.is_some() || self.disable_ssl {
                    tracing::warn!("--region, --endpoint and --disable-ssl are ignored for gcs");
                }
            }
        }
    }
}
