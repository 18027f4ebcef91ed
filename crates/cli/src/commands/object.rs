//! Object commands: get, ls, put, rm, cp

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Args;
use gos_core::{Context, Object, StorageBackend};
use jiff::Timestamp;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Object path, relative to the configured prefix
    pub path: String,

    /// Write the content to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct LsArgs {
    /// Prefix to list, relative to the configured prefix
    #[arg(default_value = "")]
    pub prefix: String,
}

#[derive(Args, Debug)]
pub struct PutArgs {
    /// Object path, relative to the configured prefix
    pub path: String,

    /// Local file to upload, or `-` for stdin
    pub file: String,
}

#[derive(Args, Debug)]
pub struct RmArgs {
    /// Object path, relative to the configured prefix
    pub path: String,
}

#[derive(Args, Debug)]
pub struct CpArgs {
    /// Source object path
    pub src: String,

    /// Destination object path
    pub dst: String,
}

#[derive(Debug, Serialize)]
struct GetOutput {
    path: String,
    size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<String>,
}

#[derive(Debug, Serialize)]
struct ListEntry {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
struct ListOutput {
    prefix: String,
    objects: Vec<ListEntry>,
    count: usize,
    complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ActionOutput<'a> {
    action: &'a str,
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    destination: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<usize>,
}

pub async fn get(
    ctx: &Context,
    backend: &dyn StorageBackend,
    args: GetArgs,
    formatter: &Formatter,
) -> ExitCode {
    let object = match backend.get_object(ctx, &args.path).await {
        Ok(object) => object,
        Err(e) => {
            formatter.error(&format!("Failed to get '{}': {e}", args.path));
            return ExitCode::from_error(&e);
        }
    };

    if let Some(file) = &args.output {
        if let Err(e) = std::fs::write(file, &object.content) {
            formatter.error(&format!("Failed to write {}: {e}", file.display()));
            return ExitCode::GeneralError;
        }
        if formatter.is_json() {
            formatter.json(&get_output(&object, None, Some(file)));
        } else {
            formatter.success(&format!(
                "Saved {} to {} ({} bytes)",
                formatter.style_path(&object.path),
                file.display(),
                object.size()
            ));
        }
        return ExitCode::Success;
    }

    if formatter.is_json() {
        let content = String::from_utf8_lossy(&object.content).into_owned();
        formatter.json(&get_output(&object, Some(content), None));
        return ExitCode::Success;
    }

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = stdout
        .write_all(&object.content)
        .and_then(|()| stdout.flush())
    {
        formatter.error(&format!("Failed to write to stdout: {e}"));
        return ExitCode::GeneralError;
    }
    ExitCode::Success
}

fn get_output(object: &Object, content: Option<String>, file: Option<&Path>) -> GetOutput {
    GetOutput {
        path: object.path.clone(),
        size: object.size(),
        last_modified: object.last_modified,
        content,
        saved_to: file.map(|f| f.display().to_string()),
    }
}

pub async fn ls(
    ctx: &Context,
    backend: &dyn StorageBackend,
    args: LsArgs,
    formatter: &Formatter,
) -> ExitCode {
    let (objects, failure) = match backend.get_objects(ctx, &args.prefix).await {
        Ok(objects) => (objects, None),
        Err(e) => (e.partial, Some(e.error)),
    };

    if formatter.is_json() {
        formatter.json(&ListOutput {
            prefix: args.prefix.clone(),
            count: objects.len(),
            objects: objects
                .iter()
                .map(|o| ListEntry {
                    path: o.path.clone(),
                    last_modified: o.last_modified,
                })
                .collect(),
            complete: failure.is_none(),
            error: failure.as_ref().map(ToString::to_string),
        });
    } else {
        for object in &objects {
            let date = object
                .last_modified
                .map(|t| t.strftime("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());
            formatter.println(&format!(
                "{}  {}",
                formatter.style_date(&format!("{date:<19}")),
                formatter.style_path(&object.path)
            ));
        }
    }

    match failure {
        None => ExitCode::Success,
        Some(e) => {
            if !formatter.is_json() {
                formatter.warning(&format!(
                    "Listing stopped early, {} objects shown",
                    objects.len()
                ));
            }
            formatter.error(&format!("Failed to list '{}': {e}", args.prefix));
            ExitCode::from_error(&e)
        }
    }
}

pub async fn put(
    ctx: &Context,
    backend: &dyn StorageBackend,
    args: PutArgs,
    formatter: &Formatter,
) -> ExitCode {
    let content = match read_input(&args.file) {
        Ok(content) => content,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            return ExitCode::UsageError;
        }
    };

    match backend.put_object(ctx, &args.path, &content).await {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&ActionOutput {
                    action: "put",
                    path: &args.path,
                    destination: None,
                    size: Some(content.len()),
                });
            } else {
                formatter.success(&format!(
                    "Stored {} ({})",
                    formatter.style_path(&args.path),
                    formatter.style_size(&format!("{} bytes", content.len()))
                ));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to put '{}': {e}", args.path));
            ExitCode::from_error(&e)
        }
    }
}

/// Read upload content from a file, or stdin for `-`
fn read_input(source: &str) -> anyhow::Result<Vec<u8>> {
    if source == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read(source).with_context(|| format!("Failed to read {source}"))
}

pub async fn rm(
    ctx: &Context,
    backend: &dyn StorageBackend,
    args: RmArgs,
    formatter: &Formatter,
) -> ExitCode {
    match backend.delete_object(ctx, &args.path).await {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&ActionOutput {
                    action: "rm",
                    path: &args.path,
                    destination: None,
                    size: None,
                });
            } else {
                formatter.success(&format!("Removed {}", formatter.style_path(&args.path)));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to remove '{}': {e}", args.path));
            ExitCode::from_error(&e)
        }
    }
}

pub async fn cp(
    ctx: &Context,
    backend: &dyn StorageBackend,
    args: CpArgs,
    formatter: &Formatter,
) -> ExitCode {
    match backend.copy_object(ctx, &args.src, &args.dst).await {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&ActionOutput {
                    action: "cp",
                    path: &args.src,
                    destination: Some(&args.dst),
                    size: None,
                });
            } else {
                formatter.success(&format!(
                    "Copied {} to {}",
                    formatter.style_path(&args.src),
                    formatter.style_path(&args.dst)
                ));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!(
                "Failed to copy '{}' to '{}': {e}",
                args.src, args.dst
            ));
            ExitCode::from_error(&e)
        }
    }
}
