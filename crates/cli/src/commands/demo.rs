//! demo command - walk a backend through every operation
//!
//! Stores a sample object, fetches it, lists its prefix, copies it, then
//! deletes both objects and confirms they are gone.

use anyhow::bail;
use gos_core::{Context, Error, StorageBackend};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

const SAMPLE_PATH: &str = "test/hello.txt";
const COPY_PATH: &str = "test/hello-copy.txt";
const SAMPLE_PREFIX: &str = "test/";
const SAMPLE_CONTENT: &[u8] = b"Hello, World! This is a test file.";

#[derive(Debug, Serialize)]
struct Step {
    step: &'static str,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DemoOutput {
    backend: &'static str,
    steps: Vec<Step>,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Step results, printed as they happen or collected for JSON
struct Report<'a> {
    formatter: &'a Formatter,
    steps: Vec<Step>,
}

impl Report<'_> {
    fn record(&mut self, step: &'static str, detail: String) {
        self.formatter.success(&format!("{step}: {detail}"));
        self.steps.push(Step { step, detail });
    }
}

/// Execute the demo command
pub async fn execute(
    ctx: &Context,
    backend: &dyn StorageBackend,
    formatter: &Formatter,
) -> ExitCode {
    formatter.heading(&format!("=== {} storage operations ===", backend.name()));

    let mut report = Report {
        formatter,
        steps: Vec::new(),
    };
    let result = walkthrough(ctx, backend, &mut report).await;

    let exit = match &result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            formatter.error(&format!("Demo failed: {e:#}"));
            e.downcast_ref::<Error>()
                .map(ExitCode::from_error)
                .unwrap_or(ExitCode::GeneralError)
        }
    };

    if formatter.is_json() {
        formatter.json(&DemoOutput {
            backend: backend.name(),
            steps: report.steps,
            success: result.is_ok(),
            error: result.err().map(|e| format!("{e:#}")),
        });
    } else if exit == ExitCode::Success {
        formatter.heading("=== operations complete ===");
    }
    exit
}

async fn walkthrough(
    ctx: &Context,
    backend: &dyn StorageBackend,
    report: &mut Report<'_>,
) -> anyhow::Result<()> {
    backend.put_object(ctx, SAMPLE_PATH, SAMPLE_CONTENT).await?;
    report.record("put", format!("stored {SAMPLE_PATH}"));

    let object = backend.get_object(ctx, SAMPLE_PATH).await?;
    if object.content != SAMPLE_CONTENT {
        bail!("{SAMPLE_PATH} came back with different content");
    }
    let modified = object
        .last_modified
        .map(|t| t.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    report.record(
        "get",
        format!(
            "{} (last modified {modified})",
            String::from_utf8_lossy(&object.content)
        ),
    );

    let objects = backend
        .get_objects(ctx, SAMPLE_PREFIX)
        .await
        .map_err(Error::from)?;
    let paths: Vec<&str> = objects.iter().map(|o| o.path.as_str()).collect();
    report.record(
        "list",
        format!(
            "{} object(s) under {SAMPLE_PREFIX}: {}",
            paths.len(),
            paths.join(", ")
        ),
    );

    backend.copy_object(ctx, SAMPLE_PATH, COPY_PATH).await?;
    let copy = backend.get_object(ctx, COPY_PATH).await?;
    report.record(
        "copy",
        format!("{SAMPLE_PATH} -> {COPY_PATH} ({} bytes)", copy.size()),
    );

    for path in [SAMPLE_PATH, COPY_PATH] {
        backend.delete_object(ctx, path).await?;
        match backend.get_object(ctx, path).await {
            Err(e) if e.is_not_found() => report.record("delete", format!("removed {path}")),
            Err(e) => return Err(e.into()),
            Ok(_) => bail!("{path} is still readable after delete"),
        }
    }

    Ok(())
}
