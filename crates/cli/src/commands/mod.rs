//! Command implementations
//!
//! Every command reports its own errors through the [`Formatter`] and
//! returns the exit code for the process.

pub mod demo;
pub mod object;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use gos_core::{Context, StorageBackend};

use crate::backend;
use crate::cli::{Cli, Commands};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Resolve the backend, connect and run the selected command
pub async fn execute(cli: Cli) -> ExitCode {
    let formatter = Formatter::new(cli.output_config());

    let config = match cli.backend.resolve(|key| std::env::var(key).ok()) {
        Ok(config) => config,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::UsageError;
        }
    };

    let mut ctx = Context::background();
    if let Some(secs) = cli.timeout {
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }
    let (ctx, cancel) = ctx.with_cancel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, canceling in-flight request");
            cancel.cancel();
        }
    });

    let backend = match backend::connect(&ctx, &config).await {
        Ok(backend) => backend,
        Err(e) => {
            formatter.error(&format!("Failed to connect to {}: {e}", config.bucket()));
            return ExitCode::from_error(&e);
        }
    };
    tracing::info!(backend = backend.name(), bucket = config.bucket(), "Backend ready");

    run(&ctx, backend.as_ref(), cli.command, &formatter).await
}

/// Dispatch a command against a connected backend
pub async fn run(
    ctx: &Context,
    backend: &dyn StorageBackend,
    command: Commands,
    formatter: &Formatter,
) -> ExitCode {
    match command {
        Commands::Get(args) => object::get(ctx, backend, args, formatter).await,
        Commands::Ls(args) => object::ls(ctx, backend, args, formatter).await,
        Commands::Put(args) => object::put(ctx, backend, args, formatter).await,
        Commands::Rm(args) => object::rm(ctx, backend, args, formatter).await,
        Commands::Cp(args) => object::cp(ctx, backend, args, formatter).await,
        Commands::Demo => demo::execute(ctx, backend, formatter).await,
    }
}
