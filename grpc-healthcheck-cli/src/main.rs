use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use grpc_healthcheck::observability::init_tracing;
use grpc_healthcheck::{run_check, ExitStatus};
use tracing::debug;

mod cli;
mod output;
mod settings;

use cli::Cli;

#[tokio::main]
async fn main() {
    // Parse command line arguments; usage errors exit 1, help and version exit 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    // Execute the check
    let result = run(cli).await;

    // Handle result
    match result {
        Ok(status) => std::process::exit(status.code()),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);

            // Show context if available
            if let Some(source) = e.source() {
                eprintln!("\n{} {}", "Caused by:".yellow(), source);
            }

            std::process::exit(ExitStatus::Unhealthy.code());
        }
    }
}

async fn run(cli: Cli) -> Result<ExitStatus> {
    let config = settings::load_config(cli.config.as_deref())?;

    init_tracing(&settings::logging_config(&cli, &config));
    for path in &config.sources {
        debug!(path = %path.display(), "Loaded configuration file");
    }

    let (target, query) = settings::check_options(&cli, &config)
        .into_parts()
        .context("Invalid health check settings")?;
    debug!(
        endpoint = %target,
        service = query.service(),
        timeout = ?query.deadline(),
        "Resolved health check settings"
    );

    if cli.verbose {
        output::render_preflight(&target, &query).print();
    }

    let report = run_check(target, query).await;
    output::render_report(&report, cli.verbose).print();

    Ok(report.exit_status())
}
