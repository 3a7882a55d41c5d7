use clap::Parser;
use owo_colors::OwoColorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use commands::*;

fn log_filter(verbose: u8) -> tracing_subscriber::EnvFilter {
    let fallback = match verbose {
        0 => "skyresolve_cli=info",
        1 => "skyresolve=debug",
        _ => "debug",
    };
    if verbose > 0 {
        return fallback.into();
    }
    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so structured output on stdout stays parseable
    tracing_subscriber::registry()
        .with(log_filter(cli.verbose))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        Commands::Search {
            query,
            sources,
            limit,
            timeout,
            radius,
        } => {
            let overrides = search::Overrides {
                sources: sources.as_deref(),
                limit: *limit,
                timeout_ms: *timeout,
                radius_deg: *radius,
            };
            search::run(&cli, query, overrides).await
        }
        Commands::Cone {
            ra,
            dec,
            radius,
            limit,
        } => cone::run(&cli, ra, dec, *radius, *limit).await,
        Commands::Resolve { name } => resolve::run(&cli, name).await,
        Commands::Status => status::run(&cli).await,
        Commands::Patterns => patterns::run(&cli),
        Commands::Config { action } => config::run(&cli, action.clone()),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        process::exit(e.exit_code());
    }
}
