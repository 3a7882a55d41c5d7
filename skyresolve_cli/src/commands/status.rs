use crate::cli::Cli;
use crate::commands::{create_resolver, spinner, Result};
use crate::output::{format_output, OutputData};

pub async fn run(cli: &Cli) -> Result<()> {
    let resolver = create_resolver()?;

    let progress = spinner(cli, "Probing upstream services...");
    let report = resolver.check_availability().await;
    progress.finish_and_clear();

    tracing::debug!(
        available = report.available_count(),
        total = report.sources.len(),
        "Availability probe finished"
    );
    format_output(&OutputData::Availability(report), &cli.output)
}
