use crate::cli::Cli;
use crate::commands::{create_resolver, spinner, Result};
use crate::output::{format_output, OutputData};

pub async fn run(cli: &Cli, name: &str) -> Result<()> {
    let resolver = create_resolver()?;

    let progress = spinner(cli, format!("Resolving '{}'...", name));
    let object = resolver.resolve_single(name).await;
    progress.finish_and_clear();

    let data = OutputData::Resolved {
        query: name.to_string(),
        object,
    };
    format_output(&data, &cli.output)
}
