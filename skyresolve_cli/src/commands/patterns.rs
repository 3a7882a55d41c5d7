use crate::cli::Cli;
use crate::commands::Result;
use crate::output::{format_output, OutputData};
use skyresolve_core::QueryClassifier;

pub fn run(cli: &Cli) -> Result<()> {
    let patterns = QueryClassifier::new().list_patterns();
    format_output(&OutputData::Patterns(patterns), &cli.output)
}
