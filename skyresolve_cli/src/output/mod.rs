use crate::cli::OutputFormat;
use crate::commands::Result;
use serde::Serialize;
use skyresolve_core::classifier::PatternInfo;
use skyresolve_core::{AvailabilityReport, ResolvedObject, ResolverConfig, SearchResponse};

mod pretty;

/// Everything a command can print. Serialized untagged so `--output json`
/// yields the payload itself.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OutputData {
    Search(SearchResponse),
    Resolved {
        query: String,
        object: Option<ResolvedObject>,
    },
    Availability(AvailabilityReport),
    Patterns(Vec<PatternInfo>),
    Config {
        path: String,
        exists: bool,
        config: ResolverConfig,
    },
}

pub fn format_output(data: &OutputData, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(data)?);
        }
        OutputFormat::Text => {
            format_text_output(data)?;
        }
        OutputFormat::Pretty => {
            print!("{}", pretty::format_pretty(data));
        }
    }
    Ok(())
}

fn optional<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn object_line(object: &ResolvedObject) -> String {
    [
        object.name.clone(),
        object.ra_hms.clone(),
        object.dec_dms.clone(),
        object.object_type.clone(),
        optional(&object.magnitude),
        object.source.to_string(),
    ]
    .join("\t")
}

/// Tab-separated, one record per line. Source errors go to stderr.
fn format_text_output(data: &OutputData) -> Result<()> {
    match data {
        OutputData::Search(response) => {
            for object in &response.results {
                println!("{}", object_line(object));
            }
            for error in &response.errors {
                eprintln!("{}: {}", error.source, error.message);
            }
        }
        OutputData::Resolved { object, .. } => {
            if let Some(object) = object {
                println!("{}", object_line(object));
            }
        }
        OutputData::Availability(report) => {
            for (source, up) in &report.sources {
                println!("{}\t{}", source, if *up { "up" } else { "down" });
            }
            println!("local\tup");
        }
        OutputData::Patterns(patterns) => {
            for pattern in patterns {
                println!(
                    "{}\t{}\t{}\t{}",
                    pattern.kind, pattern.id, pattern.example, pattern.description
                );
            }
        }
        OutputData::Config { config, .. } => {
            print!("{}", serde_yaml::to_string(config)?);
        }
    }
    Ok(())
}
