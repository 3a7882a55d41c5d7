use crate::cli::Cli;
use crate::commands::{cancel_on_ctrl_c, create_resolver, spinner, CommandError, Result};
use crate::output::{format_output, OutputData};
use skyresolve_core::{SearchOptions, Source};
use std::str::FromStr;
use std::time::Duration;

/// Command-line overrides applied on top of the configured defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides<'a> {
    pub sources: Option<&'a str>,
    pub limit: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub radius_deg: Option<f64>,
}

impl Overrides<'_> {
    pub fn apply(&self, mut options: SearchOptions) -> Result<SearchOptions> {
        if let Some(list) = self.sources {
            options = options.with_sources(parse_sources(list)?);
        }
        if let Some(limit) = self.limit {
            options = options.with_limit(limit);
        }
        if let Some(ms) = self.timeout_ms {
            options = options.with_timeout(Duration::from_millis(ms));
        }
        if let Some(radius) = self.radius_deg {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(CommandError::InvalidInput(format!(
                    "--radius must be a positive number of degrees, got {}",
                    radius
                )));
            }
            options = options.with_radius(radius);
        }
        Ok(options)
    }
}

/// Parse a comma-separated source list such as `sesame,simbad`.
pub fn parse_sources(list: &str) -> Result<Vec<Source>> {
    let mut sources = Vec::new();
    for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let source = Source::from_str(item).map_err(|_| {
            CommandError::InvalidInput(format!(
                "Unknown source '{}'. Expected one of: sesame, simbad, vizier, ned, mpc",
                item
            ))
        })?;
        if !sources.contains(&source) {
            sources.push(source);
        }
    }
    if sources.is_empty() {
        return Err(CommandError::InvalidInput(
            "--sources needs at least one source".to_string(),
        ));
    }
    Ok(sources)
}

pub async fn run(cli: &Cli, query: &str, overrides: Overrides<'_>) -> Result<()> {
    if query.trim().is_empty() {
        return Err(CommandError::InvalidInput("Query is empty".to_string()));
    }

    let resolver = create_resolver()?;
    let options = overrides.apply(resolver.default_options())?;
    cancel_on_ctrl_c(&options.cancel);

    let progress = spinner(cli, format!("Resolving '{}'...", query));
    let outcome = resolver.search_by_name(query, &options).await;
    progress.finish_and_clear();

    format_output(&OutputData::Search(outcome?), &cli.output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sources() {
        let sources = parse_sources("SIMBAD, ned,simbad").unwrap();
        assert_eq!(sources, vec![Source::Simbad, Source::Ned]);
        assert!(parse_sources("simbad,hubble").is_err());
        assert!(parse_sources(" , ").is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let overrides = Overrides {
            sources: Some("sesame"),
            limit: Some(0),
            timeout_ms: Some(2500),
            radius_deg: Some(0.25),
        };
        let options = overrides.apply(SearchOptions::default()).unwrap();
        assert_eq!(options.sources, vec![Source::Sesame]);
        assert_eq!(options.limit, 1);
        assert_eq!(options.timeout, Duration::from_millis(2500));
        assert_eq!(options.radius_deg, 0.25);
    }

    #[test]
    fn test_negative_radius_rejected() {
        let overrides = Overrides {
            radius_deg: Some(-1.0),
            ..Default::default()
        };
        assert!(overrides.apply(SearchOptions::default()).is_err());
    }
}
