use crate::cli::Cli;
use crate::commands::{cancel_on_ctrl_c, create_resolver, spinner, Result};
use crate::output::{format_output, OutputData};
use skyresolve_core::{Coordinate, CoordinateSearch};

pub async fn run(
    cli: &Cli,
    ra: &str,
    dec: &str,
    radius: Option<f64>,
    limit: Option<usize>,
) -> Result<()> {
    let center = Coordinate::parse(ra, dec)?;
    let mut search = CoordinateSearch::new(center.ra, center.dec);
    if let Some(radius) = radius {
        search = search.with_radius(radius);
    }

    let resolver = create_resolver()?;
    let mut options = resolver.default_options();
    if let Some(limit) = limit {
        options = options.with_limit(limit);
    }
    cancel_on_ctrl_c(&options.cancel);

    let progress = spinner(
        cli,
        format!(
            "Searching {:.3}° around {} {}...",
            search.radius_deg.unwrap_or(options.radius_deg),
            ra,
            dec
        ),
    );
    let outcome = resolver.search_by_coordinates(search, &options).await;
    progress.finish_and_clear();

    format_output(&OutputData::Search(outcome?), &cli.output)
}
