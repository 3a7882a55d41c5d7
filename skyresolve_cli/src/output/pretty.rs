//! Pretty formatter for terminal output.
//!
//! Bold titles, dimmed metadata, one table per result list, and source
//! failures last where the eye settles.

use super::OutputData;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;
use skyresolve_core::classifier::PatternInfo;
use skyresolve_core::{AvailabilityReport, ResolvedObject, ResolverConfig, SearchResponse, Source};

/// Terminal width for formatting (default fallback)
const DEFAULT_WIDTH: usize = 80;

/// Alternate names shown per object before eliding the rest
const MAX_ALIASES: usize = 6;

pub fn format_pretty(data: &OutputData) -> String {
    match data {
        OutputData::Search(response) => format_search(response),
        OutputData::Resolved { query, object } => match object {
            Some(object) => format_object_card(object),
            None => format!("{} '{}'\n", "No match for".yellow(), query),
        },
        OutputData::Availability(report) => format_availability(report),
        OutputData::Patterns(patterns) => format_patterns(patterns),
        OutputData::Config {
            path,
            exists,
            config,
        } => format_config(path, *exists, config),
    }
}

// ============================================================================
// Search results
// ============================================================================

fn format_search(response: &SearchResponse) -> String {
    let mut output = String::new();
    output.push('\n');
    output.push_str(&format!(
        "{} {} {}\n",
        "Results for".bold().cyan(),
        format!("'{}'", response.query).bold(),
        format!("({:?}, {} ms)", response.kind, response.elapsed_ms).dimmed()
    ));
    output.push('\n');

    if response.results.is_empty() {
        output.push_str(&format!("{}\n", "No objects found.".yellow()));
    } else {
        output.push_str(&results_table(&response.results));
        output.push('\n');
        if response.total_count > response.results.len() {
            output.push_str(
                &format!(
                    "Showing {} of {} objects (raise --limit for more)\n",
                    response.results.len(),
                    response.total_count
                )
                .dimmed()
                .to_string(),
            );
        }
        if let Some(first) = response.results.first() {
            let aliases = aliases(first);
            if !aliases.is_empty() {
                output.push_str(&format!(
                    "{} {}\n",
                    "Also known as:".dimmed(),
                    truncate(&aliases, terminal_width().saturating_sub(16))
                ));
            }
        }
    }

    if !response.sources_used.is_empty() {
        let used: Vec<String> = response.sources_used.iter().map(Source::to_string).collect();
        output.push_str(&format!("{} {}\n", "Sources:".dimmed(), used.join(", ")));
    }

    if !response.errors.is_empty() {
        output.push('\n');
        output.push_str(&format!("{}\n", "Unavailable sources:".bold().yellow()));
        for error in &response.errors {
            output.push_str(&format!(
                "  {} {} {}\n",
                "⚠".yellow(),
                error.source.to_string().yellow(),
                error.message.dimmed()
            ));
        }
    }
    output.push('\n');
    output
}

fn results_table(objects: &[ResolvedObject]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(terminal_width() as u16);

    let headers: Vec<Cell> = ["#", "Name", "RA", "Dec", "Type", "Mag", "Sources", "Conf"]
        .iter()
        .map(|col| Cell::new(col.cyan().bold().to_string()))
        .collect();
    table.set_header(headers);

    for (i, object) in objects.iter().enumerate() {
        let sources: Vec<String> = object.sources.iter().map(Source::to_string).collect();
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&object.name),
            Cell::new(&object.ra_hms),
            Cell::new(&object.dec_dms),
            Cell::new(&object.object_type),
            Cell::new(
                object
                    .magnitude
                    .map(|m| format!("{:.2}", m))
                    .unwrap_or_default(),
            ),
            Cell::new(sources.join(", ")),
            Cell::new(format!("{:.2}", object.confidence)),
        ]);
    }

    let mut output = table.to_string();
    output.push('\n');
    output
}

fn aliases(object: &ResolvedObject) -> String {
    let others: Vec<&str> = object
        .alternate_names
        .iter()
        .filter(|name| *name != object.name)
        .collect();
    let mut shown = others
        .iter()
        .take(MAX_ALIASES)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    if others.len() > MAX_ALIASES {
        shown.push_str(&format!(" (+{} more)", others.len() - MAX_ALIASES));
    }
    shown
}

// ============================================================================
// Single object
// ============================================================================

fn format_object_card(object: &ResolvedObject) -> String {
    let mut output = String::new();
    output.push('\n');
    output.push_str(&format!(
        "{}  {}\n",
        object.name.bold().cyan(),
        format!("[{}]", object.object_type).dimmed()
    ));

    let field = |label: &str, value: String| format!("  {:<14}{}\n", label.dimmed(), value);

    output.push_str(&field(
        "Position",
        format!("{} {}", object.ra_hms, object.dec_dms),
    ));
    output.push_str(&field(
        "Degrees",
        format!("{:.6} {:+.6}", object.ra, object.dec),
    ));
    if let Some(mag) = object.magnitude {
        output.push_str(&field("Magnitude", format!("{:.2}", mag)));
    }
    if let Some(sp) = &object.spectral_type {
        output.push_str(&field("Spectral type", sp.clone()));
    }
    if let Some(morph) = &object.morphological_type {
        output.push_str(&field("Morphology", morph.clone()));
    }
    if let Some(size) = object.angular_size {
        output.push_str(&field("Size", format!("{:.2}'", size)));
    }
    if let Some(z) = object.redshift {
        output.push_str(&field("Redshift", format!("{:.6}", z)));
    }
    let aliases = aliases(object);
    if !aliases.is_empty() {
        output.push_str(&field(
            "Also known as",
            truncate(&aliases, terminal_width().saturating_sub(16)),
        ));
    }
    let sources: Vec<String> = object.sources.iter().map(Source::to_string).collect();
    output.push_str(&field(
        "Sources",
        format!("{} (confidence {:.2})", sources.join(", "), object.confidence),
    ));
    if let Some(description) = &object.description {
        output.push_str(&field("Note", description.clone()));
    }
    if let Some(url) = &object.source_url {
        output.push_str(&field("Link", format_hyperlink(url, url).blue().to_string()));
    }
    output.push('\n');
    output
}

// ============================================================================
// Status, patterns, config
// ============================================================================

fn format_availability(report: &AvailabilityReport) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(terminal_width() as u16)
        .set_header(vec!["Source", "Family", "Status", "Details"]);

    for (source, up) in &report.sources {
        let status = if *up {
            "✓ Up".green().to_string()
        } else {
            "✗ Down".red().to_string()
        };
        let details = report
            .errors
            .get(source)
            .cloned()
            .unwrap_or_else(|| source.description().to_string());
        table.add_row(vec![
            Cell::new(source),
            Cell::new(source.family().as_str()),
            Cell::new(status),
            Cell::new(details),
        ]);
    }

    let mut output = String::new();
    output.push('\n');
    output.push_str(&format!("{}\n\n", "Upstream services".bold().cyan()));
    output.push_str(&table.to_string());
    output.push('\n');
    output.push_str(&format!(
        "\n{}/{} services reachable. Local classification and formatting: {}\n\n",
        report.available_count(),
        report.sources.len(),
        if report.local {
            "available".green().to_string()
        } else {
            "unavailable".red().to_string()
        }
    ));
    output
}

fn format_patterns(patterns: &[PatternInfo]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(terminal_width() as u16)
        .set_header(vec!["Kind", "Pattern", "Example", "Description"]);
    for pattern in patterns {
        table.add_row(vec![
            Cell::new(&pattern.kind),
            Cell::new(&pattern.id),
            Cell::new(&pattern.example),
            Cell::new(&pattern.description),
        ]);
    }
    format!(
        "\n{}\n\n{}\n{}\n\n",
        "Recognised query formats".bold().cyan(),
        table,
        "Anything else is resolved as an object name.".dimmed()
    )
}

fn format_config(path: &str, exists: bool, config: &ResolverConfig) -> String {
    let mut output = String::new();
    output.push('\n');
    let state = if exists {
        "".to_string()
    } else {
        " (not created yet; showing defaults)".yellow().to_string()
    };
    output.push_str(&format!("Config file: {}{}\n\n", path.dimmed(), state));
    match serde_yaml::to_string(config) {
        Ok(yaml) => output.push_str(&yaml),
        Err(e) => output.push_str(&format!("{}: {}\n", "Cannot render config".red(), e)),
    }
    output.push('\n');
    output
}

// ============================================================================
// Helpers
// ============================================================================

fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

/// OSC 8 hyperlink; terminals without support show the text only.
fn format_hyperlink(url: &str, display_text: &str) -> String {
    format!("\x1b]8;;{}\x07{}\x1b]8;;\x07", url, display_text)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if max_chars < 4 || text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars - 3).collect();
    format!("{}...", kept.trim_end())
}
