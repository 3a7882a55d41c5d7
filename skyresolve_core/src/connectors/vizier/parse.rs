//! VizieR `asu-tsv` output.
//!
//! Several tables per body, separated by blank lines. Each table is a run of
//! `#` comment lines, a header line, a units line, a dashes line and then
//! tab-separated rows.

use crate::canonical::normalize_name;
use crate::connectors::{parse_number, ParseSource};
use crate::coords::{format_dec_dms, format_ra_hms, parse_dec, parse_ra};
use crate::error::ResolveError;
use crate::model::{RawCandidate, Source};
use crate::object_types::Category;

const VIZIER_URL: &str = "https://vizier.cds.unistra.fr/viz-bin/VizieR-4";

/// Name columns in preference order, with the catalogue prefix their bare
/// values need.
const NAME_COLUMNS: &[(&str, Option<&str>)] = &[
    ("Name", None),
    ("HIP", Some("HIP")),
    ("HD", Some("HD")),
    ("HR", Some("HR")),
    ("NGC", Some("NGC")),
    ("ID", None),
    ("Object", None),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Between tables: comments or blank lines.
    Preamble,
    /// Header seen, expecting the units line.
    Units,
    /// Units seen, expecting the dashes line.
    Dashes,
    Rows,
}

struct Table {
    catalog: Option<String>,
    header: Vec<String>,
}

impl Table {
    fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }
}

pub struct VizierParser {
    target: String,
}

impl VizierParser {
    /// `target` is the cross-match centre, echoed in row links.
    pub fn new(target: &str) -> Self {
        Self {
            target: normalize_name(target),
        }
    }

    fn row_to_candidate(&self, table: &Table, cells: &[&str]) -> Option<RawCandidate> {
        let cell = |name: &str| {
            table
                .column(name)
                .and_then(|i| cells.get(i))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let ra = parse_ra(cell("_RAJ2000")?).ok()?;
        let dec = parse_dec(cell("_DEJ2000")?).ok()?;

        let designations: Vec<String> = NAME_COLUMNS
            .iter()
            .filter_map(|(column, prefix)| {
                let value = cell(column)?;
                Some(match prefix {
                    Some(p) => format!("{} {}", p, value),
                    None => value.to_string(),
                })
            })
            .collect();
        let refs: Vec<&str> = designations.iter().map(String::as_str).collect();
        let candidate = match refs.first() {
            Some(name) => RawCandidate::new(Source::Vizier, name, ra, dec).with_designations(&refs),
            None => {
                let label = format!("{} {}", format_ra_hms(ra), format_dec_dms(dec));
                RawCandidate::unnamed(Source::Vizier, &label, ra, dec)
            }
        };

        let spectral_type = cell("SpType").map(str::to_string);
        let mut candidate = candidate
            .with_magnitude(cell("Vmag").and_then(parse_number))
            .with_spectral_type(spectral_type.clone());
        if spectral_type.is_some() {
            candidate = candidate.with_type(Category::Star.label(), Category::Star);
        }
        if let Some(catalog) = &table.catalog {
            candidate = candidate
                .with_description(format!("VizieR {}", catalog))
                .with_url(format!(
                    "{}?-source={}&-c={}",
                    VIZIER_URL,
                    urlencoding::encode(catalog),
                    urlencoding::encode(&self.target)
                ));
        }
        Some(candidate)
    }
}

fn is_dashes(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c == '-' || c == '\t' || c == ' ')
}

impl ParseSource for VizierParser {
    fn parse(&self, body: &str) -> Result<Vec<RawCandidate>, ResolveError> {
        if body.trim_start().starts_with('<') {
            return Err(ResolveError::parse("VizieR returned markup instead of TSV"));
        }

        let mut candidates = Vec::new();
        let mut state = State::Preamble;
        let mut catalog: Option<String> = None;
        let mut table: Option<Table> = None;

        for raw_line in body.lines() {
            let line = raw_line.trim_end_matches('\r');

            if let Some(comment) = line.strip_prefix('#') {
                if let Some(name) = comment.trim().strip_prefix("Name:") {
                    catalog = Some(name.trim().to_string());
                }
                if comment.trim_start().starts_with("INFO") && comment.contains("Error") {
                    return Err(ResolveError::parse(format!(
                        "VizieR reported: {}",
                        comment.trim()
                    )));
                }
                continue;
            }

            if line.trim().is_empty() {
                state = State::Preamble;
                table = None;
                continue;
            }

            match state {
                State::Preamble => {
                    table = Some(Table {
                        catalog: catalog.clone(),
                        header: line.split('\t').map(|h| h.trim().to_string()).collect(),
                    });
                    state = State::Units;
                }
                State::Units => {
                    state = if is_dashes(line) { State::Rows } else { State::Dashes };
                }
                State::Dashes => {
                    if is_dashes(line) {
                        state = State::Rows;
                    } else if let Some(t) = &table {
                        state = State::Rows;
                        let cells: Vec<&str> = line.split('\t').collect();
                        candidates.extend(self.row_to_candidate(t, &cells));
                    }
                }
                State::Rows => {
                    if let Some(t) = &table {
                        let cells: Vec<&str> = line.split('\t').collect();
                        candidates.extend(self.row_to_candidate(t, &cells));
                    }
                }
            }
        }

        Ok(candidates)
    }
}
