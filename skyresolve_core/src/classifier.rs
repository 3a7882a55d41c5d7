//! Query classifier: decides whether an input is a coordinate pair, a
//! minor-body designator or a name, and routes it to a source strategy.
//!
//! # Example
//!
//! ```rust
//! use skyresolve_core::classifier::QueryClassifier;
//! use skyresolve_core::model::QueryKind;
//!
//! let classifier = QueryClassifier::new();
//!
//! assert_eq!(classifier.classify("00:42:44.3 +41:16:09").kind, QueryKind::Coordinate);
//! assert_eq!(classifier.classify("2024 AB").kind, QueryKind::MinorBody);
//! assert_eq!(classifier.classify("Andromeda Galaxy").kind, QueryKind::Name);
//! ```

use crate::coords::Coordinate;
use crate::model::Query;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// How a matched designator is rewritten into its normalized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Normalize {
    /// `2024AB` -> `2024 AB`
    Provisional,
    /// `(433) Eros` -> `433`
    Numbered,
    /// `c/2020 f3 (NEOWISE)` -> `C/2020 F3`
    Comet,
    /// Packed forms are passed through uppercased.
    Packed,
}

/// Pattern definition for minor-body designators.
struct DesignatorPattern {
    id: &'static str,
    pattern: Regex,
    normalize: Normalize,
    description: &'static str,
}

/// A pattern for documentation/help output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternInfo {
    pub id: String,
    pub kind: String,
    pub description: String,
    pub example: String,
}

static SEXAGESIMAL_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^\s*(?P<ra>\d{1,2}\s*[hH:\s]\s*\d{1,2}\s*[mM:\s]\s*\d{1,2}(?:\.\d+)?\s*[sS]?)\s*[,\s]\s*(?P<dec>[+-]?\d{1,2}\s*[dD°:\s]\s*\d{1,2}\s*[mM':\s]\s*\d{1,2}(?:\.\d+)?\s*(?:"|''|[sS])?)\s*$"#,
    )
    .expect("sexagesimal pattern is valid")
});

static DECIMAL_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<ra>\d{1,3}(?:\.\d+)?)\s*(?:,\s*|\s+)(?P<dec>[+-]?\d{1,2}(?:\.\d+)?)\s*$")
        .expect("decimal pattern is valid")
});

static DESIGNATOR_PATTERNS: Lazy<Vec<DesignatorPattern>> = Lazy::new(build_designator_patterns);

fn build_designator_patterns() -> Vec<DesignatorPattern> {
    vec![
        DesignatorPattern {
            id: "comet_provisional",
            pattern: Regex::new(
                r"(?i)^(?P<prefix>[CPDXIA])/(?P<year>\d{4})\s*(?P<code>[A-Z]{1,2}\d{0,3}(?:-[A-Z])?)(?:\s*\(.*\))?$",
            )
            .expect("valid"),
            normalize: Normalize::Comet,
            description: "Comet provisional designation (C/2020 F3, P/2019 LD2)",
        },
        DesignatorPattern {
            id: "comet_numbered",
            pattern: Regex::new(r"(?i)^(?P<number>\d{1,4})(?P<prefix>[PDI])(?:/(?P<name>[A-Za-z][\w' -]*))?$")
                .expect("valid"),
            normalize: Normalize::Comet,
            description: "Numbered periodic comet (1P/Halley, 67P)",
        },
        DesignatorPattern {
            id: "asteroid_provisional",
            pattern: Regex::new(r"(?i)^(?P<year>(?:18|19|20)\d{2})\s*(?P<code>[A-Z]{2}\d{0,3})$")
                .expect("valid"),
            normalize: Normalize::Provisional,
            description: "Asteroid provisional designation (2024 AB, 1998 QE2)",
        },
        DesignatorPattern {
            id: "asteroid_packed",
            pattern: Regex::new(r"^(?P<packed>[IJK]\d{2}[A-HJ-Y][0-9A-Za-z]\d[A-Z])$").expect("valid"),
            normalize: Normalize::Packed,
            description: "Packed provisional designation (K24A00B)",
        },
        DesignatorPattern {
            id: "asteroid_numbered_named",
            pattern: Regex::new(r"^\((?P<number>\d{1,7})\)(?:\s*(?P<name>[A-Za-z][\w' -]*))?$")
                .expect("valid"),
            normalize: Normalize::Numbered,
            description: "Numbered minor planet in parentheses ((433) Eros)",
        },
        DesignatorPattern {
            id: "asteroid_numbered",
            pattern: Regex::new(r"^(?P<number>\d{1,7})$").expect("valid"),
            normalize: Normalize::Numbered,
            description: "Bare minor planet number (433)",
        },
    ]
}

/// Classifies raw query text. Cheap to construct; patterns are shared.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryClassifier;

impl QueryClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a raw query. Never fails: anything that is not a valid
    /// coordinate pair or designator is treated as a name.
    pub fn classify(&self, raw: &str) -> Query {
        let input = raw.trim();

        if let Some(coordinate) = detect_coordinate(input) {
            return Query::coordinate(input, coordinate);
        }

        if let Some(designator) = detect_minor_body(input) {
            return Query::minor_body(input, designator);
        }

        Query::name(input)
    }

    /// Get list of all supported patterns (for documentation/help)
    pub fn list_patterns(&self) -> Vec<PatternInfo> {
        let mut patterns = vec![
            PatternInfo {
                id: "coordinate_sexagesimal".to_string(),
                kind: "coordinate".to_string(),
                description: "Sexagesimal RA/Dec pair".to_string(),
                example: "00h42m44.3s +41d16m09s".to_string(),
            },
            PatternInfo {
                id: "coordinate_decimal".to_string(),
                kind: "coordinate".to_string(),
                description: "Decimal-degree RA/Dec pair".to_string(),
                example: "10.6847 41.2689".to_string(),
            },
        ];
        patterns.extend(DESIGNATOR_PATTERNS.iter().map(|p| PatternInfo {
            id: p.id.to_string(),
            kind: "minor-body".to_string(),
            description: p.description.to_string(),
            example: get_pattern_example(p.id),
        }));
        patterns
    }
}

/// Detect a coordinate pair. Out-of-range values yield `None`.
pub fn detect_coordinate(input: &str) -> Option<Coordinate> {
    let caps = SEXAGESIMAL_PAIR
        .captures(input)
        .or_else(|| DECIMAL_PAIR.captures(input))?;
    Coordinate::parse(&caps["ra"], &caps["dec"]).ok()
}

/// Detect a minor-body designator and return its normalized form.
pub fn detect_minor_body(input: &str) -> Option<String> {
    DESIGNATOR_PATTERNS.iter().find_map(|p| {
        p.pattern
            .captures(input)
            .and_then(|caps| normalize_designator(p.normalize, &caps))
    })
}

fn normalize_designator(mode: Normalize, caps: &Captures<'_>) -> Option<String> {
    match mode {
        Normalize::Provisional => Some(format!(
            "{} {}",
            caps.name("year")?.as_str(),
            caps.name("code")?.as_str().to_uppercase()
        )),
        Normalize::Numbered => {
            let number = caps.name("number")?.as_str().trim_start_matches('0');
            if number.is_empty() {
                None
            } else {
                Some(number.to_string())
            }
        }
        Normalize::Comet => {
            let prefix = caps.name("prefix")?.as_str().to_uppercase();
            match (caps.name("year"), caps.name("code"), caps.name("number")) {
                (Some(year), Some(code), _) => Some(format!(
                    "{}/{} {}",
                    prefix,
                    year.as_str(),
                    code.as_str().to_uppercase()
                )),
                (_, _, Some(number)) => Some(format!("{}{}", number.as_str(), prefix)),
                _ => None,
            }
        }
        Normalize::Packed => Some(caps.name("packed")?.as_str().to_uppercase()),
    }
}

fn get_pattern_example(id: &str) -> String {
    match id {
        "comet_provisional" => "C/2020 F3 (NEOWISE)",
        "comet_numbered" => "1P/Halley",
        "asteroid_provisional" => "2024 AB",
        "asteroid_packed" => "K24A00B",
        "asteroid_numbered_named" => "(433) Eros",
        "asteroid_numbered" => "433",
        _ => "",
    }
    .to_string()
}
