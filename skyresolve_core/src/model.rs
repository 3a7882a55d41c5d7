//! Domain model: sources, queries, raw candidates and resolved objects.

use crate::canonical::{build_canonical_id, display_name, NameSet};
use crate::coords::{format_dec_dms, format_ra_hms, Coordinate};
use crate::error::ResolveError;
use crate::object_types::Category;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Sources
// ============================================================================

/// An upstream reference service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Sesame,
    Simbad,
    Vizier,
    Ned,
    Mpc,
}

/// Upstream hosting family. Calls within one family share a rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Cds,
    Ned,
    Mpc,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Cds => "cds",
            Family::Ned => "ned",
            Family::Mpc => "mpc",
        }
    }
}

impl Source {
    pub const ALL: [Source; 5] = [
        Source::Sesame,
        Source::Simbad,
        Source::Vizier,
        Source::Ned,
        Source::Mpc,
    ];

    /// Lower is more authoritative.
    pub const fn trust_rank(&self) -> u8 {
        match self {
            Source::Mpc => 0,
            Source::Sesame => 1,
            Source::Simbad => 2,
            Source::Vizier => 3,
            Source::Ned => 4,
        }
    }

    /// Confidence used when a connector has no finer signal.
    pub const fn base_confidence(&self) -> f64 {
        match self {
            Source::Mpc => 0.99,
            Source::Sesame => 0.95,
            Source::Simbad => 0.92,
            Source::Vizier => 0.75,
            Source::Ned => 0.72,
        }
    }

    pub const fn family(&self) -> Family {
        match self {
            Source::Sesame | Source::Simbad | Source::Vizier => Family::Cds,
            Source::Ned => Family::Ned,
            Source::Mpc => Family::Mpc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Sesame => "sesame",
            Source::Simbad => "simbad",
            Source::Vizier => "vizier",
            Source::Ned => "ned",
            Source::Mpc => "mpc",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Source::Sesame => "CDS Sesame name resolver",
            Source::Simbad => "SIMBAD astronomical database (TAP)",
            Source::Vizier => "VizieR catalogue cross-match",
            Source::Ned => "NASA/IPAC Extragalactic Database",
            Source::Mpc => "Minor Planet Center",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Source::ALL
            .iter()
            .copied()
            .find(|src| src.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ResolveError::InvalidInput(format!("Unknown source '{}'", s)))
    }
}

// ============================================================================
// Query
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryKind {
    Coordinate,
    Name,
    MinorBody,
}

/// A classified query. Built once per search and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub raw: String,
    pub kind: QueryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designator: Option<String>,
}

impl Query {
    pub fn name(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            kind: QueryKind::Name,
            coordinate: None,
            designator: None,
        }
    }

    pub fn coordinate(raw: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            raw: raw.into(),
            kind: QueryKind::Coordinate,
            coordinate: Some(coordinate),
            designator: None,
        }
    }

    pub fn minor_body(raw: impl Into<String>, designator: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            kind: QueryKind::MinorBody,
            coordinate: None,
            designator: Some(designator.into()),
        }
    }

    /// Text sent to name-based services: the designator when one was
    /// extracted, the raw input otherwise.
    pub fn lookup_text(&self) -> &str {
        self.designator.as_deref().unwrap_or(&self.raw)
    }
}

// ============================================================================
// RawCandidate
// ============================================================================

/// One answer from one source, before consolidation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCandidate {
    pub source: Source,
    pub name: String,
    pub canonical_id: String,
    pub identifiers: NameSet,
    pub ra: f64,
    pub dec: f64,
    pub object_type: String,
    pub category: Category,
    pub confidence: f64,
    pub magnitude: Option<f64>,
    /// Major axis in arcminutes.
    pub angular_size: Option<f64>,
    pub redshift: Option<f64>,
    pub spectral_type: Option<String>,
    pub morphological_type: Option<String>,
    pub source_url: Option<String>,
    pub description: Option<String>,
}

impl RawCandidate {
    /// Create a candidate with required fields. The canonical id is derived
    /// from the name until [`RawCandidate::with_designations`] says otherwise.
    pub fn new(source: Source, name: &str, ra: f64, dec: f64) -> Self {
        let name = display_name(name);
        let mut identifiers = NameSet::new();
        identifiers.insert(&name);
        Self {
            source,
            canonical_id: build_canonical_id(&[&name]),
            name,
            identifiers,
            ra,
            dec,
            object_type: Category::Other.label().to_string(),
            category: Category::Other,
            confidence: source.base_confidence(),
            magnitude: None,
            angular_size: None,
            redshift: None,
            spectral_type: None,
            morphological_type: None,
            source_url: None,
            description: None,
        }
    }

    /// Create a candidate for a row that carries no designation. `label` is
    /// for display only: the candidate has no identifiers and no canonical
    /// id, so it can only join a group by position.
    pub fn unnamed(source: Source, label: &str, ra: f64, dec: f64) -> Self {
        Self {
            name: display_name(label),
            canonical_id: String::new(),
            identifiers: NameSet::new(),
            ..Self::new(source, label, ra, dec)
        }
    }

    /// Set the canonical id from designations (best first) and record each
    /// of them as an identifier.
    pub fn with_designations(mut self, designations: &[&str]) -> Self {
        let id = build_canonical_id(designations);
        if !id.is_empty() {
            self.canonical_id = id;
        }
        for d in designations {
            self.identifiers.insert(d);
        }
        self
    }

    pub fn with_identifier(mut self, identifier: &str) -> Self {
        self.identifiers.insert(identifier);
        self
    }

    pub fn with_type(mut self, label: impl Into<String>, category: Category) -> Self {
        self.object_type = label.into();
        self.category = category;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_magnitude(mut self, magnitude: Option<f64>) -> Self {
        self.magnitude = magnitude;
        self
    }

    pub fn with_angular_size(mut self, arcmin: Option<f64>) -> Self {
        self.angular_size = arcmin;
        self
    }

    pub fn with_redshift(mut self, redshift: Option<f64>) -> Self {
        self.redshift = redshift;
        self
    }

    pub fn with_spectral_type(mut self, spectral_type: Option<String>) -> Self {
        self.spectral_type = non_blank(spectral_type);
        self
    }

    pub fn with_morphological_type(mut self, morphological_type: Option<String>) -> Self {
        self.morphological_type = non_blank(morphological_type);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            ra: self.ra,
            dec: self.dec,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ============================================================================
// ResolvedObject
// ============================================================================

/// A consolidated object. Only the consolidator builds these, and a merge
/// always yields a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedObject {
    pub name: String,
    pub canonical_id: String,
    pub identifiers: NameSet,
    /// Every distinct name contributed by a merged record, primary first.
    pub alternate_names: NameSet,
    pub ra: f64,
    pub dec: f64,
    pub ra_hms: String,
    pub dec_dms: String,
    pub object_type: String,
    pub category: Category,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angular_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redshift: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spectral_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub morphological_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Most authoritative contributor.
    pub source: Source,
    /// All contributors in arrival order.
    pub sources: Vec<Source>,
}

impl ResolvedObject {
    pub(crate) fn from_candidate(candidate: RawCandidate) -> Self {
        let mut alternate_names = NameSet::new();
        if !candidate.identifiers.is_empty() {
            alternate_names.insert(&candidate.name);
        }
        Self {
            ra_hms: format_ra_hms(candidate.ra),
            dec_dms: format_dec_dms(candidate.dec),
            name: candidate.name,
            canonical_id: candidate.canonical_id,
            identifiers: candidate.identifiers,
            alternate_names,
            ra: candidate.ra,
            dec: candidate.dec,
            object_type: candidate.object_type,
            category: candidate.category,
            confidence: candidate.confidence,
            magnitude: candidate.magnitude,
            angular_size: candidate.angular_size,
            redshift: candidate.redshift,
            spectral_type: candidate.spectral_type,
            morphological_type: candidate.morphological_type,
            source_url: candidate.source_url,
            description: candidate.description,
            source: candidate.source,
            sources: vec![candidate.source],
        }
    }

    pub fn trust_rank(&self) -> u8 {
        self.source.trust_rank()
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            ra: self.ra,
            dec: self.dec,
        }
    }
}
