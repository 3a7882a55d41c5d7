//! Request and response types for federated resolution.

use crate::config::{ResolverConfig, DEFAULT_LIMIT, DEFAULT_RADIUS_DEG, DEFAULT_TIMEOUT_MS};
use crate::error::ResolveError;
use crate::model::{QueryKind, ResolvedObject, Source};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Per-search knobs. Cheap to clone; the cancellation token is shared.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Sources allowed to run. Strategies skip anything not listed.
    pub sources: Vec<Source>,
    pub limit: usize,
    /// Per-call timeout.
    pub timeout: Duration,
    pub radius_deg: f64,
    pub cancel: CancellationToken,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            sources: Source::ALL.to_vec(),
            limit: DEFAULT_LIMIT,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            radius_deg: DEFAULT_RADIUS_DEG,
            cancel: CancellationToken::new(),
        }
    }
}

impl SearchOptions {
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self {
            sources: config.sources.clone(),
            limit: config.limit.max(1),
            timeout: config.timeout(),
            radius_deg: config.radius_deg,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_sources(mut self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.sources = sources.into_iter().collect();
        self
    }

    /// Values below 1 are raised to 1.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_radius(mut self, radius_deg: f64) -> Self {
        self.radius_deg = radius_deg;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn includes(&self, source: Source) -> bool {
        self.sources.contains(&source)
    }
}

/// Failure class of an isolated source error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorKind {
    Network,
    Upstream,
    Parse,
}

/// Error from a source that failed during a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceError {
    pub source: Source,
    pub kind: SourceErrorKind,
    pub message: String,
}

impl SourceError {
    /// Classify a connector error. Cancellation is not a source failure and
    /// yields `None`.
    pub fn from_error(source: Source, err: &ResolveError) -> Option<Self> {
        let kind = match err {
            ResolveError::Cancelled => return None,
            ResolveError::Network(_) | ResolveError::Io(_) => SourceErrorKind::Network,
            ResolveError::Upstream { .. } => SourceErrorKind::Upstream,
            _ => SourceErrorKind::Parse,
        };
        Some(Self {
            source,
            kind,
            message: err.to_string(),
        })
    }
}

/// Complete result of one search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The query as given
    pub query: String,

    /// How the query was classified
    pub kind: QueryKind,

    pub results: Vec<ResolvedObject>,

    /// Sources that completed successfully, in call order
    pub sources_used: Vec<Source>,

    /// Consolidated objects before truncation to the limit
    pub total_count: usize,

    pub elapsed_ms: u64,

    #[serde(default)]
    pub errors: Vec<SourceError>,
}

impl SearchResponse {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Every invoked source failed.
    pub fn all_failed(&self) -> bool {
        self.sources_used.is_empty() && !self.errors.is_empty()
    }

    pub fn first(&self) -> Option<&ResolvedObject> {
        self.results.first()
    }
}

/// Explicit cone search. `radius_deg` overrides the options radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSearch {
    pub ra: f64,
    pub dec: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_deg: Option<f64>,
}

impl CoordinateSearch {
    pub fn new(ra: f64, dec: f64) -> Self {
        Self {
            ra,
            dec,
            radius_deg: None,
        }
    }

    pub fn with_radius(mut self, radius_deg: f64) -> Self {
        self.radius_deg = Some(radius_deg);
        self
    }
}

/// Reachability of each upstream service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityReport {
    pub sources: BTreeMap<Source, bool>,

    /// Probe failure messages for unavailable sources
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<Source, String>,

    /// Offline classification and formatting always work.
    pub local: bool,
}

impl AvailabilityReport {
    pub fn is_available(&self, source: Source) -> bool {
        self.sources.get(&source).copied().unwrap_or(false)
    }

    pub fn available_count(&self) -> usize {
        self.sources.values().filter(|up| **up).count()
    }
}
