//! The public entry point: classify, orchestrate, consolidate.
//!
//! # Example
//!
//! ```rust,ignore
//! use skyresolve_core::{ObjectResolver, ResolverConfig, SearchOptions};
//!
//! let resolver = ObjectResolver::new(ResolverConfig::default())?;
//! let response = resolver.search_by_name("M31", &SearchOptions::default()).await?;
//! for object in &response.results {
//!     println!("{} {} {}", object.name, object.ra_hms, object.dec_dms);
//! }
//! ```

use crate::classifier::QueryClassifier;
use crate::config::ResolverConfig;
use crate::connectors::{ConnectorRegistry, UpstreamClient};
use crate::coords::Coordinate;
use crate::error::ResolveError;
use crate::federated::{
    consolidate, AvailabilityReport, CoordinateSearch, Orchestrator, SearchOptions, SearchResponse,
};
use crate::gate::GateRegistry;
use crate::http::{HttpClient, ReqwestClient};
use crate::model::{Query, ResolvedObject, Source};
use crate::retry::RetryExecutor;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Sources consulted by [`ObjectResolver::resolve_single`].
const SINGLE_SOURCES: [Source; 3] = [Source::Mpc, Source::Sesame, Source::Simbad];

pub struct ObjectResolver {
    config: ResolverConfig,
    classifier: QueryClassifier,
    gates: Arc<GateRegistry>,
    engine: Orchestrator,
}

impl ObjectResolver {
    /// Resolver backed by the default `reqwest` transport.
    pub fn new(config: ResolverConfig) -> Result<Self, ResolveError> {
        config.validate()?;
        let http = ReqwestClient::new(&config.user_agent)?;
        Self::with_client(Arc::new(http), config)
    }

    /// Resolver over any transport; tests pass a scripted client here.
    pub fn with_client(
        http: Arc<dyn HttpClient>,
        config: ResolverConfig,
    ) -> Result<Self, ResolveError> {
        config.validate()?;
        let gates = Arc::new(GateRegistry::new(config.gate_spacing()));
        let executor = RetryExecutor::new(Arc::clone(&gates), config.retry_policy());
        let upstream = UpstreamClient::new(http, executor);
        let registry = ConnectorRegistry::standard(&config, upstream);
        Ok(Self::with_registry(registry, gates, config))
    }

    /// Resolver over a hand-built connector set.
    pub fn with_registry(
        registry: ConnectorRegistry,
        gates: Arc<GateRegistry>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            config,
            classifier: QueryClassifier::new(),
            gates,
            engine: Orchestrator::new(registry),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Rate-limit gates shared by every connector of this resolver.
    pub fn gates(&self) -> &GateRegistry {
        &self.gates
    }

    pub fn classifier(&self) -> &QueryClassifier {
        &self.classifier
    }

    /// Options seeded from the configuration.
    pub fn default_options(&self) -> SearchOptions {
        SearchOptions::from_config(&self.config)
    }

    /// Classify free text and run the matching strategy. Source failures are
    /// reported in the response; only cancellation is an `Err`.
    pub async fn search_by_name(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse, ResolveError> {
        let start = Instant::now();
        if options.cancel.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }
        let classified = self.classifier.classify(query);
        debug!(
            target: "skyresolve.engine",
            query = %classified.raw,
            kind = ?classified.kind,
            "Classified query"
        );
        self.execute(classified, options, start).await
    }

    /// Cone search around an explicit position, skipping classification.
    pub async fn search_by_coordinates(
        &self,
        search: CoordinateSearch,
        options: &SearchOptions,
    ) -> Result<SearchResponse, ResolveError> {
        let start = Instant::now();
        let coordinate = Coordinate::new(search.ra, search.dec)?;
        let mut options = options.clone();
        if let Some(radius) = search.radius_deg {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(ResolveError::InvalidInput(format!(
                    "Radius must be positive: {}",
                    radius
                )));
            }
            options.radius_deg = radius;
        }
        let raw = format!("{} {}", coordinate.ra, coordinate.dec);
        self.execute(Query::coordinate(raw, coordinate), &options, start)
            .await
    }

    /// Best single match from MPC, Sesame and SIMBAD. Never fails: errors
    /// and cancellation both come back as `None`.
    pub async fn resolve_single(&self, name: &str) -> Option<ResolvedObject> {
        let options = self
            .default_options()
            .with_sources(SINGLE_SOURCES)
            .with_limit(1);
        match self.search_by_name(name, &options).await {
            Ok(response) => response.results.into_iter().next(),
            Err(err) => {
                debug!(target: "skyresolve.engine", name, error = %err, "resolve_single gave up");
                None
            }
        }
    }

    /// Probe every registered connector concurrently.
    pub async fn check_availability(&self) -> AvailabilityReport {
        let timeout = self.config.probe_timeout();
        let cancel = &CancellationToken::new();

        let probes: Vec<_> = self
            .engine
            .registry()
            .iter()
            .map(move |(&source, connector)| async move {
                (source, connector.probe(timeout, cancel).await)
            })
            .collect();
        let outcomes = futures::future::join_all(probes).await;

        let mut sources = BTreeMap::new();
        let mut errors = BTreeMap::new();
        for (source, outcome) in outcomes {
            match outcome {
                Ok(()) => {
                    sources.insert(source, true);
                }
                Err(err) => {
                    debug!(target: "skyresolve.engine", source = source.as_str(), error = %err, "Probe failed");
                    sources.insert(source, false);
                    errors.insert(source, err.to_string());
                }
            }
        }

        AvailabilityReport {
            sources,
            errors,
            local: true,
        }
    }

    async fn execute(
        &self,
        query: Query,
        options: &SearchOptions,
        start: Instant,
    ) -> Result<SearchResponse, ResolveError> {
        let outcome = self.engine.run(&query, options).await?;
        let merged = consolidate(outcome.candidates, options.limit);
        let elapsed_ms = start.elapsed().as_millis() as u64;

        info!(
            target: "skyresolve.engine",
            query = %query.raw,
            results = merged.objects.len(),
            errors = outcome.errors.len(),
            elapsed_ms,
            "Search complete"
        );

        Ok(SearchResponse {
            query: query.raw,
            kind: query.kind,
            results: merged.objects,
            sources_used: outcome.sources_used,
            total_count: merged.total_count,
            elapsed_ms,
            errors: outcome.errors,
        })
    }
}
