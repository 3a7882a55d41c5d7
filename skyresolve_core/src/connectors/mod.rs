//! Upstream source connectors.
//!
//! Each connector turns a [`Query`] into zero or more [`RawCandidate`]s in
//! its own wire format. Network access goes through [`UpstreamClient`], which
//! holds the family gate and applies the retry policy; decoding lives in a
//! pure `parse` module per source.

pub mod mpc;
pub mod ned;
pub mod sesame;
pub mod simbad;
pub mod vizier;

use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::federated::SearchOptions;
use crate::http::{HttpClient, HttpRequest, HttpResponse};
use crate::model::{Query, RawCandidate, Source};
use crate::retry::{RetryExecutor, RetryPolicy};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[async_trait]
pub trait SourceConnector: Send + Sync {
    fn source(&self) -> Source;

    /// Query the upstream. Not found is `Ok(vec![])`.
    async fn search(
        &self,
        query: &Query,
        options: &SearchOptions,
    ) -> Result<Vec<RawCandidate>, ResolveError>;

    /// One cheap request to check the service answers at all.
    async fn probe(&self, timeout: Duration, cancel: &CancellationToken)
        -> Result<(), ResolveError>;
}

/// Decodes one response body into candidates. Never touches the network.
pub trait ParseSource {
    fn parse(&self, body: &str) -> Result<Vec<RawCandidate>, ResolveError>;
}

// ============================================================================
// UpstreamClient
// ============================================================================

/// HTTP access shared by all connectors: gated by family, retried per policy.
#[derive(Clone)]
pub struct UpstreamClient {
    http: Arc<dyn HttpClient>,
    executor: RetryExecutor,
}

impl UpstreamClient {
    pub fn new(http: Arc<dyn HttpClient>, executor: RetryExecutor) -> Self {
        Self { http, executor }
    }

    /// Send a request built fresh for each attempt and return the body of a
    /// successful response.
    pub async fn fetch<F>(
        &self,
        source: Source,
        cancel: &CancellationToken,
        build: F,
    ) -> Result<String, ResolveError>
    where
        F: Fn() -> HttpRequest,
    {
        let response: HttpResponse = self
            .executor
            .run(source.family(), cancel, || {
                let http = Arc::clone(&self.http);
                let request = build();
                async move {
                    debug!(
                        target: "skyresolve.connector",
                        source = source.as_str(),
                        url = %request.url,
                        "Calling upstream"
                    );
                    let response = http.execute(request).await?;
                    debug!(
                        target: "skyresolve.connector",
                        source = source.as_str(),
                        status = response.status,
                        bytes = response.body.len(),
                        "Upstream answered"
                    );
                    response.error_for_status(source.as_str())
                }
            })
            .await?;
        Ok(response.body)
    }

    /// Single attempt used by availability probes. Any completed exchange
    /// below HTTP 500 counts as reachable.
    pub async fn probe(
        &self,
        source: Source,
        request: HttpRequest,
    ) -> Result<(), ResolveError> {
        let cancel = request.cancel.clone();
        let response = self
            .executor
            .run_with_policy(source.family(), &cancel, RetryPolicy::none(), || {
                let http = Arc::clone(&self.http);
                let request = request.clone();
                async move { http.execute(request).await }
            })
            .await?;
        if response.status >= 500 {
            return Err(ResolveError::upstream(
                response.status,
                format!("{} probe returned HTTP {}", source, response.status),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Connectors keyed by source.
#[derive(Default, Clone)]
pub struct ConnectorRegistry {
    connectors: BTreeMap<Source, Arc<dyn SourceConnector>>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The five standard connectors sharing one upstream client.
    pub fn standard(config: &ResolverConfig, upstream: UpstreamClient) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(sesame::SesameConnector::new(
            upstream.clone(),
            &config.endpoints.sesame,
        )));
        registry.register(Arc::new(simbad::SimbadConnector::new(
            upstream.clone(),
            &config.endpoints.simbad_tap,
        )));
        registry.register(Arc::new(vizier::VizierConnector::new(
            upstream.clone(),
            &config.endpoints.vizier,
            config.vizier.clone(),
        )));
        registry.register(Arc::new(ned::NedConnector::new(
            upstream.clone(),
            &config.endpoints.ned,
        )));
        registry.register(Arc::new(mpc::MpcConnector::new(
            upstream,
            &config.endpoints.mpc_identifier,
            &config.endpoints.mpc_observations,
        )));
        registry
    }

    /// Replaces any connector already registered for the same source.
    pub fn register(&mut self, connector: Arc<dyn SourceConnector>) {
        self.connectors.insert(connector.source(), connector);
    }

    pub fn get(&self, source: Source) -> Option<&Arc<dyn SourceConnector>> {
        self.connectors.get(&source)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Source, &Arc<dyn SourceConnector>)> {
        self.connectors.iter()
    }
}

// ============================================================================
// Shared parsing helpers
// ============================================================================

/// Parse a numeric field, treating blanks and placeholders as missing.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed.eq_ignore_ascii_case("nan") {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Leading numeric part of a value like `"3.44g"` or `"12.1 B"`.
pub(crate) fn leading_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let end = trimmed
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || ((*c == '-' || *c == '+') && *i == 0)))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    parse_number(&trimmed[..end])
}
