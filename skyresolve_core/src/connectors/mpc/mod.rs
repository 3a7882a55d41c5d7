//! Minor Planet Center: identifier resolution, then latest observation.

mod parse;

pub use parse::{parse_identifier, MpcIdentity, MpcObservationParser};

use super::{ParseSource, SourceConnector, UpstreamClient};
use crate::error::ResolveError;
use crate::federated::SearchOptions;
use crate::http::HttpRequest;
use crate::model::{Query, RawCandidate, Source};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub struct MpcConnector {
    upstream: UpstreamClient,
    identifier_url: String,
    observations_url: String,
}

impl MpcConnector {
    pub fn new(upstream: UpstreamClient, identifier_url: &str, observations_url: &str) -> Self {
        Self {
            upstream,
            identifier_url: identifier_url.to_string(),
            observations_url: observations_url.to_string(),
        }
    }

    /// Stage 1. `Ok(None)` when the MPC does not know the designator.
    pub async fn resolve_identity(
        &self,
        designator: &str,
        options: &SearchOptions,
    ) -> Result<Option<MpcIdentity>, ResolveError> {
        let body = self
            .upstream
            .fetch(Source::Mpc, &options.cancel, || {
                HttpRequest::get(self.identifier_url.clone(), options.timeout, &options.cancel)
                    .header("Content-Type", "text/plain")
                    .body(designator)
            })
            .await?;
        parse_identifier(&body)
    }

    /// Stage 2.
    async fn latest_position(
        &self,
        identity: MpcIdentity,
        options: &SearchOptions,
    ) -> Result<Vec<RawCandidate>, ResolveError> {
        let Some(designation) = identity.primary_designation().map(str::to_string) else {
            return Ok(Vec::new());
        };
        let payload = json!({
            "desigs": [designation],
            "output_format": ["ADES_DF"],
        });
        let body = self
            .upstream
            .fetch(Source::Mpc, &options.cancel, || {
                HttpRequest::get(self.observations_url.clone(), options.timeout, &options.cancel)
                    .json_body(&payload)
            })
            .await?;
        MpcObservationParser::new(identity).parse(&body)
    }
}

#[async_trait]
impl SourceConnector for MpcConnector {
    fn source(&self) -> Source {
        Source::Mpc
    }

    async fn search(
        &self,
        query: &Query,
        options: &SearchOptions,
    ) -> Result<Vec<RawCandidate>, ResolveError> {
        let designator = query.lookup_text();
        let Some(identity) = self.resolve_identity(designator, options).await? else {
            debug!(target: "skyresolve.connector", source = "mpc", designator, "Not known to the MPC");
            return Ok(Vec::new());
        };

        let candidates = self.latest_position(identity, options).await?;
        if candidates.is_empty() {
            debug!(
                target: "skyresolve.connector",
                source = "mpc",
                designator,
                "No observation with a usable position"
            );
        }
        Ok(candidates)
    }

    async fn probe(&self, timeout: Duration, cancel: &CancellationToken) -> Result<(), ResolveError> {
        let request = HttpRequest::get(self.identifier_url.clone(), timeout, cancel)
            .header("Content-Type", "text/plain")
            .body("433");
        self.upstream.probe(Source::Mpc, request).await
    }
}
