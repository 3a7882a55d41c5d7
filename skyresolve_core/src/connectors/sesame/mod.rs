//! CDS Sesame name resolver.

mod parse;

pub use parse::SesameParser;

use super::{ParseSource, SourceConnector, UpstreamClient};
use crate::error::ResolveError;
use crate::federated::SearchOptions;
use crate::http::HttpRequest;
use crate::model::{Query, RawCandidate, Source};
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct SesameConnector {
    upstream: UpstreamClient,
    base_url: String,
}

impl SesameConnector {
    pub fn new(upstream: UpstreamClient, base_url: &str) -> Self {
        Self {
            upstream,
            base_url: base_url.trim_end_matches('?').to_string(),
        }
    }

    fn lookup_url(&self, name: &str) -> String {
        format!("{}?{}", self.base_url, urlencoding::encode(name.trim()))
    }
}

#[async_trait]
impl SourceConnector for SesameConnector {
    fn source(&self) -> Source {
        Source::Sesame
    }

    async fn search(
        &self,
        query: &Query,
        options: &SearchOptions,
    ) -> Result<Vec<RawCandidate>, ResolveError> {
        let url = self.lookup_url(query.lookup_text());
        let body = self
            .upstream
            .fetch(Source::Sesame, &options.cancel, || {
                HttpRequest::get(url.clone(), options.timeout, &options.cancel)
            })
            .await?;
        SesameParser.parse(&body)
    }

    async fn probe(&self, timeout: Duration, cancel: &CancellationToken) -> Result<(), ResolveError> {
        let request = HttpRequest::get(self.lookup_url("M1"), timeout, cancel);
        self.upstream.probe(Source::Sesame, request).await
    }
}
