//! NASA/IPAC Extragalactic Database object search.

mod parse;

pub use parse::NedParser;

use super::{ParseSource, SourceConnector, UpstreamClient};
use crate::error::ResolveError;
use crate::federated::SearchOptions;
use crate::http::HttpRequest;
use crate::model::{Query, RawCandidate, Source};
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct NedConnector {
    upstream: UpstreamClient,
    base_url: String,
}

impl NedConnector {
    pub fn new(upstream: UpstreamClient, base_url: &str) -> Self {
        Self {
            upstream,
            base_url: base_url.to_string(),
        }
    }

    fn by_name_url(&self, name: &str) -> String {
        format!(
            "{}?objname={}&extend=no&of=xml_main&img_stamp=NO",
            self.base_url,
            urlencoding::encode(name.trim())
        )
    }
}

#[async_trait]
impl SourceConnector for NedConnector {
    fn source(&self) -> Source {
        Source::Ned
    }

    async fn search(
        &self,
        query: &Query,
        options: &SearchOptions,
    ) -> Result<Vec<RawCandidate>, ResolveError> {
        let url = self.by_name_url(query.lookup_text());
        let body = self
            .upstream
            .fetch(Source::Ned, &options.cancel, || {
                HttpRequest::get(url.clone(), options.timeout, &options.cancel)
            })
            .await?;
        NedParser.parse(&body)
    }

    async fn probe(&self, timeout: Duration, cancel: &CancellationToken) -> Result<(), ResolveError> {
        let request = HttpRequest::get(self.by_name_url("M1"), timeout, cancel);
        self.upstream.probe(Source::Ned, request).await
    }
}
