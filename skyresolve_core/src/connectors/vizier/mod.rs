//! VizieR catalogue cross-match (`asu-tsv` output).

mod parse;

pub use parse::VizierParser;

use super::{ParseSource, SourceConnector, UpstreamClient};
use crate::config::VizierSettings;
use crate::error::ResolveError;
use crate::federated::SearchOptions;
use crate::http::HttpRequest;
use crate::model::{Query, RawCandidate, Source};
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct VizierConnector {
    upstream: UpstreamClient,
    base_url: String,
    settings: VizierSettings,
}

impl VizierConnector {
    pub fn new(upstream: UpstreamClient, base_url: &str, settings: VizierSettings) -> Self {
        Self {
            upstream,
            base_url: base_url.to_string(),
            settings,
        }
    }

    /// Cross-match URL around a target name.
    pub fn crossmatch_url(&self, target: &str, max_rows: u32) -> String {
        let mut url = format!(
            "{}?-c={}&-c.rs={}&-out.max={}&-out.add=_RAJ,_DEJ&-oc.form=d&-sort=_r",
            self.base_url,
            urlencoding::encode(target.trim()),
            self.settings.radius_arcsec,
            max_rows
        );
        for catalog in &self.settings.catalogs {
            url.push_str("&-source=");
            url.push_str(&urlencoding::encode(catalog));
        }
        url
    }
}

#[async_trait]
impl SourceConnector for VizierConnector {
    fn source(&self) -> Source {
        Source::Vizier
    }

    async fn search(
        &self,
        query: &Query,
        options: &SearchOptions,
    ) -> Result<Vec<RawCandidate>, ResolveError> {
        let target = query.lookup_text();
        let url = self.crossmatch_url(target, self.settings.max_rows);
        let body = self
            .upstream
            .fetch(Source::Vizier, &options.cancel, || {
                HttpRequest::get(url.clone(), options.timeout, &options.cancel)
            })
            .await?;
        VizierParser::new(target).parse(&body)
    }

    async fn probe(&self, timeout: Duration, cancel: &CancellationToken) -> Result<(), ResolveError> {
        let request = HttpRequest::get(self.crossmatch_url("M1", 1), timeout, cancel);
        self.upstream.probe(Source::Vizier, request).await
    }
}
