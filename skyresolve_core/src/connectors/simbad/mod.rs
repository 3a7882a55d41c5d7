//! SIMBAD via its TAP synchronous endpoint.

mod parse;

pub use parse::SimbadParser;

use super::{ParseSource, SourceConnector, UpstreamClient};
use crate::coords::Coordinate;
use crate::error::ResolveError;
use crate::federated::SearchOptions;
use crate::http::HttpRequest;
use crate::model::{Query, RawCandidate, Source};
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Columns every query selects, in the order the parser expects to find
/// them by name.
const SELECT_COLUMNS: &str = "b.main_id, b.ra, b.dec, b.otype, b.sp_type, f.V, \
     b.galdim_majaxis, b.galdim_minaxis, b.morph_type, b.rvz_redshift, s.ids";

const JOINS: &str = "LEFT JOIN allfluxes AS f ON f.oidref = b.oid \
     LEFT JOIN ids AS s ON s.oidref = b.oid";

/// Upper bound on rows for identifier lookups; one object normally matches.
const IDENT_TOP: usize = 10;

pub struct SimbadConnector {
    upstream: UpstreamClient,
    tap_url: String,
}

impl SimbadConnector {
    pub fn new(upstream: UpstreamClient, tap_url: &str) -> Self {
        Self {
            upstream,
            tap_url: tap_url.to_string(),
        }
    }

    fn query_url(&self, adql: &str) -> String {
        format!(
            "{}?request=doQuery&lang=adql&format=json&query={}",
            self.tap_url,
            urlencoding::encode(adql)
        )
    }

    async fn run_adql(
        &self,
        adql: String,
        parser: SimbadParser,
        options: &SearchOptions,
    ) -> Result<Vec<RawCandidate>, ResolveError> {
        let url = self.query_url(&adql);
        let body = self
            .upstream
            .fetch(Source::Simbad, &options.cancel, || {
                HttpRequest::get(url.clone(), options.timeout, &options.cancel)
            })
            .await?;
        parser.parse(&body)
    }
}

/// ADQL lookup of one identifier through the `ident` table.
pub fn identifier_adql(identifier: &str) -> String {
    format!(
        "SELECT TOP {} {} FROM basic AS b JOIN ident AS i ON i.oidref = b.oid {} WHERE i.id = '{}'",
        IDENT_TOP,
        SELECT_COLUMNS,
        JOINS,
        escape_adql(identifier.trim())
    )
}

/// ADQL cone search ordered by distance from the centre.
pub fn cone_adql(center: &Coordinate, radius_deg: f64, limit: usize) -> String {
    format!(
        "SELECT TOP {limit} {cols} FROM basic AS b {joins} \
         WHERE CONTAINS(POINT('ICRS', b.ra, b.dec), CIRCLE('ICRS', {ra}, {dec}, {r})) = 1 \
         ORDER BY DISTANCE(POINT('ICRS', b.ra, b.dec), POINT('ICRS', {ra}, {dec})) ASC",
        limit = limit.max(1),
        cols = SELECT_COLUMNS,
        joins = JOINS,
        ra = center.ra,
        dec = center.dec,
        r = radius_deg,
    )
}

fn escape_adql(raw: &str) -> String {
    raw.replace('\'', "''")
}

#[async_trait]
impl SourceConnector for SimbadConnector {
    fn source(&self) -> Source {
        Source::Simbad
    }

    async fn search(
        &self,
        query: &Query,
        options: &SearchOptions,
    ) -> Result<Vec<RawCandidate>, ResolveError> {
        match query.coordinate {
            Some(center) => {
                let adql = cone_adql(&center, options.radius_deg, options.limit);
                let parser = SimbadParser::cone(center, options.radius_deg);
                self.run_adql(adql, parser, options).await
            }
            None => {
                let adql = identifier_adql(query.lookup_text());
                self.run_adql(adql, SimbadParser::identifier(), options)
                    .await
            }
        }
    }

    async fn probe(&self, timeout: Duration, cancel: &CancellationToken) -> Result<(), ResolveError> {
        let request = HttpRequest::get(
            self.query_url("SELECT TOP 1 main_id FROM basic"),
            timeout,
            cancel,
        );
        self.upstream.probe(Source::Simbad, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_adql_escapes_quotes() {
        let adql = identifier_adql("Barnard's Star");
        assert!(adql.contains("i.id = 'Barnard''s Star'"));
        assert!(adql.starts_with("SELECT TOP 10 b.main_id"));
    }

    #[test]
    fn test_cone_adql_uses_contains_circle() {
        let adql = cone_adql(&Coordinate { ra: 10.68, dec: 41.27 }, 0.5, 5);
        assert!(adql.contains("CIRCLE('ICRS', 10.68, 41.27, 0.5)"));
        assert!(adql.contains("TOP 5"));
        assert!(adql.contains("ORDER BY DISTANCE"));
    }
}
