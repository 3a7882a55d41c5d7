//! Federated search execution engine.
//!
//! Picks the source strategy for a classified query, runs the connectors in
//! the order the strategy demands, and isolates per-source failures.

use super::{SearchOptions, SourceError};
use crate::connectors::ConnectorRegistry;
use crate::error::ResolveError;
use crate::model::{Query, QueryKind, RawCandidate, Source};
use std::time::Instant;
use tracing::{debug, warn};

/// Everything the connectors produced for one query.
#[derive(Debug, Default)]
pub struct Orchestration {
    /// Raw candidates in call order.
    pub candidates: Vec<RawCandidate>,
    pub errors: Vec<SourceError>,
    /// Sources that completed without error, in call order.
    pub sources_used: Vec<Source>,
}

impl Orchestration {
    /// Fold one connector outcome in. Only cancellation escapes.
    fn record(
        &mut self,
        source: Source,
        outcome: Result<Vec<RawCandidate>, ResolveError>,
    ) -> Result<(), ResolveError> {
        match outcome {
            Ok(candidates) => {
                self.sources_used.push(source);
                self.candidates.extend(candidates);
                Ok(())
            }
            Err(err) => match SourceError::from_error(source, &err) {
                Some(source_error) => {
                    warn!(
                        target: "skyresolve.engine",
                        source = source.as_str(),
                        error = %err,
                        "Source failed; continuing without it"
                    );
                    self.errors.push(source_error);
                    Ok(())
                }
                None => Err(err),
            },
        }
    }

    fn produced_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }
}

/// Engine for executing per-kind source strategies.
pub struct Orchestrator {
    registry: ConnectorRegistry,
}

impl Orchestrator {
    pub fn new(registry: ConnectorRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ConnectorRegistry {
        &self.registry
    }

    /// Run the strategy for `query.kind`.
    ///
    /// - coordinate: SIMBAD only.
    /// - minor-body: MPC, then Sesame, then SIMBAD, one after another.
    /// - name: Sesame then SIMBAD; afterwards VizieR and NED concurrently,
    ///   joined by MPC when neither Sesame nor SIMBAD produced a candidate.
    pub async fn run(
        &self,
        query: &Query,
        options: &SearchOptions,
    ) -> Result<Orchestration, ResolveError> {
        if options.cancel.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }

        let mut out = Orchestration::default();
        match query.kind {
            QueryKind::Coordinate => {
                self.sequential(&[Source::Simbad], query, options, &mut out)
                    .await?;
            }
            QueryKind::MinorBody => {
                self.sequential(
                    &[Source::Mpc, Source::Sesame, Source::Simbad],
                    query,
                    options,
                    &mut out,
                )
                .await?;
            }
            QueryKind::Name => {
                self.sequential(&[Source::Sesame, Source::Simbad], query, options, &mut out)
                    .await?;

                let mut supplements = vec![Source::Vizier, Source::Ned];
                if !out.produced_candidates() {
                    supplements.push(Source::Mpc);
                }
                self.concurrent(&supplements, query, options, &mut out)
                    .await?;
            }
        }

        Ok(out)
    }

    async fn sequential(
        &self,
        sources: &[Source],
        query: &Query,
        options: &SearchOptions,
        out: &mut Orchestration,
    ) -> Result<(), ResolveError> {
        for &source in sources {
            if let Some(outcome) = self.invoke(source, query, options).await {
                out.record(source, outcome)?;
            }
        }
        Ok(())
    }

    /// Start every source at once; outcomes are recorded in `sources` order
    /// regardless of completion order.
    async fn concurrent(
        &self,
        sources: &[Source],
        query: &Query,
        options: &SearchOptions,
        out: &mut Orchestration,
    ) -> Result<(), ResolveError> {
        let futures: Vec<_> = sources
            .iter()
            .map(|&source| self.invoke(source, query, options))
            .collect();
        let outcomes = futures::future::join_all(futures).await;

        for (&source, outcome) in sources.iter().zip(outcomes) {
            if let Some(outcome) = outcome {
                out.record(source, outcome)?;
            }
        }
        Ok(())
    }

    /// `None` when the source is excluded by the options or not registered.
    async fn invoke(
        &self,
        source: Source,
        query: &Query,
        options: &SearchOptions,
    ) -> Option<Result<Vec<RawCandidate>, ResolveError>> {
        if !options.includes(source) {
            return None;
        }
        let connector = self.registry.get(source)?;
        if options.cancel.is_cancelled() {
            return Some(Err(ResolveError::Cancelled));
        }

        let start = Instant::now();
        let outcome = connector.search(query, options).await;
        debug!(
            target: "skyresolve.engine",
            source = source.as_str(),
            ok = outcome.is_ok(),
            candidates = outcome.as_ref().map(Vec::len).unwrap_or(0),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Source finished"
        );
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::SourceConnector;
    use crate::coords::Coordinate;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    type Outcome = fn(Source) -> Result<Vec<RawCandidate>, ResolveError>;

    struct FakeConnector {
        source: Source,
        outcome: Outcome,
        delay: Duration,
        calls: Arc<Mutex<Vec<Source>>>,
    }

    #[async_trait]
    impl SourceConnector for FakeConnector {
        fn source(&self) -> Source {
            self.source
        }

        async fn search(
            &self,
            _query: &Query,
            _options: &SearchOptions,
        ) -> Result<Vec<RawCandidate>, ResolveError> {
            self.calls.lock().unwrap().push(self.source);
            tokio::time::sleep(self.delay).await;
            (self.outcome)(self.source)
        }

        async fn probe(
            &self,
            _timeout: Duration,
            _cancel: &CancellationToken,
        ) -> Result<(), ResolveError> {
            Ok(())
        }
    }

    fn one(source: Source) -> Result<Vec<RawCandidate>, ResolveError> {
        let offset = source.trust_rank() as f64 * 10.0;
        Ok(vec![RawCandidate::new(source, source.as_str(), offset, 0.0)])
    }

    fn none(_: Source) -> Result<Vec<RawCandidate>, ResolveError> {
        Ok(Vec::new())
    }

    fn down(_: Source) -> Result<Vec<RawCandidate>, ResolveError> {
        Err(ResolveError::network("connection refused"))
    }

    fn cancelled(_: Source) -> Result<Vec<RawCandidate>, ResolveError> {
        Err(ResolveError::Cancelled)
    }

    struct Harness {
        engine: Orchestrator,
        calls: Arc<Mutex<Vec<Source>>>,
    }

    impl Harness {
        fn new(setup: &[(Source, Outcome, u64)]) -> Self {
            let calls = Arc::new(Mutex::new(Vec::new()));
            let mut registry = ConnectorRegistry::new();
            for &(source, outcome, delay_ms) in setup {
                registry.register(Arc::new(FakeConnector {
                    source,
                    outcome,
                    delay: Duration::from_millis(delay_ms),
                    calls: Arc::clone(&calls),
                }));
            }
            Self {
                engine: Orchestrator::new(registry),
                calls,
            }
        }

        fn all(outcome: Outcome) -> Self {
            let setup: Vec<_> = Source::ALL.iter().map(|&s| (s, outcome, 0)).collect();
            Self::new(&setup)
        }

        fn calls(&self) -> Vec<Source> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[tokio::test]
    async fn test_coordinate_queries_only_simbad() {
        let harness = Harness::all(one);
        let query = Query::coordinate("10.68 41.27", Coordinate { ra: 10.68, dec: 41.27 });
        let out = harness
            .engine
            .run(&query, &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(harness.calls(), vec![Source::Simbad]);
        assert_eq!(out.sources_used, vec![Source::Simbad]);
    }

    #[tokio::test]
    async fn test_minor_body_order() {
        let harness = Harness::all(one);
        let query = Query::minor_body("2024 AB", "2024 AB");
        harness
            .engine
            .run(&query, &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(
            harness.calls(),
            vec![Source::Mpc, Source::Sesame, Source::Simbad]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_name_stage_two_order_is_fixed() {
        let harness = Harness::new(&[
            (Source::Sesame, one, 0),
            (Source::Simbad, one, 0),
            (Source::Vizier, one, 300),
            (Source::Ned, one, 10),
            (Source::Mpc, one, 0),
        ]);
        let out = harness
            .engine
            .run(&Query::name("M31"), &SearchOptions::default())
            .await
            .unwrap();

        let calls = harness.calls();
        assert_eq!(&calls[..2], &[Source::Sesame, Source::Simbad]);
        assert!(!calls.contains(&Source::Mpc));
        let order: Vec<Source> = out.candidates.iter().map(|c| c.source).collect();
        assert_eq!(
            order,
            vec![Source::Sesame, Source::Simbad, Source::Vizier, Source::Ned]
        );
    }

    #[tokio::test]
    async fn test_name_falls_back_to_mpc_when_unresolved() {
        let harness = Harness::new(&[
            (Source::Sesame, none, 0),
            (Source::Simbad, none, 0),
            (Source::Vizier, none, 0),
            (Source::Ned, none, 0),
            (Source::Mpc, one, 0),
        ]);
        let out = harness
            .engine
            .run(&Query::name("Ceres"), &SearchOptions::default())
            .await
            .unwrap();
        assert!(harness.calls().contains(&Source::Mpc));
        assert_eq!(out.candidates.len(), 1);
        assert_eq!(out.candidates[0].source, Source::Mpc);
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let harness = Harness::new(&[
            (Source::Sesame, down, 0),
            (Source::Simbad, one, 0),
            (Source::Vizier, none, 0),
            (Source::Ned, none, 0),
        ]);
        let out = harness
            .engine
            .run(&Query::name("M31"), &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].source, Source::Sesame);
        assert_eq!(
            out.sources_used,
            vec![Source::Simbad, Source::Vizier, Source::Ned]
        );
        assert_eq!(out.candidates.len(), 1);
    }

    #[tokio::test]
    async fn test_cancellation_aborts_search() {
        let harness = Harness::new(&[(Source::Sesame, cancelled, 0), (Source::Simbad, one, 0)]);
        let err = harness
            .engine
            .run(&Query::name("M31"), &SearchOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(harness.calls(), vec![Source::Sesame]);
    }

    #[tokio::test]
    async fn test_cancelled_before_dispatch() {
        let harness = Harness::all(one);
        let options = SearchOptions::default();
        options.cancel.cancel();
        let err = harness
            .engine
            .run(&Query::name("M31"), &options)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(harness.calls().is_empty());
    }

    #[tokio::test]
    async fn test_source_filter() {
        let harness = Harness::all(one);
        let options = SearchOptions::default().with_sources([Source::Simbad, Source::Ned]);
        let out = harness
            .engine
            .run(&Query::name("M31"), &options)
            .await
            .unwrap();
        assert_eq!(out.sources_used, vec![Source::Simbad, Source::Ned]);
    }
}
