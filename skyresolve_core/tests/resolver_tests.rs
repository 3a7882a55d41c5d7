use async_trait::async_trait;
use skyresolve_core::federated::SourceErrorKind;
use skyresolve_core::http::{HttpClient, HttpRequest, HttpResponse};
use skyresolve_core::model::Family;
use skyresolve_core::{
    Category, CoordinateSearch, ObjectResolver, QueryKind, ResolveError, ResolverConfig,
    SearchOptions, Source,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Scripted transport
// ============================================================================

type Responder = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, ResolveError> + Send + Sync>;

const SESAME: &str = "nph-sesame";
const SIMBAD: &str = "sim-tap";
const VIZIER: &str = "asu-tsv";
const NED: &str = "objsearch";
const MPC_ID: &str = "query-identifier";
const MPC_OBS: &str = "get-obs";

/// Answers by URL substring. Anything unrouted is a connection failure.
#[derive(Default)]
struct ScriptedClient {
    routes: Vec<(&'static str, Responder)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new() -> Self {
        Self::default()
    }

    fn route<F>(mut self, pattern: &'static str, respond: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, ResolveError> + Send + Sync + 'static,
    {
        self.routes.push((pattern, Box::new(respond)));
        self
    }

    fn ok(self, pattern: &'static str, body: impl Into<String>) -> Self {
        let body = body.into();
        self.route(pattern, move |_| Ok(HttpResponse::new(200, body.clone())))
    }

    fn status(self, pattern: &'static str, status: u16) -> Self {
        self.route(pattern, move |_| Ok(HttpResponse::new(status, "unavailable")))
    }

    fn calls_to(&self, pattern: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.contains(pattern))
            .count()
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpClient for ScriptedClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ResolveError> {
        self.calls.lock().unwrap().push(request.url.clone());
        match self.routes.iter().find(|(p, _)| request.url.contains(p)) {
            Some((_, respond)) => respond(&request),
            None => Err(ResolveError::network(format!(
                "connection refused: {}",
                request.url
            ))),
        }
    }
}

fn resolver(client: &Arc<ScriptedClient>) -> ObjectResolver {
    ObjectResolver::with_client(client.clone(), ResolverConfig::default()).unwrap()
}

// ============================================================================
// Fixtures
// ============================================================================

const SESAME_M31: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Sesame>
<Target option="SNV">
  <name>M31</name>
  <Resolver name="S=Simbad (via url):    2ms">
    <otype>G</otype>
    <jradeg>10.6847</jradeg>
    <jdedeg>41.2689</jdedeg>
    <oname>M 31</oname>
  </Resolver>
  <Resolver name="N=NED (local):    0ms">
    <otype>G</otype>
    <jradeg>10.6848</jradeg>
    <jdedeg>41.2690</jdedeg>
    <oname>Andromeda Galaxy</oname>
  </Resolver>
</Target>
</Sesame>
"#;

const SESAME_NOT_FOUND: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Sesame>
<Target option="SNV">
  <name>unknown</name>
  <Resolver name="S=Simbad (via url):    1ms">
    <INFO>*** Not found</INFO>
  </Resolver>
</Target>
</Sesame>
"#;

const SIMBAD_METADATA: &str = r#"[
    {"name":"main_id","datatype":"char"},
    {"name":"ra","datatype":"double"},
    {"name":"dec","datatype":"double"},
    {"name":"otype","datatype":"char"},
    {"name":"sp_type","datatype":"char"},
    {"name":"V","datatype":"double"},
    {"name":"galdim_majaxis","datatype":"real"},
    {"name":"morph_type","datatype":"char"},
    {"name":"rvz_redshift","datatype":"double"},
    {"name":"ids","datatype":"char"}
]"#;

fn simbad_body(rows: &str) -> String {
    format!(r#"{{"metadata":{},"data":{}}}"#, SIMBAD_METADATA, rows)
}

fn simbad_empty() -> String {
    simbad_body("[]")
}

const VIZIER_EMPTY: &str = "#\n# No table found\n#\n";

const NED_NOT_FOUND: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<VOTABLE version="v1.1">
<INFO name="Error" value="The object name you have entered is not currently recognized by NED."/>
</VOTABLE>
"#;

const MPC_NOT_FOUND: &str = r#"{"found": 0}"#;

fn empty_everywhere() -> ScriptedClient {
    ScriptedClient::new()
        .ok(SESAME, SESAME_NOT_FOUND)
        .ok(SIMBAD, simbad_empty())
        .ok(VIZIER, VIZIER_EMPTY)
        .ok(NED, NED_NOT_FOUND)
        .ok(MPC_ID, MPC_NOT_FOUND)
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_sesame_blocks_merge_into_one_object() {
    let client = Arc::new(
        ScriptedClient::new()
            .ok(SESAME, SESAME_M31)
            .ok(SIMBAD, simbad_empty())
            .ok(VIZIER, VIZIER_EMPTY)
            .ok(NED, NED_NOT_FOUND),
    );
    let response = resolver(&client)
        .search_by_name("M31", &SearchOptions::default())
        .await
        .unwrap();

    assert_eq!(response.kind, QueryKind::Name);
    assert_eq!(response.results.len(), 1);
    let m31 = &response.results[0];
    assert_eq!(m31.name, "M 31");
    assert!(m31.alternate_names.contains("Andromeda Galaxy"));
    assert_eq!(m31.category, Category::Galaxy);
    assert!(response.errors.is_empty());
    assert_eq!(client.calls_to(MPC_ID), 0);
}

#[tokio::test(start_paused = true)]
async fn test_coordinate_search_only_calls_simbad() {
    let client = Arc::new(empty_everywhere().ok(
        SIMBAD,
        simbad_body(
            r#"[["M  31", 10.684708, 41.26875, "G", null, 3.44, 199.53, "SA(s)b", -0.001, "M  31|NGC   224"]]"#,
        ),
    ));
    let search = CoordinateSearch::new(10.68, 41.27).with_radius(0.5);
    let response = resolver(&client)
        .search_by_coordinates(search, &SearchOptions::default())
        .await
        .unwrap();

    assert_eq!(response.kind, QueryKind::Coordinate);
    assert_eq!(response.sources_used, vec![Source::Simbad]);
    assert_eq!(client.calls_to(SIMBAD), 1);
    assert_eq!(client.calls_to(VIZIER), 0);
    assert_eq!(client.calls_to(NED), 0);
    assert_eq!(client.calls_to(SESAME), 0);
}

#[tokio::test(start_paused = true)]
async fn test_positionless_minor_body_yields_nothing() {
    let client = Arc::new(
        empty_everywhere()
            .ok(
                MPC_ID,
                r#"{"found": 1, "object_type": ["Minor planet", 0],
                    "unpacked_primary_provisional_designation": "2024 AB"}"#,
            )
            .ok(
                MPC_OBS,
                r#"[{"ADES_DF": [{"obstime": "2024-01-02T03:04:05Z", "ra": "", "dec": ""}]}]"#,
            ),
    );
    let response = resolver(&client)
        .search_by_name("2024 AB", &SearchOptions::default())
        .await
        .unwrap();

    assert_eq!(response.kind, QueryKind::MinorBody);
    assert!(response.results.is_empty());
    assert!(response.errors.is_empty());
    assert_eq!(
        response.sources_used,
        vec![Source::Mpc, Source::Sesame, Source::Simbad]
    );
    assert_eq!(client.calls_to(MPC_OBS), 1);
}

#[tokio::test(start_paused = true)]
async fn test_every_source_down_is_not_an_error() {
    let client = Arc::new(ScriptedClient::new());
    let response = resolver(&client)
        .search_by_name("M31", &SearchOptions::default())
        .await
        .unwrap();

    assert!(response.results.is_empty());
    assert_eq!(response.errors.len(), 5);
    assert!(response
        .errors
        .iter()
        .all(|e| e.kind == SourceErrorKind::Network));
    assert!(response.all_failed());
    // one retry each
    assert_eq!(client.calls_to(SESAME), 2);
    assert_eq!(client.calls_to(MPC_ID), 2);
}

// ============================================================================
// Properties
// ============================================================================

const SIRIUS_SIMBAD: &str = r#"[["* alf CMa", 101.28715533, -16.71611586, "SB*", "A1V+DA", -1.46, null, null, -0.000018, "* alf CMa|HIP 32349|HD 48915|NAME Sirius"]]"#;

const SIRIUS_VIZIER: &str = "#Name: I/239/hip_main\n\
_RAJ2000\t_DEJ2000\tHIP\tVmag\tSpType\n\
deg\tdeg\t\tmag\t\n\
----------\t----------\t------\t-----\t------\n\
101.28715533\t-16.71611586\t32349\t-1.44\tA0m...\n";

#[tokio::test(start_paused = true)]
async fn test_simbad_outranks_vizier_for_same_star() {
    let client = Arc::new(
        empty_everywhere()
            .ok(SIMBAD, simbad_body(SIRIUS_SIMBAD))
            .ok(VIZIER, SIRIUS_VIZIER),
    );
    let response = resolver(&client)
        .search_by_name("Sirius", &SearchOptions::default())
        .await
        .unwrap();

    assert_eq!(response.results.len(), 1);
    let sirius = &response.results[0];
    assert_eq!(sirius.source, Source::Simbad);
    assert_eq!(sirius.name, "* alf CMa");
    assert_eq!(sirius.magnitude, Some(-1.46));
    assert_eq!(sirius.sources, vec![Source::Simbad, Source::Vizier]);
    assert!(sirius.alternate_names.contains("HIP 32349"));
}

#[tokio::test(start_paused = true)]
async fn test_late_mpc_answer_sorts_first() {
    let client = Arc::new(
        empty_everywhere()
            .ok(
                VIZIER,
                "_RAJ2000\t_DEJ2000\tName\n\
deg\tdeg\t\n\
---\t---\t---\n\
50.0\t10.0\tField 7\n",
            )
            .ok(
                MPC_ID,
                r#"{"found": 1, "object_type": ["Minor planet", 0], "permid": "1", "name": "Ceres",
                    "unpacked_primary_provisional_designation": "A801 AA"}"#,
            )
            .ok(
                MPC_OBS,
                r#"[{"ADES_DF": [{"obstime": "2024-05-01T03:00:00Z", "ra": 200.0, "dec": -10.0, "mag": 8.9, "stn": "I41"}]}]"#,
            ),
    );
    let response = resolver(&client)
        .search_by_name("Ceres", &SearchOptions::default())
        .await
        .unwrap();

    let order: Vec<Source> = response.results.iter().map(|o| o.source).collect();
    assert_eq!(order, vec![Source::Mpc, Source::Vizier]);
    assert_eq!(response.results[0].name, "1 Ceres");
    assert_eq!(response.results[0].category, Category::Asteroid);
    assert_eq!(response.total_count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_search_is_stable() {
    let client = Arc::new(
        empty_everywhere()
            .ok(SESAME, SESAME_M31)
            .ok(SIMBAD, simbad_body(SIRIUS_SIMBAD))
            .ok(VIZIER, SIRIUS_VIZIER),
    );
    let resolver = resolver(&client);
    let first = resolver
        .search_by_name("M31", &SearchOptions::default())
        .await
        .unwrap();
    let second = resolver
        .search_by_name("M31", &SearchOptions::default())
        .await
        .unwrap();

    assert_eq!(first.results, second.results);
    assert_eq!(first.sources_used, second.sources_used);
    assert_eq!(first.results.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_partial_failure_keeps_other_results() {
    let client = Arc::new(
        empty_everywhere()
            .status(SESAME, 503)
            .ok(SIMBAD, simbad_body(SIRIUS_SIMBAD)),
    );
    let response = resolver(&client)
        .search_by_name("Sirius", &SearchOptions::default())
        .await
        .unwrap();

    assert_eq!(response.results.len(), 1);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].source, Source::Sesame);
    assert_eq!(response.errors[0].kind, SourceErrorKind::Upstream);
    assert!(!response.sources_used.contains(&Source::Sesame));
    assert_eq!(client.calls_to(SESAME), 2);
}

#[tokio::test(start_paused = true)]
async fn test_cds_calls_are_spaced() {
    let client = Arc::new(
        empty_everywhere()
            .ok(SESAME, SESAME_M31)
            .ok(SIMBAD, simbad_body(SIRIUS_SIMBAD))
            .ok(VIZIER, SIRIUS_VIZIER),
    );
    let resolver = resolver(&client);
    resolver
        .search_by_name("M31", &SearchOptions::default())
        .await
        .unwrap();

    let starts = resolver.gates().gate(Family::Cds).call_starts().await;
    assert_eq!(starts.len(), 3);
    for pair in starts.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(200));
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_search() {
    let client = Arc::new(empty_everywhere().route(SESAME, |request| {
        request.cancel.cancel();
        Err(ResolveError::Cancelled)
    }));
    let err = resolver(&client)
        .search_by_name("M31", &SearchOptions::default())
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(client.total_calls(), 1);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let client = Arc::new(empty_everywhere());
    let options = SearchOptions::default();
    options.cancel.cancel();
    let err = resolver(&client)
        .search_by_name("M31", &options)
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::Cancelled));
    assert_eq!(client.total_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_resolve_single_skips_supplementary_sources() {
    let client = Arc::new(empty_everywhere().ok(SESAME, SESAME_M31));
    let m31 = resolver(&client).resolve_single("M31").await.unwrap();

    assert_eq!(m31.name, "M 31");
    assert_eq!(client.calls_to(VIZIER), 0);
    assert_eq!(client.calls_to(NED), 0);
}

#[tokio::test(start_paused = true)]
async fn test_resolve_single_swallows_failures() {
    let client = Arc::new(ScriptedClient::new());
    assert!(resolver(&client).resolve_single("M31").await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_availability_isolates_failures() {
    let client = Arc::new(
        ScriptedClient::new()
            .ok(SESAME, SESAME_NOT_FOUND)
            .status(SIMBAD, 503)
            .status(NED, 404)
            .ok(MPC_ID, MPC_NOT_FOUND),
    );
    let report = resolver(&client).check_availability().await;

    assert!(report.local);
    assert!(report.is_available(Source::Sesame));
    assert!(!report.is_available(Source::Simbad));
    assert!(!report.is_available(Source::Vizier));
    assert!(report.is_available(Source::Ned));
    assert!(report.is_available(Source::Mpc));
    assert_eq!(report.available_count(), 3);
    assert!(report.errors.contains_key(&Source::Vizier));
    // probes are never retried
    assert_eq!(client.calls_to(SIMBAD), 1);
}
