// src/lib.rs
//! Astronomical object resolution across CDS (Sesame, SIMBAD, VizieR), NED
//! and the Minor Planet Center.
//!
//! A query is classified as a coordinate pair, a minor-body designator or a
//! free-form name, dispatched to the sources that can answer it, and the
//! per-source answers are merged into one list ordered by source trust.

pub mod canonical;
pub mod classifier;
pub mod config;
pub mod connectors;
pub mod coords;
pub mod error;
pub mod federated;
pub mod gate;
pub mod http;
pub mod model;
pub mod object_types;
pub mod resolver;
pub mod retry;

pub use crate::classifier::QueryClassifier;
pub use crate::config::{ConfigStore, ResolverConfig};
pub use crate::coords::{format_dec_dms, format_ra_hms, Coordinate};
pub use crate::error::ResolveError;
pub use crate::federated::{
    AvailabilityReport, CoordinateSearch, SearchOptions, SearchResponse, SourceError,
    SourceErrorKind,
};
pub use crate::http::{HttpClient, HttpRequest, HttpResponse};
pub use crate::model::{Query, QueryKind, ResolvedObject, Source};
pub use crate::object_types::Category;
pub use crate::resolver::ObjectResolver;
pub use tokio_util::sync::CancellationToken;
