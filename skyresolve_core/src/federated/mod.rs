//! Federated resolution across the upstream sources.
//!
//! This module provides:
//! - `Orchestrator`: per-kind source strategies with failure isolation
//! - `consolidate`: cross-source merge and trust ordering
//! - `SearchOptions` / `SearchResponse`: the request and response types
//!
//! # Example
//!
//! ```ignore
//! use skyresolve_core::federated::{consolidate, Orchestrator, SearchOptions};
//!
//! let engine = Orchestrator::new(registry);
//! let raw = engine.run(&query, &SearchOptions::default()).await?;
//! let merged = consolidate(raw.candidates, 10);
//! ```

mod consolidate;
mod engine;
mod types;

pub use consolidate::{consolidate, merge, same_object, Consolidated, MERGE_RADIUS_ARCSEC};
pub use engine::{Orchestration, Orchestrator};
pub use types::{
    AvailabilityReport, CoordinateSearch, SearchOptions, SearchResponse, SourceError,
    SourceErrorKind,
};
