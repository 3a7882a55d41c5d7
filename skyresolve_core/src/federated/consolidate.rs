//! Cross-source consolidation.
//!
//! Candidates are folded in arrival order. A candidate joins the first group
//! it matches; otherwise it starts a new group. Groups are then ordered by
//! the trust rank of their most authoritative contributor.

use crate::canonical::NameSet;
use crate::coords::{format_dec_dms, format_ra_hms};
use crate::model::{RawCandidate, ResolvedObject};
use crate::object_types::Category;

/// Positions closer than this are the same object.
pub const MERGE_RADIUS_ARCSEC: f64 = 5.0;

/// Consolidated groups, truncated to the limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Consolidated {
    pub objects: Vec<ResolvedObject>,
    /// Groups before truncation.
    pub total_count: usize,
}

/// Same canonical id, a shared identifier, or positions within
/// [`MERGE_RADIUS_ARCSEC`].
pub fn same_object(group: &ResolvedObject, candidate: &ResolvedObject) -> bool {
    if !group.canonical_id.is_empty() && group.canonical_id == candidate.canonical_id {
        return true;
    }
    if group.identifiers.intersects(&candidate.identifiers) {
        return true;
    }
    group.coordinate().separation_arcsec(&candidate.coordinate()) <= MERGE_RADIUS_ARCSEC
}

fn type_is_known(object: &ResolvedObject) -> bool {
    !(object.category == Category::Other && object.object_type == Category::Other.label())
}

/// Merge two records of the same object into a new one. Scalars come from
/// the more trusted record (`earlier` on ties); gaps are filled from the
/// other one.
pub fn merge(earlier: &ResolvedObject, later: &ResolvedObject) -> ResolvedObject {
    let (primary, secondary) = if later.trust_rank() < earlier.trust_rank() {
        (later, earlier)
    } else {
        (earlier, later)
    };

    let mut identifiers = primary.identifiers.clone();
    identifiers.extend_from(&secondary.identifiers);

    let mut alternate_names = NameSet::new();
    if !primary.identifiers.is_empty() {
        alternate_names.insert(&primary.name);
    }
    alternate_names.extend_from(&earlier.alternate_names);
    alternate_names.extend_from(&later.alternate_names);

    let mut sources = earlier.sources.clone();
    for source in &later.sources {
        if !sources.contains(source) {
            sources.push(*source);
        }
    }

    let (object_type, category) = if type_is_known(primary) || !type_is_known(secondary) {
        (primary.object_type.clone(), primary.category)
    } else {
        (secondary.object_type.clone(), secondary.category)
    };

    ResolvedObject {
        name: primary.name.clone(),
        canonical_id: if primary.canonical_id.is_empty() {
            secondary.canonical_id.clone()
        } else {
            primary.canonical_id.clone()
        },
        identifiers,
        alternate_names,
        ra: primary.ra,
        dec: primary.dec,
        ra_hms: format_ra_hms(primary.ra),
        dec_dms: format_dec_dms(primary.dec),
        object_type,
        category,
        confidence: primary.confidence.max(secondary.confidence),
        magnitude: primary.magnitude.or(secondary.magnitude),
        angular_size: primary.angular_size.or(secondary.angular_size),
        redshift: primary.redshift.or(secondary.redshift),
        spectral_type: primary
            .spectral_type
            .clone()
            .or_else(|| secondary.spectral_type.clone()),
        morphological_type: primary
            .morphological_type
            .clone()
            .or_else(|| secondary.morphological_type.clone()),
        source_url: primary
            .source_url
            .clone()
            .or_else(|| secondary.source_url.clone()),
        description: primary
            .description
            .clone()
            .or_else(|| secondary.description.clone()),
        source: primary.source,
        sources,
    }
}

/// Fold, order by trust (stable) and truncate to `limit` (at least 1).
pub fn consolidate(candidates: Vec<RawCandidate>, limit: usize) -> Consolidated {
    let mut groups: Vec<ResolvedObject> = Vec::new();

    for candidate in candidates {
        let incoming = ResolvedObject::from_candidate(candidate);
        match groups.iter().position(|g| same_object(g, &incoming)) {
            Some(i) => {
                let merged = merge(&groups[i], &incoming);
                groups[i] = merged;
            }
            None => groups.push(incoming),
        }
    }

    groups.sort_by_key(ResolvedObject::trust_rank);
    let total_count = groups.len();
    groups.truncate(limit.max(1));

    Consolidated {
        objects: groups,
        total_count,
    }
}
