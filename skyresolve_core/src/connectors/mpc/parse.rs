//! Minor Planet Center JSON.
//!
//! Stage 1 (`query-identifier`) resolves a designator into an
//! [`MpcIdentity`]. Stage 2 (`get-obs`, ADES rows) supplies the position from
//! the most recent observation that has one.

use crate::connectors::{parse_number, ParseSource};
use crate::coords::Coordinate;
use crate::error::ResolveError;
use crate::model::{RawCandidate, Source};
use crate::object_types::Category;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

const MPC_OBJECT_URL: &str = "https://minorplanetcenter.net/db_search/show_object?object_id=";

/// What stage 1 knows about a body.
#[derive(Debug, Clone, PartialEq)]
pub struct MpcIdentity {
    pub permid: Option<String>,
    pub name: Option<String>,
    pub provisional: Option<String>,
    pub packed_provisional: Option<String>,
    pub other_designations: Vec<String>,
    pub object_type: String,
    pub is_comet: bool,
}

impl MpcIdentity {
    /// Designation used for the stage 2 lookup.
    pub fn primary_designation(&self) -> Option<&str> {
        self.permid.as_deref().or(self.provisional.as_deref())
    }

    /// `433 Eros`, `2024 AB`, `1P/Halley`
    pub fn display_name(&self) -> String {
        match (&self.permid, &self.name) {
            (Some(id), Some(name)) if self.is_comet => format!("{}/{}", id, name),
            (Some(id), Some(name)) => format!("{} {}", id, name),
            (Some(id), None) => id.clone(),
            (None, Some(name)) => name.clone(),
            (None, None) => self.provisional.clone().unwrap_or_default(),
        }
    }

    fn designations(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        out.extend(self.permid.as_deref());
        out.extend(self.name.as_deref());
        out.extend(self.provisional.as_deref());
        out.extend(self.packed_provisional.as_deref());
        out.extend(self.other_designations.iter().map(String::as_str));
        out
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_found(value: &Value) -> bool {
    match value.get("found") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0) > 0,
        _ => false,
    }
}

/// Parse the stage 1 answer. `Ok(None)` means the MPC does not know the body.
pub fn parse_identifier(body: &str) -> Result<Option<MpcIdentity>, ResolveError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ResolveError::parse(format!("MPC identifier JSON: {}", e)))?;
    if !value.is_object() {
        return Err(ResolveError::parse("MPC identifier response is not an object"));
    }
    if !is_found(&value) {
        return Ok(None);
    }

    // `object_type` is `["Minor planet", 0]` or a bare label.
    let object_type = match value.get("object_type") {
        Some(Value::Array(items)) => items.first().and_then(Value::as_str).map(str::to_string),
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
    .unwrap_or_else(|| "Minor planet".to_string());

    let other_designations = value
        .get("unpacked_secondary_provisional_designations")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let provisional = string_field(&value, "unpacked_primary_provisional_designation")
        .or_else(|| string_field(&value, "iau_designation"));
    let is_comet = object_type.to_ascii_lowercase().contains("comet")
        || provisional.as_deref().is_some_and(|p| p.contains('/'));

    let identity = MpcIdentity {
        permid: string_field(&value, "permid"),
        name: string_field(&value, "name"),
        provisional,
        packed_provisional: string_field(&value, "packed_primary_provisional_designation"),
        other_designations,
        object_type,
        is_comet,
    };
    if identity.primary_designation().is_none() {
        return Err(ResolveError::parse("MPC identifier response has no designation"));
    }
    Ok(Some(identity))
}

/// One usable ADES observation.
struct Observation {
    time: DateTime<Utc>,
    coordinate: Coordinate,
    magnitude: Option<f64>,
    station: Option<String>,
}

fn parse_obstime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|t| t.and_utc())
}

fn number_field(row: &Value, key: &str) -> Option<f64> {
    match row.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

fn observation(row: &Value) -> Option<Observation> {
    let time = parse_obstime(row.get("obstime")?.as_str()?)?;
    let coordinate = Coordinate::new(number_field(row, "ra")?, number_field(row, "dec")?).ok()?;
    Some(Observation {
        time,
        coordinate,
        magnitude: number_field(row, "mag"),
        station: string_field(row, "stn"),
    })
}

/// ADES rows, either top level or wrapped as `[{"ADES_DF": [...]}]`.
fn observation_rows(value: &Value) -> Result<Vec<&Value>, ResolveError> {
    let items = value
        .as_array()
        .ok_or_else(|| ResolveError::parse("MPC observations response is not an array"))?;
    let mut rows = Vec::new();
    for item in items {
        match item.get("ADES_DF").and_then(Value::as_array) {
            Some(inner) => rows.extend(inner.iter()),
            None if item.get("obstime").is_some() => rows.push(item),
            None => {}
        }
    }
    Ok(rows)
}

/// Stage 2 parser bound to the identity from stage 1.
pub struct MpcObservationParser {
    identity: MpcIdentity,
}

impl MpcObservationParser {
    pub fn new(identity: MpcIdentity) -> Self {
        Self { identity }
    }
}

impl ParseSource for MpcObservationParser {
    /// Yields at most one candidate; none when no row has a usable position.
    fn parse(&self, body: &str) -> Result<Vec<RawCandidate>, ResolveError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| ResolveError::parse(format!("MPC observations JSON: {}", e)))?;

        let latest = observation_rows(&value)?
            .into_iter()
            .filter_map(observation)
            .max_by_key(|obs| obs.time);
        let Some(latest) = latest else {
            return Ok(Vec::new());
        };

        let identity = &self.identity;
        let name = identity.display_name();
        let category = if identity.is_comet {
            Category::Comet
        } else {
            Category::Asteroid
        };
        let lookup_id = identity.primary_designation().unwrap_or(&name).to_string();

        let mut description = format!(
            "Last observed {}",
            latest.time.format("%Y-%m-%d %H:%M UTC")
        );
        if let Some(station) = &latest.station {
            description.push_str(&format!(" from station {}", station));
        }

        Ok(vec![RawCandidate::new(
            Source::Mpc,
            &name,
            latest.coordinate.ra,
            latest.coordinate.dec,
        )
        .with_designations(&identity.designations())
        .with_type(identity.object_type.clone(), category)
        .with_magnitude(latest.magnitude)
        .with_description(description)
        .with_url(format!("{}{}", MPC_OBJECT_URL, urlencoding::encode(&lookup_id)))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EROS: &str = r#"{
        "found": 1,
        "object_type": ["Minor planet", 0],
        "permid": "433",
        "packed_permid": "00433",
        "name": "Eros",
        "unpacked_primary_provisional_designation": "A898 PA",
        "packed_primary_provisional_designation": "A898P00A",
        "unpacked_secondary_provisional_designations": ["1956 PC"]
    }"#;

    fn eros() -> MpcIdentity {
        parse_identifier(EROS).unwrap().unwrap()
    }

    #[test]
    fn test_identifier_found() {
        let identity = eros();
        assert_eq!(identity.permid.as_deref(), Some("433"));
        assert_eq!(identity.display_name(), "433 Eros");
        assert_eq!(identity.primary_designation(), Some("433"));
        assert!(!identity.is_comet);
        assert_eq!(identity.object_type, "Minor planet");
    }

    #[test]
    fn test_identifier_not_found() {
        assert!(parse_identifier(r#"{"found": 0}"#).unwrap().is_none());
        assert!(parse_identifier(r#"{"found": false}"#).unwrap().is_none());
    }

    #[test]
    fn test_comet_identity() {
        let body = r#"{"found": 1, "object_type": ["Comet", 1], "permid": "1P", "name": "Halley"}"#;
        let identity = parse_identifier(body).unwrap().unwrap();
        assert!(identity.is_comet);
        assert_eq!(identity.display_name(), "1P/Halley");
    }

    #[test]
    fn test_picks_most_recent_observation_with_position() {
        let body = r#"[{"ADES_DF": [
            {"obstime": "2023-01-01T00:00:00Z", "ra": "10.0", "dec": "5.0", "mag": "12.1", "stn": "F51"},
            {"obstime": "2024-03-05T02:10:00.5Z", "ra": 45.5, "dec": -3.25, "mag": 11.4, "stn": "G96"},
            {"obstime": "2024-06-01T00:00:00Z", "ra": "", "dec": ""}
        ]}]"#;
        let candidates = MpcObservationParser::new(eros()).parse(body).unwrap();
        assert_eq!(candidates.len(), 1);

        let c = &candidates[0];
        assert_eq!(c.ra, 45.5);
        assert_eq!(c.dec, -3.25);
        assert_eq!(c.magnitude, Some(11.4));
        assert_eq!(c.canonical_id, "433");
        assert_eq!(c.category, Category::Asteroid);
        assert!(c.identifiers.contains("A898 PA"));
        assert!(c.identifiers.contains("1956 PC"));
        assert_eq!(c.confidence, 0.99);
        assert!(c.description.as_deref().unwrap().contains("2024-03-05"));
    }

    #[test]
    fn test_no_usable_observation_is_empty() {
        let body = r#"[{"ADES_DF": [{"obstime": "2024-06-01T00:00:00Z", "ra": null, "dec": null}]}]"#;
        assert!(MpcObservationParser::new(eros()).parse(body).unwrap().is_empty());
        assert!(MpcObservationParser::new(eros()).parse("[]").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_observations() {
        let err = MpcObservationParser::new(eros())
            .parse(r#"{"error": "bad"}"#)
            .unwrap_err();
        assert!(matches!(err, ResolveError::Parse(_)));
    }
}
