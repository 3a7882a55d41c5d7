//! SIMBAD TAP JSON output: a `metadata` list of column descriptors and a
//! `data` list of row arrays.

use crate::connectors::ParseSource;
use crate::coords::Coordinate;
use crate::error::ResolveError;
use crate::model::{RawCandidate, Source};
use crate::object_types;
use serde::Deserialize;
use serde_json::Value;

const SIMBAD_ID_URL: &str = "https://simbad.cds.unistra.fr/simbad/sim-id?Ident=";

#[derive(Debug, Deserialize)]
struct TapResponse {
    metadata: Vec<TapColumn>,
    data: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct TapColumn {
    name: String,
}

/// Column positions resolved from the metadata block.
struct Columns {
    main_id: usize,
    ra: usize,
    dec: usize,
    otype: Option<usize>,
    sp_type: Option<usize>,
    v_mag: Option<usize>,
    major_axis: Option<usize>,
    morph_type: Option<usize>,
    redshift: Option<usize>,
    ids: Option<usize>,
}

impl Columns {
    fn resolve(metadata: &[TapColumn]) -> Result<Self, ResolveError> {
        let find = |name: &str| {
            metadata
                .iter()
                .position(|c| c.name.eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                ResolveError::parse(format!("SIMBAD response lacks column '{}'", name))
            })
        };
        Ok(Self {
            main_id: require("main_id")?,
            ra: require("ra")?,
            dec: require("dec")?,
            otype: find("otype"),
            sp_type: find("sp_type"),
            v_mag: find("V"),
            major_axis: find("galdim_majaxis"),
            morph_type: find("morph_type"),
            redshift: find("rvz_redshift"),
            ids: find("ids"),
        })
    }
}

fn text_at(row: &[Value], idx: Option<usize>) -> Option<String> {
    row.get(idx?)?
        .as_str()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn number_at(row: &[Value], idx: Option<usize>) -> Option<f64> {
    let value = match row.get(idx?)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    value.filter(|v: &f64| v.is_finite())
}

/// Parser for one SIMBAD query. A cone parser scales confidence down with
/// distance from the search centre.
#[derive(Debug, Clone, Copy)]
pub struct SimbadParser {
    cone: Option<(Coordinate, f64)>,
}

impl SimbadParser {
    pub fn identifier() -> Self {
        Self { cone: None }
    }

    pub fn cone(center: Coordinate, radius_deg: f64) -> Self {
        Self {
            cone: Some((center, radius_deg)),
        }
    }

    fn confidence_at(&self, ra: f64, dec: f64) -> f64 {
        let base = Source::Simbad.base_confidence();
        match self.cone {
            Some((center, radius)) if radius > 0.0 => {
                let distance = center.separation_arcsec(&Coordinate { ra, dec }) / 3600.0;
                base * (1.0 - 0.5 * (distance / radius).min(1.0))
            }
            _ => base,
        }
    }

    fn row_to_candidate(&self, row: &[Value], cols: &Columns) -> Option<RawCandidate> {
        let main_id = text_at(row, Some(cols.main_id))?;
        let ra = number_at(row, Some(cols.ra))?;
        let dec = number_at(row, Some(cols.dec))?;

        let ids = text_at(row, cols.ids).unwrap_or_default();
        let mut designations: Vec<&str> = vec![main_id.as_str()];
        designations.extend(ids.split('|').map(str::trim).filter(|s| !s.is_empty()));

        let otype = text_at(row, cols.otype).unwrap_or_default();
        let (label, category) = object_types::lookup(Source::Simbad, &otype);

        Some(
            RawCandidate::new(Source::Simbad, &main_id, ra, dec)
                .with_designations(&designations)
                .with_type(label, category)
                .with_confidence(self.confidence_at(ra, dec))
                .with_magnitude(number_at(row, cols.v_mag))
                .with_angular_size(number_at(row, cols.major_axis))
                .with_redshift(number_at(row, cols.redshift))
                .with_spectral_type(text_at(row, cols.sp_type))
                .with_morphological_type(text_at(row, cols.morph_type))
                .with_url(format!("{}{}", SIMBAD_ID_URL, urlencoding::encode(&main_id))),
        )
    }
}

impl ParseSource for SimbadParser {
    fn parse(&self, body: &str) -> Result<Vec<RawCandidate>, ResolveError> {
        let response: TapResponse = serde_json::from_str(body)
            .map_err(|e| ResolveError::parse(format!("SIMBAD TAP JSON: {}", e)))?;
        let cols = Columns::resolve(&response.metadata)?;

        Ok(response
            .data
            .iter()
            .filter_map(|row| self.row_to_candidate(row, &cols))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_types::Category;

    const METADATA: &str = r#"[
        {"name":"main_id","datatype":"char"},
        {"name":"ra","datatype":"double","unit":"deg"},
        {"name":"dec","datatype":"double","unit":"deg"},
        {"name":"otype","datatype":"char"},
        {"name":"sp_type","datatype":"char"},
        {"name":"V","datatype":"double"},
        {"name":"galdim_majaxis","datatype":"real","unit":"arcmin"},
        {"name":"galdim_minaxis","datatype":"real","unit":"arcmin"},
        {"name":"morph_type","datatype":"char"},
        {"name":"rvz_redshift","datatype":"double"},
        {"name":"ids","datatype":"char"}
    ]"#;

    fn body(rows: &str) -> String {
        format!(r#"{{"metadata":{},"data":{}}}"#, METADATA, rows)
    }

    #[test]
    fn test_identifier_row() {
        let json = body(
            r#"[["M  31", 10.684708, 41.26875, "AGN", null, 3.44, 199.53, 70.79, "SA(s)b", -0.001, "M  31|NGC   224|NAME Andromeda Galaxy|UGC 454"]]"#,
        );
        let candidates = SimbadParser::identifier().parse(&json).unwrap();
        assert_eq!(candidates.len(), 1);

        let m31 = &candidates[0];
        assert_eq!(m31.name, "M 31");
        assert_eq!(m31.canonical_id, "M31");
        assert_eq!(m31.category, Category::ActiveGalaxy);
        assert_eq!(m31.magnitude, Some(3.44));
        assert_eq!(m31.angular_size, Some(199.53));
        assert_eq!(m31.redshift, Some(-0.001));
        assert!(m31.spectral_type.is_none());
        assert_eq!(m31.identifiers.len(), 4);
        assert!(m31.identifiers.contains("ngc 224"));
        assert_eq!(m31.confidence, 0.92);
    }

    #[test]
    fn test_empty_result() {
        assert!(SimbadParser::identifier().parse(&body("[]")).unwrap().is_empty());
    }

    #[test]
    fn test_rows_without_position_are_skipped() {
        let json = body(r#"[["X 1", null, null, "*", null, null, null, null, null, null, "X 1"]]"#);
        assert!(SimbadParser::identifier().parse(&json).unwrap().is_empty());
    }

    #[test]
    fn test_cone_confidence_decays_with_distance() {
        let center = Coordinate { ra: 10.0, dec: 0.0 };
        let parser = SimbadParser::cone(center, 1.0);
        let json = body(
            r#"[["A", 10.0, 0.0, "*", "G2V", null, null, null, null, null, "A"],
                ["B", 10.5, 0.0, "*", null, null, null, null, null, null, "B"]]"#,
        );
        let candidates = parser.parse(&json).unwrap();
        assert!((candidates[0].confidence - 0.92).abs() < 1e-9);
        assert!((candidates[1].confidence - 0.92 * 0.75).abs() < 1e-6);
        assert_eq!(candidates[0].spectral_type.as_deref(), Some("G2V"));
    }

    #[test]
    fn test_missing_required_column() {
        let json = r#"{"metadata":[{"name":"main_id"}],"data":[]}"#;
        let err = SimbadParser::identifier().parse(json).unwrap_err();
        assert!(matches!(err, ResolveError::Parse(_)));
    }

    #[test]
    fn test_non_json_is_parse_error() {
        let err = SimbadParser::identifier()
            .parse("<VOTABLE>error</VOTABLE>")
            .unwrap_err();
        assert!(matches!(err, ResolveError::Parse(_)));
    }
}
