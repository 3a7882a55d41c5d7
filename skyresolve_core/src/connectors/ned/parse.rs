//! NED VOTable output: `FIELD` descriptors followed by `TR`/`TD` rows.

use crate::connectors::{leading_number, parse_number, ParseSource};
use crate::error::ResolveError;
use crate::model::{RawCandidate, Source};
use crate::object_types;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

const NED_BYNAME_URL: &str = "https://ned.ipac.caltech.edu/byname?objname=";

struct Fields {
    name: usize,
    ra: usize,
    dec: usize,
    otype: Option<usize>,
    redshift: Option<usize>,
    magnitude: Option<usize>,
}

impl Fields {
    fn resolve(names: &[String]) -> Option<Self> {
        let exact = |wanted: &str| names.iter().position(|n| n.eq_ignore_ascii_case(wanted));
        let prefixed = |prefix: &str| {
            names
                .iter()
                .position(|n| n.to_ascii_uppercase().starts_with(prefix))
        };
        Some(Self {
            name: exact("Object Name")?,
            ra: prefixed("RA")?,
            dec: prefixed("DEC")?,
            otype: exact("Type"),
            redshift: exact("Redshift"),
            magnitude: exact("Magnitude and Filter"),
        })
    }

    fn to_candidate(&self, cells: &[String]) -> Option<RawCandidate> {
        let cell = |idx: usize| cells.get(idx).map(|c| c.trim()).filter(|c| !c.is_empty());

        let name = cell(self.name)?;
        let ra = cell(self.ra).and_then(parse_number)?;
        let dec = cell(self.dec).and_then(parse_number)?;
        let (label, category) =
            object_types::lookup(Source::Ned, self.otype.and_then(cell).unwrap_or(""));

        Some(
            RawCandidate::new(Source::Ned, name, ra, dec)
                .with_type(label, category)
                .with_redshift(self.redshift.and_then(cell).and_then(parse_number))
                .with_magnitude(self.magnitude.and_then(cell).and_then(leading_number))
                .with_url(format!("{}{}", NED_BYNAME_URL, urlencoding::encode(name))),
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NedParser;

impl ParseSource for NedParser {
    fn parse(&self, body: &str) -> Result<Vec<RawCandidate>, ResolveError> {
        let mut reader = Reader::from_str(body);
        reader.trim_text(true);

        let mut saw_votable = false;
        let mut field_names: Vec<String> = Vec::new();
        let mut fields: Option<Fields> = None;
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut row: Option<Vec<String>> = None;
        let mut in_cell = false;
        let mut buffer = Vec::new();

        loop {
            match reader.read_event_into(&mut buffer) {
                Ok(Event::Start(ref e)) => match e.name().as_ref() {
                    b"VOTABLE" => saw_votable = true,
                    b"FIELD" => field_names.push(field_name(e)),
                    b"TR" => row = Some(Vec::new()),
                    b"TD" => {
                        in_cell = true;
                        if let Some(r) = row.as_mut() {
                            r.push(String::new());
                        }
                    }
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                    b"FIELD" => field_names.push(field_name(e)),
                    b"TD" => {
                        if let Some(r) = row.as_mut() {
                            r.push(String::new());
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(ref e)) => {
                    if in_cell {
                        let text = e
                            .unescape()
                            .map_err(|err| ResolveError::parse(format!("NED text: {}", err)))?;
                        if let Some(cell) = row.as_mut().and_then(|r| r.last_mut()) {
                            cell.push_str(&text);
                        }
                    }
                }
                Ok(Event::End(ref e)) => match e.name().as_ref() {
                    b"TD" => in_cell = false,
                    b"TR" => rows.extend(row.take()),
                    b"TABLE" => {
                        if fields.is_none() {
                            fields = Fields::resolve(&field_names);
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(err) => {
                    return Err(ResolveError::parse(format!(
                        "NED VOTable at byte {}: {}",
                        reader.buffer_position(),
                        err
                    )))
                }
                _ => {}
            }
            buffer.clear();
        }

        if !saw_votable {
            return Err(ResolveError::parse("NED response is not a VOTable"));
        }
        // Not-found answers carry an error INFO and no table at all.
        if field_names.is_empty() {
            return Ok(Vec::new());
        }
        let fields = match fields.or_else(|| Fields::resolve(&field_names)) {
            Some(f) => f,
            None => {
                return Err(ResolveError::parse(
                    "NED VOTable lacks name or position fields",
                ))
            }
        };

        Ok(rows.iter().filter_map(|r| fields.to_candidate(r)).collect())
    }
}

fn field_name(e: &quick_xml::events::BytesStart<'_>) -> String {
    e.attributes()
        .filter_map(Result::ok)
        .find(|a| a.key.as_ref() == b"name")
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_types::Category;

    const M31: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<VOTABLE version="v1.1">
<RESOURCE>
<TABLE name="NED_MainTable">
<FIELD name="No." datatype="int"/>
<FIELD name="Object Name" datatype="char" arraysize="30"/>
<FIELD name="RA(deg)" datatype="double" unit="degrees"/>
<FIELD name="DEC(deg)" datatype="double" unit="degrees"/>
<FIELD name="Type" datatype="char"/>
<FIELD name="Velocity" datatype="double"/>
<FIELD name="Redshift" datatype="double"/>
<FIELD name="Redshift Flag" datatype="char"/>
<FIELD name="Magnitude and Filter" datatype="char"/>
<DATA><TABLEDATA>
<TR><TD>1</TD><TD>MESSIER 031</TD><TD>10.68479</TD><TD>41.26906</TD><TD>G</TD><TD>-300</TD><TD>-0.001001</TD><TD/><TD>4.36</TD></TR>
<TR><TD>2</TD><TD>3C 273</TD><TD>187.27792</TD><TD>2.05239</TD><TD>QSO</TD><TD></TD><TD>0.158339</TD><TD></TD><TD>12.9 V</TD></TR>
</TABLEDATA></DATA>
</TABLE>
</RESOURCE>
</VOTABLE>
"#;

    const NOT_FOUND: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<VOTABLE version="v1.1">
<INFO name="Error" value="The object name you have entered is not currently recognized by NED."/>
</VOTABLE>
"#;

    #[test]
    fn test_parses_rows() {
        let candidates = NedParser.parse(M31).unwrap();
        assert_eq!(candidates.len(), 2);

        let m31 = &candidates[0];
        assert_eq!(m31.name, "MESSIER 031");
        assert_eq!(m31.canonical_id, "MESSIER031");
        assert_eq!(m31.category, Category::Galaxy);
        assert_eq!(m31.redshift, Some(-0.001001));
        assert_eq!(m31.magnitude, Some(4.36));
        assert_eq!(m31.confidence, 0.72);

        let quasar = &candidates[1];
        assert_eq!(quasar.category, Category::Quasar);
        assert_eq!(quasar.magnitude, Some(12.9));
    }

    #[test]
    fn test_not_found_is_empty() {
        assert!(NedParser.parse(NOT_FOUND).unwrap().is_empty());
    }

    #[test]
    fn test_html_is_parse_error() {
        let err = NedParser.parse("<html><body>maintenance</body></html>").unwrap_err();
        assert!(matches!(err, ResolveError::Parse(_)));
    }
}
