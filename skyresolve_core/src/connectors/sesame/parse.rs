//! Sesame `-oxp` XML output.
//!
//! One `<Resolver>` block per database that answered. Blocks without a
//! position (the `*** Not found` case) are skipped.

use crate::connectors::{parse_number, ParseSource};
use crate::coords::{parse_dec, parse_ra};
use crate::error::ResolveError;
use crate::model::{RawCandidate, Source};
use crate::object_types;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

const SIMBAD_ID_URL: &str = "https://simbad.cds.unistra.fr/simbad/sim-id?Ident=";

#[derive(Debug, Default)]
struct ResolverBlock {
    resolver: String,
    oname: Option<String>,
    otype: Option<String>,
    jpos: Option<String>,
    jradeg: Option<String>,
    jdedeg: Option<String>,
    mtype: Option<String>,
    aliases: Vec<String>,
    /// (band, value) in document order
    mags: Vec<(String, f64)>,
}

impl ResolverBlock {
    fn position(&self) -> Option<(f64, f64)> {
        let decimal = self
            .jradeg
            .as_deref()
            .and_then(parse_number)
            .zip(self.jdedeg.as_deref().and_then(parse_number));
        if decimal.is_some() {
            return decimal;
        }
        let jpos = self.jpos.as_deref()?;
        let mut halves = jpos.split_whitespace();
        let ra = parse_ra(halves.next()?).ok()?;
        let dec = parse_dec(halves.next()?).ok()?;
        Some((ra, dec))
    }

    fn magnitude(&self) -> Option<f64> {
        self.mags
            .iter()
            .find(|(band, _)| band.eq_ignore_ascii_case("V"))
            .or_else(|| self.mags.first())
            .map(|(_, v)| *v)
    }

    fn into_candidate(self, target_name: &str) -> Option<RawCandidate> {
        let (ra, dec) = self.position()?;
        let name = self
            .oname
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| target_name.to_string());

        let mut designations: Vec<&str> = vec![name.as_str()];
        designations.extend(self.aliases.iter().map(String::as_str));

        let (label, category) = object_types::lookup(Source::Sesame, self.otype.as_deref().unwrap_or(""));
        let mut candidate = RawCandidate::new(Source::Sesame, &name, ra, dec)
            .with_designations(&designations)
            .with_type(label, category)
            .with_magnitude(self.magnitude())
            .with_morphological_type(self.mtype.clone())
            .with_url(format!("{}{}", SIMBAD_ID_URL, urlencoding::encode(&name)));
        if !self.resolver.is_empty() {
            candidate = candidate.with_description(format!("Resolved by Sesame via {}", self.resolver));
        }
        Some(candidate)
    }
}

/// `S=Simbad (via url):    1ms` -> `Simbad`
fn resolver_label(raw: &str) -> String {
    let after_eq = raw.split_once('=').map(|(_, rest)| rest).unwrap_or(raw);
    after_eq
        .split(|c: char| c == '(' || c == ':')
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SesameParser;

impl ParseSource for SesameParser {
    fn parse(&self, body: &str) -> Result<Vec<RawCandidate>, ResolveError> {
        let mut reader = Reader::from_str(body);
        reader.trim_text(true);

        let mut candidates = Vec::new();
        let mut saw_root = false;
        let mut target_name = String::new();
        let mut block: Option<ResolverBlock> = None;
        let mut current_tag: Option<String> = None;
        let mut mag_band: Option<String> = None;
        let mut buffer = Vec::new();

        loop {
            match reader.read_event_into(&mut buffer) {
                Ok(Event::Start(ref e)) => {
                    let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    match tag_name.as_str() {
                        "Sesame" => saw_root = true,
                        "Resolver" => {
                            let mut resolver = String::new();
                            for attr in e.attributes().filter_map(Result::ok) {
                                if attr.key.as_ref() == b"name" {
                                    resolver = resolver_label(&String::from_utf8_lossy(&attr.value));
                                }
                            }
                            block = Some(ResolverBlock {
                                resolver,
                                ..ResolverBlock::default()
                            });
                        }
                        "mag" => {
                            mag_band = e
                                .attributes()
                                .filter_map(Result::ok)
                                .find(|a| a.key.as_ref() == b"band")
                                .map(|a| String::from_utf8_lossy(&a.value).to_string());
                        }
                        _ => {}
                    }
                    current_tag = Some(tag_name);
                }
                Ok(Event::Text(ref e)) => {
                    if let Some(tag) = current_tag.as_deref() {
                        let text = e
                            .unescape()
                            .map_err(|err| ResolveError::parse(format!("Sesame text: {}", err)))?
                            .to_string();

                        match block.as_mut() {
                            None if tag == "name" => target_name = text,
                            None => {}
                            Some(b) => match tag {
                                "oname" => b.oname = Some(text),
                                "otype" => b.otype = Some(text),
                                "jpos" => b.jpos = Some(text),
                                "jradeg" => b.jradeg = Some(text),
                                "jdedeg" => b.jdedeg = Some(text),
                                "MType" => b.mtype = Some(text),
                                "alias" => b.aliases.push(text),
                                "v" => {
                                    if let (Some(band), Some(value)) =
                                        (mag_band.as_ref(), parse_number(&text))
                                    {
                                        b.mags.push((band.clone(), value));
                                    }
                                }
                                _ => {}
                            },
                        }
                    }
                }
                Ok(Event::End(ref e)) => {
                    match e.name().as_ref() {
                        b"Resolver" => {
                            if let Some(finished) = block.take() {
                                candidates.extend(finished.into_candidate(&target_name));
                            }
                        }
                        b"mag" => mag_band = None,
                        _ => {}
                    }
                    current_tag = None;
                }
                Ok(Event::Eof) => break,
                Err(err) => {
                    return Err(ResolveError::parse(format!(
                        "Sesame XML at byte {}: {}",
                        reader.buffer_position(),
                        err
                    )))
                }
                _ => {}
            }
            buffer.clear();
        }

        if !saw_root {
            return Err(ResolveError::parse("Sesame response has no <Sesame> root"));
        }
        Ok(candidates)
    }
}
