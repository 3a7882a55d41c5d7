//! Equatorial coordinates: parsing, sexagesimal formatting and angular
//! separation.

use crate::error::ResolveError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;
const RAD_TO_DEG: f64 = 180.0 / std::f64::consts::PI;
const HOURS_TO_DEG: f64 = 15.0;
pub const ARCSEC_PER_DEG: f64 = 3600.0;

static RA_HMS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{1,2})\s*[hH:\s]\s*(\d{1,2})\s*[mM:\s]\s*(\d{1,2}(?:\.\d+)?)\s*[sS]?\s*$")
        .expect("RA pattern is valid")
});

static DEC_DMS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^\s*([+-]?\d{1,2})\s*[dD°:\s]\s*(\d{1,2})\s*[mM':\s]\s*(\d{1,2}(?:\.\d+)?)\s*(?:"|''|[sS])?\s*$"#,
    )
    .expect("Dec pattern is valid")
});

/// A J2000 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub ra: f64,
    pub dec: f64,
}

impl Coordinate {
    /// Validated constructor: RA in [0, 360), Dec in [-90, 90].
    pub fn new(ra: f64, dec: f64) -> Result<Self, ResolveError> {
        if !ra.is_finite() || !(0.0..360.0).contains(&ra) {
            return Err(ResolveError::InvalidInput(format!(
                "RA out of range [0, 360): {}",
                ra
            )));
        }
        if !dec.is_finite() || !(-90.0..=90.0).contains(&dec) {
            return Err(ResolveError::InvalidInput(format!(
                "Dec out of range [-90, 90]: {}",
                dec
            )));
        }
        Ok(Self { ra, dec })
    }

    /// Parse an RA/Dec pair where each half is decimal degrees or
    /// sexagesimal (`00h42m44.3s`, `00:42:44.3`, `+41d16m09s`).
    pub fn parse(ra: &str, dec: &str) -> Result<Self, ResolveError> {
        Self::new(parse_ra(ra)?, parse_dec(dec)?)
    }

    pub fn separation_arcsec(&self, other: &Coordinate) -> f64 {
        angular_separation_deg(self.ra, self.dec, other.ra, other.dec) * ARCSEC_PER_DEG
    }
}

/// Great-circle distance in degrees (Vincenty formula, stable for both
/// tiny and antipodal separations).
pub fn angular_separation_deg(ra1: f64, dec1: f64, ra2: f64, dec2: f64) -> f64 {
    let (d1_sin, d1_cos) = (dec1 * DEG_TO_RAD).sin_cos();
    let (d2_sin, d2_cos) = (dec2 * DEG_TO_RAD).sin_cos();
    let (dl_sin, dl_cos) = ((ra2 - ra1) * DEG_TO_RAD).sin_cos();

    let num1 = d2_cos * dl_sin;
    let num2 = d1_cos * d2_sin - d1_sin * d2_cos * dl_cos;
    let denom = d1_sin * d2_sin + d1_cos * d2_cos * dl_cos;

    num1.hypot(num2).atan2(denom) * RAD_TO_DEG
}

/// Parse right ascension given as hours-minutes-seconds or decimal degrees.
pub fn parse_ra(raw: &str) -> Result<f64, ResolveError> {
    if let Some(caps) = RA_HMS.captures(raw) {
        let h = parse_component(&caps[1])?;
        let m = parse_component(&caps[2])?;
        let s = parse_component(&caps[3])?;
        if h >= 24.0 || m >= 60.0 || s >= 60.0 {
            return Err(ResolveError::InvalidInput(format!(
                "Invalid HMS components: {}h {}m {}s",
                h, m, s
            )));
        }
        return Ok((h + m / 60.0 + s / 3600.0) * HOURS_TO_DEG);
    }

    let deg = parse_component(raw.trim())?;
    if !(0.0..360.0).contains(&deg) {
        return Err(ResolveError::InvalidInput(format!(
            "RA out of range [0, 360): {}",
            deg
        )));
    }
    Ok(deg)
}

/// Parse declination given as degrees-minutes-seconds or decimal degrees.
pub fn parse_dec(raw: &str) -> Result<f64, ResolveError> {
    if let Some(caps) = DEC_DMS.captures(raw) {
        let d_str = &caps[1];
        let d = parse_component(d_str)?;
        let m = parse_component(&caps[2])?;
        let s = parse_component(&caps[3])?;
        if m >= 60.0 || s >= 60.0 {
            return Err(ResolveError::InvalidInput(format!(
                "Invalid DMS components: {} {}' {}\"",
                d, m, s
            )));
        }
        // Sign from the text so that -00 keeps its sign.
        let sign = if d_str.starts_with('-') { -1.0 } else { 1.0 };
        let value = sign * (d.abs() + m / 60.0 + s / 3600.0);
        if !(-90.0..=90.0).contains(&value) {
            return Err(ResolveError::InvalidInput(format!(
                "Dec out of range [-90, 90]: {}",
                value
            )));
        }
        return Ok(value);
    }

    let deg = parse_component(raw.trim())?;
    if !(-90.0..=90.0).contains(&deg) {
        return Err(ResolveError::InvalidInput(format!(
            "Dec out of range [-90, 90]: {}",
            deg
        )));
    }
    Ok(deg)
}

fn parse_component(raw: &str) -> Result<f64, ResolveError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ResolveError::InvalidInput(format!("Not a number: '{}'", raw)))
}

/// Format RA (degrees) as `HHh MMm SS.SSs`.
pub fn format_ra_hms(ra_deg: f64) -> String {
    let centis = (ra_deg.rem_euclid(360.0) / HOURS_TO_DEG * 360_000.0).round() as u64 % 8_640_000;
    let h = centis / 360_000;
    let m = (centis / 6_000) % 60;
    let s = (centis % 6_000) as f64 / 100.0;
    format!("{:02}h {:02}m {:05.2}s", h, m, s)
}

/// Format Dec (degrees) as `±DD° MM' SS.S"`.
pub fn format_dec_dms(dec_deg: f64) -> String {
    let sign = if dec_deg < 0.0 { '-' } else { '+' };
    let decis = (dec_deg.abs() * 36_000.0).round() as u64;
    let d = decis / 36_000;
    let m = (decis / 600) % 60;
    let s = (decis % 600) as f64 / 10.0;
    format!("{}{:02}° {:02}' {:04.1}\"", sign, d, m, s)
}
