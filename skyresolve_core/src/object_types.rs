//! Upstream object-type codes mapped to a display label and a category.

use crate::model::Source;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Star,
    DoubleStar,
    VariableStar,
    Galaxy,
    GalaxyCluster,
    OpenCluster,
    GlobularCluster,
    Nebula,
    PlanetaryNebula,
    HiiRegion,
    SupernovaRemnant,
    Quasar,
    ActiveGalaxy,
    Asteroid,
    Comet,
    Other,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Star => "Star",
            Category::DoubleStar => "Double Star",
            Category::VariableStar => "Variable Star",
            Category::Galaxy => "Galaxy",
            Category::GalaxyCluster => "Galaxy Cluster",
            Category::OpenCluster => "Open Cluster",
            Category::GlobularCluster => "Globular Cluster",
            Category::Nebula => "Nebula",
            Category::PlanetaryNebula => "Planetary Nebula",
            Category::HiiRegion => "HII Region",
            Category::SupernovaRemnant => "Supernova Remnant",
            Category::Quasar => "Quasar",
            Category::ActiveGalaxy => "Active Galaxy",
            Category::Asteroid => "Asteroid",
            Category::Comet => "Comet",
            Category::Other => "Unknown",
        }
    }
}

/// One row of a type-code table.
#[derive(Debug, Clone, Copy)]
pub struct TypeEntry {
    pub code: &'static str,
    pub label: &'static str,
    pub category: Category,
}

const fn entry(code: &'static str, label: &'static str, category: Category) -> TypeEntry {
    TypeEntry {
        code,
        label,
        category,
    }
}

/// SIMBAD object types, also returned by Sesame.
pub const CDS_TYPES: &[TypeEntry] = &[
    entry("*", "Star", Category::Star),
    entry("**", "Double Star", Category::DoubleStar),
    entry("SB*", "Spectroscopic Binary", Category::DoubleStar),
    entry("EB*", "Eclipsing Binary", Category::DoubleStar),
    entry("V*", "Variable Star", Category::VariableStar),
    entry("Ce*", "Cepheid Variable", Category::VariableStar),
    entry("RR*", "RR Lyrae Variable", Category::VariableStar),
    entry("Mi*", "Mira Variable", Category::VariableStar),
    entry("PM*", "High Proper Motion Star", Category::Star),
    entry("WD*", "White Dwarf", Category::Star),
    entry("RG*", "Red Giant", Category::Star),
    entry("C*", "Carbon Star", Category::Star),
    entry("Psr", "Pulsar", Category::Star),
    entry("G", "Galaxy", Category::Galaxy),
    entry("GiG", "Galaxy in Group", Category::Galaxy),
    entry("GiC", "Galaxy in Cluster", Category::Galaxy),
    entry("BiC", "Brightest Galaxy in Cluster", Category::Galaxy),
    entry("IG", "Interacting Galaxies", Category::Galaxy),
    entry("PaG", "Pair of Galaxies", Category::Galaxy),
    entry("SBG", "Starburst Galaxy", Category::Galaxy),
    entry("LSB", "Low Surface Brightness Galaxy", Category::Galaxy),
    entry("EmG", "Emission-line Galaxy", Category::Galaxy),
    entry("H2G", "HII Galaxy", Category::Galaxy),
    entry("rG", "Radio Galaxy", Category::ActiveGalaxy),
    entry("AGN", "Active Galactic Nucleus", Category::ActiveGalaxy),
    entry("SyG", "Seyfert Galaxy", Category::ActiveGalaxy),
    entry("Sy1", "Seyfert 1 Galaxy", Category::ActiveGalaxy),
    entry("Sy2", "Seyfert 2 Galaxy", Category::ActiveGalaxy),
    entry("LIN", "LINER Galaxy", Category::ActiveGalaxy),
    entry("BLL", "BL Lac Object", Category::ActiveGalaxy),
    entry("Bla", "Blazar", Category::ActiveGalaxy),
    entry("QSO", "Quasar", Category::Quasar),
    entry("ClG", "Cluster of Galaxies", Category::GalaxyCluster),
    entry("GrG", "Group of Galaxies", Category::GalaxyCluster),
    entry("OpC", "Open Cluster", Category::OpenCluster),
    entry("OpCl", "Open Cluster", Category::OpenCluster),
    entry("Cl*", "Star Cluster", Category::OpenCluster),
    entry("As*", "Stellar Association", Category::OpenCluster),
    entry("GlC", "Globular Cluster", Category::GlobularCluster),
    entry("GlCl", "Globular Cluster", Category::GlobularCluster),
    entry("PN", "Planetary Nebula", Category::PlanetaryNebula),
    entry("HII", "HII Region", Category::HiiRegion),
    entry("SNR", "Supernova Remnant", Category::SupernovaRemnant),
    entry("ISM", "Interstellar Medium", Category::Nebula),
    entry("RNe", "Reflection Nebula", Category::Nebula),
    entry("DNe", "Dark Nebula", Category::Nebula),
    entry("GNe", "Galactic Nebula", Category::Nebula),
    entry("Cld", "Cloud", Category::Nebula),
    entry("MoC", "Molecular Cloud", Category::Nebula),
];

/// NED object types.
pub const NED_TYPES: &[TypeEntry] = &[
    entry("*", "Star", Category::Star),
    entry("**", "Double Star", Category::DoubleStar),
    entry("*Cl", "Star Cluster", Category::OpenCluster),
    entry("G", "Galaxy", Category::Galaxy),
    entry("GPair", "Galaxy Pair", Category::Galaxy),
    entry("GTrpl", "Galaxy Triple", Category::Galaxy),
    entry("GGroup", "Group of Galaxies", Category::GalaxyCluster),
    entry("GClstr", "Cluster of Galaxies", Category::GalaxyCluster),
    entry("QSO", "Quasar", Category::Quasar),
    entry("QGroup", "Group of Quasars", Category::Quasar),
    entry("RadioS", "Radio Source", Category::Other),
    entry("IrS", "Infrared Source", Category::Other),
    entry("UvS", "Ultraviolet Source", Category::Other),
    entry("XrayS", "X-ray Source", Category::Other),
    entry("VisS", "Visual Source", Category::Other),
    entry("PN", "Planetary Nebula", Category::PlanetaryNebula),
    entry("HII", "HII Region", Category::HiiRegion),
    entry("SNR", "Supernova Remnant", Category::SupernovaRemnant),
    entry("Neb", "Nebula", Category::Nebula),
    entry("EmLS", "Emission-line Source", Category::Other),
];

/// Type table used to interpret a source's codes.
pub fn type_table(source: Source) -> &'static [TypeEntry] {
    match source {
        Source::Sesame | Source::Simbad | Source::Vizier => CDS_TYPES,
        Source::Ned => NED_TYPES,
        Source::Mpc => &[],
    }
}

/// Resolve a raw type code. Exact match first, then case-insensitive.
/// Unknown codes ending in `*` are stars; anything else keeps its raw code
/// as the label.
pub fn lookup(source: Source, code: &str) -> (String, Category) {
    let code = code.trim();
    let table = type_table(source);
    let found = table
        .iter()
        .find(|e| e.code == code)
        .or_else(|| table.iter().find(|e| e.code.eq_ignore_ascii_case(code)));

    match found {
        Some(e) => (e.label.to_string(), e.category),
        None if code.is_empty() => (Category::Other.label().to_string(), Category::Other),
        None if code.ends_with('*') => (code.to_string(), Category::Star),
        None => (code.to_string(), Category::Other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_cds_codes() {
        assert_eq!(
            lookup(Source::Simbad, "G"),
            ("Galaxy".to_string(), Category::Galaxy)
        );
        assert_eq!(lookup(Source::Sesame, "glc").1, Category::GlobularCluster);
        assert_eq!(lookup(Source::Simbad, "BY*").1, Category::Star);
    }

    #[test]
    fn test_lookup_ned_codes() {
        assert_eq!(lookup(Source::Ned, "GClstr").1, Category::GalaxyCluster);
        assert_eq!(lookup(Source::Ned, "QSO").0, "Quasar");
    }

    #[test]
    fn test_unknown_code_keeps_label() {
        assert_eq!(
            lookup(Source::Ned, "Blob"),
            ("Blob".to_string(), Category::Other)
        );
        assert_eq!(lookup(Source::Simbad, "").0, "Unknown");
    }

    #[test]
    fn test_codes_unique_per_table() {
        for table in [CDS_TYPES, NED_TYPES] {
            for (i, a) in table.iter().enumerate() {
                assert!(
                    table[i + 1..].iter().all(|b| b.code != a.code),
                    "duplicate code {}",
                    a.code
                );
            }
        }
    }
}
