#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Compile-time registry of region bounding boxes.
//!
//! Region bounds are embedded from `regions.toml` via `include_str!` and
//! parsed once on first use. The registry is a closed set: a name outside
//! it is a caller error, never a fallback to some default box.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use quakewatch_event_models::BoundingBox;
use serde::Deserialize;

/// Number of registered regions. Enforced by a test.
#[cfg(test)]
const EXPECTED_REGION_COUNT: usize = 20;

const REGIONS_TOML: &str = include_str!("../regions.toml");

/// Errors returned by region lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegionError {
    /// The (normalized) name is not in the registry.
    #[error("unknown region '{0}'")]
    NotFound(String),
}

#[derive(Debug, Deserialize)]
struct RegionFile {
    region: Vec<RegionEntry>,
}

#[derive(Debug, Deserialize)]
struct RegionEntry {
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
    min_latitude: f64,
    max_latitude: f64,
    min_longitude: f64,
    max_longitude: f64,
}

struct Registry {
    /// Canonical names in file order.
    names: Vec<String>,
    /// Normalized name or alias -> bounds.
    boxes: BTreeMap<String, BoundingBox>,
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    let file: RegionFile = toml::de::from_str(REGIONS_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded regions.toml: {e}"));

    let mut names = Vec::with_capacity(file.region.len());
    let mut boxes = BTreeMap::new();
    for entry in file.region {
        let bbox = BoundingBox::new(
            entry.min_latitude,
            entry.max_latitude,
            entry.min_longitude,
            entry.max_longitude,
        );
        for key in std::iter::once(&entry.name).chain(&entry.aliases) {
            boxes.insert(normalize(key), bbox);
        }
        names.push(entry.name);
    }

    Registry { names, boxes }
});

/// Lower-cases and trims a region name.
#[must_use]
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Looks up the bounding box for a region.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Errors
///
/// Returns [`RegionError::NotFound`] if the name is not a registered
/// region or alias.
pub fn lookup(name: &str) -> Result<BoundingBox, RegionError> {
    let key = normalize(name);
    REGISTRY
        .boxes
        .get(&key)
        .copied()
        .ok_or(RegionError::NotFound(key))
}

/// Canonical names of every registered region.
#[must_use]
pub fn names() -> &'static [String] {
    &REGISTRY.names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn loads_all_regions() {
        assert_eq!(
            names().len(),
            EXPECTED_REGION_COUNT,
            "Expected {EXPECTED_REGION_COUNT} regions, found {}. \
             Update EXPECTED_REGION_COUNT after adding/removing regions.",
            names().len()
        );
    }

    #[test]
    fn region_names_are_unique() {
        let mut seen = BTreeSet::new();
        for name in names() {
            assert!(seen.insert(name), "Duplicate region: {name}");
        }
    }

    #[test]
    fn bounds_are_ordered() {
        for name in names() {
            let bbox = lookup(name).unwrap();
            assert!(bbox.min_latitude < bbox.max_latitude, "{name} latitude");
            assert!(bbox.min_longitude < bbox.max_longitude, "{name} longitude");
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup("cAlAbRiA"), lookup("calabria"));
        assert_eq!(lookup("  Calabria "), lookup("calabria"));
        assert!(lookup("calabria").is_ok());
    }

    #[test]
    fn aliases_resolve_to_canonical_box() {
        assert_eq!(lookup("Emilia Romagna"), lookup("emilia-romagna"));
        assert_eq!(lookup("VALLE D AOSTA"), lookup("valle d'aosta"));
    }

    #[test]
    fn unknown_region() {
        assert_eq!(
            lookup(" Atlantis "),
            Err(RegionError::NotFound("atlantis".to_string()))
        );
        assert!(lookup("").is_err());
    }
}
