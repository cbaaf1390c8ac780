//! Maps raw interpreter elements onto [`Place`] values.

use std::collections::BTreeMap;

use spotfinder_core::{Coordinate, Place};

use crate::types::RawElement;

const FALLBACK_KEYS: [&str; 4] = ["amenity", "tourism", "leisure", "shop"];
const UNKNOWN_NAME: &str = "unknown";

/// Which localized `name:<lang>` tags win during name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePreference {
    pub primary: String,
    pub secondary: String,
}

impl NamePreference {
    #[must_use]
    pub fn new(primary: &str, secondary: &str) -> Self {
        Self {
            primary: primary.to_owned(),
            secondary: secondary.to_owned(),
        }
    }
}

impl Default for NamePreference {
    fn default() -> Self {
        Self::new("ja", "en")
    }
}

/// Normalizes one element. Returns `None` when it has no usable coordinate
/// either directly or as a nested center.
#[must_use]
pub fn normalize_element(element: RawElement, names: &NamePreference) -> Option<Place> {
    let coordinate = element_coordinate(&element)?;
    let name = resolve_name(&element.tags, names);
    let categories = derive_categories(&element.tags);
    Some(Place {
        id: format!("{}/{}", element.kind, element.id),
        name,
        coordinate,
        tags: element.tags,
        categories,
    })
}

/// Normalizes a batch, dropping elements without a usable coordinate.
#[must_use]
pub fn normalize_elements(elements: Vec<RawElement>, names: &NamePreference) -> Vec<Place> {
    let total = elements.len();
    let places: Vec<Place> = elements
        .into_iter()
        .filter_map(|element| {
            let id = element.id;
            let kind = element.kind.clone();
            let place = normalize_element(element, names);
            if place.is_none() {
                tracing::debug!(kind = %kind, id, "dropping element without usable coordinate");
            }
            place
        })
        .collect();
    if places.len() < total {
        tracing::debug!(
            kept = places.len(),
            dropped = total - places.len(),
            "normalized geodata elements"
        );
    }
    places
}

fn element_coordinate(element: &RawElement) -> Option<Coordinate> {
    let (lat, lon) = match (element.lat, element.lon, element.center) {
        (Some(lat), Some(lon), _) => (lat, lon),
        (_, _, Some(center)) => (center.lat, center.lon),
        _ => return None,
    };
    Coordinate::new(lat, lon)
}

pub(crate) fn resolve_name(tags: &BTreeMap<String, String>, names: &NamePreference) -> String {
    let primary_key = format!("name:{}", names.primary);
    let secondary_key = format!("name:{}", names.secondary);
    let preferred = [
        primary_key.as_str(),
        "name",
        secondary_key.as_str(),
        "brand",
        "operator",
    ];

    preferred
        .iter()
        .find_map(|key| non_blank(tags, key))
        .or_else(|| FALLBACK_KEYS.iter().find_map(|key| non_blank(tags, key)))
        .map_or_else(
            || {
                if tags.contains_key("historic") {
                    "historic".to_owned()
                } else {
                    UNKNOWN_NAME.to_owned()
                }
            },
            str::to_owned,
        )
}

pub(crate) fn derive_categories(tags: &BTreeMap<String, String>) -> Vec<String> {
    let mut categories: Vec<String> = FALLBACK_KEYS
        .iter()
        .filter_map(|key| non_blank(tags, key))
        .map(str::to_owned)
        .collect();
    if tags.contains_key("historic") {
        categories.push("historic".to_owned());
    }
    categories
}

fn non_blank<'a>(tags: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    tags.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
