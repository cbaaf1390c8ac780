use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// A place normalized from a raw geodata record, before any reachability
/// metrics are attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// `"{type}/{id}"`, e.g. `"node/123"`; unique within one result set.
    pub id: String,
    /// Resolved display name.
    pub name: String,
    pub coordinate: Coordinate,
    /// Raw provider tags, kept for display metadata.
    pub tags: BTreeMap<String, String>,
    /// Ordered category values derived from the tags.
    pub categories: Vec<String>,
}

impl Place {
    #[must_use]
    pub fn primary_category(&self) -> &str {
        self.categories.first().map_or("", String::as_str)
    }

    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// A [`Place`] with reachability metrics relative to the search origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    #[serde(flatten)]
    pub place: Place,
    /// Straight-line distance from the origin in meters.
    pub distance_m: f64,
    /// Travel time from distance and the mode's average speed, in minutes.
    pub heuristic_eta_min: f64,
    /// Travel time from the routing service, in minutes.
    pub refined_eta_min: Option<f64>,
}

impl Poi {
    /// Refined travel time when available, otherwise the heuristic one.
    #[must_use]
    pub fn effective_eta_min(&self) -> f64 {
        self.refined_eta_min.unwrap_or(self.heuristic_eta_min)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.place.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.place.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poi(refined: Option<f64>) -> Poi {
        Poi {
            place: Place {
                id: "node/1".to_string(),
                name: "Cafe".to_string(),
                coordinate: Coordinate { lat: 0.0, lon: 0.0 },
                tags: BTreeMap::new(),
                categories: vec![],
            },
            distance_m: 500.0,
            heuristic_eta_min: 6.0,
            refined_eta_min: refined,
        }
    }

    #[test]
    fn effective_eta_prefers_refined() {
        assert!((poi(Some(9.5)).effective_eta_min() - 9.5).abs() < f64::EPSILON);
        assert!((poi(None).effective_eta_min() - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn primary_category_defaults_to_empty() {
        assert_eq!(poi(None).place.primary_category(), "");
    }
}
