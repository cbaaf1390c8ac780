//! Geographic area passed to the geodata query.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Smallest search radius sent upstream, in meters.
pub const MIN_RADIUS_M: u32 = 200;
/// Largest search radius sent upstream, in meters.
pub const MAX_RADIUS_M: u32 = 12_000;

/// An explicit map rectangle in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    #[must_use]
    pub fn center(&self) -> Coordinate {
        Coordinate {
            lat: (self.south + self.north) / 2.0,
            lon: (self.west + self.east) / 2.0,
        }
    }

    /// Parses `"south,west,north,east"`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let parts = raw
            .split(',')
            .map(|p| p.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
            .collect::<Option<Vec<_>>>()?;
        let [south, west, north, east] = parts.as_slice() else {
            return None;
        };
        (south <= north).then_some(Self {
            south: *south,
            west: *west,
            north: *north,
            east: *east,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AreaSpec {
    Radius { center: Coordinate, meters: u32 },
    BoundingBox(BoundingBox),
}

impl AreaSpec {
    /// A radius area around `center`; `meters` is rounded and clamped to
    /// [`MIN_RADIUS_M`]..=[`MAX_RADIUS_M`].
    #[must_use]
    pub fn radius(center: Coordinate, meters: f64) -> Self {
        Self::Radius {
            center,
            meters: clamp_radius(meters),
        }
    }
}

/// Rounds and clamps a requested radius to the provider-friendly range.
/// Non-finite input collapses to the minimum.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_radius(meters: f64) -> u32 {
    if !meters.is_finite() {
        return MIN_RADIUS_M;
    }
    let rounded = meters.round().clamp(f64::from(MIN_RADIUS_M), f64::from(MAX_RADIUS_M));
    rounded as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_raises_small_radius() {
        assert_eq!(clamp_radius(50.0), 200);
    }

    #[test]
    fn clamp_lowers_large_radius() {
        assert_eq!(clamp_radius(20_000.0), 12_000);
    }

    #[test]
    fn clamp_rounds_in_range_values() {
        assert_eq!(clamp_radius(1499.6), 1500);
        assert_eq!(clamp_radius(f64::NAN), 200);
    }

    #[test]
    fn radius_constructor_clamps() {
        let center = Coordinate { lat: 35.0, lon: 139.0 };
        assert_eq!(
            AreaSpec::radius(center, 50.0),
            AreaSpec::Radius { center, meters: 200 }
        );
    }

    #[test]
    fn bbox_parse_and_center() {
        let b = BoundingBox::parse("35.0,139.0,36.0,140.0").unwrap();
        assert_eq!(b.center(), Coordinate { lat: 35.5, lon: 139.5 });
        assert!(BoundingBox::parse("36.0,139.0,35.0,140.0").is_none());
        assert!(BoundingBox::parse("35.0,139.0,36.0").is_none());
    }
}
