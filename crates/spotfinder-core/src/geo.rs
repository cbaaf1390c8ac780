//! Great-circle distance and human-readable unit formatting.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Map center used when neither a device position nor a viewport is known
/// (Tokyo Station).
pub const DEFAULT_MAP_CENTER: Coordinate = Coordinate {
    lat: 35.681_236,
    lon: 139.767_125,
};

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Builds a coordinate, returning `None` when either component is not a
    /// finite number inside the valid latitude/longitude range.
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        let coord = Self { lat, lon };
        coord.is_valid().then_some(coord)
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Parses `"lat,lon"`.
    #[must_use]
    pub fn parse_pair(raw: &str) -> Option<Self> {
        let (lat, lon) = raw.split_once(',')?;
        let lat = lat.trim().parse::<f64>().ok()?;
        let lon = lon.trim().parse::<f64>().ok()?;
        Self::new(lat, lon)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// Great-circle distance between two coordinates in meters.
#[must_use]
pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Formats a distance: whole meters below 1 km, kilometers with two decimals
/// above.
#[must_use]
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{meters:.0} m")
    } else {
        format!("{:.2} km", meters / 1000.0)
    }
}

/// Formats a duration given in minutes: `"12 min"` or `"1 h 5 min"`.
#[must_use]
pub fn format_duration(minutes: f64) -> String {
    if minutes < 60.0 {
        return format!("{} min", minutes.round());
    }
    let hours = (minutes / 60.0).floor();
    let rest = (minutes % 60.0).round();
    format!("{hours} h {rest} min")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn haversine_same_point_is_zero() {
        let p = coord(35.0, 139.0);
        assert!(haversine_m(p, p).abs() < 1e-9);
    }

    #[test]
    fn haversine_one_degree_latitude() {
        // One degree of latitude is ~111.19 km on a 6371 km sphere.
        let d = haversine_m(coord(0.0, 0.0), coord(1.0, 0.0));
        assert!((d - 111_194.9).abs() < 1.0, "got {d}");
    }

    #[test]
    fn haversine_is_symmetric() {
        let a = coord(35.681_236, 139.767_125);
        let b = coord(35.658_581, 139.745_433);
        assert!((haversine_m(a, b) - haversine_m(b, a)).abs() < 1e-6);
    }

    #[test]
    fn coordinate_rejects_out_of_range_and_nan() {
        assert!(Coordinate::new(91.0, 0.0).is_none());
        assert!(Coordinate::new(0.0, 181.0).is_none());
        assert!(Coordinate::new(f64::NAN, 0.0).is_none());
        assert!(Coordinate::new(-90.0, 180.0).is_some());
    }

    #[test]
    fn parse_pair_reads_lat_lon() {
        let c = Coordinate::parse_pair("35.5, 139.25").unwrap();
        assert_eq!(c, coord(35.5, 139.25));
        assert!(Coordinate::parse_pair("35.5").is_none());
        assert!(Coordinate::parse_pair("a,b").is_none());
    }

    #[test]
    fn format_distance_switches_to_km() {
        assert_eq!(format_distance(850.4), "850 m");
        assert_eq!(format_distance(1250.0), "1.25 km");
    }

    #[test]
    fn format_duration_switches_to_hours() {
        assert_eq!(format_duration(12.4), "12 min");
        assert_eq!(format_duration(65.0), "1 h 5 min");
        assert_eq!(format_duration(120.0), "2 h 0 min");
    }
}
