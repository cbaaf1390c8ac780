//! Directions handoff to an external map service.

use std::sync::LazyLock;

use reqwest::Url;
use spotfinder_core::{Coordinate, TravelMode};

static DIRECTIONS_BASE: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://www.google.com/maps/dir/").expect("valid directions URL")
});

/// Directions link from `origin` to `destination`. Only coordinates and the
/// travel mode are passed on.
#[must_use]
pub fn directions_url(origin: Coordinate, destination: Coordinate, mode: TravelMode) -> Url {
    let mut url = DIRECTIONS_BASE.clone();
    url.query_pairs_mut()
        .append_pair("api", "1")
        .append_pair("origin", &origin.to_string())
        .append_pair("destination", &destination.to_string())
        .append_pair("travelmode", mode.as_str());
    url
}
