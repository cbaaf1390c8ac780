//! Reachability estimates: a heuristic tier that never fails and an optional
//! routing-service tier that overrides it where it answers.

use std::future::Future;

use spotfinder_core::{haversine_m, Coordinate, Place, Poi, TravelMode};
use spotfinder_osrm::{OsrmClient, OsrmError};

/// Only the first POIs (in normalized order) are sent for refinement.
pub const REFINE_LIMIT: usize = 100;

/// A provider of travel times from one origin to many destinations.
pub trait TravelTimeSource: Send + Sync {
    type Error: std::fmt::Display + Send;

    /// Minutes from `origin` to each destination, index-aligned; `None` where
    /// no route is known.
    fn travel_minutes(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
        mode: TravelMode,
    ) -> impl Future<Output = Result<Vec<Option<f64>>, Self::Error>> + Send;
}

impl TravelTimeSource for OsrmClient {
    type Error = OsrmError;

    fn travel_minutes(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
        mode: TravelMode,
    ) -> impl Future<Output = Result<Vec<Option<f64>>, Self::Error>> + Send {
        self.durations_from(origin, destinations, mode)
    }
}

/// Attaches straight-line distance and a speed-based ETA to every place.
#[must_use]
pub fn estimate_heuristic(places: Vec<Place>, origin: Coordinate, mode: TravelMode) -> Vec<Poi> {
    let speed = mode.speed_m_per_min();
    places
        .into_iter()
        .map(|place| {
            let distance_m = haversine_m(origin, place.coordinate);
            Poi {
                place,
                distance_m,
                heuristic_eta_min: distance_m / speed,
                refined_eta_min: None,
            }
        })
        .collect()
}

/// Replaces heuristic ETAs with routed ones for the first [`REFINE_LIMIT`]
/// POIs. A failed lookup leaves every POI on its heuristic ETA; it is logged
/// and otherwise ignored.
///
/// Returns how many POIs received a refined value.
pub async fn refine_estimates<S>(
    pois: &mut [Poi],
    origin: Coordinate,
    mode: TravelMode,
    source: &S,
) -> usize
where
    S: TravelTimeSource,
{
    let head = pois.len().min(REFINE_LIMIT);
    if head == 0 {
        return 0;
    }
    let destinations: Vec<Coordinate> = pois[..head].iter().map(|p| p.place.coordinate).collect();

    match source.travel_minutes(origin, &destinations, mode).await {
        Ok(minutes) => {
            let mut refined = 0;
            for (poi, value) in pois[..head].iter_mut().zip(minutes) {
                if let Some(value) = value.filter(|v| v.is_finite()) {
                    poi.refined_eta_min = Some(value);
                    refined += 1;
                }
            }
            refined
        }
        Err(err) => {
            tracing::warn!(
                destinations = head,
                error = %err,
                "travel-time refinement failed; keeping heuristic estimates"
            );
            0
        }
    }
}
