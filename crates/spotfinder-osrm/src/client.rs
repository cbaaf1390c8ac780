//! HTTP client for the OSRM `table` service.
//!
//! Only the first row of the matrix is requested (`sources=0`), so one call
//! yields travel times from the origin to each destination.

use std::time::Duration;

use reqwest::{Client, Url};
use spotfinder_core::{Coordinate, TravelMode};

use crate::error::OsrmError;
use crate::types::TableResponse;

const DEFAULT_BASE_URL: &str = "https://router.project-osrm.org";

/// Public servers reject larger coordinate lists.
pub const MAX_DESTINATIONS_PER_REQUEST: usize = 80;

/// Routing profile name for a travel mode.
#[must_use]
pub fn profile_for(mode: TravelMode) -> &'static str {
    match mode {
        TravelMode::Walking => "foot",
        TravelMode::Driving => "driving",
    }
}

pub struct OsrmClient {
    client: Client,
    base_url: Url,
}

impl OsrmClient {
    /// Creates a client pointed at the public demo server.
    ///
    /// # Errors
    ///
    /// Returns [`OsrmError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, OsrmError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout_secs, user_agent)
    }

    /// Creates a client for a self-hosted server or a mock server in tests.
    ///
    /// # Errors
    ///
    /// Returns [`OsrmError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`OsrmError::InvalidBaseUrl`] if `base_url`
    /// does not parse.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, OsrmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let trimmed = base_url.trim_end_matches('/');
        let base_url = Url::parse(trimmed).map_err(|e| OsrmError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Travel times in minutes from `origin` to each of `destinations`,
    /// index-aligned with `destinations`.
    ///
    /// Destinations are sent in sequential chunks of
    /// [`MAX_DESTINATIONS_PER_REQUEST`]. Unreachable or non-finite cells come
    /// back as `None`.
    ///
    /// # Errors
    ///
    /// Any failing chunk fails the whole call:
    /// - [`OsrmError::Http`] on network failure.
    /// - [`OsrmError::UnexpectedStatus`] on a non-2xx status.
    /// - [`OsrmError::Api`] when the envelope code is not `Ok`.
    /// - [`OsrmError::Deserialize`] if the body does not match the expected shape.
    pub async fn durations_from(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
        mode: TravelMode,
    ) -> Result<Vec<Option<f64>>, OsrmError> {
        let mut minutes = Vec::with_capacity(destinations.len());
        for chunk in destinations.chunks(MAX_DESTINATIONS_PER_REQUEST) {
            let url = self.table_url(origin, chunk, mode);
            let table = self.request_table(&url).await?;
            let row = table.durations.into_iter().next().unwrap_or_default();
            // Cell 0 is the origin itself.
            minutes.extend((1..=chunk.len()).map(|cell| {
                row.get(cell)
                    .copied()
                    .flatten()
                    .and_then(seconds_to_minutes)
            }));
        }
        Ok(minutes)
    }

    pub(crate) fn table_url(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
        mode: TravelMode,
    ) -> Url {
        let coordinates = std::iter::once(origin)
            .chain(destinations.iter().copied())
            .map(|c| format!("{},{}", c.lon, c.lat))
            .collect::<Vec<_>>()
            .join(";");

        let mut url = self.base_url.clone();
        let path = format!(
            "{}/table/v1/{}/{coordinates}",
            url.path().trim_end_matches('/'),
            profile_for(mode)
        );
        url.set_path(&path);
        url.query_pairs_mut()
            .append_pair("sources", "0")
            .append_pair("annotations", "duration");
        url
    }

    async fn request_table(&self, url: &Url) -> Result<TableResponse, OsrmError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // The service reports errors such as `NoTable` with a 400 and a JSON
        // envelope, so prefer the envelope when it parses.
        match serde_json::from_str::<TableResponse>(&body) {
            Ok(table) if table.code != "Ok" => Err(OsrmError::Api {
                code: table.code,
                message: table.message.unwrap_or_default(),
            }),
            _ if !status.is_success() => Err(OsrmError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }),
            Ok(table) => Ok(table),
            Err(source) => Err(OsrmError::Deserialize {
                context: format!("table response from {url}"),
                source,
            }),
        }
    }
}

fn seconds_to_minutes(seconds: f64) -> Option<f64> {
    seconds.is_finite().then_some(seconds / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate { lat, lon }
    }

    #[test]
    fn profiles_match_modes() {
        assert_eq!(profile_for(TravelMode::Walking), "foot");
        assert_eq!(profile_for(TravelMode::Driving), "driving");
    }

    #[test]
    fn table_url_lists_origin_first_as_lon_lat() {
        let client = OsrmClient::with_base_url("http://osrm.test/", 5, "test").unwrap();
        let url = client.table_url(
            coord(35.5, 139.5),
            &[coord(35.25, 139.75)],
            TravelMode::Walking,
        );
        assert_eq!(
            url.as_str(),
            "http://osrm.test/table/v1/foot/139.5,35.5;139.75,35.25?sources=0&annotations=duration"
        );
    }

    #[test]
    fn table_url_keeps_base_path_prefix() {
        let client = OsrmClient::with_base_url("http://osrm.test/routing", 5, "test").unwrap();
        let url = client.table_url(coord(1.0, 2.0), &[], TravelMode::Driving);
        assert!(url.as_str().starts_with("http://osrm.test/routing/table/v1/driving/2,1?"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = OsrmClient::with_base_url("not a url", 5, "test");
        assert!(matches!(result, Err(OsrmError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn non_finite_seconds_are_dropped() {
        assert_eq!(seconds_to_minutes(90.0), Some(1.5));
        assert_eq!(seconds_to_minutes(f64::INFINITY), None);
    }
}
