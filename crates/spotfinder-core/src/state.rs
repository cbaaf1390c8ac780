//! Flat search-form state and its share-link query-string encoding.
//!
//! The state is a cache of the last-used inputs, not an authoritative data
//! source: parsing is tolerant and unknown keys or values fall back to
//! defaults.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;

use crate::budget::{BudgetError, BudgetInput, DistanceUnit, Metric, SearchBudget, TravelMode};
use crate::category::{CategorySelection, CoarseCategories};
use crate::geo::Coordinate;
use crate::sort::{SortDirection, SortKey};

/// Characters left unescaped in query values.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b',');

#[derive(Debug, Error)]
pub enum StateError {
    #[error("query parameter {key:?} is not valid UTF-8 after decoding")]
    InvalidEncoding { key: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub metric: Metric,
    /// Distance exactly as typed; validated only when a search starts.
    pub distance: Option<String>,
    pub distance_unit: DistanceUnit,
    /// Minutes exactly as typed; validated only when a search starts.
    pub time: Option<String>,
    pub mode: TravelMode,
    pub categories: CategorySelection,
    pub sort_by: SortKey,
    pub sort_dir: SortDirection,
    /// Search the visible map rectangle instead of a radius.
    pub use_bbox: bool,
    pub favorites_only: bool,
    /// 1-based result page.
    pub page: usize,
    pub center: Option<Coordinate>,
    pub zoom: Option<u8>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            metric: Metric::Distance,
            distance: Some("1".to_string()),
            distance_unit: DistanceUnit::Kilometers,
            time: Some("15".to_string()),
            mode: TravelMode::Walking,
            categories: CategorySelection {
                coarse: CoarseCategories {
                    gourmet: true,
                    sightseeing: true,
                },
                details: std::collections::BTreeSet::new(),
            },
            sort_by: SortKey::Auto,
            sort_dir: SortDirection::Asc,
            use_bbox: false,
            favorites_only: false,
            page: 1,
            center: None,
            zoom: None,
        }
    }
}

impl SearchState {
    /// Validates the budget fields for the active metric.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetError`] for missing, non-numeric or non-positive input.
    pub fn budget(&self) -> Result<SearchBudget, BudgetError> {
        SearchBudget::from_input(BudgetInput {
            metric: self.metric,
            distance: self.distance.as_deref(),
            distance_unit: self.distance_unit,
            time: self.time.as_deref(),
            mode: self.mode,
        })
    }

    /// Encodes the state as URL query parameters (without a leading `?`).
    /// Empty values are omitted.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let flag = |b: bool| String::from(if b { "1" } else { "0" });
        let mut pairs: Vec<(&str, String)> = vec![("metric", self.metric.as_str().to_string())];
        if let Some(distance) = self.distance.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("distance", distance.to_string()));
        }
        pairs.push(("distanceUnit", self.distance_unit.as_str().to_string()));
        if let Some(time) = self.time.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("time", time.to_string()));
        }
        pairs.push(("mode", self.mode.as_str().to_string()));
        pairs.push(("gourmet", flag(self.categories.coarse.gourmet)));
        pairs.push(("sight", flag(self.categories.coarse.sightseeing)));
        let details = self.categories.details_csv();
        if !details.is_empty() {
            pairs.push(("details", details));
        }
        pairs.push(("sortBy", self.sort_by.as_str().to_string()));
        pairs.push(("sortDir", self.sort_dir.as_str().to_string()));
        pairs.push(("bbox", flag(self.use_bbox)));
        pairs.push(("favOnly", flag(self.favorites_only)));
        pairs.push(("page", self.page.to_string()));
        if let Some(center) = self.center {
            pairs.push(("center", format!("{:.6},{:.6}", center.lat, center.lon)));
        }
        if let Some(zoom) = self.zoom {
            pairs.push(("z", zoom.to_string()));
        }

        pairs
            .into_iter()
            .map(|(k, v)| format!("{k}={}", utf8_percent_encode(&v, QUERY_VALUE)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Parses a query string (with or without a leading `?`). An empty query
    /// yields the default state; otherwise omitted optional fields stay empty
    /// so an encoded state reads back unchanged. Unknown keys and unparseable
    /// values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::InvalidEncoding`] if a value does not decode to
    /// UTF-8.
    pub fn from_query_string(query: &str) -> Result<Self, StateError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        if query.is_empty() {
            return Ok(Self::default());
        }
        let mut state = Self {
            distance: None,
            time: None,
            ..Self::default()
        };

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
            let plus_decoded = raw.replace('+', " ");
            let value = percent_decode_str(&plus_decoded)
                .decode_utf8()
                .map_err(|_| StateError::InvalidEncoding {
                    key: key.to_string(),
                })?;
            state.apply(key, value.trim());
        }

        Ok(state)
    }

    fn apply(&mut self, key: &str, value: &str) {
        let flag = |v: &str| v == "1";
        match key {
            "metric" => set_parsed(&mut self.metric, key, value),
            "distance" => self.distance = non_empty(value),
            "distanceUnit" => set_parsed(&mut self.distance_unit, key, value),
            "time" => self.time = non_empty(value),
            "mode" => set_parsed(&mut self.mode, key, value),
            "gourmet" => self.categories.coarse.gourmet = flag(value),
            "sight" => self.categories.coarse.sightseeing = flag(value),
            "details" => self.categories.details = CategorySelection::parse_details(value),
            "sortBy" => set_parsed(&mut self.sort_by, key, value),
            "sortDir" => set_parsed(&mut self.sort_dir, key, value),
            "bbox" => self.use_bbox = flag(value),
            "favOnly" => self.favorites_only = flag(value),
            "page" => {
                if let Ok(page) = value.parse::<usize>() {
                    self.page = page.max(1);
                }
            }
            "center" => self.center = Coordinate::parse_pair(value),
            "z" => self.zoom = value.parse::<u8>().ok(),
            _ => tracing::debug!(key, "ignoring unknown share-link parameter"),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn set_parsed<T>(slot: &mut T, key: &str, value: &str)
where
    T: std::str::FromStr,
{
    match value.parse::<T>() {
        Ok(parsed) => *slot = parsed,
        Err(_) => tracing::debug!(key, value, "ignoring invalid share-link value"),
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
