//! Translation of a user-entered reachability budget into a search radius.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::area::clamp_radius;

/// How the user intends to travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Walking,
    Driving,
}

impl TravelMode {
    /// Average speed in meters per minute used for heuristic travel times.
    ///
    /// Walking is ~5 km/h, driving ~34 km/h (urban average).
    #[must_use]
    pub fn speed_m_per_min(self) -> f64 {
        match self {
            Self::Walking => 83.3,
            Self::Driving => 566.7,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Walking => "walking",
            Self::Driving => "driving",
        }
    }
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TravelMode {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "walking" => Ok(Self::Walking),
            "driving" => Ok(Self::Driving),
            other => Err(BudgetError::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[serde(rename = "m")]
    Meters,
    #[default]
    #[serde(rename = "km")]
    Kilometers,
}

impl DistanceUnit {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Meters => "m",
            Self::Kilometers => "km",
        }
    }

    #[must_use]
    pub fn to_meters(self, value: f64) -> f64 {
        match self {
            Self::Meters => value,
            Self::Kilometers => value * 1000.0,
        }
    }
}

impl std::str::FromStr for DistanceUnit {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(Self::Meters),
            "km" => Ok(Self::Kilometers),
            other => Err(BudgetError::UnknownUnit(other.to_string())),
        }
    }
}

/// Which budget the user filters by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Distance,
    Time,
}

impl Metric {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Time => "time",
        }
    }
}

impl std::str::FromStr for Metric {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "distance" => Ok(Self::Distance),
            "time" => Ok(Self::Time),
            other => Err(BudgetError::UnknownMetric(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BudgetError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} is not a number: {raw:?}")]
    NotANumber { field: &'static str, raw: String },

    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },

    #[error("unknown travel mode: {0:?}")]
    UnknownMode(String),

    #[error("unknown distance unit: {0:?}")]
    UnknownUnit(String),

    #[error("unknown metric: {0:?}")]
    UnknownMetric(String),
}

/// Raw budget fields as entered in the search form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetInput<'a> {
    pub metric: Metric,
    pub distance: Option<&'a str>,
    pub distance_unit: DistanceUnit,
    pub time: Option<&'a str>,
    pub mode: TravelMode,
}

/// A validated reachability budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric", rename_all = "lowercase")]
pub enum SearchBudget {
    Distance { meters: f64, mode: TravelMode },
    Time { minutes: f64, mode: TravelMode },
}

impl SearchBudget {
    /// Validates form input into a budget.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetError`] when the field for the active metric is absent,
    /// not numeric, or not strictly positive.
    pub fn from_input(input: BudgetInput<'_>) -> Result<Self, BudgetError> {
        match input.metric {
            Metric::Distance => {
                let value = parse_positive("distance", input.distance)?;
                Ok(Self::Distance {
                    meters: input.distance_unit.to_meters(value),
                    mode: input.mode,
                })
            }
            Metric::Time => {
                let minutes = parse_positive("time", input.time)?;
                Ok(Self::Time {
                    minutes,
                    mode: input.mode,
                })
            }
        }
    }

    #[must_use]
    pub fn metric(&self) -> Metric {
        match self {
            Self::Distance { .. } => Metric::Distance,
            Self::Time { .. } => Metric::Time,
        }
    }

    /// Travel mode used for heuristic and routed travel-time estimates.
    #[must_use]
    pub fn travel_mode(&self) -> TravelMode {
        match self {
            Self::Distance { mode, .. } | Self::Time { mode, .. } => *mode,
        }
    }

    /// Travel mode passed to the directions link. Distance budgets hand off
    /// on foot.
    #[must_use]
    pub fn directions_mode(&self) -> TravelMode {
        match self {
            Self::Distance { .. } => TravelMode::Walking,
            Self::Time { mode, .. } => *mode,
        }
    }

    /// Radius that drives the outbound area query, clamped to
    /// [`crate::MIN_RADIUS_M`]..=[`crate::MAX_RADIUS_M`].
    #[must_use]
    pub fn search_radius_m(&self) -> u32 {
        let raw = match self {
            Self::Distance { meters, .. } => *meters,
            Self::Time { minutes, mode } => minutes * mode.speed_m_per_min(),
        };
        clamp_radius(raw)
    }
}

fn parse_positive(field: &'static str, raw: Option<&str>) -> Result<f64, BudgetError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(BudgetError::Missing { field })?;
    let value = raw.parse::<f64>().map_err(|_| BudgetError::NotANumber {
        field,
        raw: raw.to_string(),
    })?;
    if !value.is_finite() {
        return Err(BudgetError::NotANumber {
            field,
            raw: raw.to_string(),
        });
    }
    if value <= 0.0 {
        return Err(BudgetError::NonPositive { field });
    }
    Ok(value)
}
