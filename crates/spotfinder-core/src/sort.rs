use serde::{Deserialize, Serialize};

use crate::budget::Metric;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Follows the active metric: distance or time.
    #[default]
    Auto,
    Distance,
    Time,
    Name,
    Category,
}

impl SortKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Distance => "distance",
            Self::Time => "time",
            Self::Name => "name",
            Self::Category => "category",
        }
    }

    /// Resolves [`SortKey::Auto`] against the active metric.
    #[must_use]
    pub fn resolve(self, metric: Metric) -> Self {
        match (self, metric) {
            (Self::Auto, Metric::Distance) => Self::Distance,
            (Self::Auto, Metric::Time) => Self::Time,
            (key, _) => key,
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "distance" => Ok(Self::Distance),
            "time" => Ok(Self::Time),
            "name" => Ok(Self::Name),
            "category" => Ok(Self::Category),
            other => Err(format!("unknown sort key: {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction: {other:?}")),
        }
    }
}
