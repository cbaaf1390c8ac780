pub mod app_config;
pub mod area;
pub mod budget;
pub mod category;
pub mod config;
pub mod favorites;
pub mod geo;
pub mod poi;
pub mod sort;
pub mod state;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use area::{AreaSpec, BoundingBox, MAX_RADIUS_M, MIN_RADIUS_M};
pub use budget::{BudgetError, BudgetInput, DistanceUnit, Metric, SearchBudget, TravelMode};
pub use category::{CategorySelection, CoarseCategories, DetailCategory};
pub use config::{load_app_config, load_app_config_from_env};
pub use favorites::{
    FavoriteRecord, FavoritesError, FavoritesStore, InMemoryFavorites, JsonFileFavorites,
};
pub use geo::{format_distance, format_duration, haversine_m, Coordinate, DEFAULT_MAP_CENTER};
pub use poi::{Place, Poi};
pub use sort::{SortDirection, SortKey};
pub use state::{SearchState, StateError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
