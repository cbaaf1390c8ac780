use thiserror::Error;

use spotfinder_core::{BudgetError, FavoritesError, StateError};
use spotfinder_overpass::OverpassError;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid budget: {0}")]
    Budget(#[from] BudgetError),

    #[error("select at least one category")]
    NoCategories,

    #[error("geodata lookup failed: {0}")]
    Geodata(#[from] OverpassError),

    #[error("invalid share link: {0}")]
    State(#[from] StateError),

    #[error("favorites error: {0}")]
    Favorites(#[from] FavoritesError),

    #[error("no place with id {id} in the current results")]
    UnknownPlace { id: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
