//! Favorite places keyed by POI identifier.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::poi::Place;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl From<&Place> for FavoriteRecord {
    fn from(place: &Place) -> Self {
        Self {
            id: place.id.clone(),
            name: place.name.clone(),
            lat: place.coordinate.lat,
            lon: place.coordinate.lon,
        }
    }
}

#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("failed to write favorites to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize favorites: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub trait FavoritesStore: Send {
    fn contains(&self, id: &str) -> bool;

    /// Adds or replaces the record for `record.id`.
    ///
    /// # Errors
    ///
    /// Returns [`FavoritesError`] if the change cannot be persisted.
    fn add(&mut self, record: FavoriteRecord) -> Result<(), FavoritesError>;

    /// Removes `id`; returns whether it was present.
    ///
    /// # Errors
    ///
    /// Returns [`FavoritesError`] if the change cannot be persisted.
    fn remove(&mut self, id: &str) -> Result<bool, FavoritesError>;

    fn list(&self) -> Vec<FavoriteRecord>;

    /// Adds the record if absent, removes it if present. Returns whether the
    /// id is a favorite afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`FavoritesError`] if the change cannot be persisted.
    fn toggle(&mut self, record: FavoriteRecord) -> Result<bool, FavoritesError> {
        if self.contains(&record.id) {
            self.remove(&record.id)?;
            Ok(false)
        } else {
            self.add(record)?;
            Ok(true)
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryFavorites {
    records: BTreeMap<String, FavoriteRecord>,
}

impl FavoritesStore for InMemoryFavorites {
    fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    fn add(&mut self, record: FavoriteRecord) -> Result<(), FavoritesError> {
        self.records.insert(record.id.clone(), record);
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<bool, FavoritesError> {
        Ok(self.records.remove(id).is_some())
    }

    fn list(&self) -> Vec<FavoriteRecord> {
        self.records.values().cloned().collect()
    }
}

/// Favorites persisted as a JSON object keyed by id.
///
/// A missing or unreadable file loads as an empty set; every mutation
/// rewrites the whole file.
#[derive(Debug)]
pub struct JsonFileFavorites {
    path: PathBuf,
    records: BTreeMap<String, FavoriteRecord>,
}

impl JsonFileFavorites {
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = load_records(&path);
        Self { path, records }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), FavoritesError> {
        let body = serde_json::to_string_pretty(&self.records)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| FavoritesError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        std::fs::write(&self.path, body).map_err(|source| FavoritesError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

fn load_records(path: &Path) -> BTreeMap<String, FavoriteRecord> {
    let Ok(body) = std::fs::read_to_string(path) else {
        return BTreeMap::new();
    };
    serde_json::from_str(&body).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "favorites file is corrupt; starting empty");
        BTreeMap::new()
    })
}

impl FavoritesStore for JsonFileFavorites {
    fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    fn add(&mut self, record: FavoriteRecord) -> Result<(), FavoritesError> {
        self.records.insert(record.id.clone(), record);
        self.save()
    }

    fn remove(&mut self, id: &str) -> Result<bool, FavoritesError> {
        let removed = self.records.remove(id).is_some();
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    fn list(&self) -> Vec<FavoriteRecord> {
        self.records.values().cloned().collect()
    }
}
