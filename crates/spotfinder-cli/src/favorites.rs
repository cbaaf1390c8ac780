//! `favorites` command handlers.
//!
//! Favorites are normally toggled from search results; these subcommands
//! inspect and edit the same JSON file directly.

use std::io::Write;

use clap::Subcommand;
use spotfinder_core::{AppConfig, Coordinate, FavoriteRecord, FavoritesStore, JsonFileFavorites};

/// Sub-commands available under `favorites`.
#[derive(Debug, Subcommand)]
pub enum FavoritesCommands {
    /// List saved favorites
    List,
    /// Save a place as a favorite
    Add {
        /// Place id as shown in search results (e.g. node/123)
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Remove a favorite by id
    Remove {
        /// Place id (e.g. way/456)
        id: String,
    },
}

pub(crate) fn run_favorites(config: &AppConfig, command: FavoritesCommands) -> anyhow::Result<()> {
    let mut store = JsonFileFavorites::open(&config.favorites_path);
    tracing::debug!(path = %store.path().display(), "opened favorites");
    execute(&mut store, command, &mut std::io::stdout().lock())
}

pub(crate) fn execute<S, W>(
    store: &mut S,
    command: FavoritesCommands,
    out: &mut W,
) -> anyhow::Result<()>
where
    S: FavoritesStore,
    W: Write,
{
    match command {
        FavoritesCommands::List => {
            let records = store.list();
            if records.is_empty() {
                writeln!(out, "no favorites yet")?;
            }
            for record in records {
                writeln!(
                    out,
                    "{:<16} {:<32} {:.6},{:.6}",
                    record.id, record.name, record.lat, record.lon
                )?;
            }
        }
        FavoritesCommands::Add { id, name, lat, lon } => {
            let coordinate = Coordinate::new(lat, lon)
                .ok_or_else(|| anyhow::anyhow!("coordinate {lat},{lon} is out of range"))?;
            store.add(FavoriteRecord {
                id: id.clone(),
                name,
                lat: coordinate.lat,
                lon: coordinate.lon,
            })?;
            writeln!(out, "added {id}")?;
        }
        FavoritesCommands::Remove { id } => {
            if store.remove(&id)? {
                writeln!(out, "removed {id}")?;
            } else {
                writeln!(out, "{id} is not a favorite")?;
            }
        }
    }
    Ok(())
}
