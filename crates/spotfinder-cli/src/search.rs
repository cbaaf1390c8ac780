//! `search` and `query` command handlers.

use std::collections::HashSet;

use clap::Args;
use spotfinder_core::{
    AppConfig, BoundingBox, CategorySelection, Coordinate, DetailCategory, DistanceUnit,
    JsonFileFavorites, Metric, SearchState, SortDirection, SortKey, TravelMode,
};
use spotfinder_osrm::OsrmClient;
use spotfinder_overpass::{NamePreference, OverpassClient};
use spotfinder_search::{
    prepare_search, OriginInput, SearchOrchestrator, SearchOutcome, SearchSettings, SearchStatus,
    ThumbnailClient,
};

use crate::render;

type CliOrchestrator = SearchOrchestrator<OverpassClient, OsrmClient, JsonFileFavorites>;

/// Search-form fields. Anything left unset keeps the value from `--from-url`,
/// or the form default.
#[derive(Debug, Clone, Default, Args)]
pub struct SearchForm {
    /// Budget metric: distance or time
    #[arg(long)]
    pub metric: Option<Metric>,
    /// Distance budget, in --unit
    #[arg(long)]
    pub distance: Option<String>,
    /// Unit of --distance: m or km
    #[arg(long = "unit")]
    pub distance_unit: Option<DistanceUnit>,
    /// Time budget in minutes
    #[arg(long)]
    pub time: Option<String>,
    /// Travel mode for time budgets: walking or driving
    #[arg(long)]
    pub mode: Option<TravelMode>,
    /// Include restaurants, cafes, bars and pubs
    #[arg(long, overrides_with = "no_gourmet")]
    pub gourmet: bool,
    #[arg(long, overrides_with = "gourmet")]
    pub no_gourmet: bool,
    /// Include attractions, parks and historic sites
    #[arg(long, overrides_with = "no_sight")]
    pub sight: bool,
    #[arg(long, overrides_with = "sight")]
    pub no_sight: bool,
    /// Fine-grained categories, comma separated (e.g. cafe,restaurant-ramen,shrine)
    #[arg(long)]
    pub details: Option<String>,
    /// Sort key: auto, distance, time, name or category
    #[arg(long)]
    pub sort_by: Option<SortKey>,
    /// Sort direction: asc or desc
    #[arg(long)]
    pub sort_dir: Option<SortDirection>,
    /// Search the --bounds rectangle instead of a radius
    #[arg(long)]
    pub bbox: bool,
    /// Only show favorites
    #[arg(long)]
    pub favorites_only: bool,
    /// Result page to show (1-based)
    #[arg(long)]
    pub page: Option<usize>,
}

impl SearchForm {
    /// Overlays the fields that were given onto `base`.
    ///
    /// # Errors
    ///
    /// Returns an error when `--details` names an unknown category.
    pub fn apply(&self, mut base: SearchState) -> anyhow::Result<SearchState> {
        if let Some(metric) = self.metric {
            base.metric = metric;
        }
        if let Some(distance) = &self.distance {
            base.distance = Some(distance.clone());
        }
        if let Some(unit) = self.distance_unit {
            base.distance_unit = unit;
        }
        if let Some(time) = &self.time {
            base.time = Some(time.clone());
        }
        if let Some(mode) = self.mode {
            base.mode = mode;
        }
        if self.gourmet || self.no_gourmet {
            base.categories.coarse.gourmet = self.gourmet;
        }
        if self.sight || self.no_sight {
            base.categories.coarse.sightseeing = self.sight;
        }
        if let Some(details) = &self.details {
            if let Some(unknown) = details
                .split(',')
                .map(str::trim)
                .find(|slug| !slug.is_empty() && DetailCategory::from_slug(slug).is_none())
            {
                anyhow::bail!("unknown category {unknown:?}");
            }
            base.categories.details = CategorySelection::parse_details(details);
        }
        if let Some(sort_by) = self.sort_by {
            base.sort_by = sort_by;
        }
        if let Some(sort_dir) = self.sort_dir {
            base.sort_dir = sort_dir;
        }
        if self.bbox {
            base.use_bbox = true;
        }
        if self.favorites_only {
            base.favorites_only = true;
        }
        if let Some(page) = self.page {
            base.page = page.max(1);
        }
        Ok(base)
    }
}

/// Where the search starts.
#[derive(Debug, Clone, Default, Args)]
pub struct OriginArgs {
    /// Current latitude
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,
    /// Current longitude
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
    /// Map center as LAT,LON; used when no position is given
    #[arg(long, allow_hyphen_values = true)]
    pub center: Option<String>,
    /// Visible map rectangle as SOUTH,WEST,NORTH,EAST
    #[arg(long, allow_hyphen_values = true)]
    pub bounds: Option<String>,
}

impl OriginArgs {
    /// # Errors
    ///
    /// Returns an error for out-of-range or malformed coordinates.
    pub fn to_origin(&self) -> anyhow::Result<OriginInput> {
        let position = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(
                Coordinate::new(lat, lon)
                    .ok_or_else(|| anyhow::anyhow!("position {lat},{lon} is out of range"))?,
            ),
            _ => None,
        };
        let map_center = self
            .center
            .as_deref()
            .map(|raw| {
                Coordinate::parse_pair(raw)
                    .ok_or_else(|| anyhow::anyhow!("--center must be LAT,LON, got {raw:?}"))
            })
            .transpose()?;
        let map_bounds = self
            .bounds
            .as_deref()
            .map(|raw| {
                BoundingBox::parse(raw).ok_or_else(|| {
                    anyhow::anyhow!("--bounds must be SOUTH,WEST,NORTH,EAST, got {raw:?}")
                })
            })
            .transpose()?;
        Ok(OriginInput {
            position,
            map_center,
            map_bounds,
        })
    }
}

/// Everything the `search` subcommand was given.
#[derive(Debug)]
pub struct SearchRequest {
    pub form: SearchForm,
    pub origin: OriginArgs,
    pub from_url: Option<String>,
    pub thumbnails: bool,
    pub toggle_favorite: Vec<String>,
    pub json: bool,
}

/// Accepts a full share link or just its query string.
pub fn share_query_of(link: &str) -> &str {
    let query = link.split_once('?').map_or(link, |(_, query)| query);
    query.split_once('#').map_or(query, |(query, _)| query)
}

fn build_orchestrator(config: &AppConfig) -> anyhow::Result<CliOrchestrator> {
    let overpass = OverpassClient::new(
        config.overpass_endpoints.clone(),
        config.overpass_timeout_secs,
        &config.user_agent,
    )?;
    let osrm = OsrmClient::with_base_url(
        &config.osrm_base_url,
        config.osrm_timeout_secs,
        &config.user_agent,
    )?;
    let favorites = JsonFileFavorites::open(&config.favorites_path);
    let settings = SearchSettings {
        refine_travel_times: config.refine_travel_times,
        names: NamePreference::new(&config.name_language, &config.secondary_language),
    };
    Ok(SearchOrchestrator::new(overpass, osrm, favorites, settings))
}

/// Runs one search and prints the requested page.
///
/// # Errors
///
/// Returns an error for invalid flags, invalid search input, or when every
/// geodata endpoint failed.
pub(crate) async fn run_search(config: &AppConfig, request: &SearchRequest) -> anyhow::Result<()> {
    let origin = request.origin.to_origin()?;
    let base = match &request.from_url {
        Some(link) => SearchState::from_query_string(share_query_of(link))?,
        None => SearchState::default(),
    };
    let state = request.form.apply(base)?;
    let orchestrator = build_orchestrator(config)?;

    let outcome = if request.from_url.is_some() || request.form.page.is_some() {
        orchestrator.restore(&state.to_query_string(), &origin).await
    } else {
        orchestrator.search(state, &origin).await
    };

    let mut snapshot = match outcome {
        Ok(SearchOutcome::Completed(snapshot)) => snapshot,
        Ok(SearchOutcome::Superseded) => anyhow::bail!("search was superseded"),
        Err(err) => {
            if let SearchStatus::Failed { message } = orchestrator.snapshot().await.status {
                eprintln!("{message}");
            }
            return Err(err.into());
        }
    };

    if !request.toggle_favorite.is_empty() {
        for id in &request.toggle_favorite {
            let now_favorite = orchestrator.toggle_favorite(id).await?;
            let verb = if now_favorite { "added to" } else { "removed from" };
            eprintln!("{id} {verb} favorites");
        }
        snapshot = orchestrator.snapshot().await;
    }

    if request.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let thumbnails = if request.thumbnails {
        ThumbnailClient::new(
            config.overpass_timeout_secs,
            &config.user_agent,
            config.thumbnail_limit,
        )?
        .lookup_many(&snapshot.page.items)
        .await
    } else {
        Vec::new()
    };
    let favorite_ids: HashSet<String> = orchestrator
        .favorites()
        .await
        .into_iter()
        .map(|record| record.id)
        .collect();

    print!(
        "{}",
        render::render_snapshot(&snapshot, &thumbnails, &favorite_ids)
    );
    Ok(())
}

/// Prints the geodata query a search would send.
///
/// # Errors
///
/// Returns an error for invalid flags or invalid search input.
pub(crate) fn run_query(form: &SearchForm, origin: &OriginArgs) -> anyhow::Result<()> {
    let state = form.apply(SearchState::default())?;
    let prepared = prepare_search(&state, &origin.to_origin()?)?;
    if let Some(note) = prepared.origin_source.note() {
        eprintln!("{note}");
    }
    println!("{}", prepared.query);
    Ok(())
}
