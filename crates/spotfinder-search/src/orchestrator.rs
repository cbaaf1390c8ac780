//! Owns the search session: runs the pipeline, keeps the estimated results,
//! and serves re-sorts, filters and page moves from them without refetching.
//!
//! Every search takes a generation ticket. A search whose ticket is no longer
//! current when it resumes after a network step is discarded, so a slow
//! earlier search can never overwrite a later one.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::Mutex;

use spotfinder_core::{
    AreaSpec, BoundingBox, Coordinate, FavoriteRecord, FavoritesStore, Poi, SearchBudget,
    SearchState, SortDirection, SortKey, TravelMode, DEFAULT_MAP_CENTER,
};
use spotfinder_overpass::{
    build_query, normalize_elements, NamePreference, OverpassClient, OverpassError, RawElement,
};

use crate::engine::{arrange, paginate, ResultPage, ViewOptions};
use crate::error::SearchError;
use crate::estimate::{estimate_heuristic, refine_estimates, TravelTimeSource};

const PROVIDER_UNAVAILABLE: &str = "the geodata service is unavailable; try again later";

/// Source of raw geodata elements for a built query.
pub trait PlaceSource: Send + Sync {
    fn fetch_elements(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<RawElement>, OverpassError>> + Send;
}

impl PlaceSource for OverpassClient {
    fn fetch_elements(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<RawElement>, OverpassError>> + Send {
        self.fetch(query)
    }
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub refine_travel_times: bool,
    pub names: NamePreference,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            refine_travel_times: true,
            names: NamePreference::default(),
        }
    }
}

/// Where a search may start from, most preferred first.
#[derive(Debug, Clone, Copy, Default)]
pub struct OriginInput {
    /// Device position, when known.
    pub position: Option<Coordinate>,
    /// Center of the visible map.
    pub map_center: Option<Coordinate>,
    /// Visible map rectangle, used when bounding-box search is on.
    pub map_bounds: Option<BoundingBox>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginSource {
    Position,
    MapCenter,
    DefaultCenter,
}

impl OriginSource {
    /// Informational message shown when the search did not start from the
    /// device position.
    #[must_use]
    pub fn note(self) -> Option<&'static str> {
        match self {
            Self::Position => None,
            Self::MapCenter => Some("current location unavailable; searching from the map center"),
            Self::DefaultCenter => {
                Some("current location unavailable; searching from the default map center")
            }
        }
    }
}

impl OriginInput {
    fn resolve(&self, state: &SearchState) -> (Coordinate, OriginSource) {
        if let Some(position) = self.position {
            return (position, OriginSource::Position);
        }
        match self
            .map_center
            .or(state.center)
            .or_else(|| self.map_bounds.map(|b| b.center()))
        {
            Some(center) => (center, OriginSource::MapCenter),
            None => (DEFAULT_MAP_CENTER, OriginSource::DefaultCenter),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchStatus {
    Idle,
    Loading,
    Ready { found: usize },
    Failed { message: String },
}

/// Read-only view of the session for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub status: SearchStatus,
    pub origin: Option<Coordinate>,
    pub origin_source: Option<OriginSource>,
    /// Mode for directions links; distance budgets hand off on foot.
    pub travel_mode: TravelMode,
    pub page: ResultPage,
    /// Query string reproducing this view.
    pub share_query: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Completed(Snapshot),
    /// A newer search started while this one was in flight.
    Superseded,
}

/// A validated search, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSearch {
    pub budget: SearchBudget,
    pub query: String,
    pub origin: Coordinate,
    pub origin_source: OriginSource,
}

/// Validates `state` and builds the geodata query without any network call.
///
/// # Errors
///
/// [`SearchError::Budget`] for an invalid budget, [`SearchError::NoCategories`]
/// when no category is selected.
pub fn prepare_search(
    state: &SearchState,
    origin: &OriginInput,
) -> Result<PreparedSearch, SearchError> {
    let budget = state.budget()?;
    if state.categories.is_empty() {
        return Err(SearchError::NoCategories);
    }
    let (center, origin_source) = origin.resolve(state);
    let area = match (state.use_bbox, origin.map_bounds) {
        (true, Some(bounds)) => AreaSpec::BoundingBox(bounds),
        (use_bbox, _) => {
            if use_bbox {
                tracing::debug!("bounding-box search without map bounds; using radius");
            }
            AreaSpec::radius(center, f64::from(budget.search_radius_m()))
        }
    };
    let query = build_query(&area, &state.categories).ok_or(SearchError::NoCategories)?;
    Ok(PreparedSearch {
        budget,
        query,
        origin: center,
        origin_source,
    })
}

struct Retained {
    estimated: Vec<Poi>,
    budget: SearchBudget,
    origin: Coordinate,
    origin_source: OriginSource,
}

struct Session<F> {
    favorites: F,
    state: SearchState,
    status: SearchStatus,
    retained: Option<Retained>,
    arranged: Vec<Poi>,
    share_query: String,
}

impl<F: FavoritesStore> Session<F> {
    fn view_options(&self) -> ViewOptions {
        ViewOptions {
            sort_by: self.state.sort_by,
            sort_dir: self.state.sort_dir,
            favorites_only: self.state.favorites_only,
        }
    }

    /// Re-derives the arranged list from the retained estimates.
    fn rearrange(&mut self) {
        let Some(retained) = &self.retained else {
            self.share_query = self.state.to_query_string();
            return;
        };
        let arranged = arrange(
            &retained.estimated,
            &retained.budget,
            self.view_options(),
            &self.favorites,
        );
        if matches!(self.status, SearchStatus::Ready { .. }) {
            self.status = SearchStatus::Ready {
                found: arranged.found,
            };
        }
        self.arranged = arranged.items;
        self.state.page = paginate(&self.arranged, self.state.page).page;
        self.share_query = self.state.to_query_string();
    }

    fn snapshot(&self) -> Snapshot {
        let travel_mode = self
            .retained
            .as_ref()
            .map_or(TravelMode::Walking, |r| r.budget.directions_mode());
        Snapshot {
            status: self.status.clone(),
            origin: self.retained.as_ref().map(|r| r.origin),
            origin_source: self.retained.as_ref().map(|r| r.origin_source),
            travel_mode,
            page: paginate(&self.arranged, self.state.page),
            share_query: self.share_query.clone(),
        }
    }
}

pub struct SearchOrchestrator<P, T, F> {
    places: P,
    travel_times: T,
    settings: SearchSettings,
    generation: AtomicU64,
    session: Mutex<Session<F>>,
}

impl<P, T, F> SearchOrchestrator<P, T, F>
where
    P: PlaceSource,
    T: TravelTimeSource,
    F: FavoritesStore,
{
    pub fn new(places: P, travel_times: T, favorites: F, settings: SearchSettings) -> Self {
        let state = SearchState::default();
        let share_query = state.to_query_string();
        Self {
            places,
            travel_times,
            settings,
            generation: AtomicU64::new(0),
            session: Mutex::new(Session {
                favorites,
                state,
                status: SearchStatus::Idle,
                retained: None,
                arranged: Vec::new(),
                share_query,
            }),
        }
    }

    /// Runs a new search from `state` and shows its first page.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Budget`] or [`SearchError::NoCategories`] for invalid
    ///   input, before any network call.
    /// - [`SearchError::Geodata`] when every geodata endpoint failed; the
    ///   previous results stay in place.
    pub async fn search(
        &self,
        state: SearchState,
        origin: &OriginInput,
    ) -> Result<SearchOutcome, SearchError> {
        self.run(state, origin, 1).await
    }

    /// Runs the search encoded in a share-link query string and moves to its
    /// stored page, clamped to the pages available.
    ///
    /// # Errors
    ///
    /// [`SearchError::State`] for an undecodable query string, otherwise as
    /// [`Self::search`].
    pub async fn restore(
        &self,
        query: &str,
        origin: &OriginInput,
    ) -> Result<SearchOutcome, SearchError> {
        let state = SearchState::from_query_string(query)?;
        let page = state.page;
        self.run(state, origin, page).await
    }

    async fn run(
        &self,
        mut state: SearchState,
        origin: &OriginInput,
        page: usize,
    ) -> Result<SearchOutcome, SearchError> {
        let PreparedSearch {
            budget,
            query,
            origin: origin_point,
            origin_source,
        } = match prepare_search(&state, origin) {
            Ok(prepared) => prepared,
            Err(err) => {
                self.session.lock().await.status = SearchStatus::Failed {
                    message: err.to_string(),
                };
                return Err(err);
            }
        };

        let ticket = {
            let mut session = self.session.lock().await;
            session.status = SearchStatus::Loading;
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        let elements = match self.places.fetch_elements(&query).await {
            Ok(elements) => elements,
            Err(err) => {
                let mut session = self.session.lock().await;
                if !self.is_current(ticket) {
                    tracing::debug!(ticket, "discarding failure of superseded search");
                    return Ok(SearchOutcome::Superseded);
                }
                session.status = SearchStatus::Failed {
                    message: PROVIDER_UNAVAILABLE.to_owned(),
                };
                return Err(SearchError::Geodata(err));
            }
        };
        if !self.is_current(ticket) {
            tracing::debug!(ticket, "search superseded after geodata fetch");
            return Ok(SearchOutcome::Superseded);
        }

        let places = normalize_elements(elements, &self.settings.names);
        let mode = budget.travel_mode();
        let mut estimated = estimate_heuristic(places, origin_point, mode);
        let refined = if self.settings.refine_travel_times {
            let refined =
                refine_estimates(&mut estimated, origin_point, mode, &self.travel_times).await;
            if !self.is_current(ticket) {
                tracing::debug!(ticket, "search superseded after travel-time refinement");
                return Ok(SearchOutcome::Superseded);
            }
            refined
        } else {
            0
        };

        let mut session = self.session.lock().await;
        if !self.is_current(ticket) {
            return Ok(SearchOutcome::Superseded);
        }

        if state.center.is_none() {
            state.center = Some(origin_point);
        }
        state.page = page;
        let fetched = estimated.len();
        session.state = state;
        session.retained = Some(Retained {
            estimated,
            budget,
            origin: origin_point,
            origin_source,
        });
        session.status = SearchStatus::Ready { found: 0 };
        session.rearrange();

        tracing::info!(
            fetched,
            refined,
            shown = session.arranged.len(),
            origin = %origin_point,
            "search completed"
        );
        Ok(SearchOutcome::Completed(session.snapshot()))
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    /// Changes the sort and returns to the first page.
    pub async fn set_sort(&self, sort_by: SortKey, sort_dir: SortDirection) -> Snapshot {
        let mut session = self.session.lock().await;
        session.state.sort_by = sort_by;
        session.state.sort_dir = sort_dir;
        session.state.page = 1;
        session.rearrange();
        session.snapshot()
    }

    /// Toggles the favorites-only restriction and returns to the first page.
    pub async fn set_favorites_only(&self, favorites_only: bool) -> Snapshot {
        let mut session = self.session.lock().await;
        session.state.favorites_only = favorites_only;
        session.state.page = 1;
        session.rearrange();
        session.snapshot()
    }

    /// Moves to `page`, clamped to the available pages.
    pub async fn go_to_page(&self, page: usize) -> Snapshot {
        let mut session = self.session.lock().await;
        session.state.page = paginate(&session.arranged, page).page;
        session.share_query = session.state.to_query_string();
        session.snapshot()
    }

    pub async fn next_page(&self) -> Snapshot {
        let current = self.session.lock().await.state.page;
        self.go_to_page(current.saturating_add(1)).await
    }

    pub async fn prev_page(&self) -> Snapshot {
        let current = self.session.lock().await.state.page;
        self.go_to_page(current.saturating_sub(1)).await
    }

    /// Toggles a place from the current results in or out of the favorites.
    /// Returns whether it is a favorite afterwards.
    ///
    /// # Errors
    ///
    /// - [`SearchError::UnknownPlace`] if `id` is not in the retained results.
    /// - [`SearchError::Favorites`] if the store cannot persist the change.
    pub async fn toggle_favorite(&self, id: &str) -> Result<bool, SearchError> {
        let mut session = self.session.lock().await;
        let record = session
            .retained
            .as_ref()
            .and_then(|r| r.estimated.iter().find(|p| p.id() == id))
            .map(|p| FavoriteRecord::from(&p.place))
            .ok_or_else(|| SearchError::UnknownPlace { id: id.to_owned() })?;
        let now_favorite = session.favorites.toggle(record)?;
        if session.state.favorites_only {
            session.rearrange();
        }
        Ok(now_favorite)
    }

    pub async fn favorites(&self) -> Vec<FavoriteRecord> {
        self.session.lock().await.favorites.list()
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.session.lock().await.snapshot()
    }

    pub async fn state(&self) -> SearchState {
        self.session.lock().await.state.clone()
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
