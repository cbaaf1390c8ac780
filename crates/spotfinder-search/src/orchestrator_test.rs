use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize};
use std::time::Duration;

use spotfinder_core::{InMemoryFavorites, Metric};

use super::*;

const HOME: Coordinate = Coordinate {
    lat: 35.0,
    lon: 139.0,
};

fn cafe(id: i64, lat: f64) -> RawElement {
    RawElement {
        kind: "node".to_owned(),
        id,
        lat: Some(lat),
        lon: Some(139.0),
        center: None,
        tags: BTreeMap::from([
            ("amenity".to_owned(), "cafe".to_owned()),
            ("name".to_owned(), format!("Cafe {id:02}")),
        ]),
    }
}

/// Cafes roughly 11 m apart heading north from [`HOME`].
fn cafes(n: i64) -> Vec<RawElement> {
    (0..n)
        .map(|i| cafe(i, 35.0 + 0.0001 * (i as f64 + 1.0)))
        .collect()
}

struct FakePlaces {
    elements: Vec<RawElement>,
    fail: AtomicBool,
    calls: AtomicUsize,
    /// Queries containing this text answer slowly.
    slow_marker: Option<&'static str>,
}

impl FakePlaces {
    fn new(elements: Vec<RawElement>) -> Self {
        Self {
            elements,
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            slow_marker: None,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PlaceSource for FakePlaces {
    async fn fetch_elements(&self, query: &str) -> Result<Vec<RawElement>, OverpassError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.slow_marker.is_some_and(|marker| query.contains(marker)) {
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(OverpassError::UnexpectedStatus {
                status: 500,
                url: "http://fake/api/interpreter".to_owned(),
            });
        }
        Ok(self.elements.clone())
    }
}

#[derive(Default)]
struct FakeRouter {
    calls: AtomicUsize,
    modes: std::sync::Mutex<Vec<TravelMode>>,
}

impl FakeRouter {
    fn modes(&self) -> Vec<TravelMode> {
        self.modes.lock().unwrap().clone()
    }
}

impl TravelTimeSource for FakeRouter {
    type Error = String;

    async fn travel_minutes(
        &self,
        _origin: Coordinate,
        destinations: &[Coordinate],
        mode: TravelMode,
    ) -> Result<Vec<Option<f64>>, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.modes.lock().unwrap().push(mode);
        Ok(vec![Some(1.0); destinations.len()])
    }
}

type TestOrchestrator = SearchOrchestrator<FakePlaces, FakeRouter, InMemoryFavorites>;

fn orchestrator(places: FakePlaces) -> TestOrchestrator {
    SearchOrchestrator::new(
        places,
        FakeRouter::default(),
        InMemoryFavorites::default(),
        SearchSettings::default(),
    )
}

fn at_home() -> OriginInput {
    OriginInput {
        position: Some(HOME),
        ..OriginInput::default()
    }
}

fn completed(outcome: SearchOutcome) -> Snapshot {
    match outcome {
        SearchOutcome::Completed(snapshot) => snapshot,
        SearchOutcome::Superseded => panic!("expected a completed search"),
    }
}

// -----------------------------------------------------------------------
// search
// -----------------------------------------------------------------------

#[tokio::test]
async fn search_completes_with_first_page_and_share_query() {
    let orch = orchestrator(FakePlaces::new(cafes(45)));

    let snapshot = completed(
        orch.search(SearchState::default(), &at_home())
            .await
            .unwrap(),
    );

    assert_eq!(snapshot.status, SearchStatus::Ready { found: 45 });
    assert_eq!(snapshot.page.page, 1);
    assert_eq!(snapshot.page.total_pages, 3);
    assert_eq!(snapshot.page.items.len(), 20);
    assert_eq!(snapshot.page.items[0].id(), "node/0");
    assert_eq!(snapshot.origin_source, Some(OriginSource::Position));
    assert!(snapshot.share_query.contains("page=1"));
    assert!(snapshot.share_query.contains("center=35.000000,139.000000"));
    assert_eq!(orch.travel_times.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn invalid_budget_fails_before_any_fetch() {
    let orch = orchestrator(FakePlaces::new(cafes(3)));
    let state = SearchState {
        distance: Some("far".to_owned()),
        ..SearchState::default()
    };

    let err = orch.search(state, &at_home()).await.unwrap_err();

    assert!(matches!(err, SearchError::Budget(_)), "got: {err:?}");
    assert_eq!(orch.places.calls(), 0);
    assert!(matches!(
        orch.snapshot().await.status,
        SearchStatus::Failed { .. }
    ));
}

#[tokio::test]
async fn missing_categories_fail_before_any_fetch() {
    let orch = orchestrator(FakePlaces::new(cafes(3)));
    let mut state = SearchState::default();
    state.categories.coarse.gourmet = false;
    state.categories.coarse.sightseeing = false;

    let err = orch.search(state, &at_home()).await.unwrap_err();

    assert!(matches!(err, SearchError::NoCategories), "got: {err:?}");
    assert_eq!(orch.places.calls(), 0);
}

#[tokio::test]
async fn provider_failure_keeps_previous_results() {
    let orch = orchestrator(FakePlaces::new(cafes(5)));
    orch.search(SearchState::default(), &at_home())
        .await
        .unwrap();

    orch.places.fail.store(true, Ordering::SeqCst);
    let err = orch
        .search(SearchState::default(), &at_home())
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::Geodata(_)), "got: {err:?}");
    let snapshot = orch.snapshot().await;
    assert_eq!(snapshot.page.items.len(), 5);
    assert_eq!(
        snapshot.status,
        SearchStatus::Failed {
            message: PROVIDER_UNAVAILABLE.to_owned()
        }
    );
}

#[tokio::test]
async fn origin_falls_back_to_map_center_with_note() {
    let orch = orchestrator(FakePlaces::new(cafes(2)));
    let origin = OriginInput {
        map_center: Some(HOME),
        ..OriginInput::default()
    };

    let snapshot = completed(orch.search(SearchState::default(), &origin).await.unwrap());

    assert_eq!(snapshot.origin_source, Some(OriginSource::MapCenter));
    assert!(OriginSource::MapCenter.note().is_some());
    assert_eq!(snapshot.origin, Some(HOME));
}

#[tokio::test]
async fn origin_without_any_hint_uses_default_center() {
    let orch = orchestrator(FakePlaces::new(Vec::new()));

    let snapshot = completed(
        orch.search(SearchState::default(), &OriginInput::default())
            .await
            .unwrap(),
    );

    assert_eq!(snapshot.origin_source, Some(OriginSource::DefaultCenter));
    assert_eq!(snapshot.origin, Some(DEFAULT_MAP_CENTER));
    assert_eq!(snapshot.status, SearchStatus::Ready { found: 0 });
    assert_eq!(snapshot.page.total_pages, 1);
}

#[tokio::test]
async fn time_budget_uses_refined_minutes() {
    let orch = orchestrator(FakePlaces::new(cafes(4)));
    let state = SearchState {
        metric: Metric::Time,
        time: Some("2".to_owned()),
        mode: TravelMode::Driving,
        ..SearchState::default()
    };

    let snapshot = completed(orch.search(state, &at_home()).await.unwrap());

    assert_eq!(snapshot.status, SearchStatus::Ready { found: 4 });
    assert_eq!(snapshot.travel_mode, TravelMode::Driving);
    assert!(snapshot
        .page
        .items
        .iter()
        .all(|p| p.refined_eta_min == Some(1.0)));
}

#[tokio::test]
async fn distance_budget_estimates_with_selected_mode() {
    let orch = orchestrator(FakePlaces::new(cafes(3)));
    let state = SearchState {
        mode: TravelMode::Driving,
        ..SearchState::default()
    };

    let snapshot = completed(orch.search(state, &at_home()).await.unwrap());

    assert_eq!(orch.travel_times.modes(), vec![TravelMode::Driving]);
    let driving_speed = TravelMode::Driving.speed_m_per_min();
    for poi in &snapshot.page.items {
        assert!((poi.heuristic_eta_min - poi.distance_m / driving_speed).abs() < 1e-9);
    }
    // the directions link still hands off on foot
    assert_eq!(snapshot.travel_mode, TravelMode::Walking);
}

#[tokio::test]
async fn refinement_can_be_disabled() {
    let orch = SearchOrchestrator::new(
        FakePlaces::new(cafes(3)),
        FakeRouter::default(),
        InMemoryFavorites::default(),
        SearchSettings {
            refine_travel_times: false,
            ..SearchSettings::default()
        },
    );

    orch.search(SearchState::default(), &at_home())
        .await
        .unwrap();

    assert_eq!(orch.travel_times.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn newer_search_supersedes_slower_older_one() {
    let mut places = FakePlaces::new(cafes(3));
    places.slow_marker = Some("restaurant");
    let orch = orchestrator(places);

    let mut gourmet = SearchState::default();
    gourmet.categories.coarse.sightseeing = false;
    let mut sights = SearchState::default();
    sights.categories.coarse.gourmet = false;
    sights.sort_by = SortKey::Name;

    let origin = at_home();
    let (older, newer) = tokio::join!(orch.search(gourmet, &origin), orch.search(sights, &origin));

    assert_eq!(older.unwrap(), SearchOutcome::Superseded);
    assert!(matches!(newer.unwrap(), SearchOutcome::Completed(_)));
    assert_eq!(
        orch.snapshot().await.status,
        SearchStatus::Ready { found: 3 }
    );
    let state = orch.state().await;
    assert_eq!(state.sort_by, SortKey::Name);
    assert!(!state.categories.coarse.gourmet);
}

// -----------------------------------------------------------------------
// view changes
// -----------------------------------------------------------------------

#[tokio::test]
async fn set_sort_returns_to_first_page_without_refetching() {
    let orch = orchestrator(FakePlaces::new(cafes(45)));
    orch.search(SearchState::default(), &at_home())
        .await
        .unwrap();
    assert_eq!(orch.go_to_page(3).await.page.page, 3);

    let snapshot = orch.set_sort(SortKey::Name, SortDirection::Desc).await;

    assert_eq!(snapshot.page.page, 1);
    assert_eq!(snapshot.page.items[0].name(), "Cafe 44");
    assert!(snapshot.share_query.contains("sortBy=name&sortDir=desc"));
    assert_eq!(orch.places.calls(), 1);
}

#[tokio::test]
async fn set_sort_before_any_search_updates_share_query() {
    let orch = orchestrator(FakePlaces::new(cafes(3)));

    let snapshot = orch.set_sort(SortKey::Category, SortDirection::Desc).await;

    assert_eq!(snapshot.status, SearchStatus::Idle);
    assert!(snapshot
        .share_query
        .contains("sortBy=category&sortDir=desc"));
    let snapshot = orch.set_favorites_only(true).await;
    assert!(snapshot.share_query.contains("favOnly=1"));
    assert_eq!(orch.places.calls(), 0);
}

#[tokio::test]
async fn shop_only_place_sorts_by_its_shop_value() {
    let shop = RawElement {
        kind: "node".to_owned(),
        id: 90,
        lat: Some(35.0001),
        lon: Some(139.0),
        center: None,
        tags: BTreeMap::from([("shop".to_owned(), "supermarket".to_owned())]),
    };
    let bar = RawElement {
        kind: "node".to_owned(),
        id: 91,
        lat: Some(35.0002),
        lon: Some(139.0),
        center: None,
        tags: BTreeMap::from([("amenity".to_owned(), "bar".to_owned())]),
    };
    let orch = orchestrator(FakePlaces::new(vec![shop, cafe(1, 35.0003), bar]));
    let state = SearchState {
        sort_by: SortKey::Category,
        ..SearchState::default()
    };

    let snapshot = completed(orch.search(state, &at_home()).await.unwrap());

    let names: Vec<&str> = snapshot.page.items.iter().map(Poi::name).collect();
    assert_eq!(names, vec!["bar", "Cafe 01", "supermarket"]);
    assert_eq!(
        snapshot.page.items[2].place.primary_category(),
        "supermarket"
    );
}

#[tokio::test]
async fn page_navigation_stops_at_both_ends() {
    let orch = orchestrator(FakePlaces::new(cafes(45)));
    orch.search(SearchState::default(), &at_home())
        .await
        .unwrap();

    assert_eq!(orch.prev_page().await.page.page, 1);
    assert_eq!(orch.next_page().await.page.page, 2);
    let last = orch.next_page().await;
    assert_eq!(last.page.page, 3);
    assert!(!last.page.has_next);
    assert_eq!(orch.next_page().await.page.page, 3);
    assert!(orch.snapshot().await.share_query.contains("page=3"));
}

#[tokio::test]
async fn favorites_only_recomputes_from_retained_results() {
    let orch = orchestrator(FakePlaces::new(cafes(10)));
    orch.search(SearchState::default(), &at_home())
        .await
        .unwrap();

    assert!(orch.toggle_favorite("node/3").await.unwrap());
    let snapshot = orch.set_favorites_only(true).await;

    assert_eq!(snapshot.status, SearchStatus::Ready { found: 1 });
    assert_eq!(snapshot.page.items.len(), 1);
    assert_eq!(snapshot.page.items[0].id(), "node/3");
    assert!(snapshot.share_query.contains("favOnly=1"));

    assert!(!orch.toggle_favorite("node/3").await.unwrap());
    assert!(orch.snapshot().await.page.items.is_empty());
    assert_eq!(orch.places.calls(), 1);
}

#[tokio::test]
async fn toggling_unknown_place_is_an_error() {
    let orch = orchestrator(FakePlaces::new(cafes(1)));
    let err = orch.toggle_favorite("node/99").await.unwrap_err();
    assert!(matches!(err, SearchError::UnknownPlace { .. }), "got: {err:?}");
}

// -----------------------------------------------------------------------
// restore
// -----------------------------------------------------------------------

#[tokio::test]
async fn restore_moves_to_stored_page() {
    let orch = orchestrator(FakePlaces::new(cafes(45)));
    let stored = SearchState {
        page: 3,
        center: Some(HOME),
        ..SearchState::default()
    };

    let snapshot = completed(
        orch.restore(&stored.to_query_string(), &OriginInput::default())
            .await
            .unwrap(),
    );

    assert_eq!(snapshot.page.page, 3);
    assert_eq!(snapshot.page.items.len(), 5);
    assert_eq!(snapshot.origin, Some(HOME));
    assert_eq!(snapshot.origin_source, Some(OriginSource::MapCenter));
}

#[tokio::test]
async fn restore_clamps_page_past_the_end() {
    let orch = orchestrator(FakePlaces::new(cafes(5)));
    let query = format!(
        "{}&page=9",
        SearchState::default().to_query_string().replace("page=1", "page=2")
    );

    let snapshot = completed(orch.restore(&query, &at_home()).await.unwrap());

    assert_eq!(snapshot.page.page, 1);
    assert!(snapshot.share_query.contains("page=1"));
}
