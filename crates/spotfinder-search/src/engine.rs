//! Filter, sort and paginate estimated POIs. Pure; never touches the network.

use std::cmp::Ordering;

use serde::Serialize;
use spotfinder_core::{FavoritesStore, Metric, Poi, SearchBudget, SortDirection, SortKey};

pub const PAGE_SIZE: usize = 20;

/// Results kept for paging after sorting.
pub const MAX_RESULTS: usize = 200;

/// User-adjustable view settings applied on top of a budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewOptions {
    pub sort_by: SortKey,
    pub sort_dir: SortDirection,
    pub favorites_only: bool,
}

/// Outcome of [`arrange`].
#[derive(Debug, Clone, PartialEq)]
pub struct Arranged {
    /// Sorted matches, capped at [`MAX_RESULTS`].
    pub items: Vec<Poi>,
    /// Matches before the cap.
    pub found: usize,
}

/// One page of arranged results plus navigation flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPage {
    pub items: Vec<Poi>,
    /// 1-based, already clamped to `1..=total_pages`.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

fn within_budget(poi: &Poi, budget: &SearchBudget) -> bool {
    match budget {
        SearchBudget::Distance { meters, .. } => poi.distance_m <= *meters,
        SearchBudget::Time { minutes, .. } => poi.effective_eta_min() <= *minutes,
    }
}

/// Applies the budget cutoff, the favorites-only restriction and the sort.
///
/// Matches are first ordered by the budget's own metric, then stably by the
/// selected key, so ties under the key keep nearest-first order.
pub fn arrange<F>(
    pois: &[Poi],
    budget: &SearchBudget,
    options: ViewOptions,
    favorites: &F,
) -> Arranged
where
    F: FavoritesStore + ?Sized,
{
    let metric = budget.metric();
    let mut items: Vec<Poi> = pois
        .iter()
        .filter(|poi| within_budget(poi, budget))
        .filter(|poi| !options.favorites_only || favorites.contains(poi.id()))
        .cloned()
        .collect();

    sort_pois(&mut items, SortKey::Auto, SortDirection::Asc, metric);
    sort_pois(&mut items, options.sort_by, options.sort_dir, metric);

    let found = items.len();
    items.truncate(MAX_RESULTS);
    Arranged { items, found }
}

/// Stable sort by `key`, resolving [`SortKey::Auto`] against `metric`.
pub fn sort_pois(items: &mut [Poi], key: SortKey, direction: SortDirection, metric: Metric) {
    let key = key.resolve(metric);
    items.sort_by(|a, b| {
        let ordering = compare(a, b, key);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn compare(a: &Poi, b: &Poi, key: SortKey) -> Ordering {
    match key {
        SortKey::Distance | SortKey::Auto => a.distance_m.total_cmp(&b.distance_m),
        SortKey::Time => a.effective_eta_min().total_cmp(&b.effective_eta_min()),
        SortKey::Name => a.name().to_lowercase().cmp(&b.name().to_lowercase()),
        SortKey::Category => a.place.primary_category().cmp(b.place.primary_category()),
    }
}

#[must_use]
pub fn total_pages(total_items: usize) -> usize {
    total_items.div_ceil(PAGE_SIZE).max(1)
}

/// Slices out `page` (1-based). Out-of-range pages are clamped rather than
/// rejected.
#[must_use]
pub fn paginate(items: &[Poi], page: usize) -> ResultPage {
    let total_items = items.len();
    let total_pages = total_pages(total_items);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * PAGE_SIZE;
    let end = (start + PAGE_SIZE).min(total_items);
    ResultPage {
        items: items.get(start..end).map(<[Poi]>::to_vec).unwrap_or_default(),
        page,
        total_pages,
        total_items,
        has_prev: page > 1,
        has_next: page < total_pages,
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
