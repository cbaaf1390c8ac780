//! Plain-text rendering of a result page.

use std::collections::HashSet;

use reqwest::Url;
use spotfinder_core::{format_distance, format_duration, Place};
use spotfinder_search::{directions_url, OriginSource, SearchStatus, Snapshot, PAGE_SIZE};

/// Category chips shown per place.
const MAX_CHIPS: usize = 3;

pub fn render_snapshot(
    snapshot: &Snapshot,
    thumbnails: &[Option<String>],
    favorites: &HashSet<String>,
) -> String {
    let mut lines = Vec::new();

    if let Some(note) = snapshot.origin_source.and_then(OriginSource::note) {
        lines.push(note.to_owned());
    }
    lines.push(status_line(&snapshot.status));

    let page = &snapshot.page;
    if page.items.is_empty() {
        lines.push("no matching places".to_owned());
    }

    let offset = (page.page - 1) * PAGE_SIZE;
    for (index, poi) in page.items.iter().enumerate() {
        let star = if favorites.contains(poi.id()) { " *" } else { "" };
        let routed = if poi.refined_eta_min.is_some() { " (routed)" } else { "" };
        lines.push(format!(
            "{:>3}. {}{star}  [{}]",
            offset + index + 1,
            poi.name(),
            chips(&poi.place)
        ));
        lines.push(format!(
            "     {} | {}{routed}",
            format_distance(poi.distance_m),
            format_duration(poi.effective_eta_min()),
        ));
        let meta = place_meta(&poi.place);
        if !meta.is_empty() {
            lines.push(format!("     {meta}"));
        }
        if let Some(origin) = snapshot.origin {
            let url = directions_url(origin, poi.place.coordinate, snapshot.travel_mode);
            lines.push(format!("     directions: {url}"));
        }
        if let Some(Some(thumbnail)) = thumbnails.get(index) {
            lines.push(format!("     thumbnail: {thumbnail}"));
        }
        lines.push(format!("     id: {}", poi.id()));
    }

    lines.push(format!(
        "page {}/{} ({} places){}{}",
        page.page,
        page.total_pages,
        page.total_items,
        if page.has_prev { " [prev]" } else { "" },
        if page.has_next { " [next]" } else { "" }
    ));
    lines.push(format!("share: ?{}", snapshot.share_query));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn status_line(status: &SearchStatus) -> String {
    match status {
        SearchStatus::Idle => "ready".to_owned(),
        SearchStatus::Loading => "searching...".to_owned(),
        SearchStatus::Ready { found } => format!("found {found} places"),
        SearchStatus::Failed { message } => message.clone(),
    }
}

fn chips(place: &Place) -> String {
    place
        .categories
        .iter()
        .take(MAX_CHIPS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Cuisine, opening hours and website host, when tagged.
pub fn place_meta(place: &Place) -> String {
    let mut bits = Vec::new();
    if let Some(cuisine) = place.tag("cuisine") {
        bits.push(format!("cuisine: {cuisine}"));
    }
    if let Some(hours) = place.tag("opening_hours") {
        bits.push(format!("hours: {hours}"));
    }
    if let Some(host) = place
        .tag("website")
        .and_then(|site| Url::parse(site).ok())
        .and_then(|url| url.host_str().map(str::to_owned))
    {
        bits.push(format!("web: {host}"));
    }
    bits.join(" | ")
}
