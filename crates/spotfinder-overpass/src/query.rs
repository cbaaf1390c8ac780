//! Overpass QL query construction.

use spotfinder_core::{AreaSpec, CategorySelection, DetailCategory};

/// Server-side evaluation limit in seconds.
pub const SERVER_TIMEOUT_SECS: u32 = 25;

/// Maximum number of elements the interpreter is asked to return.
pub const MAX_ELEMENTS: u32 = 120;

const GOURMET_AMENITIES: &str = r#"["amenity"~"restaurant|cafe|fast_food|bar|pub"]"#;
const SIGHTSEEING_TOURISM: &str =
    r#"["tourism"~"attraction|museum|artwork|viewpoint|gallery|theme_park|zoo|aquarium"]"#;
const SIGHTSEEING_LEISURE: &str = r#"["leisure"~"park|garden"]"#;
const HISTORIC: &str = r#"["historic"]"#;

/// Tag predicate for a fine-grained category.
#[must_use]
pub fn detail_predicate(category: DetailCategory) -> &'static str {
    match category {
        DetailCategory::Cafe => r#"["amenity"="cafe"]"#,
        DetailCategory::Ramen => r#"["amenity"="restaurant"]["cuisine"~"ramen",i]"#,
        DetailCategory::Sushi => r#"["amenity"="restaurant"]["cuisine"~"sushi",i]"#,
        DetailCategory::FastFood => r#"["amenity"="fast_food"]"#,
        DetailCategory::Bar => r#"["amenity"="bar"]"#,
        DetailCategory::Pub => r#"["amenity"="pub"]"#,
        DetailCategory::Bakery => r#"["shop"="bakery"]"#,
        DetailCategory::Park => r#"["leisure"="park"]"#,
        DetailCategory::Garden => r#"["leisure"="garden"]"#,
        DetailCategory::Museum => r#"["tourism"="museum"]"#,
        DetailCategory::Gallery => r#"["tourism"="gallery"]"#,
        DetailCategory::Viewpoint => r#"["tourism"="viewpoint"]"#,
        DetailCategory::Attraction => r#"["tourism"="attraction"]"#,
        DetailCategory::ThemePark => r#"["tourism"="theme_park"]"#,
        DetailCategory::Zoo => r#"["tourism"="zoo"]"#,
        DetailCategory::Aquarium => r#"["tourism"="aquarium"]"#,
        DetailCategory::Historic => HISTORIC,
        DetailCategory::Temple => r#"["amenity"="place_of_worship"]["religion"="buddhist"]"#,
        DetailCategory::Shrine => r#"["amenity"="place_of_worship"]["religion"="shinto"]"#,
        DetailCategory::Church => {
            r#"["amenity"="place_of_worship"]["religion"~"christian|catholic",i]"#
        }
    }
}

/// Geographic filter shared by every clause of a query.
#[must_use]
pub fn area_filter(area: &AreaSpec) -> String {
    match area {
        AreaSpec::Radius { center, meters } => {
            format!("(around:{meters},{},{})", center.lat, center.lon)
        }
        AreaSpec::BoundingBox(bbox) => {
            format!("({},{},{},{})", bbox.south, bbox.west, bbox.north, bbox.east)
        }
    }
}

/// Builds the query for `area` and `selection`.
///
/// Selected fine-grained categories take precedence over the coarse flags.
/// Returns `None` when nothing is selected, which callers report as missing
/// search criteria rather than as an error.
#[must_use]
pub fn build_query(area: &AreaSpec, selection: &CategorySelection) -> Option<String> {
    let predicates: Vec<&str> = if selection.uses_details() {
        // BTreeSet iteration follows declaration order, which is table order.
        selection.details.iter().map(|d| detail_predicate(*d)).collect()
    } else {
        let mut predicates = Vec::new();
        if selection.coarse.gourmet {
            predicates.push(GOURMET_AMENITIES);
        }
        if selection.coarse.sightseeing {
            predicates.extend([SIGHTSEEING_TOURISM, SIGHTSEEING_LEISURE, HISTORIC]);
        }
        predicates
    };

    if predicates.is_empty() {
        return None;
    }

    let filter = area_filter(area);
    let clauses: String = predicates
        .iter()
        .map(|p| format!("  nwr{p}{filter};\n"))
        .collect();

    Some(format!(
        "[out:json][timeout:{SERVER_TIMEOUT_SECS}];\n(\n{clauses});\nout center {MAX_ELEMENTS};"
    ))
}
