//! Category selection: a coarse gourmet/sightseeing pair or a fine-grained set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Fine-grained categories selectable in the detail filter.
///
/// Declaration order is the order clauses are emitted in the geodata query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DetailCategory {
    Cafe,
    Ramen,
    Sushi,
    FastFood,
    Bar,
    Pub,
    Bakery,
    Park,
    Garden,
    Museum,
    Gallery,
    Viewpoint,
    Attraction,
    ThemePark,
    Zoo,
    Aquarium,
    Historic,
    Temple,
    Shrine,
    Church,
}

impl DetailCategory {
    pub const ALL: [Self; 20] = [
        Self::Cafe,
        Self::Ramen,
        Self::Sushi,
        Self::FastFood,
        Self::Bar,
        Self::Pub,
        Self::Bakery,
        Self::Park,
        Self::Garden,
        Self::Museum,
        Self::Gallery,
        Self::Viewpoint,
        Self::Attraction,
        Self::ThemePark,
        Self::Zoo,
        Self::Aquarium,
        Self::Historic,
        Self::Temple,
        Self::Shrine,
        Self::Church,
    ];

    /// Stable identifier used in share links and on the command line.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::Cafe => "cafe",
            Self::Ramen => "restaurant-ramen",
            Self::Sushi => "restaurant-sushi",
            Self::FastFood => "fast_food",
            Self::Bar => "bar",
            Self::Pub => "pub",
            Self::Bakery => "bakery",
            Self::Park => "park",
            Self::Garden => "garden",
            Self::Museum => "museum",
            Self::Gallery => "gallery",
            Self::Viewpoint => "viewpoint",
            Self::Attraction => "attraction",
            Self::ThemePark => "theme_park",
            Self::Zoo => "zoo",
            Self::Aquarium => "aquarium",
            Self::Historic => "historic",
            Self::Temple => "temple",
            Self::Shrine => "shrine",
            Self::Church => "church",
        }
    }

    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }

    /// Whether the category belongs to the gourmet group (as opposed to
    /// sightseeing).
    #[must_use]
    pub fn is_gourmet(self) -> bool {
        matches!(
            self,
            Self::Cafe
                | Self::Ramen
                | Self::Sushi
                | Self::FastFood
                | Self::Bar
                | Self::Pub
                | Self::Bakery
        )
    }
}

impl std::fmt::Display for DetailCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoarseCategories {
    pub gourmet: bool,
    pub sightseeing: bool,
}

impl CoarseCategories {
    #[must_use]
    pub fn any(&self) -> bool {
        self.gourmet || self.sightseeing
    }
}

/// The categories requested for one search.
///
/// A non-empty `details` set fully replaces `coarse` for query construction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategorySelection {
    pub coarse: CoarseCategories,
    pub details: BTreeSet<DetailCategory>,
}

impl CategorySelection {
    #[must_use]
    pub fn uses_details(&self) -> bool {
        !self.details.is_empty()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.uses_details() && !self.coarse.any()
    }

    /// Parses a comma-separated slug list, skipping blanks and unknown slugs.
    #[must_use]
    pub fn parse_details(raw: &str) -> BTreeSet<DetailCategory> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|slug| {
                let parsed = DetailCategory::from_slug(slug);
                if parsed.is_none() {
                    tracing::debug!(slug, "ignoring unknown detail category");
                }
                parsed
            })
            .collect()
    }

    #[must_use]
    pub fn details_csv(&self) -> String {
        self.details
            .iter()
            .map(|c| c.slug())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_round_trip_for_every_category() {
        for category in DetailCategory::ALL {
            assert_eq!(DetailCategory::from_slug(category.slug()), Some(category));
        }
    }

    #[test]
    fn parse_details_skips_unknown_and_blank() {
        let parsed = CategorySelection::parse_details("cafe,,bogus, zoo");
        assert_eq!(
            parsed.into_iter().collect::<Vec<_>>(),
            vec![DetailCategory::Cafe, DetailCategory::Zoo]
        );
    }

    #[test]
    fn empty_selection_has_neither_coarse_nor_details() {
        assert!(CategorySelection::default().is_empty());
        let coarse_only = CategorySelection {
            coarse: CoarseCategories {
                gourmet: true,
                sightseeing: false,
            },
            details: BTreeSet::new(),
        };
        assert!(!coarse_only.is_empty());
        assert!(!coarse_only.uses_details());
    }

    #[test]
    fn details_override_coarse() {
        let selection = CategorySelection {
            coarse: CoarseCategories::default(),
            details: [DetailCategory::Museum].into_iter().collect(),
        };
        assert!(selection.uses_details());
        assert!(!selection.is_empty());
        assert_eq!(selection.details_csv(), "museum");
    }

    #[test]
    fn gourmet_group_membership() {
        assert!(DetailCategory::Bakery.is_gourmet());
        assert!(!DetailCategory::Shrine.is_gourmet());
    }
}
