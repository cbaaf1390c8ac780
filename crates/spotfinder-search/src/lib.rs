pub mod engine;
pub mod error;
pub mod estimate;
pub mod navigation;
pub mod orchestrator;
pub mod thumbnail;

pub use engine::{
    arrange, paginate, sort_pois, total_pages, Arranged, ResultPage, ViewOptions, MAX_RESULTS,
    PAGE_SIZE,
};
pub use error::SearchError;
pub use estimate::{estimate_heuristic, refine_estimates, TravelTimeSource, REFINE_LIMIT};
pub use navigation::directions_url;
pub use orchestrator::{
    prepare_search, OriginInput, OriginSource, PlaceSource, PreparedSearch, SearchOrchestrator,
    SearchOutcome, SearchSettings, SearchStatus, Snapshot,
};
pub use thumbnail::{ThumbnailClient, ThumbnailEndpoints};
