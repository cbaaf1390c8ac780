pub mod client;
pub mod error;
pub mod normalize;
pub mod query;
pub mod types;

pub use client::{FailoverState, OverpassClient};
pub use error::OverpassError;
pub use normalize::{normalize_element, normalize_elements, NamePreference};
pub use query::build_query;
pub use types::{ElementCenter, OverpassResponse, RawElement};
