pub mod client;
pub mod error;
pub mod types;

pub use client::{profile_for, OsrmClient, MAX_DESTINATIONS_PER_REQUEST};
pub use error::OsrmError;
pub use types::TableResponse;
