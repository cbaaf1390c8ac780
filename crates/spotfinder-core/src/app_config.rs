use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Equivalent geodata endpoints in failover priority order.
    pub overpass_endpoints: Vec<String>,
    /// Client-side timeout for a single endpoint attempt.
    pub overpass_timeout_secs: u64,
    pub osrm_base_url: String,
    pub osrm_timeout_secs: u64,
    /// Whether to ask the routing service for refined travel times.
    pub refine_travel_times: bool,
    pub user_agent: String,
    pub favorites_path: PathBuf,
    /// Language suffix of the preferred `name:<lang>` tag.
    pub name_language: String,
    pub secondary_language: String,
    /// How many POIs per page get a thumbnail lookup.
    pub thumbnail_limit: usize,
}
