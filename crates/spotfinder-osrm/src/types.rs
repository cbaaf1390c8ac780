use serde::Deserialize;

/// Body of a `table` service response.
///
/// `durations[0]` holds seconds from the source (index 0) to every
/// coordinate in the request, with `null` for unreachable pairs.
#[derive(Debug, Deserialize)]
pub struct TableResponse {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub durations: Vec<Vec<Option<f64>>>,
}
