use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level JSON body returned by an Overpass interpreter.
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<RawElement>,
}

/// One node, way or relation as returned by the interpreter.
///
/// Nodes carry `lat`/`lon` directly; ways and relations only carry a
/// `center` when the query asked for `out center`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawElement {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<ElementCenter>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ElementCenter {
    pub lat: f64,
    pub lon: f64,
}
