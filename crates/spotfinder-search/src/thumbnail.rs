//! Best-effort thumbnail lookup from encyclopedia tags on a place.
//!
//! A `wikipedia=<lang>:<title>` tag resolves through the page-summary API;
//! otherwise a `wikidata=Q<n>` tag resolves through the entity's image
//! property. Every failure yields `None`.

use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use spotfinder_core::Poi;

use crate::error::SearchError;

static WIKIPEDIA_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]{2,3}(?:-[a-z0-9]+)*):(.+)$").expect("valid wikipedia tag regex")
});
static WIKIDATA_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Q[1-9][0-9]*$").expect("valid wikidata id regex"));

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const THUMBNAIL_WIDTH: u32 = 120;

/// Base URLs of the lookup services. `{lang}` in `wikipedia` is replaced with
/// the article language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailEndpoints {
    pub wikipedia: String,
    pub wikidata: String,
    pub commons: String,
}

impl Default for ThumbnailEndpoints {
    fn default() -> Self {
        Self {
            wikipedia: "https://{lang}.wikipedia.org".to_owned(),
            wikidata: "https://www.wikidata.org".to_owned(),
            commons: "https://commons.wikimedia.org".to_owned(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PageSummary {
    thumbnail: Option<SummaryImage>,
}

#[derive(Debug, Deserialize)]
struct SummaryImage {
    source: String,
}

pub struct ThumbnailClient {
    client: Client,
    endpoints: ThumbnailEndpoints,
    limit: usize,
}

impl ThumbnailClient {
    /// Creates a client that looks up at most `limit` places per call.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str, limit: usize) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            endpoints: ThumbnailEndpoints::default(),
            limit,
        })
    }

    #[must_use]
    pub fn with_endpoints(mut self, endpoints: ThumbnailEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Thumbnails for the first `limit` POIs, looked up concurrently and
    /// returned in input order.
    pub async fn lookup_many(&self, pois: &[Poi]) -> Vec<Option<String>> {
        let limited = &pois[..pois.len().min(self.limit)];
        stream::iter(limited)
            .map(|poi| self.lookup(&poi.place.tags))
            .buffered(self.limit.max(1))
            .collect()
            .await
    }

    pub async fn lookup(&self, tags: &BTreeMap<String, String>) -> Option<String> {
        if let Some(url) = self.from_wikipedia(tags).await {
            return Some(url);
        }
        self.from_wikidata(tags).await
    }

    async fn from_wikipedia(&self, tags: &BTreeMap<String, String>) -> Option<String> {
        let raw = tags.get("wikipedia")?;
        let captures = WIKIPEDIA_TAG_RE.captures(raw.trim())?;
        let lang = captures.get(1)?.as_str();
        let title = captures.get(2)?.as_str().replace(' ', "_");
        let url = format!(
            "{}/api/rest_v1/page/summary/{}",
            self.endpoints.wikipedia.replace("{lang}", lang),
            utf8_percent_encode(&title, URI_COMPONENT)
        );

        let summary: PageSummary = self.get_json(&url).await?;
        summary.thumbnail.map(|t| t.source)
    }

    async fn from_wikidata(&self, tags: &BTreeMap<String, String>) -> Option<String> {
        let id = tags.get("wikidata").map(|s| s.trim())?;
        if !WIKIDATA_ID_RE.is_match(id) {
            return None;
        }
        let url = format!("{}/wiki/Special:EntityData/{id}.json", self.endpoints.wikidata);

        let entity: serde_json::Value = self.get_json(&url).await?;
        let pointer = format!("/entities/{id}/claims/P18/0/mainsnak/datavalue/value");
        let file_name = entity.pointer(&pointer)?.as_str()?.replace(' ', "_");
        Some(format!(
            "{}/wiki/Special:FilePath/{}?width={THUMBNAIL_WIDTH}",
            self.endpoints.commons,
            utf8_percent_encode(&file_name, URI_COMPONENT)
        ))
    }

    async fn get_json<T>(&self, url: &str) -> Option<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(url, error = %err, "thumbnail lookup failed");
                return None;
            }
        };
        if !response.status().is_success() {
            tracing::debug!(url, status = response.status().as_u16(), "thumbnail lookup failed");
            return None;
        }
        response
            .json::<T>()
            .await
            .map_err(|err| tracing::debug!(url, error = %err, "thumbnail body did not parse"))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wikipedia_tag_pattern() {
        let caps = WIKIPEDIA_TAG_RE.captures("ja:東京タワー").unwrap();
        assert_eq!(&caps[1], "ja");
        assert_eq!(&caps[2], "東京タワー");
        assert!(WIKIPEDIA_TAG_RE.is_match("zh-yue:Something"));
        assert!(!WIKIPEDIA_TAG_RE.is_match("Tokyo Tower"));
        assert!(!WIKIPEDIA_TAG_RE.is_match("evil.example/x:Title"));
    }

    #[test]
    fn wikidata_id_pattern() {
        assert!(WIKIDATA_ID_RE.is_match("Q1055"));
        assert!(!WIKIDATA_ID_RE.is_match("Q0"));
        assert!(!WIKIDATA_ID_RE.is_match("Q12/../x"));
    }

    #[test]
    fn file_names_are_encoded_like_uri_components() {
        let encoded = utf8_percent_encode("Tokyo_Tower_(2023).jpg", URI_COMPONENT).to_string();
        assert_eq!(encoded, "Tokyo_Tower_(2023).jpg");
        let encoded = utf8_percent_encode("a&b.jpg", URI_COMPONENT).to_string();
        assert_eq!(encoded, "a%26b.jpg");
    }
}
