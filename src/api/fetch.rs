// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::episode::Episode;
use crate::error::ApiError;
use crate::http::HttpClient;

use super::model::ApiEpisode;

const EPISODES_PATH: &str = "episodes";

/// Sort direction for episode listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("Invalid sort order: '{s}'. Valid options: asc, desc")),
        }
    }
}

/// Listing parameters, passed through to the API untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
}

impl ListQuery {
    /// The newest `limit` episodes by publication date
    pub fn latest(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            sort: Some("published_at".to_string()),
            order: Some(SortOrder::Desc),
        }
    }
}

/// Client for the episode API
#[derive(Debug, Clone)]
pub struct EpisodeApi<C> {
    client: C,
    base_url: Url,
}

impl<C: HttpClient> EpisodeApi<C> {
    /// Create an API client rooted at `base_url`
    pub fn new(client: C, base_url: &str) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        base_url.set_query(None);
        base_url.set_fragment(None);

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the episode collection with the query applied
    pub fn listing_url(&self, query: &ListQuery) -> Url {
        let mut url = self.endpoint(&[EPISODES_PATH]);

        {
            let mut pairs = url.query_pairs_mut();
            if let Some(limit) = query.limit {
                pairs.append_pair("_limit", &limit.to_string());
            }
            if let Some(ref sort) = query.sort {
                pairs.append_pair("_sort", sort);
            }
            if let Some(order) = query.order {
                pairs.append_pair("_order", order.as_str());
            }
        }

        if url.query() == Some("") {
            url.set_query(None);
        }
        url
    }

    /// URL of a single episode; the id is encoded as one path segment
    pub fn episode_url(&self, id: &str) -> Url {
        self.endpoint(&[EPISODES_PATH, id])
    }

    /// Fetch an ordered listing of episodes
    ///
    /// Records that cannot be converted (bad duration or date) are skipped
    /// with a warning rather than failing the whole listing.
    pub async fn list_episodes(&self, query: &ListQuery) -> Result<Vec<Episode>, ApiError> {
        let url = self.listing_url(query);
        let records: Vec<ApiEpisode> = self.get_json(&url).await?;
        let total = records.len();

        let episodes: Vec<Episode> = records
            .into_iter()
            .filter_map(|record| {
                let id = record.id.clone();
                Episode::try_from(record)
                    .inspect_err(|e| warn!(episode_id = %id, error = %e, "Skipping episode"))
                    .ok()
            })
            .collect();

        debug!(%url, total, kept = episodes.len(), "Fetched episode listing");
        Ok(episodes)
    }

    /// Fetch a single episode by id
    pub async fn get_episode(&self, id: &str) -> Result<Episode, ApiError> {
        let url = self.episode_url(id);
        let record: ApiEpisode = self.get_json(&url).await?;
        debug!(%url, "Fetched episode");
        Episode::try_from(record)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, ApiError> {
        let response = self
            .client
            .get(url.as_str())
            .await
            .map_err(|e| ApiError::FetchFailed {
                url: url.to_string(),
                source: e,
            })?;

        if !response.is_success() {
            return Err(ApiError::HttpStatus {
                url: url.to_string(),
                status: response.status,
            });
        }

        serde_json::from_slice(&response.body).map_err(|e| ApiError::DecodeFailed {
            url: url.to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use crate::http::HttpResponse;
    use async_trait::async_trait;
    use bytes::Bytes;

    #[derive(Clone, Default)]
    struct MockHttpClient {
        responses: HashMap<String, (u16, String)>,
    }

    impl MockHttpClient {
        fn with(mut self, url: &str, status: u16, body: &str) -> Self {
            self.responses
                .insert(url.to_string(), (status, body.to_string()));
            self
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn get(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
            let (status, body) = self
                .responses
                .get(url)
                .cloned()
                .unwrap_or((404, "{}".to_string()));

            Ok(HttpResponse {
                status,
                body: Bytes::from(body),
            })
        }
    }

    const LISTING: &str = r#"[
      {
        "id": "ep-2",
        "title": "Episode 2",
        "members": "Ana",
        "published_at": "2021-01-22 09:00:00",
        "thumbnail": "https://example.com/2.jpg",
        "description": "<p>Two</p>",
        "file": { "url": "https://example.com/2.mp3", "duration": "1800" }
      },
      {
        "id": "broken",
        "title": "Broken",
        "published_at": "not a date",
        "file": { "url": "https://example.com/b.mp3", "duration": 10 }
      },
      {
        "id": "ep-1",
        "title": "Episode 1",
        "members": "Bruno",
        "published_at": "2021-01-08 09:00:00",
        "thumbnail": "https://example.com/1.jpg",
        "description": "<p>One</p>",
        "file": { "url": "https://example.com/1.mp3", "duration": 65 }
      }
    ]"#;

    fn api(client: MockHttpClient) -> EpisodeApi<MockHttpClient> {
        EpisodeApi::new(client, "http://localhost:3333/").unwrap()
    }

    #[test]
    fn listing_url_carries_query_parameters() {
        let api = api(MockHttpClient::default());

        assert_eq!(
            api.listing_url(&ListQuery::latest(12)).as_str(),
            "http://localhost:3333/episodes?_limit=12&_sort=published_at&_order=desc"
        );
        assert_eq!(
            api.listing_url(&ListQuery::default()).as_str(),
            "http://localhost:3333/episodes"
        );
    }

    #[test]
    fn base_url_without_trailing_slash_keeps_path() {
        let api = EpisodeApi::new(MockHttpClient::default(), "https://api.example.com/v1").unwrap();

        assert_eq!(
            api.episode_url("ep-1").as_str(),
            "https://api.example.com/v1/episodes/ep-1"
        );
    }

    #[test]
    fn episode_url_encodes_id_as_single_segment() {
        let api = api(MockHttpClient::default());

        assert_eq!(
            api.episode_url("a/b c").as_str(),
            "http://localhost:3333/episodes/a%2Fb%20c"
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(matches!(
            EpisodeApi::new(MockHttpClient::default(), "mailto:someone@example.com"),
            Err(ApiError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            EpisodeApi::new(MockHttpClient::default(), "not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn sort_order_parses_case_insensitively() {
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("sideways".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::Desc.to_string(), "desc");
    }

    #[tokio::test]
    async fn list_episodes_keeps_order_and_skips_broken_records() {
        let client = MockHttpClient::default().with(
            "http://localhost:3333/episodes?_limit=12&_sort=published_at&_order=desc",
            200,
            LISTING,
        );

        let episodes = api(client)
            .list_episodes(&ListQuery::latest(12))
            .await
            .unwrap();

        let ids: Vec<&str> = episodes.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["ep-2", "ep-1"]);
        assert_eq!(episodes[0].duration(), 1800);
        assert_eq!(episodes[1].duration_as_string(), "00:01:05");
    }

    #[tokio::test]
    async fn get_episode_fetches_single_record() {
        let record = r#"{
          "id": "ep-1",
          "title": "Episode 1",
          "published_at": "2021-01-08 09:00:00",
          "file": { "url": "https://example.com/1.mp3", "duration": 65 }
        }"#;
        let client =
            MockHttpClient::default().with("http://localhost:3333/episodes/ep-1", 200, record);

        let episode = api(client).get_episode("ep-1").await.unwrap();

        assert_eq!(episode.title(), "Episode 1");
        assert_eq!(episode.published_at(), "8 jan 21");
    }

    #[tokio::test]
    async fn http_errors_are_reported() {
        let result = api(MockHttpClient::default()).get_episode("missing").await;

        match result.unwrap_err() {
            ApiError::HttpStatus { status, url } => {
                assert_eq!(status, 404);
                assert_eq!(url, "http://localhost:3333/episodes/missing");
            }
            other => panic!("Expected HttpStatus error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_decode_error() {
        let client =
            MockHttpClient::default().with("http://localhost:3333/episodes", 200, "<html>");

        let result = api(client).list_episodes(&ListQuery::default()).await;

        assert!(matches!(result, Err(ApiError::DecodeFailed { .. })));
    }
}
