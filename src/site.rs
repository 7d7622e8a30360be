// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::api::{EpisodeApi, ListQuery};
use crate::episode::{Episode, episode_page_path, page_slug};
use crate::error::{BuildError, PageError};
use crate::http::HttpClient;
use crate::progress::{ProgressEvent, SharedProgressReporter};
use crate::render::{episode_page, home_page};

/// Name of the JSON file holding the listing for client-side players
pub const EPISODES_DATA_FILENAME: &str = "episodes.json";

const INDEX_FILENAME: &str = "index.html";

/// Options for a static site build
#[derive(Debug, Clone)]
pub struct SiteOptions {
    /// Listing shown on the home page
    pub listing: ListQuery,
    /// Maximum number of detail pages to pre-render (None = all listed)
    pub limit: Option<usize>,
    /// Maximum number of detail pages fetched at once
    pub max_concurrent: usize,
    /// Keep rendering if individual pages fail
    pub continue_on_error: bool,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            listing: ListQuery::latest(12),
            limit: None,
            max_concurrent: 3,
            continue_on_error: true,
        }
    }
}

/// Result of a site build
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Episodes on the home page
    pub listed: usize,
    /// Detail pages written
    pub rendered: usize,
    /// Listed episodes whose detail page was not pre-rendered
    pub skipped: usize,
    /// Detail pages that failed
    pub failed: usize,
    /// Details of failed pages (episode id, error message)
    pub failed_pages: Vec<(String, String)>,
}

/// Build the static site into `output_dir`
///
/// This is the main entry point of the library. It:
/// 1. Fetches the episode listing
/// 2. Writes the home page and the episode data file
/// 3. Fetches and renders detail pages in parallel
pub async fn build_site<C: HttpClient + Clone + 'static>(
    api: &EpisodeApi<C>,
    output_dir: &Path,
    options: &SiteOptions,
    reporter: SharedProgressReporter,
) -> Result<BuildResult, BuildError> {
    reporter.report(ProgressEvent::FetchingListing {
        url: api.listing_url(&options.listing).to_string(),
    });

    let episodes = api.list_episodes(&options.listing).await?;

    let to_render: Vec<Episode> = match options.limit {
        Some(limit) => episodes.iter().take(limit).cloned().collect(),
        None => episodes.clone(),
    };
    let total_pages = to_render.len();
    let skipped = episodes.len() - total_pages;

    reporter.report(ProgressEvent::ListingFetched {
        total_episodes: episodes.len(),
        to_render: total_pages,
    });
    info!(listed = episodes.len(), total_pages, "Building site");

    let index_path = write_index(&episodes, output_dir).await?;
    reporter.report(ProgressEvent::IndexWritten { path: index_path });

    // Slot pool: bounds concurrency and hands out stable slot IDs
    let max_concurrent = options.max_concurrent.max(1);
    let (slot_tx, mut slot_rx) = tokio::sync::mpsc::channel(max_concurrent);
    for slot in 0..max_concurrent {
        let _ = slot_tx.try_send(slot);
    }

    let rendered_count = Arc::new(AtomicUsize::new(0));
    let failed_count = Arc::new(AtomicUsize::new(0));
    let failed_pages = Arc::new(Mutex::new(Vec::new()));

    let output_dir = output_dir.to_path_buf();
    let mut handles = Vec::new();

    for (page_index, episode) in to_render.into_iter().enumerate() {
        if !options.continue_on_error && failed_count.load(Ordering::SeqCst) > 0 {
            break;
        }

        let Some(slot_id) = slot_rx.recv().await else {
            break;
        };

        let slot_tx = slot_tx.clone();
        let api = api.clone();
        let output_dir = output_dir.clone();
        let reporter = reporter.clone();
        let rendered_count = rendered_count.clone();
        let failed_count = failed_count.clone();
        let failed_pages = failed_pages.clone();

        let handle = tokio::spawn(async move {
            let episode_id = episode.id().to_string();

            reporter.report(ProgressEvent::PageStarting {
                slot_id,
                episode_id: episode_id.clone(),
                page_index,
                total_pages,
            });

            match render_episode_page(&api, &episode_id, &output_dir).await {
                Ok((path, title)) => {
                    rendered_count.fetch_add(1, Ordering::SeqCst);
                    reporter.report(ProgressEvent::PageRendered {
                        slot_id,
                        episode_id,
                        title,
                        path,
                    });
                }
                Err(e) => {
                    warn!(episode_id = %episode_id, error = %e, "Episode page failed");
                    failed_count.fetch_add(1, Ordering::SeqCst);
                    reporter.report(ProgressEvent::PageFailed {
                        slot_id,
                        episode_id: episode_id.clone(),
                        error: e.to_string(),
                    });
                    failed_pages.lock().await.push((episode_id, e.to_string()));
                }
            }

            // Return slot to the pool when done
            let _ = slot_tx.send(slot_id).await;
        });

        handles.push(handle);
    }

    for handle in handles {
        let _ = handle.await;
    }

    let rendered = rendered_count.load(Ordering::SeqCst);
    let failed = failed_count.load(Ordering::SeqCst);
    let failed_pages = failed_pages.lock().await.clone();

    reporter.report(ProgressEvent::BuildCompleted {
        rendered_count: rendered,
        skipped_count: skipped,
        failed_count: failed,
    });
    info!(rendered, skipped, failed, "Site build finished");

    if rendered == 0 && failed > 0 && !options.continue_on_error {
        return Err(BuildError::AllPagesFailed);
    }

    Ok(BuildResult {
        listed: episodes.len(),
        rendered,
        skipped,
        failed,
        failed_pages,
    })
}

/// Write `index.html` and the episode data file, returning the index path
async fn write_index(episodes: &[Episode], output_dir: &Path) -> Result<PathBuf, BuildError> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| BuildError::CreateDirectoryFailed {
            path: output_dir.to_path_buf(),
            source: e,
        })?;

    let data_path = output_dir.join(EPISODES_DATA_FILENAME);
    let json = serde_json::to_string_pretty(episodes)?;
    tokio::fs::write(&data_path, json)
        .await
        .map_err(|e| BuildError::WriteFailed {
            path: data_path,
            source: e,
        })?;

    let index_path = output_dir.join(INDEX_FILENAME);
    tokio::fs::write(&index_path, home_page(episodes))
        .await
        .map_err(|e| BuildError::WriteFailed {
            path: index_path.clone(),
            source: e,
        })?;

    Ok(index_path)
}

/// Fetch one episode and write its detail page, returning path and title
pub async fn render_episode_page<C: HttpClient>(
    api: &EpisodeApi<C>,
    episode_id: &str,
    output_dir: &Path,
) -> Result<(PathBuf, String), PageError> {
    let slug = page_slug(episode_id).ok_or_else(|| PageError::UnsafeId(episode_id.to_string()))?;
    let episode = api.get_episode(episode_id).await?;

    let path = episode_page_path(output_dir, &slug);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| PageError::CreateDirectoryFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }

    tokio::fs::write(&path, episode_page(&episode))
        .await
        .map_err(|e| PageError::WriteFailed {
            path: path.clone(),
            source: e,
        })?;

    Ok((path, episode.title().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use crate::http::HttpResponse;
    use crate::progress::NoopReporter;
    use async_trait::async_trait;
    use bytes::Bytes;
    use tempfile::tempdir;

    const BASE_URL: &str = "http://localhost:3333/";

    #[derive(Clone, Default)]
    struct MockHttpClient {
        responses: Arc<HashMap<String, (u16, String)>>,
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

    fn record(id: &str, title: &str) -> String {
        format!(
            r#"{{
              "id": "{id}",
              "title": "{title}",
              "members": "Diego",
              "published_at": "2021-01-08 09:00:00",
              "thumbnail": "https://example.com/{id}.jpg",
              "description": "<p>About {title}</p>",
              "file": {{ "url": "https://example.com/{id}.mp3", "duration": 3725 }}
            }}"#
        )
    }

    /// Three listed episodes; `broken` detail lookups return 500
    fn api(broken: Option<&str>) -> EpisodeApi<MockHttpClient> {
        let episodes = [
            ("ep-3", "Episode ep-3"),
            ("ep-2", "Episode ep-2"),
            ("ep-1", "Episode ep-1"),
        ];
        api_serving(&episodes, broken)
    }

    /// Serve a listing of `(id, title)` records plus one detail record each
    fn api_serving(
        episodes: &[(&str, &str)],
        broken: Option<&str>,
    ) -> EpisodeApi<MockHttpClient> {
        let urls = EpisodeApi::new(MockHttpClient::default(), BASE_URL).unwrap();
        let listing = format!(
            "[{}]",
            episodes
                .iter()
                .map(|(id, title)| record(id, title))
                .collect::<Vec<_>>()
                .join(",")
        );

        let mut responses = HashMap::new();
        responses.insert(
            urls.listing_url(&ListQuery::latest(12)).to_string(),
            (200, listing),
        );
        for &(id, title) in episodes {
            let response = if Some(id) == broken {
                (500, "oops".to_string())
            } else {
                (200, record(id, title))
            };
            responses.insert(urls.episode_url(id).to_string(), response);
        }

        let client = MockHttpClient {
            responses: Arc::new(responses),
        };
        EpisodeApi::new(client, BASE_URL).unwrap()
    }

    #[tokio::test]
    async fn build_writes_index_data_and_detail_pages() {
        let dir = tempdir().unwrap();

        let result = build_site(
            &api(None),
            dir.path(),
            &SiteOptions::default(),
            NoopReporter::shared(),
        )
        .await
        .unwrap();

        assert_eq!(result.listed, 3);
        assert_eq!(result.rendered, 3);
        assert_eq!(result.skipped, 0);
        assert_eq!(result.failed, 0);

        let index = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(index.contains("Episode ep-3"));
        assert!(index.contains(r#"href="/episodes/ep-1""#));

        let data = std::fs::read_to_string(dir.path().join(EPISODES_DATA_FILENAME)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&data).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 3);
        assert_eq!(json[0]["durationAsString"], "01:02:05");
        assert_eq!(json[0]["publishedAt"], "8 jan 21");

        let page =
            std::fs::read_to_string(dir.path().join("episodes/ep-2/index.html")).unwrap();
        assert!(page.contains("<p>About Episode ep-2</p>"));
    }

    #[tokio::test]
    async fn build_respects_limit() {
        let dir = tempdir().unwrap();
        let options = SiteOptions {
            limit: Some(2),
            ..Default::default()
        };

        let result = build_site(&api(None), dir.path(), &options, NoopReporter::shared())
            .await
            .unwrap();

        assert_eq!(result.rendered, 2);
        assert_eq!(result.skipped, 1);
        assert!(dir.path().join("episodes/ep-3/index.html").exists());
        assert!(dir.path().join("episodes/ep-2/index.html").exists());
        assert!(!dir.path().join("episodes/ep-1/index.html").exists());
    }

    #[tokio::test]
    async fn failed_page_is_reported_without_aborting() {
        let dir = tempdir().unwrap();

        let result = build_site(
            &api(Some("ep-2")),
            dir.path(),
            &SiteOptions::default(),
            NoopReporter::shared(),
        )
        .await
        .unwrap();

        assert_eq!(result.rendered, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.failed_pages[0].0, "ep-2");
        assert!(result.failed_pages[0].1.contains("500"));
        assert!(!dir.path().join("episodes/ep-2/index.html").exists());
    }

    #[tokio::test]
    async fn strict_build_fails_when_nothing_rendered() {
        let dir = tempdir().unwrap();
        let options = SiteOptions {
            limit: Some(1),
            continue_on_error: false,
            ..Default::default()
        };

        let result =
            build_site(&api(Some("ep-3")), dir.path(), &options, NoopReporter::shared()).await;

        assert!(matches!(result, Err(BuildError::AllPagesFailed)));
    }

    #[tokio::test]
    async fn listing_failure_aborts_build() {
        let dir = tempdir().unwrap();
        let api = EpisodeApi::new(MockHttpClient::default(), BASE_URL).unwrap();

        let result =
            build_site(&api, dir.path(), &SiteOptions::default(), NoopReporter::shared()).await;

        assert!(matches!(result, Err(BuildError::Api(_))));
        assert!(!dir.path().join("index.html").exists());
    }

    #[tokio::test]
    async fn empty_ids_are_rejected() {
        let dir = tempdir().unwrap();

        let result = render_episode_page(&api(None), "", dir.path()).await;

        assert!(matches!(result, Err(PageError::UnsafeId(_))));
    }

    #[tokio::test]
    async fn similar_ids_get_separate_pages() {
        let dir = tempdir().unwrap();
        let api = api_serving(&[("ep 1", "First"), ("ep-1", "Second")], None);

        let result = build_site(&api, dir.path(), &SiteOptions::default(), NoopReporter::shared())
            .await
            .unwrap();

        assert_eq!(result.rendered, 2);
        let page_dirs = std::fs::read_dir(dir.path().join("episodes")).unwrap().count();
        assert_eq!(page_dirs, 2);

        let first =
            std::fs::read_to_string(dir.path().join("episodes/ep_201/index.html")).unwrap();
        let second =
            std::fs::read_to_string(dir.path().join("episodes/ep-1/index.html")).unwrap();
        assert!(first.contains("<h1>First</h1>"));
        assert!(second.contains("<h1>Second</h1>"));

        let index = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(index.contains(r#"href="/episodes/ep_201""#));
        assert!(index.contains(r#"href="/episodes/ep-1""#));
    }
}
