// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use crate::episode::Episode;

use super::components::{card_item, episode_list_item, player_panel};
use super::view::PlayerView;

const SITE_NAME: &str = "Podcastr";

/// Number of episodes shown as cards on the home page
pub const LATEST_COUNT: usize = 2;

/// Assemble the home page from an ordered listing
///
/// The first [`LATEST_COUNT`] episodes become cards, the rest list items.
/// Every play button addresses the full listing, so playing from either
/// section queues all episodes in listing order.
pub fn home_page(episodes: &[Episode]) -> String {
    let split = LATEST_COUNT.min(episodes.len());
    let (latest, rest) = episodes.split_at(split);

    let cards: String = latest
        .iter()
        .enumerate()
        .map(|(index, episode)| card_item(episode, index))
        .collect();

    let items: String = rest
        .iter()
        .enumerate()
        .map(|(index, episode)| episode_list_item(episode, latest.len() + index))
        .collect();

    let body = format!(
        r#"<div class="home">
<section class="latest-episodes">
<h2>Últimos lançamentos</h2>
<ul>
{cards}</ul>
</section>
<section class="all-episodes">
<h2>Todos episódios</h2>
<ul>
{items}</ul>
</section>
</div>
"#
    );

    layout(SITE_NAME, &body)
}

/// Assemble the detail page of one episode
///
/// The description is inserted as-is: it is HTML authored by the episode
/// API, which is trusted. Every other field is escaped.
pub fn episode_page(episode: &Episode) -> String {
    let body = format!(
        r#"<div class="episode">
  <div class="thumbnail">
    <a href="/" class="back"><img src="/arrow-left.svg" alt="Voltar"></a>
    <img width="700" height="160" src="{thumbnail}" alt="{title_attr}">
    <button type="button" data-play-episode="{id}"><img src="/play.svg" alt="Tocar episódio"></button>
  </div>
  <header>
    <h1>{title}</h1>
    <span>{members}</span>
    <span>{published_at}</span>
    <span>{duration}</span>
  </header>
  <div class="description">
{description}
  </div>
</div>
"#,
        thumbnail = attr(episode.thumbnail()),
        title_attr = attr(episode.title()),
        id = attr(episode.id()),
        title = text(episode.title()),
        members = text(episode.members()),
        published_at = text(episode.published_at()),
        duration = text(episode.duration_as_string()),
        description = episode.description(),
    );

    let title = format!("{} | {}", episode.title(), SITE_NAME);
    layout(&title, &body)
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
<div class="wrapper">
<main>
<header class="site-header">
  <a href="/"><img src="/logo.svg" alt="{site}"></a>
  <p>O melhor para você ouvir, sempre</p>
</header>
{body}</main>
{player}</div>
</body>
</html>
"#,
        title = text(title),
        site = SITE_NAME,
        player = player_panel(&PlayerView::empty()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(n: usize) -> Episode {
        Episode::new(
            format!("ep-{n}"),
            format!("Episode {n}"),
            format!("https://example.com/{n}.mp3"),
            60 * n as u64,
        )
    }

    #[test]
    fn home_splits_latest_and_rest_with_global_play_indices() {
        let episodes: Vec<Episode> = (0..5).map(episode).collect();

        let html = home_page(&episodes);

        assert_eq!(html.matches(r#"<li class="card">"#).count(), 2);
        assert_eq!(html.matches(r#"<li class="episode-item">"#).count(), 3);
        for index in 0..5 {
            assert!(html.contains(&format!(r#"data-play-index="{index}""#)));
        }

        let card_pos = html.find("Episode 1").unwrap();
        let list_pos = html.find("Episode 2").unwrap();
        assert!(card_pos < list_pos);
    }

    #[test]
    fn home_handles_short_listings() {
        let html = home_page(&[episode(0)]);

        assert_eq!(html.matches(r#"<li class="card">"#).count(), 1);
        assert_eq!(html.matches(r#"<li class="episode-item">"#).count(), 0);

        let empty = home_page(&[]);
        assert!(empty.contains("Todos episódios"));
    }

    #[test]
    fn home_includes_empty_player() {
        let html = home_page(&[episode(0)]);
        assert!(html.contains("Selecione um podcast para ouvir"));
    }

    #[test]
    fn episode_page_renders_description_verbatim() {
        let episode = Episode::new("ep-1", "A <b>bold</b> title", "https://example.com/1.mp3", 3725)
            .with_description("<p>Links: <a href=\"https://rocketseat.com.br\">site</a></p>");

        let html = episode_page(&episode);

        assert!(html.contains("<p>Links: <a href=\"https://rocketseat.com.br\">site</a></p>"));
        assert!(html.contains("<h1>A &lt;b&gt;bold&lt;/b&gt; title</h1>"));
        assert!(html.contains("<title>A &lt;b&gt;bold&lt;/b&gt; title | Podcastr</title>"));
        assert!(html.contains("<span>01:02:05</span>"));
        assert!(html.contains(r#"data-play-episode="ep-1""#));
    }
}
