// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use crate::episode::{Episode, episode_href};

use super::view::PlayerView;

/// A row of the full episode listing
///
/// `play_index` addresses the episode inside the list the play button
/// queues, not inside this row's section.
pub fn episode_list_item(episode: &Episode, play_index: usize) -> String {
    format!(
        r#"<li class="episode-item">
  <img width="192" height="192" src="{thumbnail}" alt="{title_attr}" loading="lazy">
  <div class="details">
    <a href="{href}">{title}</a>
    <p>{members}</p>
    <span>{published_at}</span>
    <span>{duration}</span>
  </div>
  <button type="button" data-play-index="{play_index}">
    <img src="/play-green.svg" alt="Tocar episódio">
  </button>
</li>
"#,
        thumbnail = attr(episode.thumbnail()),
        title_attr = attr(episode.title()),
        href = attr(&episode_href(episode)),
        title = text(episode.title()),
        members = text(episode.members()),
        published_at = text(episode.published_at()),
        duration = text(episode.duration_as_string()),
    )
}

/// A card for one of the latest releases
pub fn card_item(episode: &Episode, play_index: usize) -> String {
    format!(
        r#"<li class="card">
  <img width="360" height="200" src="{thumbnail}" alt="{title_attr}" loading="lazy">
  <div class="details">
    <span>{published_at}</span>
    <a href="{href}">{title}</a>
    <p>{members}</p>
  </div>
  <div class="actions">
    <button type="button" data-play-index="{play_index}">
      <img src="/play-green.svg" alt="Tocar episódio">
      <span>{duration}</span>
    </button>
  </div>
</li>
"#,
        thumbnail = attr(episode.thumbnail()),
        title_attr = attr(episode.title()),
        published_at = text(episode.published_at()),
        href = attr(&episode_href(episode)),
        title = text(episode.title()),
        members = text(episode.members()),
        duration = text(episode.duration_as_string()),
    )
}

/// The "now playing" panel
pub fn player_panel(view: &PlayerView<'_>) -> String {
    let mut html = String::from(
        r#"<div class="player">
  <header>
    <img src="/playing.svg" alt="Tocando agora">
    <strong>Tocando agora</strong>
  </header>
"#,
    );

    match view.episode {
        Some(episode) => {
            html.push_str(&format!(
                r#"  <div class="current-episode">
    <img width="592" height="592" src="{thumbnail}" alt="{title_attr}">
    <strong>{title}</strong>
    <span>{members}</span>
  </div>
"#,
                thumbnail = attr(episode.thumbnail()),
                title_attr = attr(episode.title()),
                title = text(episode.title()),
                members = text(episode.members()),
            ));
        }
        None => html.push_str(
            r#"  <div class="empty-player">
    <strong>Selecione um podcast para ouvir</strong>
  </div>
"#,
        ),
    }

    let footer_class = if view.controls_enabled() {
        "controls-footer"
    } else {
        "controls-footer empty"
    };
    html.push_str(&format!(
        r#"  <footer class="{footer_class}">
    <div class="progress">
      <span>{progress}</span>
      <progress max="1" value="{ratio:.4}"></progress>
      <span>{duration}</span>
    </div>
    <div class="controls">
"#,
        progress = text(&view.progress_label),
        ratio = view.progress_ratio(),
        duration = text(&view.duration_label),
    ));

    let enabled = view.controls_enabled();
    let (play_icon, play_label) = if view.is_playing {
        ("/pause.svg", "Pausar")
    } else {
        ("/play.svg", "Tocar")
    };
    let buttons = [
        control("shuffle", "/shuffle.svg", "Embaralhar", enabled, view.is_shuffling),
        control(
            "previous",
            "/play-previous.svg",
            "Tocar anterior",
            enabled && view.has_previous,
            false,
        ),
        control("play", play_icon, play_label, enabled, false),
        control(
            "next",
            "/play-next.svg",
            "Tocar próxima",
            enabled && view.has_next,
            false,
        ),
        control("loop", "/repeat.svg", "Repetir", enabled, view.is_looping),
    ];
    for button in buttons {
        html.push_str(&button);
    }

    html.push_str("    </div>\n  </footer>\n</div>\n");
    html
}

fn control(action: &str, icon: &str, label: &str, enabled: bool, active: bool) -> String {
    let class = if active { r#" class="is-active""# } else { "" };
    let disabled = if enabled { "" } else { " disabled" };

    format!(
        "      <button type=\"button\" data-action=\"{action}\"{class}{disabled}>\
<img src=\"{icon}\" alt=\"{label}\"></button>\n"
    )
}
