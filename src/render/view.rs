// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::duration::format_duration;
use crate::episode::Episode;
use crate::player::PlayerState;

/// Everything the player panel needs to draw itself
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView<'a> {
    /// Episode currently selected, if the queue is non-empty
    pub episode: Option<&'a Episode>,
    /// Scrub position in seconds
    pub progress: u64,
    pub progress_label: String,
    pub duration_label: String,
    pub is_playing: bool,
    pub is_looping: bool,
    pub is_shuffling: bool,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<'a> PlayerView<'a> {
    pub fn new(state: &'a PlayerState, progress: u64) -> Self {
        let episode = state.current_episode();
        let duration = episode.map(Episode::duration).unwrap_or(0);

        Self {
            episode,
            progress,
            progress_label: format_duration(progress),
            duration_label: format_duration(duration),
            is_playing: state.is_playing(),
            is_looping: state.is_looping(),
            is_shuffling: state.is_shuffling(),
            has_next: state.has_next(),
            has_previous: state.has_previous(),
        }
    }

    /// The panel as shown before anything was queued
    pub fn empty() -> PlayerView<'static> {
        PlayerView {
            episode: None,
            progress: 0,
            progress_label: format_duration(0),
            duration_label: format_duration(0),
            is_playing: false,
            is_looping: false,
            is_shuffling: false,
            has_next: false,
            has_previous: false,
        }
    }

    /// Fraction of the episode already played, in `[0, 1]`
    pub fn progress_ratio(&self) -> f64 {
        match self.episode {
            Some(episode) if episode.duration() > 0 => {
                (self.progress as f64 / episode.duration() as f64).min(1.0)
            }
            _ => 0.0,
        }
    }

    /// Transport controls only work with an episode selected
    pub fn controls_enabled(&self) -> bool {
        self.episode.is_some()
    }
}
