// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashMap;

use crate::episode::Episode;

/// Notifications a media element emits while playing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    /// Playback position moved (seconds)
    TimeUpdate(u64),
    /// The current source played to its end and stopped
    Ended,
    /// Playback started
    Play,
    /// Playback paused
    Pause,
    /// A new source was loaded and is ready to play
    LoadedMetadata,
}

/// The platform media element a player session drives
///
/// Implementations queue events as they happen; the session collects them
/// with [`drain_events`](MediaElement::drain_events).
pub trait MediaElement {
    /// Load a new source, replacing the current one
    fn set_source(&mut self, url: &str);

    /// Currently loaded source, if any
    fn source(&self) -> Option<&str>;

    /// Move the playback position (seconds)
    fn set_position(&mut self, seconds: u64);

    fn position(&self) -> u64;

    fn play(&mut self);

    fn pause(&mut self);

    /// Whether playback restarts from the beginning instead of ending
    fn set_looping(&mut self, looping: bool);

    fn drain_events(&mut self) -> Vec<MediaEvent>;
}

/// An in-memory media element with a virtual clock
///
/// Durations come from a catalog of source URLs. Unknown sources have a
/// zero duration and end as soon as the clock advances.
#[derive(Debug, Default)]
pub struct SimulatedMedia {
    catalog: HashMap<String, u64>,
    source: Option<String>,
    position: u64,
    playing: bool,
    looping: bool,
    events: Vec<MediaEvent>,
}

impl SimulatedMedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a media element that knows the durations of `episodes`
    pub fn with_catalog<'a>(episodes: impl IntoIterator<Item = &'a Episode>) -> Self {
        let catalog = episodes
            .into_iter()
            .map(|episode| (episode.url().to_string(), episode.duration()))
            .collect();

        Self {
            catalog,
            ..Self::default()
        }
    }

    /// Register the duration of a source
    pub fn insert(&mut self, url: impl Into<String>, duration: u64) {
        self.catalog.insert(url.into(), duration);
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Duration of the loaded source
    pub fn duration(&self) -> u64 {
        self.source
            .as_ref()
            .and_then(|source| self.catalog.get(source))
            .copied()
            .unwrap_or(0)
    }

    /// Let `seconds` of playback time pass
    ///
    /// Does nothing while paused or without a source. Reaching the end wraps
    /// to the start when looping; otherwise playback pauses and `Ended`
    /// follows the `Pause` event.
    pub fn advance(&mut self, seconds: u64) {
        if !self.playing || self.source.is_none() {
            return;
        }

        let duration = self.duration();
        let left_in_source = duration.saturating_sub(self.position);

        if seconds < left_in_source {
            self.position += seconds;
            self.events.push(MediaEvent::TimeUpdate(self.position));
            return;
        }

        if !self.looping || duration == 0 {
            self.position = duration;
            self.events.push(MediaEvent::TimeUpdate(self.position));
            self.playing = false;
            self.events.push(MediaEvent::Pause);
            self.events.push(MediaEvent::Ended);
            return;
        }

        self.position = (seconds - left_in_source) % duration;
        self.events.push(MediaEvent::TimeUpdate(self.position));
    }
}

impl MediaElement for SimulatedMedia {
    fn set_source(&mut self, url: &str) {
        self.source = Some(url.to_string());
        self.position = 0;
        self.events.push(MediaEvent::LoadedMetadata);
    }

    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn set_position(&mut self, seconds: u64) {
        self.position = seconds.min(self.duration());
        self.events.push(MediaEvent::TimeUpdate(self.position));
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn play(&mut self) {
        if self.source.is_some() && !self.playing {
            self.playing = true;
            self.events.push(MediaEvent::Play);
        }
    }

    fn pause(&mut self) {
        if self.playing {
            self.playing = false;
            self.events.push(MediaEvent::Pause);
        }
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn drain_events(&mut self) -> Vec<MediaEvent> {
        std::mem::take(&mut self.events)
    }
}
