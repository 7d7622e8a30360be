// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use rand::Rng;
use tracing::debug;

use crate::episode::Episode;
use crate::error::PlayerError;

/// Playback queue and transport flags for one listening session
///
/// The store does not drive the media element. It records which episode is
/// current and what playback state the user asked for. Two playing flags
/// are kept because a request and its confirmation are separate events:
/// `is_playing` is what the user requested, `is_media_playing` is the last
/// state the media element reported through [`set_playing_state`]. The two
/// converge once the element reports back.
///
/// [`set_playing_state`]: PlayerState::set_playing_state
#[derive(Debug, Clone, Default)]
pub struct PlayerState {
    queue: Vec<Episode>,
    current_index: Option<usize>,
    requested_playing: bool,
    media_playing: bool,
    looping: bool,
    shuffling: bool,
}

impl PlayerState {
    /// Create an empty store with every flag off
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue with a single episode
    ///
    /// The playing flag is left alone; callers decide whether to request
    /// playback as well.
    pub fn play_single(&mut self, episode: Episode) {
        debug!(episode_id = episode.id(), "Queue replaced with single episode");
        self.queue = vec![episode];
        self.current_index = Some(0);
    }

    /// Replace the queue with `list`, start at `start_index` and request playback
    ///
    /// An empty list or an out-of-range start index is rejected and leaves
    /// the store untouched.
    pub fn play_from_list(
        &mut self,
        list: Vec<Episode>,
        start_index: usize,
    ) -> Result<(), PlayerError> {
        if list.is_empty() {
            return Err(PlayerError::EmptyQueue);
        }
        if start_index >= list.len() {
            return Err(PlayerError::IndexOutOfRange {
                index: start_index,
                len: list.len(),
            });
        }

        debug!(len = list.len(), start_index, "Queue replaced with list");
        self.queue = list;
        self.current_index = Some(start_index);
        self.requested_playing = true;
        Ok(())
    }

    pub fn toggle_play(&mut self) {
        self.requested_playing = !self.requested_playing;
    }

    pub fn toggle_loop(&mut self) {
        self.looping = !self.looping;
    }

    /// Flip shuffle mode; the queue order and current index are kept
    pub fn toggle_shuffle(&mut self) {
        self.shuffling = !self.shuffling;
    }

    /// Record the play state reported by the media element
    pub fn set_playing_state(&mut self, playing: bool) {
        self.media_playing = playing;
        self.requested_playing = playing;
    }

    /// Advance to the next episode using the thread-local RNG for shuffle
    pub fn play_next(&mut self) {
        self.play_next_with(&mut rand::thread_rng());
    }

    /// Advance to the next episode
    ///
    /// While shuffling, any index of the queue may be picked, including the
    /// current one.
    pub fn play_next_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.queue.is_empty() {
            return;
        }

        if self.shuffling {
            let next = rng.gen_range(0..self.queue.len());
            debug!(next, "Shuffle picked episode");
            self.current_index = Some(next);
        } else if self.has_next() {
            self.current_index = self.current_index.map(|index| index + 1);
        }
    }

    pub fn play_previous(&mut self) {
        if self.has_previous() {
            self.current_index = self.current_index.map(|index| index - 1);
        }
    }

    /// Empty the queue
    ///
    /// Playing, loop and shuffle flags survive a clear.
    pub fn clear(&mut self) {
        debug!("Queue cleared");
        self.queue.clear();
        self.current_index = None;
    }

    /// React to the media element finishing the current episode
    pub fn handle_episode_ended(&mut self) {
        self.handle_episode_ended_with(&mut rand::thread_rng());
    }

    pub fn handle_episode_ended_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.has_next() {
            self.play_next_with(rng);
        } else {
            self.clear();
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_index.is_some_and(|index| index > 0)
    }

    /// Shuffle mode always has a next episode, even for a one-item queue
    pub fn has_next(&self) -> bool {
        self.shuffling
            || self
                .current_index
                .is_some_and(|index| index + 1 < self.queue.len())
    }

    pub fn queue(&self) -> &[Episode] {
        &self.queue
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_episode(&self) -> Option<&Episode> {
        self.current_index.and_then(|index| self.queue.get(index))
    }

    /// Requested playback state
    pub fn is_playing(&self) -> bool {
        self.requested_playing
    }

    /// Last playback state confirmed by the media element
    pub fn is_media_playing(&self) -> bool {
        self.media_playing
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn is_shuffling(&self) -> bool {
        self.shuffling
    }
}
