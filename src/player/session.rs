// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use tracing::{debug, trace};

use crate::episode::Episode;
use crate::error::PlayerError;
use crate::render::PlayerView;

use super::media::{MediaElement, MediaEvent};
use super::state::PlayerState;

/// The player panel's logic: user intents and media events in, store and
/// media element kept in step
///
/// The session owns the scrub position shown in the panel. Seeking goes
/// straight to the media element and never through the store.
#[derive(Debug)]
pub struct PlayerSession<M> {
    state: PlayerState,
    media: M,
    progress: u64,
    loaded_url: Option<String>,
}

impl<M: MediaElement> PlayerSession<M> {
    pub fn new(media: M) -> Self {
        Self {
            state: PlayerState::new(),
            media,
            progress: 0,
            loaded_url: None,
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    /// Scrub position mirrored from the media element (seconds)
    pub fn progress(&self) -> u64 {
        self.progress
    }

    /// Play a single episode right away
    pub fn play(&mut self, episode: Episode) {
        self.state.play_single(episode);
        if !self.state.is_playing() {
            self.state.toggle_play();
        }
        self.sync_media();
    }

    /// Queue `list` and start playing at `index`
    pub fn play_list(&mut self, list: Vec<Episode>, index: usize) -> Result<(), PlayerError> {
        self.state.play_from_list(list, index)?;
        self.sync_media();
        Ok(())
    }

    pub fn toggle_play(&mut self) {
        self.state.toggle_play();
        self.sync_media();
    }

    pub fn next(&mut self) {
        self.state.play_next();
        self.sync_media();
    }

    pub fn previous(&mut self) {
        self.state.play_previous();
        self.sync_media();
    }

    pub fn toggle_loop(&mut self) {
        self.state.toggle_loop();
        self.sync_media();
    }

    pub fn toggle_shuffle(&mut self) {
        self.state.toggle_shuffle();
    }

    /// Jump to `seconds` within the current episode
    ///
    /// Positions past the end are clamped to the episode's duration. Without
    /// a current episode this does nothing.
    pub fn seek(&mut self, seconds: u64) {
        let Some(episode) = self.state.current_episode() else {
            return;
        };

        let target = seconds.min(episode.duration());
        self.media.set_position(target);
        self.progress = target;
    }

    /// Handle every event the media element queued since the last pump
    pub fn pump(&mut self) {
        for event in self.media.drain_events() {
            self.handle_event(event);
        }
    }

    /// Apply a single media event
    pub fn handle_event(&mut self, event: MediaEvent) {
        trace!(?event, "Media event");

        match event {
            MediaEvent::TimeUpdate(position) => self.progress = position,
            MediaEvent::LoadedMetadata => {
                self.progress = 0;
            }
            MediaEvent::Play => self.state.set_playing_state(true),
            MediaEvent::Pause => self.state.set_playing_state(false),
            MediaEvent::Ended => {
                self.state.handle_episode_ended();
                // The element paused itself on ending; the successor autoplays
                if self.state.current_episode().is_some() && !self.state.is_playing() {
                    self.state.toggle_play();
                }
                // Shuffle may land on the episode that just finished
                self.loaded_url = None;
                self.sync_media();
            }
        }
    }

    /// Snapshot for rendering the player panel
    pub fn view(&self) -> PlayerView<'_> {
        PlayerView::new(&self.state, self.progress)
    }

    /// Push the store's requested state onto the media element
    ///
    /// Loads the current episode when it changed, forwards the loop flag and
    /// asks the element to play or pause to match the request. Confirmation
    /// arrives later as `Play`/`Pause` events.
    fn sync_media(&mut self) {
        let current_url = self.state.current_episode().map(|e| e.url().to_string());

        match current_url {
            Some(url) => {
                if self.loaded_url.as_deref() != Some(url.as_str()) {
                    debug!(%url, "Loading episode");
                    self.media.set_source(&url);
                    self.loaded_url = Some(url);
                    self.progress = 0;
                }
            }
            None => {
                self.media.pause();
                self.loaded_url = None;
                self.progress = 0;
                return;
            }
        }

        self.media.set_looping(self.state.is_looping());

        if self.state.is_playing() {
            self.media.play();
        } else {
            self.media.pause();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::player::SimulatedMedia;

    fn episode(n: usize, duration: u64) -> Episode {
        Episode::new(
            format!("ep-{n}"),
            format!("Episode {n}"),
            format!("https://example.com/{n}.mp3"),
            duration,
        )
    }

    fn session_with(list: &[Episode]) -> PlayerSession<SimulatedMedia> {
        PlayerSession::new(SimulatedMedia::with_catalog(list))
    }

    #[test]
    fn play_list_loads_and_starts_media() {
        let list = vec![episode(0, 60), episode(1, 60)];
        let mut session = session_with(&list);

        session.play_list(list, 1).unwrap();
        session.pump();

        assert_eq!(session.media().source(), Some("https://example.com/1.mp3"));
        assert!(session.media().is_playing());
        assert!(session.state().is_media_playing());
    }

    #[test]
    fn play_list_error_leaves_media_alone() {
        let mut session = session_with(&[]);

        assert_eq!(session.play_list(vec![], 0), Err(PlayerError::EmptyQueue));
        assert_eq!(session.media().source(), None);
    }

    #[test]
    fn single_play_requests_playback() {
        let list = vec![episode(0, 60)];
        let mut session = session_with(&list);

        session.play(list[0].clone());
        session.pump();

        assert!(session.state().is_playing());
        assert!(session.media().is_playing());
    }

    #[test]
    fn toggle_play_pauses_media_and_reconciles() {
        let list = vec![episode(0, 60)];
        let mut session = session_with(&list);
        session.play_list(list, 0).unwrap();
        session.pump();

        session.toggle_play();
        assert!(!session.state().is_playing());
        assert!(session.state().is_media_playing());

        session.pump();
        assert!(!session.media().is_playing());
        assert!(!session.state().is_media_playing());
    }

    #[test]
    fn ended_advances_to_next_episode() {
        let list = vec![episode(0, 30), episode(1, 45)];
        let mut session = session_with(&list);
        session.play_list(list, 0).unwrap();
        session.pump();

        session.media_mut().advance(30);
        session.pump();
        session.pump();

        assert_eq!(session.state().current_index(), Some(1));
        assert_eq!(session.media().source(), Some("https://example.com/1.mp3"));
        assert!(session.media().is_playing());
        assert_eq!(session.progress(), 0);
    }

    #[test]
    fn ended_on_last_episode_clears_queue() {
        let list = vec![episode(0, 30)];
        let mut session = session_with(&list);
        session.play_list(list, 0).unwrap();
        session.pump();

        session.media_mut().advance(60);
        session.pump();

        assert!(session.state().queue().is_empty());
        assert_eq!(session.state().current_index(), None);
        assert_eq!(session.progress(), 0);
        assert!(!session.media().is_playing());
    }

    #[test]
    fn shuffle_repick_of_same_episode_reloads_and_replays() {
        let list = vec![episode(0, 30)];
        let mut session = session_with(&list);
        session.play_list(list, 0).unwrap();
        session.toggle_shuffle();
        session.pump();

        session.media_mut().advance(30);
        session.pump();

        let events = session.media_mut().drain_events();
        assert_eq!(events, vec![MediaEvent::LoadedMetadata, MediaEvent::Play]);
        for event in events {
            session.handle_event(event);
        }

        assert_eq!(session.state().queue().len(), 1);
        assert_eq!(session.state().current_index(), Some(0));
        assert_eq!(session.media().source(), Some("https://example.com/0.mp3"));
        assert_eq!(session.media().position(), 0);
        assert_eq!(session.progress(), 0);
        assert!(session.media().is_playing());
        assert!(session.state().is_media_playing());
    }

    #[test]
    fn looping_replays_without_ending() {
        let list = vec![episode(0, 30)];
        let mut session = session_with(&list);
        session.play_list(list, 0).unwrap();
        session.toggle_loop();
        session.pump();

        session.media_mut().advance(40);
        session.pump();

        assert_eq!(session.state().current_index(), Some(0));
        assert_eq!(session.progress(), 10);
        assert!(session.media().is_looping());
    }

    #[test]
    fn seek_mirrors_position_without_touching_store() {
        let list = vec![episode(0, 120), episode(1, 120)];
        let mut session = session_with(&list);
        session.play_list(list, 0).unwrap();
        session.pump();

        session.seek(90);

        assert_eq!(session.progress(), 90);
        assert_eq!(session.media().position(), 90);
        assert_eq!(session.state().current_index(), Some(0));

        session.seek(1_000);
        assert_eq!(session.progress(), 120);
    }

    #[test]
    fn seek_without_episode_is_ignored() {
        let mut session = session_with(&[]);

        session.seek(10);

        assert_eq!(session.progress(), 0);
    }

    #[test]
    fn time_updates_drive_progress() {
        let list = vec![episode(0, 120)];
        let mut session = session_with(&list);
        session.play_list(list, 0).unwrap();
        session.pump();

        session.media_mut().advance(25);
        session.pump();

        assert_eq!(session.progress(), 25);
        assert_eq!(session.view().progress_label, "00:00:25");
    }

    #[test]
    fn previous_and_next_reload_media() {
        let list = vec![episode(0, 60), episode(1, 60), episode(2, 60)];
        let mut session = session_with(&list);
        session.play_list(list, 1).unwrap();
        session.pump();

        session.next();
        assert_eq!(session.media().source(), Some("https://example.com/2.mp3"));

        session.previous();
        session.previous();
        assert_eq!(session.media().source(), Some("https://example.com/0.mp3"));
    }
}
