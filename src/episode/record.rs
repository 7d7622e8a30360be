// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::Serialize;

use crate::duration::format_duration;

/// A single playable podcast episode, ready for display
///
/// `duration_as_string` is derived from `duration` when the episode is
/// constructed and can never be changed independently of it.
///
/// `description` is markup supplied by the episode API. It is rendered
/// verbatim, so the API is trusted not to serve hostile HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    id: String,
    title: String,
    members: String,
    description: String,
    thumbnail: String,
    duration: u64,
    published_at: String,
    url: String,
    duration_as_string: String,
}

impl Episode {
    /// Create an episode with the fields required for playback
    ///
    /// Display-only fields start empty and can be filled with the `with_*`
    /// builders.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        duration: u64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            members: String::new(),
            description: String::new(),
            thumbnail: String::new(),
            duration,
            published_at: String::new(),
            url: url.into(),
            duration_as_string: format_duration(duration),
        }
    }

    pub fn with_members(mut self, members: impl Into<String>) -> Self {
        self.members = members.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = thumbnail.into();
        self
    }

    pub fn with_published_at(mut self, published_at: impl Into<String>) -> Self {
        self.published_at = published_at.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn members(&self) -> &str {
        &self.members
    }

    /// Raw HTML body of the episode (trusted, see type docs)
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn thumbnail(&self) -> &str {
        &self.thumbnail
    }

    /// Length in whole seconds
    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// Pre-formatted publication date for display
    pub fn published_at(&self) -> &str {
        &self.published_at
    }

    /// Playable media URL
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn duration_as_string(&self) -> &str {
        &self.duration_as_string
    }
}
