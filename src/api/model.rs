// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;

use chrono::{DateTime, Locale, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use crate::episode::Episode;
use crate::error::ApiError;

/// Locale used to render publication dates
const DISPLAY_LOCALE: Locale = Locale::pt_BR;

/// Display pattern for publication dates, e.g. `8 jan 21`
const DISPLAY_DATE_FORMAT: &str = "%-d %b %y";

/// An episode exactly as served by the episode API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEpisode {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub members: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: String,
    pub published_at: String,
    pub file: ApiFile,
}

/// The media file attached to an API episode
#[derive(Debug, Clone, Deserialize)]
pub struct ApiFile {
    pub url: String,
    #[serde(rename = "type", default)]
    pub mime_type: Option<String>,
    pub duration: ApiDuration,
}

/// Episode length in seconds; some API deployments serve it as a string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ApiDuration {
    Seconds(u64),
    Fractional(f64),
    Text(String),
}

impl ApiDuration {
    /// Whole seconds, or `None` when the value is negative or not a number
    pub fn as_seconds(&self) -> Option<u64> {
        match self {
            ApiDuration::Seconds(seconds) => Some(*seconds),
            ApiDuration::Fractional(value) => whole_seconds(*value),
            ApiDuration::Text(text) => {
                let text = text.trim();
                text.parse::<u64>()
                    .ok()
                    .or_else(|| text.parse::<f64>().ok().and_then(whole_seconds))
            }
        }
    }
}

impl fmt::Display for ApiDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiDuration::Seconds(seconds) => write!(f, "{seconds}"),
            ApiDuration::Fractional(value) => write!(f, "{value}"),
            ApiDuration::Text(text) => write!(f, "{text}"),
        }
    }
}

/// `u64::MAX as f64` rounds up to 2^64, so the upper bound is exclusive
fn whole_seconds(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0 && value < u64::MAX as f64).then(|| value.trunc() as u64)
}

impl TryFrom<ApiEpisode> for Episode {
    type Error = ApiError;

    fn try_from(api: ApiEpisode) -> Result<Self, Self::Error> {
        let duration = api
            .file
            .duration
            .as_seconds()
            .ok_or_else(|| ApiError::InvalidDuration {
                id: api.id.clone(),
                value: api.file.duration.to_string(),
            })?;

        let published_at = format_published_at(&api.published_at)?;

        Ok(Episode::new(api.id, api.title, api.file.url, duration)
            .with_members(api.members)
            .with_description(api.description)
            .with_thumbnail(api.thumbnail)
            .with_published_at(published_at))
    }
}

/// Parse an ISO-like publication timestamp and render it for display
pub fn format_published_at(date_str: &str) -> Result<String, ApiError> {
    let parsed = parse_published_at(date_str)?;
    Ok(parsed
        .and_utc()
        .format_localized(DISPLAY_DATE_FORMAT, DISPLAY_LOCALE)
        .to_string())
}

/// Accept the timestamp shapes the episode API is known to serve
///
/// Offsets are dropped; the wall-clock time as published is kept.
fn parse_published_at(date_str: &str) -> Result<NaiveDateTime, ApiError> {
    let trimmed = date_str.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }

    let formats = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];
    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|e| ApiError::InvalidDate {
            date_str: date_str.to_string(),
            reason: e.to_string(),
        })
}
