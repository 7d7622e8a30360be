// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when talking to the episode API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to fetch {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to decode episode JSON from {url}: {source}")]
    DecodeFailed {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid API base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("API base URL cannot carry path segments: {0}")]
    InvalidBaseUrl(String),

    #[error("Episode '{id}' has an invalid duration '{value}'")]
    InvalidDuration { id: String, value: String },

    #[error("Failed to parse date '{date_str}': {reason}")]
    InvalidDate { date_str: String, reason: String },
}

/// Errors reported by the playback state store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    #[error("Cannot play from an empty episode list")]
    EmptyQueue,

    #[error("Start index {index} is out of range for a list of {len} episodes")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors that can occur while rendering a single episode page
#[derive(Error, Debug)]
pub enum PageError {
    #[error("Episode id '{0}' cannot be used as a page path")]
    UnsafeId(String),

    #[error("Failed to create directory {path}: {source}")]
    CreateDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write page {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Top-level errors for static site builds
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Failed to create directory {path}: {source}")]
    CreateDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize episode data: {0}")]
    JsonSerializeFailed(#[from] serde_json::Error),

    #[error("All episode pages failed")]
    AllPagesFailed,
}
