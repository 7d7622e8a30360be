// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use super::Episode;

/// Maximum length of a page slug
const MAX_SLUG_LENGTH: usize = 100;

/// Hex digits of the id digest appended to shortened slugs
const DIGEST_SUFFIX_LENGTH: usize = 16;

/// Directory (relative to the site root) holding episode detail pages
pub const EPISODES_DIR: &str = "episodes";

/// Check if a character is kept verbatim in a page slug (whitelist approach)
fn is_verbatim_slug_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

/// Turn an episode id into a slug that is safe as a single path component
///
/// Distinct ids get distinct slugs. ASCII letters, digits and `-` are
/// kept; every other byte is written as `_` plus two hex digits, so
/// `"ep 1"` becomes `ep_201` and `".."` becomes `_2e_2e`. Slugs longer than
/// the limit are cut and suffixed with a SHA-256 digest of the full id.
///
/// Returns `None` for an empty id.
pub fn page_slug(id: &str) -> Option<String> {
    if id.is_empty() {
        return None;
    }

    let mut slug = String::with_capacity(id.len());
    for c in id.chars() {
        if is_verbatim_slug_char(c) {
            slug.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                slug.push_str(&format!("_{byte:02x}"));
            }
        }
    }

    if slug.len() > MAX_SLUG_LENGTH {
        let digest = format!("{:x}", Sha256::digest(id.as_bytes()));
        // The escaped slug is pure ASCII, so any byte offset is a char boundary
        slug.truncate(MAX_SLUG_LENGTH - DIGEST_SUFFIX_LENGTH - 1);
        slug.push('-');
        slug.push_str(&digest[..DIGEST_SUFFIX_LENGTH]);
    }

    Some(slug)
}

/// Site-relative link to an episode's detail page
pub fn episode_href(episode: &Episode) -> String {
    match page_slug(episode.id()) {
        Some(slug) => format!("/{EPISODES_DIR}/{slug}"),
        None => "/".to_string(),
    }
}

/// Location of an episode's detail page below the site root
pub fn episode_page_path(site_root: &Path, slug: &str) -> PathBuf {
    site_root.join(EPISODES_DIR).join(slug).join("index.html")
}
