//! This module defines how user supplied locators become playable tracks.
//! It provides the `TrackResolver` interface and its `yt-dlp` backed implementation.

/// Submodule defining the `TrackMetadata` struct used across the music core.
pub mod track_metadata;
/// Submodule implementing the `TrackResolver` trait for YouTube (and anything yt-dlp extracts).
pub mod youtube;

use crate::commands::music::utils::music_manager::MusicResult;
use serenity::async_trait;
use url::Url;

pub use track_metadata::{StreamSource, TrackMetadata};

/// Turns a locator (URL or search text) into a resolved track.
///
/// Resolution may be slow (network bound); callers must not hold a guild player lock
/// while awaiting it.
#[async_trait]
pub trait TrackResolver: Send + Sync {
    async fn resolve(&self, locator: &str, requested_by: &str) -> MusicResult<TrackMetadata>;
}

/// A utility struct providing general helper functions related to audio sources.
pub struct AudioSource;

impl AudioSource {
    /// Performs a basic check if the input string can be parsed as a URL.
    /// Does not validate if the URL is actually reachable or supported.
    pub fn is_url(input: &str) -> bool {
        Url::parse(input).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
    }
}
