//! Defines the `TrackMetadata` struct, the resolved and playable description of a track,
//! and the conversion from `yt-dlp --dump-json` output.

use crate::commands::music::utils::music_manager::MusicError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// What the voice sink is handed to produce audio for a track.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum StreamSource {
    /// A direct media URL that can be streamed over HTTP as-is.
    Direct(String),
    /// A page URL that still needs extraction (via yt-dlp) when played.
    Extract(String),
}

impl StreamSource {
    pub fn as_str(&self) -> &str {
        match self {
            StreamSource::Direct(url) | StreamSource::Extract(url) => url,
        }
    }
}

impl fmt::Display for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved track. Immutable once created; moved between the queue and the
/// "current" slot of a guild player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackMetadata {
    /// The title of the track.
    pub title: String,
    /// The canonical (web page) URL of the track.
    pub url: String,
    /// The handle the voice sink streams from.
    pub source: StreamSource,
    /// The duration of the track, if available.
    #[serde(default, with = "humantime_serde")]
    pub duration: Option<Duration>,
    /// URL to a thumbnail image for the track, if available.
    pub thumbnail: Option<String>,
    /// The name of the user who requested the track.
    pub requested_by: String,
}

/// The subset of the `yt-dlp -j` document we care about.
#[derive(Debug, Default, Deserialize)]
struct YtDlpEntry {
    title: Option<String>,
    url: Option<String>,
    webpage_url: Option<String>,
    original_url: Option<String>,
    duration: Option<f64>,
    thumbnail: Option<String>,
    #[serde(default)]
    entries: Vec<YtDlpEntry>,
}

impl TrackMetadata {
    /// Builds `TrackMetadata` from the JSON printed by `yt-dlp -j`.
    ///
    /// Search results and playlists carry their items under `entries`; the first one is used.
    /// `fallback_url` is the locator that was resolved, used when yt-dlp reports no page URL.
    pub fn from_ytdlp_json(
        json: &[u8],
        fallback_url: &str,
        requested_by: &str,
    ) -> Result<TrackMetadata, MusicError> {
        let document: YtDlpEntry = serde_json::from_slice(json).map_err(|e| {
            MusicError::AudioSourceError(format!("Failed to parse video metadata: {}", e))
        })?;

        let entry = if document.entries.is_empty() {
            document
        } else {
            document
                .entries
                .into_iter()
                .next()
                .ok_or_else(|| MusicError::AudioSourceError("No results found".to_string()))?
        };

        let page_url = entry
            .webpage_url
            .or(entry.original_url)
            .unwrap_or_else(|| fallback_url.to_string());

        let source = match entry.url {
            Some(direct) if !direct.is_empty() => StreamSource::Direct(direct),
            _ => StreamSource::Extract(page_url.clone()),
        };

        Ok(TrackMetadata {
            title: entry.title.unwrap_or_else(|| "Unknown title".to_string()),
            url: page_url,
            source,
            duration: entry.duration.map(Duration::from_secs_f64),
            thumbnail: entry.thumbnail,
            requested_by: requested_by.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    #[test]
    fn direct_media_url_becomes_the_stream_source() {
        let json = br#"{
            "title": "Song",
            "url": "https://media.example/abc.webm",
            "webpage_url": "https://www.youtube.com/watch?v=abc",
            "duration": 212.0,
            "thumbnail": "https://i.ytimg.com/abc.jpg"
        }"#;

        let track = TrackMetadata::from_ytdlp_json(json, "abc", "alice").unwrap();

        assert_eq!(track.title, "Song");
        assert_eq!(track.url, "https://www.youtube.com/watch?v=abc");
        assert_eq!(
            track.source,
            StreamSource::Direct("https://media.example/abc.webm".to_string())
        );
        assert_eq!(track.duration, Some(Duration::from_secs(212)));
        assert_eq!(track.requested_by, "alice");
    }

    #[test]
    fn first_entry_of_a_search_result_is_used() {
        let json = br#"{
            "entries": [
                {"title": "First", "webpage_url": "https://www.youtube.com/watch?v=1"},
                {"title": "Second", "webpage_url": "https://www.youtube.com/watch?v=2"}
            ]
        }"#;

        let track = TrackMetadata::from_ytdlp_json(json, "ytsearch1:first", "bob").unwrap();

        assert_eq!(track.title, "First");
        assert_eq!(
            track.source,
            StreamSource::Extract("https://www.youtube.com/watch?v=1".to_string())
        );
    }

    #[test]
    fn missing_fields_fall_back_to_the_locator() {
        let track = TrackMetadata::from_ytdlp_json(b"{}", "https://example.com/a.mp3", "carol")
            .unwrap();

        assert_eq!(track.title, "Unknown title");
        assert_eq!(track.url, "https://example.com/a.mp3");
        assert_eq!(track.source.as_str(), "https://example.com/a.mp3");
    }

    #[test]
    fn garbage_output_is_a_resolution_error() {
        let result = TrackMetadata::from_ytdlp_json(b"ERROR: not json", "x", "dave");

        assert_matches!(result, Err(MusicError::AudioSourceError(_)));
    }
}
