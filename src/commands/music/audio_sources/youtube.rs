//! Implements the `TrackResolver` trait on top of the `yt-dlp` command-line tool.

use crate::commands::music::utils::music_manager::{MusicError, MusicResult};
use serenity::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::{AudioSource, TrackMetadata, TrackResolver};

/// Resolves URLs and search text through `yt-dlp`.
pub struct YoutubeApi {
    program: String,
}

impl Default for YoutubeApi {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
        }
    }
}

impl YoutubeApi {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Turns a user supplied locator into the argument handed to `yt-dlp`.
    /// URLs are passed through; anything else becomes a single-result YouTube search.
    pub fn search_param(locator: &str) -> String {
        if AudioSource::is_url(locator) {
            locator.to_string()
        } else {
            format!("ytsearch1:{}", locator)
        }
    }
}

#[async_trait]
impl TrackResolver for YoutubeApi {
    async fn resolve(&self, locator: &str, requested_by: &str) -> MusicResult<TrackMetadata> {
        let search_param = Self::search_param(locator);
        info!("Resolving track with yt-dlp: {}", search_param);

        let output = Command::new(&self.program)
            .args([
                "-j",            // Output as JSON
                "--no-playlist", // Don't process playlists
                "-f",
                "bestaudio/best",
                &search_param,
            ])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                MusicError::AudioSourceError(format!("Failed to run {}: {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp exited with {}: {}", output.status, stderr.trim());
            return Err(MusicError::AudioSourceError(format!(
                "Could not extract audio from {}",
                locator
            )));
        }

        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            return Err(MusicError::AudioSourceError(format!(
                "No results found for {}",
                locator
            )));
        }

        TrackMetadata::from_ytdlp_json(&output.stdout, locator, requested_by)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("https://www.youtube.com/watch?v=dQw4w9WgXcQ", "https://www.youtube.com/watch?v=dQw4w9WgXcQ" ; "url passes through")]
    #[test_case("never gonna give you up", "ytsearch1:never gonna give you up" ; "text is searched")]
    fn search_param_for_locator(locator: &str, expected: &str) {
        assert_eq!(YoutubeApi::search_param(locator), expected);
    }

    #[tokio::test]
    async fn missing_binary_is_a_resolution_error() {
        let api = YoutubeApi::new("definitely-not-an-installed-yt-dlp");

        let result = api.resolve("anything", "alice").await;

        assert!(matches!(result, Err(MusicError::AudioSourceError(_))));
    }
}
