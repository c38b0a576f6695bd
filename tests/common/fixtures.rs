//! Sample ids and tracks used across tests.

use std::sync::Arc;
use std::time::Duration;

use jukebox::commands::music::audio_sources::{StreamSource, TrackMetadata};
use jukebox::commands::music::utils::sequencer::GuildPlayer;
use poise::serenity_prelude::{ChannelId, GuildId};

use super::fakes::{FakeSink, RecordingAnnouncer};

pub const IDLE_TIMEOUT: Duration = Duration::from_secs(15);

pub fn guild() -> GuildId {
    GuildId::new(123456789)
}

pub fn other_guild() -> GuildId {
    GuildId::new(223456789)
}

pub fn voice_channel() -> ChannelId {
    ChannelId::new(987654321)
}

pub fn other_voice_channel() -> ChannelId {
    ChannelId::new(987654322)
}

pub fn stream_url(title: &str) -> String {
    format!("https://cdn.example.com/{}.webm", title)
}

pub fn track(title: &str) -> TrackMetadata {
    TrackMetadata {
        title: title.to_string(),
        url: format!("https://www.youtube.com/watch?v={}", title),
        source: StreamSource::Direct(stream_url(title)),
        duration: Some(Duration::from_secs(180)),
        thumbnail: None,
        requested_by: "tester".to_string(),
    }
}

/// A player wired to fresh fakes.
pub struct Harness {
    pub player: Arc<GuildPlayer>,
    pub sink: Arc<FakeSink>,
    pub announcer: Arc<RecordingAnnouncer>,
}

impl Harness {
    pub fn new() -> Self {
        let sink = Arc::new(FakeSink::default());
        let announcer = Arc::new(RecordingAnnouncer::default());
        let player = Arc::new(GuildPlayer::new(
            guild(),
            sink.clone(),
            announcer.clone(),
            IDLE_TIMEOUT,
        ));
        Self {
            player,
            sink,
            announcer,
        }
    }
}
