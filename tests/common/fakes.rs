//! Test doubles for the music core's collaborators.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use jukebox::commands::music::audio_sources::{StreamSource, TrackMetadata, TrackResolver};
use jukebox::commands::music::utils::announcer::Announcer;
use jukebox::commands::music::utils::music_manager::{MusicError, MusicResult};
use jukebox::commands::music::utils::voice_sink::{TrackEndNotifier, VoiceSink};
use mockall::mock;
use poise::serenity_prelude::{ChannelId, GuildId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Connect(GuildId, ChannelId),
    Stream(GuildId, String),
    Stop(GuildId),
    Disconnect(GuildId),
}

/// In-memory voice sink. Holds the end notifier of each guild's active stream so
/// tests decide when a track finishes or fails.
#[derive(Default)]
pub struct FakeSink {
    calls: Mutex<Vec<SinkCall>>,
    active: Mutex<HashMap<GuildId, TrackEndNotifier>>,
    rejected: Mutex<HashSet<String>>,
    refuse_connect: AtomicBool,
    connections: Mutex<HashMap<GuildId, ChannelId>>,
}

impl FakeSink {
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn streamed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SinkCall::Stream(_, url) => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &SinkCall) -> usize {
        self.calls().iter().filter(|call| *call == wanted).count()
    }

    /// Streams of this URL are rejected immediately.
    pub fn reject(&self, url: impl Into<String>) {
        self.rejected.lock().unwrap().insert(url.into());
    }

    pub fn refuse_connections(&self) {
        self.refuse_connect.store(true, Ordering::SeqCst);
    }

    /// Completes the guild's active stream normally.
    pub fn finish(&self, guild_id: GuildId) -> bool {
        match self.active.lock().unwrap().remove(&guild_id) {
            Some(notifier) => {
                notifier.finished();
                true
            }
            None => false,
        }
    }

    /// Fails the guild's active stream mid-playback.
    pub fn fail(&self, guild_id: GuildId, reason: &str) -> bool {
        match self.active.lock().unwrap().remove(&guild_id) {
            Some(notifier) => {
                notifier.failed(MusicError::PlaybackError(reason.to_string()));
                true
            }
            None => false,
        }
    }

    /// Simulates the bot being kicked or the network dropping: the connection
    /// disappears and the active stream's notifier is dropped unfired.
    pub fn drop_connection(&self, guild_id: GuildId) {
        self.connections.lock().unwrap().remove(&guild_id);
        self.active.lock().unwrap().remove(&guild_id);
    }

    /// Simulates the bot being dragged to another channel.
    pub fn move_connection(&self, guild_id: GuildId, channel_id: ChannelId) {
        self.connections.lock().unwrap().insert(guild_id, channel_id);
    }

    pub fn is_streaming(&self, guild_id: GuildId) -> bool {
        self.active.lock().unwrap().contains_key(&guild_id)
    }

    fn record(&self, call: SinkCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl VoiceSink for FakeSink {
    async fn connect(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()> {
        if self.refuse_connect.load(Ordering::SeqCst) {
            return Err(MusicError::JoinError("connection refused".to_string()));
        }
        self.record(SinkCall::Connect(guild_id, channel_id));
        self.connections.lock().unwrap().insert(guild_id, channel_id);
        Ok(())
    }

    async fn stream(
        &self,
        guild_id: GuildId,
        source: &StreamSource,
        on_end: TrackEndNotifier,
    ) -> MusicResult<()> {
        let url = source.as_str().to_string();
        self.record(SinkCall::Stream(guild_id, url.clone()));
        if !self.connections.lock().unwrap().contains_key(&guild_id) {
            return Err(MusicError::NotConnected);
        }
        if self.rejected.lock().unwrap().contains(&url) {
            return Err(MusicError::PlaybackError(format!("cannot open {}", url)));
        }

        // Like a real call, starting a stream ends the previous one.
        let previous = self.active.lock().unwrap().insert(guild_id, on_end);
        if let Some(previous) = previous {
            previous.finished();
        }
        Ok(())
    }

    async fn stop(&self, guild_id: GuildId) {
        self.record(SinkCall::Stop(guild_id));
        self.finish(guild_id);
    }

    async fn disconnect(&self, guild_id: GuildId) {
        self.record(SinkCall::Disconnect(guild_id));
        self.connections.lock().unwrap().remove(&guild_id);
        self.active.lock().unwrap().remove(&guild_id);
    }

    async fn current_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        self.connections.lock().unwrap().get(&guild_id).copied()
    }
}

/// Announcer that keeps every message it was asked to post.
#[derive(Default)]
pub struct RecordingAnnouncer {
    messages: Mutex<Vec<(GuildId, String)>>,
}

impl RecordingAnnouncer {
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }
}

#[async_trait]
impl Announcer for RecordingAnnouncer {
    async fn notify(&self, guild_id: GuildId, message: String) {
        self.messages.lock().unwrap().push((guild_id, message));
    }
}

mock! {
    pub Resolver {}

    #[async_trait]
    impl TrackResolver for Resolver {
        async fn resolve(&self, locator: &str, requested_by: &str) -> MusicResult<TrackMetadata>;
    }
}
