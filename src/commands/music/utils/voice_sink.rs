//! The voice output seen by the music core, and its songbird implementation.

use std::sync::Arc;

use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use songbird::input::{HttpRequest, Input, YoutubeDl};
use songbird::tracks::PlayMode;
use songbird::{Event, EventContext, Songbird, TrackEvent};
use tokio::sync::{Mutex, oneshot};
use tracing::{debug, info, warn};

use super::music_manager::{MusicError, MusicResult};
use crate::commands::music::audio_sources::StreamSource;

/// Outcome delivered when a streamed track ends: `None` for a normal end
/// (including a forced stop), `Some` when playback failed.
pub type TrackEnd = Option<MusicError>;

/// One-shot completion signal handed to [`VoiceSink::stream`].
///
/// Firing consumes the notifier, so a stream reports its end at most once.
#[derive(Debug)]
pub struct TrackEndNotifier {
    tx: oneshot::Sender<TrackEnd>,
}

impl TrackEndNotifier {
    pub fn channel() -> (Self, oneshot::Receiver<TrackEnd>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    pub fn finished(self) {
        let _ = self.tx.send(None);
    }

    pub fn failed(self, error: MusicError) {
        let _ = self.tx.send(Some(error));
    }
}

/// Voice connection + audio output for guilds.
#[async_trait]
pub trait VoiceSink: Send + Sync {
    /// Joins `channel_id`, moving the existing connection if the guild is connected elsewhere.
    async fn connect(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()>;

    /// Starts streaming `source`. `on_end` fires exactly once when the stream ends,
    /// fails or is stopped. An `Err` means the sink rejected the source outright.
    async fn stream(
        &self,
        guild_id: GuildId,
        source: &StreamSource,
        on_end: TrackEndNotifier,
    ) -> MusicResult<()>;

    /// Stops the current stream; its `on_end` fires as if it completed.
    async fn stop(&self, guild_id: GuildId);

    async fn disconnect(&self, guild_id: GuildId);

    /// The channel the guild's live connection is in, if it has one.
    async fn current_channel(&self, guild_id: GuildId) -> Option<ChannelId>;
}

/// Relays the first end/error event of a songbird track into its notifier.
#[derive(Clone)]
struct TrackEndRelay {
    notifier: Arc<Mutex<Option<TrackEndNotifier>>>,
}

impl TrackEndRelay {
    fn new(notifier: TrackEndNotifier) -> Self {
        Self {
            notifier: Arc::new(Mutex::new(Some(notifier))),
        }
    }
}

#[async_trait]
impl songbird::EventHandler for TrackEndRelay {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        if let EventContext::Track(tracks) = ctx {
            let Some(notifier) = self.notifier.lock().await.take() else {
                return None;
            };

            let failure = tracks.iter().find_map(|(state, _)| match &state.playing {
                PlayMode::Errored(err) => Some(format!("{:?}", err)),
                _ => None,
            });

            match failure {
                Some(reason) => notifier.failed(MusicError::PlaybackError(reason)),
                None => notifier.finished(),
            }
        }
        None
    }
}

/// [`VoiceSink`] backed by the songbird voice manager.
pub struct SongbirdSink {
    manager: Arc<Songbird>,
    http_client: reqwest::Client,
}

impl SongbirdSink {
    pub fn new(manager: Arc<Songbird>, http_client: reqwest::Client) -> Self {
        Self {
            manager,
            http_client,
        }
    }

    fn input_for(&self, source: &StreamSource) -> Input {
        match source {
            StreamSource::Direct(url) => {
                HttpRequest::new(self.http_client.clone(), url.clone()).into()
            }
            StreamSource::Extract(url) => {
                YoutubeDl::new(self.http_client.clone(), url.clone()).into()
            }
        }
    }
}

#[async_trait]
impl VoiceSink for SongbirdSink {
    async fn connect(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()> {
        info!("Joining voice channel {} in guild {}", channel_id, guild_id);
        self.manager
            .join(guild_id, channel_id)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))?;
        Ok(())
    }

    async fn stream(
        &self,
        guild_id: GuildId,
        source: &StreamSource,
        on_end: TrackEndNotifier,
    ) -> MusicResult<()> {
        let call = self.manager.get(guild_id).ok_or(MusicError::NotConnected)?;
        let input = self.input_for(source);

        let mut handler = call.lock().await;
        // One stream per guild.
        handler.stop();
        let track_handle = handler.play_input(input);
        debug!("Streaming {} in guild {}", source, guild_id);

        let relay = TrackEndRelay::new(on_end);
        for event in [TrackEvent::End, TrackEvent::Error] {
            track_handle
                .add_event(Event::Track(event), relay.clone())
                .map_err(|e| MusicError::PlaybackError(e.to_string()))?;
        }

        Ok(())
    }

    async fn stop(&self, guild_id: GuildId) {
        if let Some(call) = self.manager.get(guild_id) {
            call.lock().await.stop();
        }
    }

    async fn disconnect(&self, guild_id: GuildId) {
        if self.manager.get(guild_id).is_none() {
            return;
        }
        if let Err(e) = self.manager.remove(guild_id).await {
            warn!("Failed to leave voice channel in guild {}: {}", guild_id, e);
        }
    }

    async fn current_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        let call = self.manager.get(guild_id)?;
        let channel_id = call.lock().await.current_channel()?;
        Some(ChannelId::from(channel_id.0))
    }
}
