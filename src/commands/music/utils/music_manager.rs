use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use poise::serenity_prelude as serenity;
use serenity::client::Context;
use serenity::model::id::{ChannelId, GuildId, UserId};
use thiserror::Error;
use tracing::{debug, info};

use super::announcer::Announcer;
use super::player_state::InsertMode;
use super::sequencer::{EnqueueOutcome, GuildPlayer};
use super::voice_sink::VoiceSink;
use crate::commands::music::audio_sources::{TrackMetadata, TrackResolver};

/// Errors that can occur during music operations
#[derive(Error, Debug)]
pub enum MusicError {
    #[error("Not in a guild")]
    NotInGuild,

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("User is not in a voice channel")]
    UserNotInVoiceChannel,

    #[error("Audio source error: {0}")]
    AudioSourceError(String),

    #[error("Playback error: {0}")]
    PlaybackError(String),

    #[error("Nothing is playing")]
    NothingPlaying,

    #[error("Missing track URL or search text")]
    MissingLocator,
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// A request to resolve a locator and hand the track to a guild's player.
#[derive(Debug, Clone)]
pub struct PlayRequest {
    pub guild_id: GuildId,
    /// Voice channel of the requester, if they are in one.
    pub voice_channel: Option<ChannelId>,
    pub locator: String,
    pub requested_by: String,
    pub mode: InsertMode,
}

/// Process-wide owner of the per-guild players and of the collaborators they share.
pub struct MusicManager {
    players: DashMap<GuildId, Arc<GuildPlayer>>,
    resolver: Arc<dyn TrackResolver>,
    sink: Arc<dyn VoiceSink>,
    announcer: Arc<dyn Announcer>,
    idle_timeout: Duration,
}

impl MusicManager {
    pub fn new(
        resolver: Arc<dyn TrackResolver>,
        sink: Arc<dyn VoiceSink>,
        announcer: Arc<dyn Announcer>,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            players: DashMap::new(),
            resolver,
            sink,
            announcer,
            idle_timeout,
        }
    }

    /// Returns the guild's player, creating an empty one on first use.
    /// Concurrent callers for one guild always receive the same player.
    pub fn player(&self, guild_id: GuildId) -> Arc<GuildPlayer> {
        self.players
            .entry(guild_id)
            .or_insert_with(|| {
                debug!("Creating player for guild {}", guild_id);
                Arc::new(GuildPlayer::new(
                    guild_id,
                    Arc::clone(&self.sink),
                    Arc::clone(&self.announcer),
                    self.idle_timeout,
                ))
            })
            .clone()
    }

    /// The guild's player if one was ever created, without creating it.
    pub fn existing_player(&self, guild_id: GuildId) -> Option<Arc<GuildPlayer>> {
        self.players.get(&guild_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Drops the guild's entry; the next [`player`](Self::player) call builds a fresh one.
    pub fn remove(&self, guild_id: GuildId) -> Option<Arc<GuildPlayer>> {
        self.players.remove(&guild_id).map(|(_, player)| player)
    }

    /// Validates the request, resolves the locator without holding any guild lock,
    /// then connects and enqueues on the guild's player.
    pub async fn process_play_request(
        &self,
        request: PlayRequest,
    ) -> MusicResult<(TrackMetadata, EnqueueOutcome)> {
        let locator = request.locator.trim();
        if locator.is_empty() {
            return Err(MusicError::MissingLocator);
        }
        if request.voice_channel.is_none() {
            return Err(MusicError::UserNotInVoiceChannel);
        }

        let track = self
            .resolver
            .resolve(locator, &request.requested_by)
            .await?;
        info!(
            "Resolved '{}' to '{}' for guild {}",
            locator, track.title, request.guild_id
        );

        let outcome = self
            .player(request.guild_id)
            .play(request.voice_channel, track.clone(), request.mode)
            .await?;

        Ok((track, outcome))
    }

    /// Stops and clears the guild's player if it has one.
    pub async fn stop(&self, guild_id: GuildId) {
        if let Some(player) = self.existing_player(guild_id) {
            player.stop_and_clear().await;
        }
    }

    /// Stops the guild's player and forgets it entirely.
    pub async fn forget(&self, guild_id: GuildId) {
        if let Some(player) = self.remove(guild_id) {
            player.stop_and_clear().await;
            info!("Removed player for guild {}", guild_id);
        }
    }

    /// Get the voice channel ID that the user is currently in
    pub fn get_user_voice_channel(
        ctx: &Context,
        guild_id: GuildId,
        user_id: UserId,
    ) -> MusicResult<ChannelId> {
        // Get the guild
        let guild = ctx.cache.guild(guild_id).ok_or(MusicError::NotInGuild)?;

        // Get the voice state of the user
        let voice_state = guild
            .voice_states
            .get(&user_id)
            .ok_or(MusicError::UserNotInVoiceChannel)?;

        voice_state
            .channel_id
            .ok_or(MusicError::UserNotInVoiceChannel)
    }
}
