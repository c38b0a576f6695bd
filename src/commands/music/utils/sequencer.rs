//! The per-guild playback sequencer.
//!
//! Every operation on a [`GuildPlayer`] runs inside the guild lock, so transitions
//! for one guild never interleave. Track ends arrive through a one-shot
//! [`TrackEndNotifier`] per stream; each stream carries a generation number and an
//! end report is only acted on while its generation is the one being awaited.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serenity::model::id::{ChannelId, GuildId};
use tokio::sync::{Mutex, oneshot};
use tracing::{debug, info, warn};

use super::announcer::Announcer;
use super::idle_timer::IdleTimer;
use super::music_manager::{MusicError, MusicResult};
use super::player_state::{InsertMode, PlayerSnapshot, PlayerState};
use super::voice_sink::{TrackEnd, TrackEndNotifier, VoiceSink};
use crate::commands::music::audio_sources::TrackMetadata;

/// What happened to a track handed to [`GuildPlayer::enqueue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// The player was idle and the track started streaming.
    NowPlaying,
    /// The track waits at this 1-based position of the queue.
    Queued { position: usize },
    /// The current stream was stopped; the track plays as soon as it ends.
    PlayingNext,
    /// The player was idle but the track could not be streamed and was dropped.
    Unplayable,
}

pub struct GuildPlayer {
    guild_id: GuildId,
    state: Mutex<PlayerState>,
    sink: Arc<dyn VoiceSink>,
    announcer: Arc<dyn Announcer>,
    idle_timeout: Duration,
}

impl GuildPlayer {
    pub fn new(
        guild_id: GuildId,
        sink: Arc<dyn VoiceSink>,
        announcer: Arc<dyn Announcer>,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            guild_id,
            state: Mutex::new(PlayerState::default()),
            sink,
            announcer,
            idle_timeout,
        }
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub async fn snapshot(&self) -> PlayerSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Makes sure the sink is connected to `requested_channel`.
    ///
    /// `None` means the requester is not in a voice channel. Joining the channel the
    /// live connection is already in is a no-op; a lost connection is rejoined and
    /// any other channel moves it.
    pub async fn ensure_voice(&self, requested_channel: Option<ChannelId>) -> MusicResult<()> {
        let mut state = self.state.lock().await;
        self.ensure_voice_locked(&mut state, requested_channel).await
    }

    /// Connects to the requester's channel and enqueues `track` in one critical section.
    pub async fn play(
        self: &Arc<Self>,
        requested_channel: Option<ChannelId>,
        track: TrackMetadata,
        mode: InsertMode,
    ) -> MusicResult<EnqueueOutcome> {
        let mut state = self.state.lock().await;
        self.ensure_voice_locked(&mut state, requested_channel).await?;
        Ok(self.enqueue_locked(&mut state, track, mode).await)
    }

    pub async fn enqueue(
        self: &Arc<Self>,
        track: TrackMetadata,
        mode: InsertMode,
    ) -> EnqueueOutcome {
        let mut state = self.state.lock().await;
        self.enqueue_locked(&mut state, track, mode).await
    }

    /// Stops the current stream so the following transition moves past it, even when
    /// the current track is looping. Returns the skipped track.
    pub async fn skip(&self) -> MusicResult<TrackMetadata> {
        let mut state = self.state.lock().await;
        if state.streaming.is_none() {
            return Err(MusicError::NothingPlaying);
        }
        let skipped = state.current.clone().ok_or(MusicError::NothingPlaying)?;

        info!("Skipping '{}' in guild {}", skipped.title, self.guild_id);
        state.bypass_loop = true;
        self.sink.stop(self.guild_id).await;
        Ok(skipped)
    }

    /// Flips the loop flag and returns the new value.
    pub async fn toggle_loop(&self) -> bool {
        let mut state = self.state.lock().await;
        state.loop_current = !state.loop_current;
        info!(
            "Looping {} for guild {}",
            if state.loop_current { "enabled" } else { "disabled" },
            self.guild_id
        );
        state.loop_current
    }

    /// Flips the loop flag only while a track is current, returning the new value
    /// together with that track. Check and flip happen under one lock.
    pub async fn toggle_loop_current(&self) -> Option<(bool, TrackMetadata)> {
        let mut state = self.state.lock().await;
        let current = state.current.clone()?;
        state.loop_current = !state.loop_current;
        info!(
            "Looping {} '{}' in guild {}",
            if state.loop_current { "enabled for" } else { "disabled for" },
            current.title,
            self.guild_id
        );
        Some((state.loop_current, current))
    }

    /// Clears loop, queue and current track, stops and disconnects the sink and
    /// cancels the idle timer. Safe to repeat.
    pub async fn stop_and_clear(&self) {
        let mut state = self.state.lock().await;
        state.loop_current = false;
        state.bypass_loop = false;
        state.queue.clear();
        state.cancel_idle_timer();

        if state.streaming.take().is_some() {
            self.sink.stop(self.guild_id).await;
        }
        if state.voice_channel.take().is_some() {
            self.sink.disconnect(self.guild_id).await;
        }
        state.current = None;
        info!("Stopped playback and cleared queue for guild {}", self.guild_id);
    }

    /// Entry point for track-end reports. Returns whether a transition was performed;
    /// reports for a stream that is no longer awaited are ignored.
    pub async fn track_ended(self: &Arc<Self>, generation: u64, outcome: TrackEnd) -> bool {
        let mut state = self.state.lock().await;
        if state.streaming != Some(generation) {
            debug!(
                "Ignoring stale track end (generation {}) in guild {}",
                generation, self.guild_id
            );
            return false;
        }
        state.streaming = None;

        if let Some(error) = outcome {
            let title = state
                .current
                .take()
                .map(|track| track.title)
                .unwrap_or_default();
            warn!(
                "Playback of '{}' failed in guild {}: {}",
                title, self.guild_id, error
            );
            self.announce(format!("Playback error on **{}**: `{}`", title, error));
        }

        self.advance_locked(&mut state).await;
        true
    }

    async fn ensure_voice_locked(
        &self,
        state: &mut PlayerState,
        requested_channel: Option<ChannelId>,
    ) -> MusicResult<()> {
        let channel_id = requested_channel.ok_or(MusicError::UserNotInVoiceChannel)?;

        // The connection can be dropped or moved from outside, so ask the sink.
        let live_channel = self.sink.current_channel(self.guild_id).await;
        if live_channel == Some(channel_id) {
            state.voice_channel = Some(channel_id);
            return Ok(());
        }
        if state.voice_channel.is_some() && live_channel != state.voice_channel {
            debug!(
                "Voice connection in guild {} was lost or moved (now {:?}), rejoining",
                self.guild_id, live_channel
            );
        }
        state.voice_channel = live_channel;

        self.sink.connect(self.guild_id, channel_id).await?;
        state.voice_channel = Some(channel_id);
        Ok(())
    }

    async fn enqueue_locked(
        self: &Arc<Self>,
        state: &mut PlayerState,
        track: TrackMetadata,
        mode: InsertMode,
    ) -> EnqueueOutcome {
        debug!(
            "Enqueueing '{}' ({:?}) in guild {}",
            track.title, mode, self.guild_id
        );
        match mode {
            InsertMode::Append => state.queue.push_back(track),
            InsertMode::PlayNow => state.queue.push_front(track),
        }

        if state.streaming.is_none() {
            state.cancel_idle_timer();
            self.advance_locked(state).await;
            return if state.streaming.is_some() {
                EnqueueOutcome::NowPlaying
            } else {
                EnqueueOutcome::Unplayable
            };
        }

        match mode {
            InsertMode::Append => EnqueueOutcome::Queued {
                position: state.queue.len(),
            },
            InsertMode::PlayNow => {
                // The end of the interrupted stream drives the transition.
                state.bypass_loop = true;
                self.sink.stop(self.guild_id).await;
                EnqueueOutcome::PlayingNext
            }
        }
    }

    /// Picks and starts the next track: replay the looping current track, else pop the
    /// queue, else go idle and arm the idle timer. Tracks the sink rejects are announced
    /// and dropped, so this runs at most once per queued track.
    async fn advance_locked(self: &Arc<Self>, state: &mut PlayerState) {
        let bypass_loop = std::mem::take(&mut state.bypass_loop);
        let mut replay = state.loop_current && !bypass_loop && state.current.is_some();

        loop {
            if !replay {
                state.current = state.queue.pop_front();
            }
            replay = false;

            let Some(track) = state.current.clone() else {
                self.go_idle(state);
                return;
            };

            match self.start_stream(state, &track).await {
                Ok(()) => {
                    info!("Now playing '{}' in guild {}", track.title, self.guild_id);
                    return;
                }
                Err(error) => {
                    warn!(
                        "Could not stream '{}' in guild {}: {}",
                        track.title, self.guild_id, error
                    );
                    self.announce(format!("Playback error on **{}**: `{}`", track.title, error));
                    state.current = None;
                }
            }
        }
    }

    async fn start_stream(
        self: &Arc<Self>,
        state: &mut PlayerState,
        track: &TrackMetadata,
    ) -> MusicResult<()> {
        state.cancel_idle_timer();
        let generation = state.next_generation();
        let (notifier, ended) = TrackEndNotifier::channel();

        self.sink
            .stream(self.guild_id, &track.source, notifier)
            .await?;
        state.streaming = Some(generation);

        tokio::spawn(Arc::clone(self).watch_track_end(generation, ended));

        Ok(())
    }

    // Boxed so the spawned watcher does not make `track_ended` a recursive opaque type.
    fn watch_track_end(
        self: Arc<Self>,
        generation: u64,
        ended: oneshot::Receiver<TrackEnd>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(async move {
            let outcome = ended.await.unwrap_or_else(|_| {
                Some(MusicError::PlaybackError(
                    "voice connection dropped the track".to_string(),
                ))
            });
            self.track_ended(generation, outcome).await;
        })
    }

    fn go_idle(self: &Arc<Self>, state: &mut PlayerState) {
        state.cancel_idle_timer();
        if state.voice_channel.is_none() {
            return;
        }

        let id = state.next_generation();
        let player = Arc::clone(self);
        state.idle_timer = Some(IdleTimer::arm(id, self.idle_timeout, async move {
            player.idle_expired(id).await;
        }));
        debug!(
            "Queue finished in guild {}, disconnecting in {:?} unless woken",
            self.guild_id, self.idle_timeout
        );
    }

    async fn idle_expired(&self, timer_id: u64) {
        let mut state = self.state.lock().await;
        if state.idle_timer.as_ref().map(IdleTimer::id) != Some(timer_id) {
            return;
        }
        state.idle_timer = None;

        if state.streaming.is_some() || state.loop_current || !state.queue.is_empty() {
            return;
        }
        if state.voice_channel.take().is_some() {
            info!("Leaving idle voice channel in guild {}", self.guild_id);
            self.sink.disconnect(self.guild_id).await;
        }
    }

    fn announce(&self, message: String) {
        let announcer = Arc::clone(&self.announcer);
        let guild_id = self.guild_id;
        tokio::spawn(async move {
            announcer.notify(guild_id, message).await;
        });
    }
}
