//! Mutable per-guild playback state. Only the guild's [`GuildPlayer`](super::sequencer::GuildPlayer)
//! touches it, and only while holding the guild lock.

use std::collections::VecDeque;

use serde::Serialize;
use serenity::model::id::ChannelId;

use super::idle_timer::IdleTimer;
use crate::commands::music::audio_sources::TrackMetadata;

/// Where a newly enqueued track goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    /// Tail of the queue.
    Append,
    /// Head of the queue, interrupting whatever is streaming.
    PlayNow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Idle,
    Playing,
}

#[derive(Debug, Default)]
pub struct PlayerState {
    pub(super) queue: VecDeque<TrackMetadata>,
    pub(super) current: Option<TrackMetadata>,
    pub(super) loop_current: bool,
    /// Set by skip / play-now so the next transition ignores `loop_current` once.
    pub(super) bypass_loop: bool,
    pub(super) voice_channel: Option<ChannelId>,
    pub(super) idle_timer: Option<IdleTimer>,
    /// Generation of the stream whose end is still awaited. `None` while idle.
    pub(super) streaming: Option<u64>,
    generation: u64,
}

impl PlayerState {
    pub fn status(&self) -> PlayerStatus {
        if self.streaming.is_some() {
            PlayerStatus::Playing
        } else {
            PlayerStatus::Idle
        }
    }

    pub(super) fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub(super) fn cancel_idle_timer(&mut self) {
        if let Some(timer) = self.idle_timer.take() {
            timer.cancel();
        }
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            status: self.status(),
            current: self.current.clone(),
            queue: self.queue.iter().cloned().collect(),
            loop_current: self.loop_current,
            voice_channel: self.voice_channel,
            idle_timer_armed: self.idle_timer.is_some(),
            stream_generation: self.streaming,
        }
    }
}

/// Point-in-time copy of a guild player's state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub status: PlayerStatus,
    pub current: Option<TrackMetadata>,
    pub queue: Vec<TrackMetadata>,
    pub loop_current: bool,
    pub voice_channel: Option<ChannelId>,
    pub idle_timer_armed: bool,
    pub stream_generation: Option<u64>,
}

impl PlayerSnapshot {
    /// Snapshot of a guild that never had a player.
    pub fn empty() -> Self {
        PlayerState::default().snapshot()
    }

    pub fn queue_titles(&self) -> Vec<&str> {
        self.queue.iter().map(|track| track.title.as_str()).collect()
    }

    pub fn current_title(&self) -> Option<&str> {
        self.current.as_ref().map(|track| track.title.as_str())
    }
}
