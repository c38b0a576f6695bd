use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use serenity::all::Http;
use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use tracing::{debug, warn};

/// Best-effort, guild scoped notifications (playback errors and the like).
#[async_trait]
pub trait Announcer: Send + Sync {
    async fn notify(&self, guild_id: GuildId, message: String);
}

/// Posts announcements to the text channel a music command was last used in.
///
/// Posting goes through the client's own HTTP handle, attached once the client is built.
#[derive(Default)]
pub struct ChannelAnnouncer {
    http: OnceLock<Arc<Http>>,
    channels: DashMap<GuildId, ChannelId>,
}

impl ChannelAnnouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the client's HTTP handle. Only the first call has an effect.
    pub fn attach(&self, http: Arc<Http>) {
        if self.http.set(http).is_err() {
            debug!("Announcer already has an HTTP handle");
        }
    }

    pub fn remember_channel(&self, guild_id: GuildId, channel_id: ChannelId) {
        self.channels.insert(guild_id, channel_id);
    }

    pub fn forget(&self, guild_id: GuildId) {
        self.channels.remove(&guild_id);
    }
}

#[async_trait]
impl Announcer for ChannelAnnouncer {
    async fn notify(&self, guild_id: GuildId, message: String) {
        let Some(channel_id) = self.channels.get(&guild_id).map(|entry| *entry) else {
            debug!("No announcement channel for guild {}: {}", guild_id, message);
            return;
        };
        let Some(http) = self.http.get() else {
            warn!("Announcer not attached to a client, dropping: {}", message);
            return;
        };

        if let Err(e) = channel_id.say(http.as_ref(), message).await {
            warn!(
                "Failed to post announcement in channel {} for guild {}: {}",
                channel_id, guild_id, e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unattached_announcer_drops_messages() {
        let announcer = ChannelAnnouncer::new();
        announcer.remember_channel(GuildId::new(1), ChannelId::new(2));

        // Must return without trying to reach Discord.
        announcer.notify(GuildId::new(1), "hello".to_string()).await;

        assert!(announcer.http.get().is_none());
    }

    #[test]
    fn first_attached_handle_is_kept() {
        let announcer = ChannelAnnouncer::new();
        let first = Arc::new(Http::new("first"));

        announcer.attach(first.clone());
        announcer.attach(Arc::new(Http::new("second")));

        assert!(Arc::ptr_eq(announcer.http.get().unwrap(), &first));
    }

    #[test]
    fn forgotten_guild_loses_its_channel() {
        let announcer = ChannelAnnouncer::new();
        announcer.remember_channel(GuildId::new(1), ChannelId::new(2));

        announcer.forget(GuildId::new(1));

        assert!(announcer.channels.get(&GuildId::new(1)).is_none());
    }
}
