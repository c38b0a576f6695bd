use std::sync::Arc;

use serenity::all::{Guild, UnavailableGuild};
use serenity::async_trait;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::info;

use crate::commands::music::utils::announcer::ChannelAnnouncer;
use crate::commands::music::utils::music_manager::MusicManager;

pub struct Handler {
    music: Arc<MusicManager>,
    announcer: Arc<ChannelAnnouncer>,
}

impl Handler {
    pub fn new(music: Arc<MusicManager>, announcer: Arc<ChannelAnnouncer>) -> Self {
        Self { music, announcer }
    }
}

#[async_trait]
impl serenity::prelude::EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Logged in as {} (id: {})", ready.user.name, ready.user.id);
    }

    async fn guild_delete(
        &self,
        _ctx: Context,
        incomplete: UnavailableGuild,
        _full: Option<Guild>,
    ) {
        // An outage also reports the guild as deleted; keep its player then.
        if incomplete.unavailable {
            return;
        }

        info!("Removed from guild {}, dropping its player", incomplete.id);
        self.music.forget(incomplete.id).await;
        self.announcer.forget(incomplete.id);
    }
}
