pub mod add;
pub mod loop_track;
pub mod play;
pub mod queue;
pub mod skip;
pub mod stop;

pub mod audio_sources;
pub mod utils;

use crate::{CommandResult, Context};
use poise::CreateReply;
use poise::serenity_prelude::{ChannelId, GuildId};
use utils::music_manager::{MusicError, MusicManager};

/// Resolve the guild a music command was used in.
fn command_guild(ctx: Context<'_>) -> Result<GuildId, MusicError> {
    ctx.guild_id().ok_or(MusicError::NotInGuild)
}

/// The voice channel the invoking user is in, if any.
fn author_voice_channel(ctx: Context<'_>, guild_id: GuildId) -> Option<ChannelId> {
    MusicManager::get_user_voice_channel(ctx.serenity_context(), guild_id, ctx.author().id).ok()
}

/// Playback announcements for the guild go to the channel music was last controlled from.
fn remember_text_channel(ctx: Context<'_>, guild_id: GuildId) {
    ctx.data()
        .announcer
        .remember_channel(guild_id, ctx.channel_id());
}

async fn reply(ctx: Context<'_>, reply: CreateReply) -> CommandResult {
    ctx.send(reply).await?;
    Ok(())
}
