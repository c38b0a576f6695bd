use super::*;
use crate::commands::music::utils::embedded_messages;

/// Skip the currently playing track, even when it is looping
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn skip(ctx: Context<'_>) -> CommandResult {
    let guild_id = command_guild(ctx)?;
    remember_text_channel(ctx, guild_id);

    let Some(player) = ctx.data().music.existing_player(guild_id) else {
        return reply(ctx, embedded_messages::no_track_playing()).await;
    };

    match player.skip().await {
        Ok(skipped) => reply(ctx, embedded_messages::skipped(&skipped)).await,
        Err(MusicError::NothingPlaying) => {
            reply(ctx, embedded_messages::no_track_playing()).await
        }
        Err(err) => Err(err.into()),
    }
}
