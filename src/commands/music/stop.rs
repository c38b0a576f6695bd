use super::*;
use crate::commands::music::utils::embedded_messages;

/// Stop the music, clear the queue, and leave the voice channel
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn stop(ctx: Context<'_>) -> CommandResult {
    let guild_id = command_guild(ctx)?;

    // Only listeners may stop the music
    if author_voice_channel(ctx, guild_id).is_none() {
        return reply(ctx, embedded_messages::user_not_in_voice_channel("stop")).await;
    }

    ctx.data().music.stop(guild_id).await;

    reply(ctx, embedded_messages::stopped()).await
}
