use super::*;
use crate::commands::music::utils::{embedded_messages, player_state::PlayerSnapshot};

/// Show the current track and the pending queue
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn queue(ctx: Context<'_>) -> CommandResult {
    let guild_id = command_guild(ctx)?;

    let snapshot = match ctx.data().music.existing_player(guild_id) {
        Some(player) => player.snapshot().await,
        None => PlayerSnapshot::empty(),
    };

    reply(ctx, embedded_messages::music_queue(&snapshot)).await
}
