//! Defines the `loop` command, which repeats the current track until toggled off.

use super::*;
use crate::commands::music::utils::embedded_messages;

/// Toggle looping of the current track
#[poise::command(slash_command, prefix_command, rename = "loop", category = "Music")]
pub async fn loop_track(ctx: Context<'_>) -> CommandResult {
    let guild_id = command_guild(ctx)?;
    remember_text_channel(ctx, guild_id);

    let toggled = match ctx.data().music.existing_player(guild_id) {
        Some(player) => player.toggle_loop_current().await,
        None => None,
    };

    match toggled {
        Some((enabled, current)) => {
            reply(ctx, embedded_messages::loop_status(enabled, &current)).await
        }
        None => reply(ctx, embedded_messages::nothing_to_loop()).await,
    }
}
