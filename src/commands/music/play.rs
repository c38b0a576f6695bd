use super::*;
use crate::commands::music::utils::{
    embedded_messages, music_manager::PlayRequest, player_state::InsertMode,
};
use tracing::{info, warn};

/// Play a track now, interrupting the current one. The bot joins your voice channel.
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[rest]
    #[description = "URL or search query"]
    query: String,
) -> CommandResult {
    info!("Received play command with query: {}", query);
    request_track(ctx, query, InsertMode::PlayNow, "play").await
}

/// Shared body of `play` and `add`.
pub(super) async fn request_track(
    ctx: Context<'_>,
    query: String,
    mode: InsertMode,
    command: &str,
) -> CommandResult {
    let guild_id = command_guild(ctx)?;

    let Some(voice_channel) = author_voice_channel(ctx, guild_id) else {
        return reply(ctx, embedded_messages::user_not_in_voice_channel(command)).await;
    };
    remember_text_channel(ctx, guild_id);

    // Resolution can take a while
    ctx.defer().await?;

    let request = PlayRequest {
        guild_id,
        voice_channel: Some(voice_channel),
        locator: query,
        requested_by: ctx.author().name.clone(),
        mode,
    };

    match ctx.data().music.process_play_request(request).await {
        Ok((track, outcome)) => {
            reply(ctx, embedded_messages::track_enqueued(&track, &outcome)).await
        }
        Err(err) => {
            warn!("{} request failed in guild {}: {}", command, guild_id, err);
            reply(ctx, embedded_messages::play_request_failed(&err)).await
        }
    }
}
