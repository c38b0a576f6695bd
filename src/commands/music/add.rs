use super::*;
use crate::commands::music::utils::player_state::InsertMode;
use tracing::info;

/// Add a track to the end of the queue (plays after the current track)
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn add(
    ctx: Context<'_>,
    #[rest]
    #[description = "URL or search query"]
    query: String,
) -> CommandResult {
    info!("Received add command with query: {}", query);
    play::request_track(ctx, query, InsertMode::Append, "add").await
}
