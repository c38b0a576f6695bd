use std::sync::{Arc, LazyLock};

use tracing::{debug, error};

pub mod commands;
pub mod config;
pub mod events;

use commands::music::utils::{
    announcer::ChannelAnnouncer, embedded_messages, music_manager::MusicManager,
};

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// Shared HTTP client for yt-dlp backed inputs and direct media streams.
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

// User data, which is stored and accessible in all command invocations
pub struct Data {
    pub music: Arc<MusicManager>,
    pub announcer: Arc<ChannelAnnouncer>,
    pub prefix: String,
}

/// Framework error hook: usage hints for bad arguments, error replies for failed commands.
pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::ArgumentParse { ctx, error, .. } => {
            let command = ctx.command().name.clone();
            let prefix = ctx.data().prefix.clone();
            debug!("Bad arguments for {}: {}", command, error);
            if let Err(e) = ctx
                .send(embedded_messages::missing_argument(&prefix, &command))
                .await
            {
                error!("Failed to send argument error reply: {}", e);
            }
        }
        poise::FrameworkError::Command { ctx, error, .. } => {
            error!("Command {} failed: {}", ctx.command().name, error);
            if let Err(e) = ctx.send(embedded_messages::command_failed(&error)).await {
                error!("Failed to send command error reply: {}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}
