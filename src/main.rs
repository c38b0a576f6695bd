use ::serenity::all::ClientBuilder;
use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use songbird::{SerenityInit, Songbird};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use jukebox::commands::music::{
    add::*,
    audio_sources::youtube::YoutubeApi,
    loop_track::*,
    play::*,
    queue::*,
    skip::*,
    stop::*,
    utils::{announcer::ChannelAnnouncer, music_manager::MusicManager, voice_sink::SongbirdSink},
};
use jukebox::config::BotConfig;
use jukebox::events::Handler;
use jukebox::{CommandResult, Context, Data, Error, HTTP_CLIENT};

#[poise::command(slash_command, prefix_command, category = "General")]
async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> CommandResult {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            show_context_menu_commands: true,
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.into())
}

#[poise::command(prefix_command, hide_in_help)]
async fn register(ctx: Context<'_>) -> Result<(), Error> {
    poise::builtins::register_application_commands_buttons(ctx)
        .await
        .map_err(|e| e.into())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize logging with debug level for our crate
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("jukebox=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    dotenv().ok();

    let config = BotConfig::from_env()?;

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    // Music collaborators
    let voice = Songbird::serenity();
    let announcer = Arc::new(ChannelAnnouncer::new());
    let music = Arc::new(MusicManager::new(
        Arc::new(YoutubeApi::default()),
        Arc::new(SongbirdSink::new(voice.clone(), HTTP_CLIENT.clone())),
        announcer.clone(),
        config.idle_timeout,
    ));

    let commands = vec![
        // Default commands
        register(),
        help(),
        // Music commands
        play(),
        add(),
        skip(),
        stop(),
        loop_track(),
        queue(),
    ];

    let data = Data {
        music: music.clone(),
        announcer: announcer.clone(),
        prefix: config.prefix.clone(),
    };

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands,
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.prefix.clone()),
                ..Default::default()
            },
            on_error: |error| Box::pin(jukebox::on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        });

    info!("Starting bot with prefix '{}'", config.prefix);

    let mut client = ClientBuilder::new(&config.discord_token, intents)
        .framework(framework.build())
        .event_handler(Handler::new(music, announcer.clone()))
        .register_songbird_with(voice)
        .await?;

    // Announcements share the client's HTTP handle and its rate limiter
    announcer.attach(client.http.clone());

    client.start().await.map_err(Into::into)
}
