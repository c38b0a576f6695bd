use poise::{CreateReply, serenity_prelude as serenity};
use serenity::all::CreateEmbed;

use super::player_state::PlayerSnapshot;
use super::sequencer::EnqueueOutcome;
use super::{format_duration, music_manager::MusicError};
use crate::commands::music::audio_sources::TrackMetadata;

const OK_COLOR: u32 = 0x00ff00;
const ERROR_COLOR: u32 = 0xff0000;

/// Discord rejects embed descriptions longer than this many characters.
const EMBED_DESCRIPTION_LIMIT: usize = 4096;
/// Room kept free for the "…and N more" line.
const OVERFLOW_LINE_RESERVE: usize = 32;

/// Parse the metadata for the now playing and added to queue embeds
fn parse_metadata(metadata: &TrackMetadata) -> (String, String, String) {
    let title = metadata.title.clone();
    let url = metadata.url.clone();
    let duration_str = metadata
        .duration
        .map(format_duration)
        .unwrap_or_else(|| "Unknown duration".to_string());

    (title, url, duration_str)
}

fn error_reply(description: impl Into<String>) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("❌ Error")
            .description(description)
            .color(ERROR_COLOR),
    )
}

/// Reply for a track handed to the player by `play` or `add`
pub fn track_enqueued(metadata: &TrackMetadata, outcome: &EnqueueOutcome) -> CreateReply {
    let (title, url, duration_str) = parse_metadata(metadata);

    let mut embed = match outcome {
        EnqueueOutcome::NowPlaying => CreateEmbed::new().title("🎵 Now Playing"),
        EnqueueOutcome::PlayingNext => CreateEmbed::new().title("🎵 Playing Next"),
        EnqueueOutcome::Queued { position } => CreateEmbed::new()
            .title("🎵 Added to Queue")
            .field("Position", format!("`#{}`", position), true),
        EnqueueOutcome::Unplayable => {
            return error_reply(format!("Could not play [{}]({})", title, url));
        }
    };

    embed = embed
        .description(format!("[{}]({})", title, url))
        .field("Duration", format!("`{}`", duration_str), true)
        .field("Requested by", metadata.requested_by.clone(), true)
        .color(OK_COLOR);

    if let Some(thumbnail) = &metadata.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }

    CreateReply::default().embed(embed)
}

/// Build the text listing of the current track and the pending queue
pub fn queue_description(snapshot: &PlayerSnapshot) -> String {
    let mut lines = Vec::with_capacity(snapshot.queue.len() + 2);

    match &snapshot.current {
        Some(track) => {
            let looping = if snapshot.loop_current { " 🔂" } else { "" };
            lines.push(format!(
                "**Now:** {} (requested by {}){}",
                track.title, track.requested_by, looping
            ));
        }
        None => lines.push("**Now:** (nothing)".to_string()),
    }

    if snapshot.queue.is_empty() {
        lines.push("Queue is empty.".to_string());
        return lines.join("\n");
    }

    let budget = EMBED_DESCRIPTION_LIMIT - OVERFLOW_LINE_RESERVE;
    let mut length = lines[0].chars().count();
    for (index, track) in snapshot.queue.iter().enumerate() {
        let line = format!(
            "{}. {} (requested by {})",
            index + 1,
            track.title,
            track.requested_by
        );
        let line_length = line.chars().count() + 1;
        if length + line_length > budget {
            lines.push(format!("…and {} more", snapshot.queue.len() - index));
            break;
        }
        length += line_length;
        lines.push(line);
    }

    lines.join("\n")
}

/// Create an embed for the music queue
pub fn music_queue(snapshot: &PlayerSnapshot) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("🎵 Music Queue")
            .description(queue_description(snapshot))
            .color(OK_COLOR),
    )
}

/// Create an embed for when a user is not connected to a voice channel
pub fn user_not_in_voice_channel(command: &str) -> CreateReply {
    error_reply(format!(
        "You must be in a voice channel to use `{}`.",
        command
    ))
    .ephemeral(true)
}

/// Create an embed for a failed `play`/`add` request
pub fn play_request_failed(err: &MusicError) -> CreateReply {
    match err {
        MusicError::AudioSourceError(_) => {
            error_reply(format!("Could not extract audio from that URL: {}", err))
        }
        MusicError::JoinError(_) => error_reply(format!("Failed to join voice channel: {}", err)),
        other => error_reply(other.to_string()),
    }
}

/// Create an embed for when no track is playing
pub fn no_track_playing() -> CreateReply {
    error_reply("No track is currently playing")
}

/// Create an embed for when there is no track to loop
pub fn nothing_to_loop() -> CreateReply {
    error_reply("No track is currently playing to loop.")
}

/// Create an embed for a loop toggle
pub fn loop_status(enabled: bool, metadata: &TrackMetadata) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title(if enabled {
                "🔂 Looping Enabled"
            } else {
                "➡️ Looping Disabled"
            })
            .description(format!(
                "Looping is now {} for **{}**.",
                if enabled { "ENABLED" } else { "DISABLED" },
                metadata.title
            ))
            .color(OK_COLOR),
    )
}

/// Create an embed for when the bot stops playing music
pub fn stopped() -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("⏹️ Stopped")
            .description("Stopped playback and left the voice channel.")
            .color(OK_COLOR),
    )
}

/// Create an embed for when a track is skipped
pub fn skipped(metadata: &TrackMetadata) -> CreateReply {
    let (title, url, _) = parse_metadata(metadata);

    CreateReply::default().embed(
        CreateEmbed::new()
            .title("⏭️ Skipped")
            .description(format!("Skipped [{}]({})", title, url))
            .color(OK_COLOR),
    )
}

/// Reply for a prefix/slash invocation missing its required argument
pub fn missing_argument(prefix: &str, command: &str) -> CreateReply {
    error_reply(format!(
        "Missing required argument. Example: `{}{} <youtube_url>`",
        prefix, command
    ))
}

/// Reply for an unexpected command failure
pub fn command_failed(err: &dyn std::fmt::Display) -> CreateReply {
    error_reply(format!("Error: `{}`", err))
}
