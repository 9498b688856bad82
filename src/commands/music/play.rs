use poise::CreateReply;
use tracing::{debug, info};

use super::utils::embedded_messages;
use super::utils::music_manager::{MusicError, get_user_voice_channel};
use super::utils::session::{EnqueueOutcome, PlaybackState};
use super::utils::track::Requester;
use super::{guild_id, refresh_panel, send_error};
use crate::{CommandResult, Context};

/// Play a song from YouTube or a direct URL
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[description = "URL or search query"]
    #[rest]
    query: String,
) -> CommandResult {
    info!("Received play command with query: {}", query);
    let guild_id = guild_id(ctx)?;

    // Get the user's voice channel
    let channel_id = match get_user_voice_channel(ctx.serenity_context(), guild_id, ctx.author().id)
    {
        Ok(channel_id) => channel_id,
        Err(err) => return send_error(ctx, &err).await,
    };

    // Searching can take a few seconds
    ctx.defer().await?;

    let registry = &ctx.data().registry;
    let session = registry.get_or_create_session(guild_id, ctx.channel_id()).await;
    session.set_text_channel(ctx.channel_id()).await;

    if session.state().await == PlaybackState::Disconnected {
        if let Err(err) = session.join(channel_id).await {
            return send_error(ctx, &err).await;
        }
    }

    let tracks = match registry.engine().search(&query).await {
        Ok(tracks) => tracks,
        Err(err) => return send_error(ctx, &err).await,
    };
    let Some(track) = tracks.into_iter().next() else {
        return send_error(ctx, &MusicError::NoResults(query)).await;
    };
    debug!("Resolved '{}' to {}", query, track.uri);

    let requester = Requester::new(ctx.author().id, ctx.author().name.clone());
    let embed = match session.enqueue_or_play(track.clone(), requester).await {
        Ok(EnqueueOutcome::Started) => embedded_messages::now_playing(&track),
        Ok(EnqueueOutcome::Queued { position }) => {
            embedded_messages::added_to_queue(&track, position)
        }
        Err(err) => return send_error(ctx, &err).await,
    };

    ctx.send(CreateReply::default().embed(embed)).await?;
    refresh_panel(ctx, &session).await;

    Ok(())
}
