use super::utils::embedded_messages;
use super::utils::music_manager::MusicError;
use super::{active_session, refresh_panel, send_error};
use crate::{CommandResult, Context};

/// Pause the currently playing track
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn pause(ctx: Context<'_>) -> CommandResult {
    let Some(session) = active_session(ctx).await? else {
        return Ok(());
    };

    if let Err(err) = session.pause().await {
        return send_error(ctx, &err).await;
    }
    let Some(track) = session.now_playing().await else {
        return send_error(ctx, &MusicError::NothingPlaying).await;
    };

    ctx.send(embedded_messages::paused(&track)).await?;
    refresh_panel(ctx, &session).await;
    Ok(())
}

/// Resume the paused track
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn resume(ctx: Context<'_>) -> CommandResult {
    let Some(session) = active_session(ctx).await? else {
        return Ok(());
    };

    if let Err(err) = session.resume().await {
        return send_error(ctx, &err).await;
    }
    let Some(track) = session.now_playing().await else {
        return send_error(ctx, &MusicError::NothingPlaying).await;
    };

    ctx.send(embedded_messages::resumed(&track)).await?;
    refresh_panel(ctx, &session).await;
    Ok(())
}
