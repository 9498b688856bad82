use poise::CreateReply;

use super::utils::embedded_messages;
use super::utils::music_manager::MusicError;
use super::utils::panel_view::render_panel;
use super::{active_session, send_error};
use crate::{CommandResult, Context};

/// Show the track that is playing right now
#[poise::command(slash_command, prefix_command, category = "Music", aliases("np"))]
pub async fn nowplaying(ctx: Context<'_>) -> CommandResult {
    let Some(session) = active_session(ctx).await? else {
        return Ok(());
    };

    let snapshot = session.snapshot().await;
    if !snapshot.has_track() {
        return send_error(ctx, &MusicError::NothingPlaying).await;
    }

    let view = render_panel(&snapshot);
    ctx.send(CreateReply::default().embed(embedded_messages::panel_embed(&view)))
        .await?;
    Ok(())
}

/// Post the player panel with its control buttons
#[poise::command(slash_command, prefix_command, category = "Music", aliases("controls"))]
pub async fn panel(ctx: Context<'_>) -> CommandResult {
    let Some(session) = active_session(ctx).await? else {
        return Ok(());
    };

    if let Err(err) = ctx.data().registry.refresh_panel_position(&session).await {
        return send_error(ctx, &err).await;
    }
    ctx.send(CreateReply::default().content("🎛️ Player panel posted").ephemeral(true))
        .await?;
    Ok(())
}
