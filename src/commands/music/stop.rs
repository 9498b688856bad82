use tracing::info;

use super::utils::embedded_messages;
use super::{active_session, refresh_panel};
use crate::{CommandResult, Context};

/// Stop the music and clear the queue
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn stop(ctx: Context<'_>) -> CommandResult {
    let Some(session) = active_session(ctx).await? else {
        return Ok(());
    };

    let cleared = session.clear().await;
    session.stop().await;
    info!(
        "Stopped playback in guild {} ({} tracks cleared)",
        session.guild_id(),
        cleared
    );

    ctx.send(embedded_messages::stopped(cleared)).await?;
    Ok(())
}

/// Remove every track from the queue, leaving the current one playing
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn clear(ctx: Context<'_>) -> CommandResult {
    let Some(session) = active_session(ctx).await? else {
        return Ok(());
    };

    let cleared = session.clear().await;
    ctx.send(embedded_messages::queue_cleared(cleared)).await?;
    refresh_panel(ctx, &session).await;
    Ok(())
}
