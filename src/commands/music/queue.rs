use poise::CreateReply;

use super::utils::embedded_messages;
use super::{active_session, move_panel_down, refresh_panel, send_error};
use crate::{CommandResult, Context};

/// Show the upcoming tracks
#[poise::command(slash_command, prefix_command, category = "Music", aliases("q"))]
pub async fn queue(ctx: Context<'_>) -> CommandResult {
    let Some(session) = active_session(ctx).await? else {
        return Ok(());
    };

    let snapshot = session.snapshot().await;
    ctx.send(CreateReply::default().embed(embedded_messages::music_queue(&snapshot)))
        .await?;

    // Keep the panel below the queue listing
    move_panel_down(ctx, &session).await;
    Ok(())
}

/// Shuffle the queue
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn shuffle(ctx: Context<'_>) -> CommandResult {
    let Some(session) = active_session(ctx).await? else {
        return Ok(());
    };

    match session.shuffle().await {
        Ok(count) => {
            ctx.send(embedded_messages::shuffled(count)).await?;
            refresh_panel(ctx, &session).await;
            Ok(())
        }
        Err(err) => send_error(ctx, &err).await,
    }
}
