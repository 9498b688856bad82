use poise::CreateReply;

use super::utils::embedded_messages;
use super::{active_session, move_panel_down, send_error};
use crate::{CommandResult, Context};

/// Show or set the playback volume
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn volume(
    ctx: Context<'_>,
    #[description = "New volume, 0 to 100"] volume: Option<i32>,
) -> CommandResult {
    let Some(session) = active_session(ctx).await? else {
        return Ok(());
    };

    let embed = match volume {
        Some(volume) => match session.set_volume(volume).await {
            Ok(volume) => embedded_messages::volume(volume, true),
            Err(err) => return send_error(ctx, &err).await,
        },
        None => embedded_messages::volume(session.snapshot().await.volume, false),
    };

    ctx.send(CreateReply::default().embed(embed)).await?;
    move_panel_down(ctx, &session).await;
    Ok(())
}
