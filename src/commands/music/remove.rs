use super::utils::embedded_messages;
use super::{active_session, refresh_panel, send_error};
use crate::{CommandResult, Context};

/// Remove a track from the queue by its position
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Position in the queue (1 is the next track)"]
    #[min = 1]
    position: usize,
) -> CommandResult {
    let Some(session) = active_session(ctx).await? else {
        return Ok(());
    };

    match session.remove(position).await {
        Ok(track) => {
            ctx.send(embedded_messages::track_removed(&track, position))
                .await?;
            refresh_panel(ctx, &session).await;
            Ok(())
        }
        Err(err) => send_error(ctx, &err).await,
    }
}
