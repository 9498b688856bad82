use super::utils::embedded_messages;
use super::utils::music_manager::MusicError;
use super::{active_session, send_error};
use crate::{CommandResult, Context};

/// Skip the currently playing song
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn skip(ctx: Context<'_>) -> CommandResult {
    let Some(session) = active_session(ctx).await? else {
        return Ok(());
    };

    let Some(skipped) = session.now_playing().await else {
        return send_error(ctx, &MusicError::NothingPlaying).await;
    };
    // The panel follows the session's own transition.
    let next = match session.skip().await {
        Ok(next) => next,
        Err(err) => return send_error(ctx, &err).await,
    };

    ctx.send(embedded_messages::skipped(&skipped, next.as_ref()))
        .await?;
    Ok(())
}
