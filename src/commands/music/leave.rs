use super::utils::embedded_messages;
use super::utils::music_manager::MusicError;
use super::{guild_id, send_error};
use crate::{CommandResult, Context};

/// Leave the voice channel and clear the queue
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn leave(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(ctx)?;

    if !ctx.data().registry.disconnect(guild_id).await {
        return send_error(ctx, &MusicError::NotConnected).await;
    }

    ctx.send(embedded_messages::left_voice_channel()).await?;
    Ok(())
}
