pub(crate) mod leave;
pub(crate) mod loop_mode;
pub(crate) mod nowplaying;
pub(crate) mod pause;
pub(crate) mod play;
pub(crate) mod queue;
pub(crate) mod remove;
pub(crate) mod skip;
pub(crate) mod stop;
pub(crate) mod volume;

pub mod utils;

use poise::serenity_prelude::GuildId;
use std::sync::Arc;
use tracing::warn;

use crate::{CommandResult, Context, Error};
use utils::embedded_messages;
use utils::music_manager::MusicError;
use utils::session::Session;

fn guild_id(ctx: Context<'_>) -> Result<GuildId, Error> {
    ctx.guild_id()
        .ok_or_else(|| Box::new(MusicError::NotInGuild) as Box<dyn std::error::Error + Send + Sync>)
}

/// Reply with the error embed for a failed music operation.
async fn send_error(ctx: Context<'_>, err: &MusicError) -> CommandResult {
    if !err.is_user_error() {
        warn!("Music command /{} failed: {}", ctx.command().name, err);
    }
    ctx.send(embedded_messages::music_error(err)).await?;
    Ok(())
}

/// The guild's live session. Replies with an error and returns `None` when
/// the bot is not connected.
async fn active_session(ctx: Context<'_>) -> Result<Option<Arc<Session>>, Error> {
    let guild_id = guild_id(ctx)?;
    match ctx.data().registry.get(guild_id) {
        Some(session) => {
            session.set_text_channel(ctx.channel_id()).await;
            Ok(Some(session))
        }
        None => {
            send_error(ctx, &MusicError::NotConnected).await?;
            Ok(None)
        }
    }
}

/// Edit the panel to match the session, logging rather than failing.
async fn refresh_panel(ctx: Context<'_>, session: &Arc<Session>) {
    if let Err(err) = ctx.data().registry.create_or_refresh_panel(session).await {
        warn!("Failed to refresh panel in guild {}: {}", session.guild_id(), err);
    }
}

/// Repost the panel under the latest reply.
async fn move_panel_down(ctx: Context<'_>, session: &Arc<Session>) {
    if let Err(err) = ctx.data().registry.refresh_panel_position(session).await {
        warn!("Failed to move panel in guild {}: {}", session.guild_id(), err);
    }
}
