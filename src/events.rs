use ::serenity::all::{
    ActivityData, ChannelId, ComponentInteraction, Context, CreateMessage, FullEvent, Interaction,
};
use std::path::Path;
use tracing::{error, info, warn};

use crate::music::{component_handlers, embedded_messages};
use crate::utils::{bot_stats, restart_marker};
use crate::{Data, Error};

/// Framework-level event hook
pub async fn event_handler(
    ctx: &Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot } => {
            info!("{} is connected", data_about_bot.user.name);
            update_presence(ctx, data);
            announce_restart(ctx, &data.config.update_marker_path).await;
        }
        FullEvent::GuildCreate {
            guild,
            is_new: Some(true),
        } => {
            info!("Joined guild {} ({})", guild.name, guild.id);
            update_presence(ctx, data);
        }
        FullEvent::GuildDelete { incomplete, .. } if !incomplete.unavailable => {
            info!("Left guild {}", incomplete.id);
            update_presence(ctx, data);
        }
        FullEvent::InteractionCreate {
            interaction: Interaction::Component(component),
        } if component.data.custom_id.starts_with("music_") => {
            music_component_interaction(ctx, component, data).await;
        }
        _ => {}
    }
    Ok(())
}

/// Handle component interactions for components with identities starting with "music_"
async fn music_component_interaction(ctx: &Context, component: &ComponentInteraction, data: &Data) {
    if let Err(e) = component_handlers::handle_interaction(ctx, component, &data.registry).await {
        error!("Error handling component interaction: {}", e);
    }
}

/// Show the help prefix and server count under the bot's name
fn update_presence(ctx: &Context, data: &Data) {
    let text = bot_stats::presence_text(&data.config.command_prefix, ctx.cache.guild_count());
    ctx.set_activity(Some(ActivityData::listening(text)));
}

/// Post the "back online" notice if the updater left a marker
async fn announce_restart(ctx: &Context, path: &Path) {
    let marker = match restart_marker::take(path).await {
        Ok(Some(marker)) => marker,
        Ok(None) => return,
        Err(e) => {
            error!("Error reading restart marker: {}", e);
            return;
        }
    };
    let Some(channel_id) = marker.channel_id() else {
        warn!("Restart marker does not name a channel");
        return;
    };

    let embed = embedded_messages::back_online(
        &marker.old_version,
        &marker.new_version,
        &marker.mode_title(),
    );
    if let Err(e) = ChannelId::new(channel_id)
        .send_message(&ctx.http, CreateMessage::new().embed(embed))
        .await
    {
        error!("Error sending update completion message: {}", e);
    }
}
