use serenity::all::{ComponentInteraction, Context, CreateInteractionResponseFollowup};
use std::sync::Arc;
use tracing::{debug, error, info};

use super::button_controls::MusicButton;
use super::embedded_messages;
use super::music_manager::{MusicError, SessionRegistry};
use super::session::Session;

type ButtonInteractionResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Handle a panel button press
pub async fn handle_interaction(
    ctx: &Context,
    interaction: &ComponentInteraction,
    registry: &SessionRegistry,
) -> ButtonInteractionResult {
    let Some(button) = MusicButton::from_custom_id(&interaction.data.custom_id) else {
        error!("Unknown button ID: {}", interaction.data.custom_id);
        return Ok(());
    };
    let guild_id = interaction.guild_id.ok_or(MusicError::NotInGuild)?;

    // Acknowledge right away; the panel itself is edited through the synchronizer.
    interaction.defer(ctx).await?;

    let Some(session) = registry.get(guild_id) else {
        return error_followup(ctx, interaction, &MusicError::NotConnected).await;
    };
    session.set_text_channel(interaction.channel_id).await;

    debug!(
        "Button {:?} pressed by {} in guild {}",
        button, interaction.user.name, guild_id
    );

    let outcome = match button {
        MusicButton::PlayPause => handle_play_pause(&session).await,
        MusicButton::Skip => session.skip().await.map(|_| ()),
        MusicButton::Stop => {
            handle_stop(&session).await;
            Ok(())
        }
        MusicButton::Shuffle => session.shuffle().await.map(|_| ()),
        MusicButton::Loop => {
            let mode = session.cycle_loop_mode().await;
            info!("Loop mode set to {} in guild {}", mode.label(), guild_id);
            Ok(())
        }
        MusicButton::Queue => return queue_followup(ctx, interaction, &session).await,
    };

    if let Err(err) = outcome {
        return error_followup(ctx, interaction, &err).await;
    }

    // Skip and stop update the panel through the session's own transition.
    if matches!(
        button,
        MusicButton::PlayPause | MusicButton::Shuffle | MusicButton::Loop
    ) {
        registry.create_or_refresh_panel(&session).await?;
    }
    Ok(())
}

async fn handle_play_pause(session: &Arc<Session>) -> Result<(), MusicError> {
    let paused = session.toggle_pause().await?;
    debug!(
        "Playback {} in guild {}",
        if paused { "paused" } else { "resumed" },
        session.guild_id()
    );
    Ok(())
}

async fn handle_stop(session: &Arc<Session>) {
    let cleared = session.clear().await;
    session.stop().await;
    info!(
        "Stopped playback from the panel in guild {} ({} tracks cleared)",
        session.guild_id(),
        cleared
    );
}

async fn queue_followup(
    ctx: &Context,
    interaction: &ComponentInteraction,
    session: &Session,
) -> ButtonInteractionResult {
    let snapshot = session.snapshot().await;
    interaction
        .create_followup(
            &ctx.http,
            CreateInteractionResponseFollowup::new()
                .embed(embedded_messages::music_queue(&snapshot))
                .ephemeral(true),
        )
        .await?;
    Ok(())
}

/// Send an ephemeral error message as a followup to a deferred interaction
async fn error_followup(
    ctx: &Context,
    interaction: &ComponentInteraction,
    err: &MusicError,
) -> ButtonInteractionResult {
    let reply = embedded_messages::music_error(err);
    interaction
        .create_followup(
            &ctx.http,
            CreateInteractionResponseFollowup::new()
                .embeds(reply.embeds)
                .ephemeral(true),
        )
        .await?;
    Ok(())
}
