use ::serenity::all::ClientBuilder;
use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use songbird::SerenityInit;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rusty_dj::config::Config;
use rusty_dj::music::music_manager::{MusicError, SessionRegistry};
use rusty_dj::music::panel_sync::{PanelSynchronizer, SerenityPanels};
use rusty_dj::music::songbird_engine::SongbirdEngine;
use rusty_dj::utils::bot_stats::{BotStats, spawn_stats_logger};
use rusty_dj::{Data, Error, events};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize logging with debug level for our crate
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rusty_dj=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    dotenv().ok();

    let config = Arc::new(Config::from_env().expect("Invalid configuration"));
    info!(
        "Starting in {:?} mode with prefix {}",
        config.environment, config.command_prefix
    );

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    let token = config.discord_token.clone();
    let prefix = config.command_prefix.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: rusty_dj::commands(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(prefix),
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::event_handler(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            pre_command: |ctx| {
                Box::pin(async move {
                    let executed = ctx.data().stats.record_command();
                    info!(
                        "Command {} by {} (#{})",
                        ctx.command().qualified_name,
                        ctx.author().name,
                        executed
                    );
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                let manager = songbird::get(ctx).await.ok_or(MusicError::NoVoiceManager)?;
                let (engine, engine_events) = SongbirdEngine::new(manager, reqwest::Client::new());

                let panels = Arc::new(PanelSynchronizer::new(
                    Arc::new(SerenityPanels::new(ctx.http.clone())),
                    config.panel_refresh_interval,
                    config.panel_retire_delay,
                ));
                let registry = Arc::new(SessionRegistry::new(
                    Arc::new(engine),
                    panels,
                    config.queue_limits(),
                    config.idle_config(),
                ));
                registry.spawn_event_router(engine_events);

                let stats = Arc::new(BotStats::default());
                spawn_stats_logger(ctx.cache.clone(), Arc::clone(&registry), Arc::clone(&stats));

                // Leave voice and clear panels before the shards go down
                let shutdown_registry = Arc::clone(&registry);
                let shard_manager = framework.shard_manager().clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        let closed = shutdown_registry.disconnect_all().await;
                        info!("Shutting down, closed {} music sessions", closed);
                        shard_manager.shutdown_all().await;
                    }
                });

                Ok(Data {
                    registry,
                    config,
                    stats,
                })
            })
        });

    let client_builder = ClientBuilder::new(token, intents).framework(framework.build());

    // Create and run client
    let mut client = client_builder.register_songbird().await?;
    client.start().await.map_err(Into::into)
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to set up the bot: {}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {}", ctx.command().name, error);
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}
