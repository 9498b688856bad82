use ::serenity::all::{CreateEmbed, ShardId};
use poise::CreateReply;
use std::time::Duration;

use crate::{CommandResult, Context};

/// Ping the bot to check its latency
#[poise::command(slash_command, prefix_command, category = "General")]
pub async fn ping(ctx: Context<'_>) -> CommandResult {
    let latency = get_shard_latency(&ctx)
        .await
        .unwrap_or_default()
        .as_millis();
    let sessions = ctx.data().registry.session_count();

    let embed = CreateEmbed::new()
        .title("🏓 Pong!")
        .field("API Latency", format!("{} ms", latency), true)
        .field("Music Sessions", sessions.to_string(), true)
        .color(0x00ff00);

    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}

async fn get_shard_latency(ctx: &Context<'_>) -> Option<Duration> {
    let shard_manager = ctx.framework().shard_manager().clone();
    let runners = shard_manager.runners.lock().await;

    // Latency of the shard this command arrived on
    let runner = runners.get(&ShardId(ctx.serenity_context().shard_id.0))?;
    runner.latency
}
