use ::serenity::all::CreateEmbed;
use poise::CreateReply;

use crate::utils::bot_stats::format_uptime;
use crate::{CommandResult, Context};

/// Show bot statistics
#[poise::command(
    slash_command,
    prefix_command,
    category = "General",
    aliases("statistics")
)]
pub async fn stats(ctx: Context<'_>) -> CommandResult {
    let data = ctx.data();
    let guilds = ctx.serenity_context().cache.guild_count();

    let embed = CreateEmbed::new()
        .title("📊 Bot Statistics")
        .field("🏠 Servers", format!("**{}**", guilds), true)
        .field(
            "🎵 Voice Connections",
            format!("**{}**", data.registry.session_count()),
            true,
        )
        .field("⏱️ Uptime", format!("**{}**", format_uptime(data.stats.uptime())), true)
        .field(
            "💬 Commands Executed",
            format!("**{}**", data.stats.commands_executed()),
            true,
        )
        .color(0x3498db);

    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Show what the bot is and how it is configured
#[poise::command(slash_command, prefix_command, category = "General", aliases("about"))]
pub async fn info(ctx: Context<'_>) -> CommandResult {
    let config = &ctx.data().config;

    let features = [
        "🎵 **YouTube search and direct links**",
        "📋 **Queue management**",
        "🔀 **Shuffle and loop modes**",
        "🎛️ **Volume control**",
        "⏯️ **Interactive player panel**",
        "🛡️ **Auto-disconnect when idle**",
    ];
    let settings = [
        format!("**Environment:** {:?}", config.environment),
        format!("**Max Queue Size:** {}", config.max_queue_size),
        format!(
            "**Max Track Length:** {} min",
            config.max_track_duration.as_secs() / 60
        ),
        format!(
            "**Auto-disconnect:** {} min",
            config.auto_disconnect_timeout.as_secs() / 60
        ),
    ];

    let embed = CreateEmbed::new()
        .title("ℹ️ About")
        .description(format!("**{}** - a music bot for Discord", env!("CARGO_PKG_NAME")))
        .field("🔧 Version", format!("**{}**", env!("CARGO_PKG_VERSION")), true)
        .field("📚 Framework", "**poise + serenity**", true)
        .field("🎵 Music Engine", "**songbird + yt-dlp**", true)
        .field("🌐 Prefix", format!("**{}**", config.command_prefix), true)
        .field("✨ Features", features.join("\n"), false)
        .field("⚙️ Configuration", settings.join("\n"), false)
        .footer(::serenity::all::CreateEmbedFooter::new(format!(
            "Uptime: {}",
            format_uptime(ctx.data().stats.uptime())
        )))
        .color(0x9b59b6);

    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}
