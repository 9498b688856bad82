use std::sync::Arc;

pub mod commands;
pub mod config;
pub mod events;
pub mod utils;

pub use commands::music::utils as music;

use commands::general::{info::*, ping::*};
use commands::music::{
    leave::*, loop_mode::*, nowplaying::*, pause::*, play::*, queue::*, remove::*, skip::*,
    stop::*, volume::*,
};
use config::Config;
use music::music_manager::SessionRegistry;
use utils::bot_stats::BotStats;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// User data, which is stored and accessible in all command invocations
pub struct Data {
    pub registry: Arc<SessionRegistry>,
    pub config: Arc<Config>,
    pub stats: Arc<BotStats>,
}

#[poise::command(slash_command, prefix_command, category = "General")]
async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> CommandResult {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            show_context_menu_commands: true,
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.into())
}

#[poise::command(prefix_command, hide_in_help)]
async fn register(ctx: Context<'_>) -> Result<(), Error> {
    poise::builtins::register_application_commands_buttons(ctx)
        .await
        .map_err(|e| e.into())
}

/// Every command the bot registers.
pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        // Default commands
        register(),
        help(),
        // General commands
        ping(),
        stats(),
        info(),
        // Music commands
        play(),
        pause(),
        resume(),
        skip(),
        stop(),
        clear(),
        shuffle(),
        volume(),
        loop_mode(),
        queue(),
        nowplaying(),
        panel(),
        remove(),
        leave(),
    ]
}
