use super::utils::embedded_messages;
use super::utils::session::LoopMode;
use super::{active_session, refresh_panel};
use crate::{CommandResult, Context};

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum LoopChoice {
    #[name = "off"]
    Off,
    #[name = "track"]
    Track,
    #[name = "queue"]
    Queue,
}

impl From<LoopChoice> for LoopMode {
    fn from(choice: LoopChoice) -> Self {
        match choice {
            LoopChoice::Off => LoopMode::Off,
            LoopChoice::Track => LoopMode::Track,
            LoopChoice::Queue => LoopMode::Queue,
        }
    }
}

/// Set the loop mode, or step to the next one
#[poise::command(slash_command, prefix_command, rename = "loop", category = "Music")]
pub async fn loop_mode(
    ctx: Context<'_>,
    #[description = "off, track or queue"] mode: Option<LoopChoice>,
) -> CommandResult {
    let Some(session) = active_session(ctx).await? else {
        return Ok(());
    };

    let mode = match mode {
        Some(choice) => {
            let mode = LoopMode::from(choice);
            session.set_loop_mode(mode).await;
            mode
        }
        None => session.cycle_loop_mode().await,
    };

    ctx.send(embedded_messages::loop_mode(mode)).await?;
    refresh_panel(ctx, &session).await;
    Ok(())
}
