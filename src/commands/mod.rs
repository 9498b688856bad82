//! This module aggregates all the command modules for the bot.

/// General purpose commands (e.g., ping).
pub(crate) mod general;
/// Commands and playback machinery for music.
pub mod music;
