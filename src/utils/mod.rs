//! This module aggregates various utility submodules used throughout the application.

/// Reading the marker file the updater leaves behind before a restart.
pub mod restart_marker;

/// Uptime, command counter and presence text.
pub mod bot_stats;
