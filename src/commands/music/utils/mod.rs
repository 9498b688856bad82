// Export music utilities
pub mod audio_sources;
pub mod button_controls;
pub mod component_handlers;
pub mod embedded_messages;
pub mod engine;
pub mod event_handlers;
pub mod formatting;
pub mod idle_supervisor;
pub mod music_manager;
pub mod panel_sync;
pub mod panel_view;
pub mod queue_manager;
pub mod session;
pub mod songbird_engine;
pub mod track;
