//! Background timer that disconnects a session nobody is using.

use std::sync::Weak;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleConfig {
    /// How often the session is checked.
    pub poll_interval: Duration,
    /// Idle time after which the session is disconnected.
    pub inactive_timeout: Duration,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            inactive_timeout: Duration::from_secs(300),
        }
    }
}

/// Spawn the supervisor for one session. It ends when `cancel` fires, when
/// the session is dropped, or right after it disconnects the session.
///
/// Only an idle session (connected, nothing loaded, not paused) is ever
/// disconnected; a paused track keeps the session alive.
pub fn spawn(session: Weak<Session>, cancel: CancellationToken, config: IdleConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(config.poll_interval) => {}
            }

            let Some(session) = session.upgrade() else {
                break;
            };
            if session.disconnect_if_idle(config.inactive_timeout).await {
                break;
            }
        }
        debug!("Idle supervisor stopped");
    })
}
