//! Common test utilities, fixtures, and mocks shared by the integration tests

#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

use std::sync::{Arc, Once};
use std::time::Duration;
use tracing::Level;

use rusty_dj::music::idle_supervisor::IdleConfig;
use rusty_dj::music::music_manager::SessionRegistry;
use rusty_dj::music::panel_sync::PanelSynchronizer;
use rusty_dj::music::queue_manager::QueueLimits;

use mocks::{FakeEngine, FakePanels};

static INIT: Once = Once::new();

/// Initialize tracing once for the whole test binary
pub fn init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(10);
pub const RETIRE_DELAY: Duration = Duration::from_secs(2);

/// A registry wired to in-memory fakes, plus handles to inspect them.
pub struct Harness {
    pub engine: Arc<FakeEngine>,
    pub transport: Arc<FakePanels>,
    pub panels: Arc<PanelSynchronizer>,
    pub registry: SessionRegistry,
}

impl Harness {
    pub fn new(limits: QueueLimits, idle: IdleConfig) -> Self {
        init();
        let engine = Arc::new(FakeEngine::default());
        let transport = Arc::new(FakePanels::default());
        let panels = Arc::new(PanelSynchronizer::new(
            transport.clone(),
            REFRESH_INTERVAL,
            RETIRE_DELAY,
        ));
        let registry = SessionRegistry::new(engine.clone(), panels.clone(), limits, idle);
        Self {
            engine,
            transport,
            panels,
            registry,
        }
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new(QueueLimits::default(), IdleConfig::default())
    }
}
