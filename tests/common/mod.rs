// Common test utilities for integration tests
// This module contains shared code for all integration tests
#![allow(dead_code)]

use std::sync::Once;

use log::LevelFilter;
use tokio::time::{Duration, Instant};

use chatmock::{models::Message, ChatApp, Features};

// Initialize logging once
static INIT_LOGGER: Once = Once::new();

/// Set up the logger for the tests
pub fn setup_logging() {
    INIT_LOGGER.call_once(|| {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .init();
    });
}

/// A client with every feature switched on, the seeded roster and thread
pub fn setup_app() -> ChatApp {
    setup_logging();
    ChatApp::new(Features::default())
}

pub fn setup_app_with(features: Features) -> ChatApp {
    setup_logging();
    ChatApp::new(features)
}

/// `secs` seconds after `start`
pub fn after(start: Instant, secs: u64) -> Instant {
    start + Duration::from_secs(secs)
}

pub fn last_message(app: &ChatApp) -> &Message {
    app.conversation()
        .messages()
        .last()
        .expect("thread is never empty")
}

pub fn message_ids(app: &ChatApp) -> Vec<u32> {
    app.conversation().messages().iter().map(|m| m.id).collect()
}
