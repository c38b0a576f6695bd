//! Common test utilities, fixtures, and fakes shared by the integration tests.
#![allow(dead_code)]

pub mod fakes;
pub mod fixtures;

use std::sync::Once;
use tracing::Level;

static INIT: Once = Once::new();

/// Initialize tracing for tests
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// Lets spawned watcher and announcement tasks run to completion.
pub async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}
