use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Single-shot delayed task that disconnects an idle player.
///
/// Each timer carries an id; the player only honours the firing of the timer
/// it currently has armed, so a superseded timer that already woke up is a no-op.
#[derive(Debug)]
pub struct IdleTimer {
    id: u64,
    handle: JoinHandle<()>,
}

impl IdleTimer {
    pub fn arm<F>(id: u64, delay: Duration, on_fire: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire.await;
        });
        Self { id, handle }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(self) {
        self.handle.abort();
    }
}
