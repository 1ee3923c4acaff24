//! Work queue handing each request token to exactly one worker.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::sync::{mpsc, Mutex};

/// One request to send. Carries nothing but its position in the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(usize);

impl RequestToken {
    #[inline]
    #[must_use]
    pub fn new(sequence: usize) -> Self {
        Self(sequence)
    }

    #[inline]
    #[must_use]
    pub fn sequence(&self) -> usize {
        self.0
    }
}

/// Most tokens buffered at once. Past this, `enqueue` waits for workers to catch up.
pub const MAX_QUEUE_DEPTH: usize = 1024;

/// Creates a queue buffering up to `capacity` tokens, bounded to
/// `1..=MAX_QUEUE_DEPTH` since the channel needs room for at least one token.
#[must_use]
pub fn work_queue(capacity: usize) -> (WorkSender, WorkReceiver) {
    let (tx, rx) = mpsc::channel(capacity.clamp(1, MAX_QUEUE_DEPTH));
    (
        WorkSender { tx },
        WorkReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

pub struct WorkSender {
    tx: mpsc::Sender<RequestToken>,
}

impl WorkSender {
    /// Waits for room if the queue is full.
    pub async fn enqueue(&self, token: RequestToken) -> Result<()> {
        self.tx
            .send(token)
            .await
            .map_err(|_| anyhow!("Work queue has no consumers left"))
    }

    /// Once the tokens already enqueued are drained, every dequeue observes exhaustion.
    pub fn close(self) {
        drop(self.tx);
    }
}

/// Consumer side, cloned once per worker.
#[derive(Clone)]
pub struct WorkReceiver {
    rx: Arc<Mutex<mpsc::Receiver<RequestToken>>>,
}

impl WorkReceiver {
    /// `None` once the queue is closed and empty.
    pub async fn dequeue(&self) -> Option<RequestToken> {
        self.rx.lock().await.recv().await
    }
}
