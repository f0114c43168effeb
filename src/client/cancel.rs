//! Cancellation of an in-progress invocation.
//!
//! The host holds a [`CancelHandle`]; the call client watches the matching
//! [`CancelToken`]. Cancelling interrupts an in-flight request or a pending
//! backoff sleep.

use tokio::sync::watch;

/// Host-side handle that cancels every token created from it.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// Observer side of a [`CancelHandle`].
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the token is cancelled.
    ///
    /// If the handle is dropped without cancelling, this never resolves.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}
