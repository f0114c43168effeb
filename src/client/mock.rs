//! Scripted transport for tests.

use super::transport::{Transport, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Clone)]
pub(crate) enum MockReply {
    Text(String),
    Error(TransportError),
    /// Never completes.
    Hang,
}

/// Replays a script of replies; the last one repeats once the script runs out.
pub(crate) struct MockTransport {
    replies: Mutex<VecDeque<MockReply>>,
    calls: AtomicU32,
}

impl MockTransport {
    pub(crate) fn new(replies: impl IntoIterator<Item = MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn text(text: &str) -> Self {
        Self::new([MockReply::Text(text.to_string())])
    }

    pub(crate) fn always(error: TransportError) -> Self {
        Self::new([MockReply::Error(error)])
    }

    pub(crate) fn hanging() -> Self {
        Self::new([MockReply::Hang])
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> MockReply {
        let mut replies = self.replies.lock().unwrap();
        if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies
                .front()
                .cloned()
                .unwrap_or(MockReply::Error(TransportError::Other("script empty".into())))
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, _prompt: &str) -> Result<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next_reply() {
            MockReply::Text(text) => Ok(text),
            MockReply::Error(err) => Err(err),
            MockReply::Hang => std::future::pending().await,
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
