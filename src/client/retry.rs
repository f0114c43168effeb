//! Retry, timeout, and cancellation policy around a [`Transport`].
//!
//! One invocation moves through `Pending -> (Retrying)* -> {Succeeded, Failed}`.
//! Only timeouts and transient failures are retried, and only while attempts
//! remain. Every path ends in exactly one [`CallResult`].

use super::cancel::CancelToken;
use super::transport::Transport;
use super::types::{CallRequest, CallResult, FailureKind, MAX_BACKOFF};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallState {
    Pending,
    Retrying { attempt: u32 },
    Succeeded,
    Failed,
}

/// Delay before retry number `retry` (1-based): `base * 2^(retry - 1)`,
/// capped at [`MAX_BACKOFF`].
pub fn backoff_delay(base: Duration, retry: u32) -> Duration {
    let factor = 1u32
        .checked_shl(retry.saturating_sub(1))
        .unwrap_or(u32::MAX);
    base.saturating_mul(factor).min(MAX_BACKOFF)
}

/// Sends resolved prompts through a transport with retry and timeout handling.
pub struct CallClient<T: Transport> {
    transport: T,
}

impl<T: Transport> CallClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send the request, retrying transient failures.
    ///
    /// Makes at most `max_retries + 1` calls. Each call is bounded by the
    /// configured timeout; cancellation interrupts both in-flight calls and
    /// backoff sleeps.
    pub async fn invoke(&self, request: &CallRequest, cancel: &CancelToken) -> CallResult {
        let config = request.config();
        let mut state = CallState::Pending;
        let mut attempts = 0u32;

        loop {
            if cancel.is_cancelled() {
                return CallResult::cancelled("cancelled before the request was sent", attempts);
            }

            attempts += 1;
            debug!(transport = self.transport.name(), attempt = attempts, ?state, "sending request");
            let started = Instant::now();

            let sent = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(attempt = attempts, "call cancelled while in flight");
                    return CallResult::cancelled("cancelled while the request was in flight", attempts);
                }
                sent = tokio::time::timeout(config.timeout, self.transport.send(request.prompt())) => sent,
            };

            let (kind, message) = match sent {
                Ok(Ok(response_text)) => {
                    state = CallState::Succeeded;
                    let latency = started.elapsed();
                    debug!(attempt = attempts, ?state, latency_ms = latency.as_millis() as u64, "call succeeded");
                    return CallResult::Success {
                        response_text,
                        latency,
                        attempts,
                    };
                }
                Ok(Err(err)) => (err.kind(), err.to_string()),
                Err(_) => (
                    FailureKind::Timeout,
                    format!("no response within {} ms", config.timeout.as_millis()),
                ),
            };

            if !kind.is_retryable() || attempts > config.max_retries {
                state = CallState::Failed;
                warn!(attempt = attempts, %kind, ?state, "call failed: {}", message);
                return CallResult::Failure {
                    kind,
                    message,
                    attempts,
                };
            }

            state = CallState::Retrying { attempt: attempts };
            let delay = backoff_delay(config.backoff_base, attempts);
            warn!(
                attempt = attempts,
                %kind,
                delay_ms = delay.as_millis() as u64,
                "transient failure, retrying: {}",
                message
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(attempt = attempts, "call cancelled during backoff");
                    return CallResult::cancelled("cancelled while waiting to retry", attempts);
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::cancel::CancelHandle;
    use crate::client::mock::{MockReply, MockTransport};
    use crate::client::transport::TransportError;
    use crate::client::types::CallConfig;
    use crate::prompt::{BuildContext, resolve};

    fn request(max_retries: u32) -> CallRequest {
        let prompt = resolve("Say hi to {{who}}", &BuildContext::from_pairs([("who", "Sam")])).unwrap();
        CallRequest::new(
            prompt,
            CallConfig::new("http://stub/generate")
                .with_timeout(Duration::from_secs(5))
                .with_max_retries(max_retries)
                .with_backoff_base(Duration::from_millis(100)),
        )
    }

    fn unavailable() -> TransportError {
        TransportError::Status {
            code: 503,
            body: "unavailable".to_string(),
        }
    }

    #[test]
    fn test_backoff_delay_doubles() {
        let base = Duration::from_millis(500);
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(500));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(1000));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(2000));
    }

    #[test]
    fn test_backoff_delay_is_capped() {
        let base = Duration::from_millis(500);
        assert_eq!(backoff_delay(base, 10), MAX_BACKOFF);
        assert_eq!(backoff_delay(base, 40), MAX_BACKOFF);
        assert_eq!(backoff_delay(Duration::from_secs(u64::MAX), 1), MAX_BACKOFF);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let client = CallClient::new(MockTransport::text("hi"));

        let result = client.invoke(&request(2), &CancelToken::never()).await;

        match result {
            CallResult::Success {
                response_text,
                attempts,
                ..
            } => {
                assert_eq!(response_text, "hi");
                assert_eq!(attempts, 1);
            }
            other => panic!("expected success, got {:?}", other),
        }
        assert_eq!(client.transport().calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_bound_on_transient_failure() {
        let client = CallClient::new(MockTransport::always(unavailable()));

        let result = client.invoke(&request(2), &CancelToken::never()).await;

        assert_eq!(client.transport().calls(), 3);
        match result {
            CallResult::Failure { kind, attempts, .. } => {
                assert_eq!(kind, FailureKind::Transient);
                assert_eq!(attempts, 3);
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_calls_once() {
        let client = CallClient::new(MockTransport::always(unavailable()));

        let result = client.invoke(&request(0), &CancelToken::never()).await;

        assert_eq!(client.transport().calls(), 1);
        assert_eq!(result.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejection_is_not_retried() {
        let client = CallClient::new(MockTransport::always(TransportError::Status {
            code: 401,
            body: "bad credentials".to_string(),
        }));

        let result = client.invoke(&request(5), &CancelToken::never()).await;

        assert_eq!(client.transport().calls(), 1);
        assert_eq!(result.failure_kind(), Some(FailureKind::Rejected));
        assert_eq!(result.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_failure_is_not_retried() {
        let client = CallClient::new(MockTransport::always(TransportError::InvalidResponse(
            "not json".to_string(),
        )));

        let result = client.invoke(&request(5), &CancelToken::never()).await;

        assert_eq!(client.transport().calls(), 1);
        match result {
            CallResult::Failure { kind, message, .. } => {
                assert_eq!(kind, FailureKind::Unknown);
                assert_eq!(message, "invalid response: not json");
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let client = CallClient::new(MockTransport::new([
            MockReply::Error(unavailable()),
            MockReply::Error(TransportError::Connection("reset".to_string())),
            MockReply::Text("finally".to_string()),
        ]));

        let result = client.invoke(&request(2), &CancelToken::never()).await;

        assert_eq!(client.transport().calls(), 3);
        assert!(result.is_success());
        assert_eq!(result.attempts(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_waits_between_attempts() {
        let client = CallClient::new(MockTransport::always(unavailable()));
        let start = tokio::time::Instant::now();

        client.invoke(&request(2), &CancelToken::never()).await;

        // 100ms before the first retry, 200ms before the second.
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_enforced() {
        let client = CallClient::new(MockTransport::hanging());
        let req = CallRequest::new(
            resolve("ping", &BuildContext::new()).unwrap(),
            CallConfig::new("http://stub/generate")
                .with_timeout(Duration::from_millis(250))
                .with_max_retries(0),
        );
        let start = tokio::time::Instant::now();

        let result = client.invoke(&req, &CancelToken::never()).await;

        assert_eq!(result.failure_kind(), Some(FailureKind::Timeout));
        assert_eq!(result.attempts(), 1);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(250));
        assert!(elapsed < Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_are_retried() {
        let client = CallClient::new(MockTransport::new([
            MockReply::Hang,
            MockReply::Text("second time lucky".to_string()),
        ]));

        let result = client.invoke(&request(1), &CancelToken::never()).await;

        assert!(result.is_success());
        assert_eq!(client.transport().calls(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_makes_no_calls() {
        let client = CallClient::new(MockTransport::text("hi"));
        let handle = CancelHandle::new();
        handle.cancel();

        let result = client.invoke(&request(2), &handle.token()).await;

        assert_eq!(client.transport().calls(), 0);
        assert_eq!(result.failure_kind(), Some(FailureKind::Cancelled));
        assert_eq!(result.attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_in_flight_call() {
        let client = CallClient::new(MockTransport::hanging());
        let handle = CancelHandle::new();
        let token = handle.token();

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            handle.cancel();
        });
        let result = client.invoke(&request(2), &token).await;
        canceller.await.unwrap();

        assert_eq!(result.failure_kind(), Some(FailureKind::Cancelled));
        assert_eq!(result.attempts(), 1);
        assert_eq!(client.transport().calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff_stops_retries() {
        let client = CallClient::new(MockTransport::always(unavailable()));
        let cfg = CallConfig::new("http://stub/generate")
            .with_max_retries(5)
            .with_backoff_base(Duration::from_secs(10));
        let req = CallRequest::new(resolve("ping", &BuildContext::new()).unwrap(), cfg);
        let handle = CancelHandle::new();
        let token = handle.token();

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            handle.cancel();
        });
        let result = client.invoke(&req, &token).await;
        canceller.await.unwrap();

        assert_eq!(client.transport().calls(), 1);
        match result {
            CallResult::Failure {
                kind,
                message,
                attempts,
            } => {
                assert_eq!(kind, FailureKind::Cancelled);
                assert_eq!(attempts, 1);
                assert!(message.contains("waiting to retry"));
            }
            other => panic!("expected cancellation, got {:?}", other),
        }
    }
}
