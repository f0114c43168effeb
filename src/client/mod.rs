//! External call client.
//!
//! This module provides:
//!
//! - **Types**: call config, request, classified result
//! - **Transport**: the one-request network seam and its HTTP implementation
//! - **Retry**: timeout, exponential backoff, and cancellation around a transport
//!
//! The client never returns an error: every failure path is a
//! [`CallResult::Failure`] with a [`FailureKind`].

mod cancel;
mod http;
mod retry;
mod transport;
mod types;

#[cfg(test)]
pub(crate) mod mock;
#[cfg(test)]
pub(crate) mod test_server;

pub use cancel::{CancelHandle, CancelToken};
pub use http::HttpTransport;
pub use retry::{CallClient, backoff_delay};
pub use transport::{Transport, TransportError, classify_status};
pub use types::{
    CallConfig, CallRequest, CallResult, DEFAULT_BACKOFF_BASE, DEFAULT_MAX_RETRIES,
    DEFAULT_TIMEOUT, FailureKind, MAX_BACKOFF,
};
