//! Live sample feed: server-sent event decoding, transport and the
//! reconnecting client that fans blocks out to subscribers.

pub mod client;
pub mod connector;
pub mod sse;

pub use client::StreamClient;
pub use connector::{FeedConnector, FeedStream, HttpFeedConnector};
pub use sse::SseDecoder;

/// Failure of the live feed channel. Every variant triggers a reconnect.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("feed rejected with HTTP {0}")]
    Status(u16),
    #[error("feed closed by server")]
    Closed,
}
