//! Collaborator APIs consumed by the recording and playback flows.

pub mod http;

pub use http::HttpBackend;

use crate::model::{ActivePatient, NewReading, SaveAck, SessionStatus, StoredReading};
use futures::future::BoxFuture;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with HTTP {status}")]
    Status { status: u16, detail: Option<String> },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    /// Most specific server-provided message, if there is one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status {
                detail: Some(detail),
                ..
            } => Some(detail),
            ApiError::NotFound(message) => Some(message),
            _ => None,
        }
    }

    /// Server detail verbatim when present, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Backend operations the core depends on. Futures are `'static` so hosts can
/// run them on any executor.
pub trait EcgBackend: Send + Sync + 'static {
    fn active_patients(&self) -> BoxFuture<'static, ApiResult<Vec<ActivePatient>>>;

    fn update_session_status(
        &self,
        session_id: u64,
        status: SessionStatus,
    ) -> BoxFuture<'static, ApiResult<()>>;

    fn create_reading(&self, reading: NewReading) -> BoxFuture<'static, ApiResult<SaveAck>>;

    fn reading(&self, id: u64) -> BoxFuture<'static, ApiResult<StoredReading>>;

    fn readings(&self) -> BoxFuture<'static, ApiResult<Vec<StoredReading>>>;
}
