use super::{SseDecoder, StreamError};
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::header::ACCEPT;

/// Decoded event payloads of one open channel, in arrival order.
pub type FeedStream = BoxStream<'static, Result<String, StreamError>>;

/// Opens a channel to the live sample feed, optionally filtered by device.
pub trait FeedConnector: Send + Sync + 'static {
    fn open(&self, device_id: Option<&str>) -> BoxFuture<'static, Result<FeedStream, StreamError>>;
}

/// Server-sent events over HTTP: `GET {api}/ecgstream/stream[?device_id=..]`.
#[derive(Debug, Clone)]
pub struct HttpFeedConnector {
    client: reqwest::Client,
    url: String,
}

impl HttpFeedConnector {
    pub fn new(api_base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), api_base_url)
    }

    pub fn with_client(client: reqwest::Client, api_base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}/ecgstream/stream", api_base_url.trim_end_matches('/')),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl FeedConnector for HttpFeedConnector {
    fn open(&self, device_id: Option<&str>) -> BoxFuture<'static, Result<FeedStream, StreamError>> {
        let mut request = self
            .client
            .get(&self.url)
            .header(ACCEPT, "text/event-stream");
        if let Some(device_id) = device_id {
            request = request.query(&[("device_id", device_id)]);
        }

        async move {
            let response = request
                .send()
                .await
                .map_err(|err| StreamError::Transport(err.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                return Err(StreamError::Status(status.as_u16()));
            }

            let mut decoder = SseDecoder::new();
            let messages = response.bytes_stream().flat_map(move |chunk| {
                let items: Vec<Result<String, StreamError>> = match chunk {
                    Ok(bytes) => decoder.feed(&bytes).into_iter().map(Ok).collect(),
                    Err(err) => vec![Err(StreamError::Transport(err.to_string()))],
                };
                stream::iter(items)
            });
            Ok(messages.boxed())
        }
        .boxed()
    }
}
