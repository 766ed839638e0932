use super::{FeedConnector, StreamError};
use crate::config::ReconnectPolicy;
use crate::model::SampleBlock;
use crate::telemetry::{LogManager, MetricsRecorder, StreamMetrics};
use futures::stream::{self, Stream, StreamExt};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const BLOCK_BUFFER: usize = 256;

/// Owns at most one live feed channel and re-broadcasts its blocks.
///
/// `connect` always tears the previous channel down first, and `disconnect`
/// cancels both the channel and any pending reconnect before returning, so
/// no background work outlives either call.
pub struct StreamClient<C: FeedConnector> {
    connector: Arc<C>,
    policy: ReconnectPolicy,
    runtime: Handle,
    sender: broadcast::Sender<SampleBlock>,
    metrics: Arc<MetricsRecorder>,
    active: Option<ActiveFeed>,
}

struct ActiveFeed {
    device_id: Option<String>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl<C: FeedConnector> StreamClient<C> {
    pub fn new(connector: Arc<C>, policy: ReconnectPolicy, runtime: Handle) -> Self {
        let (sender, _) = broadcast::channel(BLOCK_BUFFER);
        Self {
            connector,
            policy,
            runtime,
            sender,
            metrics: Arc::new(MetricsRecorder::new()),
            active: None,
        }
    }

    pub fn connect(&mut self, device_id: Option<String>) {
        self.disconnect();

        let cancel = CancellationToken::new();
        let handle = self.runtime.spawn(feed_loop(
            self.connector.clone(),
            device_id.clone(),
            self.policy.clone(),
            self.sender.clone(),
            self.metrics.clone(),
            cancel.clone(),
        ));
        LogManager::new("stream").record(&format!(
            "connecting to live feed (device {})",
            device_id.as_deref().unwrap_or("any")
        ));
        self.active = Some(ActiveFeed {
            device_id,
            cancel,
            handle,
        });
    }

    pub fn disconnect(&mut self) {
        if let Some(feed) = self.active.take() {
            feed.cancel.cancel();
            feed.handle.abort();
            LogManager::new("stream").record("live feed disconnected");
        }
    }

    /// True while a channel is open or a reconnect is pending.
    pub fn is_connected(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|feed| !feed.handle.is_finished())
    }

    pub fn device_id(&self) -> Option<&str> {
        self.active.as_ref().and_then(|feed| feed.device_id.as_deref())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SampleBlock> {
        self.sender.subscribe()
    }

    /// Blocks as a stream; a slow consumer skips ahead instead of stalling the feed.
    pub fn blocks(&self) -> impl Stream<Item = SampleBlock> + Send + 'static {
        stream::unfold(self.sender.subscribe(), |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(block) => return Some((block, receiver)),
                    Err(RecvError::Lagged(skipped)) => {
                        LogManager::new("stream")
                            .warn(&format!("consumer lagged, skipped {skipped} blocks"));
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        })
    }

    pub fn metrics(&self) -> StreamMetrics {
        self.metrics.snapshot()
    }
}

impl<C: FeedConnector> Drop for StreamClient<C> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

async fn feed_loop<C: FeedConnector>(
    connector: Arc<C>,
    device_id: Option<String>,
    policy: ReconnectPolicy,
    sender: broadcast::Sender<SampleBlock>,
    metrics: Arc<MetricsRecorder>,
    cancel: CancellationToken,
) {
    let logger = LogManager::new("stream");
    let mut failures: u32 = 0;

    loop {
        let (delivered, error) = tokio::select! {
            _ = cancel.cancelled() => return,
            outcome = pump(connector.as_ref(), device_id.as_deref(), &sender, &metrics, &logger) => outcome,
        };

        match error {
            Some(err) => logger.error(&format!("live feed failed: {err}")),
            None => logger.warn(&format!("live feed ended: {}", StreamError::Closed)),
        }
        failures = if delivered > 0 { 1 } else { failures + 1 };
        if let Some(max_attempts) = policy.max_attempts {
            if failures > max_attempts {
                logger.error(&format!(
                    "giving up after {max_attempts} reconnect attempts"
                ));
                return;
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(policy.delay()) => {}
        }
        metrics.record_reconnect();
        logger.record("reconnecting to live feed");
    }
}

/// Runs one channel until it fails or closes; returns blocks delivered and the failure.
async fn pump<C: FeedConnector>(
    connector: &C,
    device_id: Option<&str>,
    sender: &broadcast::Sender<SampleBlock>,
    metrics: &MetricsRecorder,
    logger: &LogManager,
) -> (usize, Option<StreamError>) {
    let mut feed = match connector.open(device_id).await {
        Ok(feed) => feed,
        Err(err) => return (0, Some(err)),
    };

    let mut delivered = 0;
    while let Some(item) = feed.next().await {
        match item {
            Ok(message) => match SampleBlock::from_json(&message) {
                Ok(block) => {
                    metrics.record_block();
                    delivered += 1;
                    // no subscribers is fine; the block is simply not observed
                    let _ = sender.send(block);
                }
                Err(err) => {
                    metrics.record_malformed();
                    logger.warn(&format!("dropping malformed block: {err}"));
                }
            },
            Err(err) => return (delivered, Some(err)),
        }
    }
    (delivered, None)
}
