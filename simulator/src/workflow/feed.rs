use crate::generator::profile::{EcgSynth, GeneratorConfig};
use ecgcore::model::SampleBlock;
use ecgcore::telemetry::LogManager;
use futures::stream::{self, Stream, StreamExt};
use std::convert::Infallible;
use tokio::time::{interval, Interval, MissedTickBehavior};
use warp::sse::Event;

/// Endless real-time stream of synthetic blocks for one device.
pub fn block_stream(
    config: GeneratorConfig,
    device_id: Option<String>,
) -> impl Stream<Item = SampleBlock> + Send + 'static {
    let synth = EcgSynth::with_device(config, device_id.as_deref());
    let period = synth.config().block_period();

    // the interval is created on first poll so it binds to the serving runtime
    stream::unfold(
        (synth, None::<Interval>),
        move |(mut synth, ticker)| async move {
            let mut ticker = ticker.unwrap_or_else(|| {
                let mut ticker = interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                ticker
            });
            ticker.tick().await;
            let block = synth.next_block();
            Some((block, (synth, Some(ticker))))
        },
    )
}

/// Blocks encoded as SSE `data:` events; unserializable blocks are skipped.
pub fn sse_events<S>(blocks: S) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static
where
    S: Stream<Item = SampleBlock> + Send + 'static,
{
    let logger = LogManager::new("feed");
    blocks.filter_map(move |block| {
        let event = match serde_json::to_string(&block) {
            Ok(json) => Some(Ok(Event::default().data(json))),
            Err(err) => {
                logger.warn(&format!("skipping block: {err}"));
                None
            }
        };
        futures::future::ready(event)
    })
}
