use crossbeam::channel;
use std::sync::Arc;
use std::time::Duration;

use crate::broker::Subscription;
use crate::config::ViewerConfig;
use crate::error::{ConnectionError, DrawError, Error};
use crate::frame_queue::frame_queue;
use crate::ingest::{Ingest, IngestStats};
use crate::render::{self, RenderSummary};
use crate::scene::{RerunScene, SceneSink};

const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewerSummary {
    pub render: RenderSummary,
    pub ingest: IngestStats,
}

/// Subscribes to the broker and renders incoming frames until interrupted.
///
/// Delivery runs on a background tokio runtime, rendering on the calling
/// thread. The scene and the runtime are released on every exit path.
pub fn run(config: &ViewerConfig, sink: &SceneSink) -> Result<ViewerSummary, Error> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("mqtt-delivery")
        .enable_all()
        .build()
        .map_err(Error::Runtime)?;

    let (producer, consumer) = frame_queue();
    let interrupt = consumer.interrupt_handle();

    let subscription = runtime.block_on(Subscription::connect(&config.broker))?;
    let topic = subscription.topic().to_string();
    let client = subscription.client();
    let ingest = Arc::new(Ingest::new(producer, &config.render.markers_field));

    let (outcome_tx, outcome_rx) = channel::bounded::<Result<(), ConnectionError>>(1);
    let mut delivery = {
        let ingest = ingest.clone();
        let interrupt = interrupt.clone();
        runtime.spawn(async move {
            let outcome = subscription.deliver(ingest).await;
            let _ = outcome_tx.send(outcome);
            interrupt.interrupt();
        })
    };
    runtime.spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log::info!("interrupted, shutting down");
                interrupt.interrupt();
            }
            Err(e) => log::warn!("unable to listen for ctrl-c: {}", e),
        }
    });

    log::info!("Listening for data on '{}'... Press Ctrl+C to stop.", topic);
    let rendered = RerunScene::open(sink, &config.render)
        .and_then(|mut scene| render::run(&consumer, &mut scene, &config.render));

    // let the event loop send the disconnect before the runtime goes away
    if let Err(e) = client.try_disconnect() {
        log::debug!("disconnect not sent: {}", e);
    }
    if runtime
        .block_on(tokio::time::timeout(DISCONNECT_TIMEOUT, &mut delivery))
        .is_err()
    {
        log::warn!("delivery did not stop within {:?}", DISCONNECT_TIMEOUT);
        delivery.abort();
    }
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);

    let render = shutdown_outcome(rendered, outcome_rx.try_recv().ok())?;

    let summary = ViewerSummary {
        render,
        ingest: ingest.stats(),
    };
    log::info!(
        "Stopped. drew {} frames, {} messages accepted, {} rejected",
        summary.render.frames_drawn,
        summary.ingest.accepted,
        summary.ingest.rejected
    );
    Ok(summary)
}

/// Combines how rendering and delivery ended into the viewer's result.
///
/// A draw error wins over a delivery error; `delivered` is `None` when
/// delivery was still running at shutdown.
pub fn shutdown_outcome(
    rendered: Result<RenderSummary, DrawError>,
    delivered: Option<Result<(), ConnectionError>>,
) -> Result<RenderSummary, Error> {
    let render = rendered?;
    match delivered {
        Some(Err(e)) => Err(e.into()),
        _ => Ok(render),
    }
}
