//! Hand-off buffer between the broker delivery context and the render loop.
//!
//! Unbounded and FIFO: every pushed frame is popped exactly once, in order.

use crossbeam::channel::{self, Receiver, Sender};

use crate::marker::MarkerFrame;

/// Creates a connected producer/consumer pair.
pub fn frame_queue() -> (FrameProducer, FrameConsumer) {
    let (frame_tx, frame_rx) = channel::unbounded();
    let (interrupt_tx, interrupt_rx) = channel::bounded(1);
    (
        FrameProducer { tx: frame_tx },
        FrameConsumer {
            rx: frame_rx,
            interrupt_tx,
            interrupt_rx,
        },
    )
}

#[derive(Clone)]
pub struct FrameProducer {
    tx: Sender<MarkerFrame>,
}

impl FrameProducer {
    /// Appends a frame. Never blocks.
    ///
    /// Once the consumer is dropped the frame is discarded.
    pub fn push(&self, frame: MarkerFrame) {
        if self.tx.send(frame).is_err() {
            log::trace!("frame consumer is gone, dropping frame");
        }
    }
}

pub struct FrameConsumer {
    rx: Receiver<MarkerFrame>,
    interrupt_tx: Sender<()>,
    interrupt_rx: Receiver<()>,
}

impl FrameConsumer {
    /// Blocks until a frame is available and returns the oldest one.
    ///
    /// Returns `None` once interrupted, or when every producer is dropped and
    /// the queue is drained. An interrupt takes priority over queued frames.
    pub fn pop_blocking(&self) -> Option<MarkerFrame> {
        if self.is_interrupted() {
            return None;
        }
        channel::select_biased! {
            recv(self.interrupt_rx) -> _ => {
                self.latch_interrupt();
                None
            },
            recv(self.rx) -> frame => frame.ok(),
        }
    }

    pub fn interrupt_handle(&self) -> InterruptHandle {
        InterruptHandle {
            tx: self.interrupt_tx.clone(),
        }
    }

    /// Number of frames waiting to be drawn.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    fn is_interrupted(&self) -> bool {
        // the interrupt slot stays full once raised
        self.interrupt_rx.is_full()
    }

    fn latch_interrupt(&self) {
        let _ = self.interrupt_tx.try_send(());
    }
}

/// Wakes a blocked [`FrameConsumer::pop_blocking`] and makes every later call return `None`.
#[derive(Clone)]
pub struct InterruptHandle {
    tx: Sender<()>,
}

impl InterruptHandle {
    pub fn interrupt(&self) {
        // a full slot means someone already interrupted
        let _ = self.tx.try_send(());
    }
}
