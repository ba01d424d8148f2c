use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::DecodeError;
use crate::frame_queue::FrameProducer;
use crate::marker::decode_payload;

/// Turns inbound broker payloads into queued frames.
pub struct Ingest {
    producer: FrameProducer,
    markers_field: String,
    accepted: AtomicU64,
    rejected: AtomicU64,
}

impl Ingest {
    pub fn new(producer: FrameProducer, markers_field: &str) -> Ingest {
        Ingest {
            producer,
            markers_field: markers_field.to_string(),
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Decodes `payload` and pushes exactly one frame on success.
    ///
    /// Decode failures are returned to the caller untouched and push nothing.
    pub fn on_message(&self, payload: &[u8]) -> Result<(), DecodeError> {
        let frame = decode_payload(payload, &self.markers_field).inspect_err(|_| {
            self.rejected.fetch_add(1, Ordering::Relaxed);
        })?;
        log::trace!("ingested frame with {} markers", frame.len());
        self.producer.push(frame);
        self.accepted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn stats(&self) -> IngestStats {
        IngestStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub accepted: u64,
    pub rejected: u64,
}
