use tracing::{debug, warn};

use crate::error::FnbError;
use crate::frame::{FrameEvent, FrameExtractor};
use crate::record::{DeviceInfo, MeasurementRecord};

/// Everything one chunk of input can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A decoded record, ready for publishing.
    Record(MeasurementRecord),
    /// A byte skipped during resynchronization.
    CorruptByte(u8),
    /// A recognized frame that did not match its schema. The frame was
    /// discarded; the stream position has already moved past it.
    DecodeProblem(FnbError),
}

/// Decode context for one connection lifetime.
///
/// Owns the frame extractor's carry-over buffer and remembers the most
/// recent [`DeviceInfo`] so a publisher can scope values under the device
/// identity. Create one per connection and drop it on disconnect; after a
/// reconnect the new stream shares nothing with the old one.
///
/// Purely synchronous, no internal locking. A host delivering chunks from
/// multiple threads must serialize its calls.
#[derive(Debug, Default)]
pub struct Session {
    extractor: FrameExtractor,
    device: Option<DeviceInfo>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one inbound chunk through frame extraction and record decoding.
    ///
    /// Corrupt bytes and schema mismatches are reported inline and never
    /// stop the stream; every complete frame in the buffer is attempted.
    pub fn handle_chunk(&mut self, chunk: &[u8]) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        for event in self.extractor.feed(chunk) {
            match event {
                FrameEvent::CorruptByte(byte) => {
                    warn!(byte = %format_args!("{byte:#04x}"), "skipping corrupt byte");
                    events.push(SessionEvent::CorruptByte(byte));
                }
                FrameEvent::Frame(frame) => match MeasurementRecord::try_from(frame) {
                    Ok(record) => {
                        if let MeasurementRecord::DeviceInfo(info) = &record {
                            debug!(identity = %info.identity(), "device identified");
                            self.device = Some(*info);
                        }
                        events.push(SessionEvent::Record(record));
                    }
                    Err(err) => {
                        warn!(%err, "discarding malformed frame");
                        events.push(SessionEvent::DecodeProblem(err));
                    }
                },
            }
        }
        events
    }

    /// Identity record of the meter, once a `DeviceInfo` frame has arrived.
    pub fn device(&self) -> Option<&DeviceInfo> {
        self.device.as_ref()
    }

    /// Bytes held over while waiting for the rest of a frame.
    pub fn pending(&self) -> usize {
        self.extractor.pending()
    }
}
