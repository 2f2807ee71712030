use bytes::{Buf, Bytes, BytesMut};
use num_enum::{FromPrimitive, IntoPrimitive};
use strum_macros::Display;
use tracing::trace;

use crate::constants::{FRAME_HEADER_SIZE, FRAME_SENTINEL, MIN_FRAME_SIZE};

/// Record types carried in the frame header.
///
/// Types not listed here are forwarded through the `Unknown` arm so that
/// firmware additions never break decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum FrameType {
    /// Model, firmware version, serial number, boot count.
    DeviceInfo = 0x03,
    /// Voltage, current and power at 0.1 mV / 0.1 mA resolution.
    PreciseMeasurement = 0x04,
    /// Cable resistance and temperature.
    CableStats = 0x05,
    /// D+/D- data line voltages.
    LineVoltages = 0x06,
    /// Voltage and current at 1 mV / 1 mA resolution.
    CoarseMeasurement = 0x07,
    /// Per-group battery charging statistics.
    ChargeStats = 0x08,

    #[num_enum(catch_all)]
    Unknown(u8),
}

/// One structurally-delimited unit of the wire stream.
///
/// Wire layout: sentinel `0xAA`, type byte, payload length byte, payload,
/// checksum byte. The protocol documents no checksum algorithm, so the
/// trailing byte is carried as-is and never verified.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub frame_type: FrameType,
    pub payload: Bytes,
    pub checksum: u8,
}

impl Frame {
    /// Serializes back to wire form. Payloads longer than 255 bytes cannot
    /// be represented on the wire.
    pub fn to_bytes(&self) -> Vec<u8> {
        debug_assert!(self.payload.len() <= u8::MAX as usize);
        let mut out = Vec::with_capacity(MIN_FRAME_SIZE + self.payload.len());
        out.push(FRAME_SENTINEL);
        out.push(self.frame_type.into());
        out.push(self.payload.len() as u8);
        out.extend_from_slice(&self.payload);
        out.push(self.checksum);
        out
    }
}

/// One step of extractor output.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameEvent {
    /// A complete, well-formed frame.
    Frame(Frame),
    /// A byte that should have been the frame sentinel and was not. The
    /// extractor has already skipped past it; report it and keep going.
    CorruptByte(u8),
}

/// Reassembles frames from an arbitrarily-chunked byte stream.
///
/// The extractor keeps the unconsumed tail of the stream between [`feed`]
/// calls, so a frame split across any number of notifications decodes the
/// same as one delivered whole. After a corrupt byte it resynchronizes by
/// advancing one byte at a time until the next sentinel, which bounds
/// recovery by the buffer length and guarantees forward progress.
///
/// One extractor per connection session, single caller at a time. After a
/// reconnect, start from a fresh extractor: a new connection is a new byte
/// stream and any buffered partial frame from the old one is meaningless.
///
/// [`feed`]: FrameExtractor::feed
#[derive(Debug, Default)]
pub struct FrameExtractor {
    buffer: BytesMut,
}

impl FrameExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes buffered while waiting for the rest of a frame.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Appends a chunk and returns a draining iterator over every event the
    /// buffer now holds. The iterator borrows the extractor; anything not
    /// consumed stays buffered for the next call.
    pub fn feed(&mut self, chunk: &[u8]) -> FrameEvents<'_> {
        self.buffer.extend_from_slice(chunk);
        FrameEvents { extractor: self }
    }

    fn next_event(&mut self) -> Option<FrameEvent> {
        let byte = *self.buffer.first()?;
        if byte != FRAME_SENTINEL {
            self.buffer.advance(1);
            return Some(FrameEvent::CorruptByte(byte));
        }

        // Sentinel seen. Until the header and the declared payload plus its
        // checksum byte are all buffered, hold everything from the sentinel
        // onward: a short frame is normal mid-stream truncation.
        if self.buffer.len() < FRAME_HEADER_SIZE {
            return None;
        }
        let plen = self.buffer[2] as usize;
        if self.buffer.len() < FRAME_HEADER_SIZE + plen + 1 {
            return None;
        }

        let frame_type = FrameType::from_primitive(self.buffer[1]);
        self.buffer.advance(FRAME_HEADER_SIZE);
        let payload = self.buffer.split_to(plen).freeze();
        let checksum = self.buffer[0];
        self.buffer.advance(1);

        trace!(frame_type = u8::from(frame_type), plen, "extracted frame");
        Some(FrameEvent::Frame(Frame {
            frame_type,
            payload,
            checksum,
        }))
    }
}

/// Draining iterator returned by [`FrameExtractor::feed`].
pub struct FrameEvents<'a> {
    extractor: &'a mut FrameExtractor,
}

impl Iterator for FrameEvents<'_> {
    type Item = FrameEvent;

    fn next(&mut self) -> Option<FrameEvent> {
        self.extractor.next_event()
    }
}
