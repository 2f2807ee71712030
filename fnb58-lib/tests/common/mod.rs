//! Common test utilities and shared imports

// Shared across multiple test files, so not every item is used everywhere.
#[allow(unused_imports)]
pub use bytes::Bytes;
#[allow(unused_imports)]
pub use fnb58_lib::FnbError;
#[allow(unused_imports)]
pub use fnb58_lib::constants::*;
#[allow(unused_imports)]
pub use fnb58_lib::frame::{Frame, FrameEvent, FrameExtractor, FrameType};
#[allow(unused_imports)]
pub use fnb58_lib::record::*;
#[allow(unused_imports)]
pub use fnb58_lib::session::{Session, SessionEvent};

/// Decode hex string to bytes for testing
#[allow(dead_code)]
pub fn hex_to_bytes(hex_data: &str) -> Vec<u8> {
    hex::decode(hex_data).expect("Failed to decode hex")
}

/// Build the wire form of one frame. The checksum byte is a wrapping sum of
/// type, length and payload; the decoder carries it without validating, so
/// any value would do.
#[allow(dead_code)]
pub fn build_frame(frame_type: u8, payload: &[u8]) -> Vec<u8> {
    assert!(payload.len() <= u8::MAX as usize);
    let mut checksum = frame_type.wrapping_add(payload.len() as u8);
    for b in payload {
        checksum = checksum.wrapping_add(*b);
    }

    let mut out = vec![FRAME_SENTINEL, frame_type, payload.len() as u8];
    out.extend_from_slice(payload);
    out.push(checksum);
    out
}

/// A valid type 0x03 device info payload: model 58, fw 102,
/// serial 3735928559 (0xDEADBEEF), boot count 17, reserved 513.
#[allow(dead_code)]
pub const DEVICE_INFO_PAYLOAD: [u8; 14] = [
    0x3A, 0x00, // model
    0x66, 0x00, // fw_version
    0xEF, 0xBE, 0xAD, 0xDE, // serial
    0x11, 0x00, 0x00, 0x00, // boot_count
    0x01, 0x02, // reserved
];

/// Collect everything the extractor produces for one chunk.
#[allow(dead_code)]
pub fn feed_all(extractor: &mut FrameExtractor, chunk: &[u8]) -> Vec<FrameEvent> {
    extractor.feed(chunk).collect()
}
