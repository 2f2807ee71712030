use thiserror::Error;

/// The primary error type for the `fnb58-lib` crate.
///
/// Nothing here is fatal to a session: a corrupt sentinel byte is recovered
/// inside the frame extractor, a truncated frame is buffered for the next
/// chunk, and a schema mismatch only discards the offending frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FnbError {
    #[error(
        "schema mismatch for record type {frame_type:#04x}: expected {expected} payload bytes, got {actual}"
    )]
    SchemaMismatch {
        frame_type: u8,
        expected: usize,
        actual: usize,
    },
}
