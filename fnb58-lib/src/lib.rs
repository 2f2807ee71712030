//! Decoder for the proprietary BLE telemetry protocol of the FNIRSI FNB58
//! USB power meter.
//!
//! The device streams measurements as notifications on a GATT characteristic.
//! Notification payloads carry no alignment guarantee with frame boundaries:
//! a chunk may end mid-frame, start mid-frame, or hold several frames. This
//! crate turns that byte stream back into typed, unit-scaled records:
//!
//! - [`frame::FrameExtractor`] reassembles `(type, payload)` frames from
//!   arbitrarily chunked bytes, resynchronizing on the `0xAA` sentinel after
//!   corruption.
//! - [`record::MeasurementRecord`] is the decoded interpretation of one
//!   frame's payload (voltage, current, power, cable stats, charge stats,
//!   device identity, ...).
//! - [`session::Session`] ties both together for one connection lifetime.
//!
//! Transport concerns (connecting, subscribing, sending the bootstrap
//! commands in [`constants`], reconnect handling) are left to the caller.

pub mod constants;
pub mod error;
pub mod frame;
pub mod record;
pub mod session;

pub use error::FnbError;
pub use frame::{Frame, FrameEvent, FrameExtractor, FrameType};
pub use record::MeasurementRecord;
pub use session::{Session, SessionEvent};
