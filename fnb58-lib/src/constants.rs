// Protocol constants for the FNIRSI FNB58 BLE telemetry stream.

/// Marker byte at the start of every frame.
pub const FRAME_SENTINEL: u8 = 0xAA;

/// Size of the frame header: sentinel, type byte, length byte.
pub const FRAME_HEADER_SIZE: usize = 3;

/// Size of the trailing checksum byte.
pub const FRAME_CHECKSUM_SIZE: usize = 1;

/// Smallest possible frame: header plus checksum, empty payload.
pub const MIN_FRAME_SIZE: usize = FRAME_HEADER_SIZE + FRAME_CHECKSUM_SIZE;

/// GATT characteristic the device streams notifications on.
pub const NOTIFY_CHARACTERISTIC_UUID: &str = "0000ffe4-0000-1000-8000-00805f9b34fb";

/// GATT characteristic accepting commands from the host.
pub const WRITE_CHARACTERISTIC_UUID: &str = "0000ffe9-0000-1000-8000-00805f9b34fb";

/// Handshake command, written first after connecting.
pub const CMD_HANDSHAKE: [u8; 4] = [0xAA, 0x81, 0x00, 0xF4];

/// Starts measurement streaming, written after [`CMD_HANDSHAKE`].
pub const CMD_START_STREAMING: [u8; 4] = [0xAA, 0x82, 0x00, 0xA7];

/// Ends the session. The device expects this written twice.
pub const CMD_STOP_STREAMING: [u8; 4] = [0xAA, 0x84, 0x00, 0x01];
