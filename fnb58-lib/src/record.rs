use std::fmt;

use serde::{Deserialize, Serialize};
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::error::FnbError;
use crate::frame::{Frame, FrameType};

/// Wire layout of a type 0x03 payload (14 bytes).
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct DeviceInfoRaw {
    pub model: U16,
    pub fw_version: U16,
    pub serial: U32,
    pub boot_count: U32,
    pub reserved: U16,
}

/// Wire layout of a type 0x04 payload (12 bytes). All three fields are in
/// 0.1 mV / 0.1 mA / 0.1 mW units.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct PreciseMeasurementRaw {
    pub voltage_tenth_mv: U32,
    pub current_tenth_ma: U32,
    pub power_tenth_mw: U32,
}

/// Wire layout of a type 0x05 payload (7 bytes).
///
/// The temperature word starts at offset 5, so its low byte doubles as a
/// one-byte flag field (probably the temperature unit). Both readings of
/// that byte are preserved on [`CableStats`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct CableStatsRaw {
    pub resistance_tenth_mohm: U32,
    pub reserved: u8,
    pub temperature_deci_c: U16,
}

/// Wire layout of a type 0x06 payload (6 bytes). Voltages in millivolts.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct LineVoltagesRaw {
    pub dp_mv: U16,
    pub dm_mv: U16,
    pub reserved: U16,
}

/// Wire layout of a type 0x07 payload (4 bytes). Millivolts / milliamps.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct CoarseMeasurementRaw {
    pub voltage_mv: U16,
    pub current_ma: U16,
}

/// Wire layout of a type 0x08 payload (17 bytes). Energy and capacity have
/// an LSB of 10 µWh / 10 µAh, times are whole seconds.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct ChargeStatsRaw {
    pub group: u8,
    pub energy_raw: U32,
    pub capacity_raw: U32,
    pub elapsed_s: U32,
    pub runtime_s: U32,
}

/// Device identity and firmware details (type 0x03).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub model: u16,
    pub fw_version: u16,
    pub serial: u32,
    pub boot_count: u32,
    /// Trailing word of unconfirmed meaning, passed through as-is.
    pub reserved: u16,
}

impl DeviceInfo {
    /// Stable per-device identity key, e.g. `FNB58_3735928559`. Downstream
    /// publishers scope topics under this so that readings from different
    /// meters never mix.
    pub fn identity(&self) -> String {
        format!("FNB{}_{}", self.model, self.serial)
    }
}

/// Higher-precision measurements (type 0x04).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreciseMeasurement {
    pub voltage_v: f64,
    pub current_a: f64,
    pub power_w: f64,
}

/// Cable resistance and temperature (type 0x05).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CableStats {
    pub resistance_ohm: f64,
    pub temperature_c: f64,
    /// Single-byte flag overlapping the low temperature byte, probably the
    /// temperature unit. Passed through as-is.
    pub temp_unit: u8,
}

/// D+/D- data line voltages (type 0x06).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineVoltages {
    pub dp_v: f64,
    pub dm_v: f64,
    /// Trailing word of unconfirmed meaning, passed through as-is.
    pub reserved: u16,
}

/// Lower-precision measurements (type 0x07).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoarseMeasurement {
    pub voltage_v: f64,
    pub current_a: f64,
}

/// Battery charging statistics for one charge group (type 0x08).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargeStats {
    pub group: u8,
    pub energy_wh: f64,
    pub capacity_ah: f64,
    /// Charging time of this group, in seconds.
    pub elapsed_s: u32,
    /// Device uptime, in seconds.
    pub runtime_s: u32,
}

impl ChargeStats {
    /// Charging time rendered as `HH:MM:SS`.
    pub fn elapsed_hms(&self) -> String {
        fmt_hms(self.elapsed_s)
    }

    /// Uptime rendered as `HH:MM:SS`, with a day count once it rolls over.
    pub fn runtime_hms(&self) -> String {
        let days = self.runtime_s / 86_400;
        if days > 0 {
            format!("{}d {}", days, fmt_hms(self.runtime_s % 86_400))
        } else {
            fmt_hms(self.runtime_s)
        }
    }
}

fn fmt_hms(secs: u32) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

impl From<DeviceInfoRaw> for DeviceInfo {
    fn from(raw: DeviceInfoRaw) -> Self {
        DeviceInfo {
            model: raw.model.get(),
            fw_version: raw.fw_version.get(),
            serial: raw.serial.get(),
            boot_count: raw.boot_count.get(),
            reserved: raw.reserved.get(),
        }
    }
}

impl From<DeviceInfo> for DeviceInfoRaw {
    fn from(info: DeviceInfo) -> Self {
        DeviceInfoRaw {
            model: U16::new(info.model),
            fw_version: U16::new(info.fw_version),
            serial: U32::new(info.serial),
            boot_count: U32::new(info.boot_count),
            reserved: U16::new(info.reserved),
        }
    }
}

impl From<PreciseMeasurementRaw> for PreciseMeasurement {
    fn from(raw: PreciseMeasurementRaw) -> Self {
        PreciseMeasurement {
            voltage_v: raw.voltage_tenth_mv.get() as f64 / 10_000.0,
            current_a: raw.current_tenth_ma.get() as f64 / 10_000.0,
            power_w: raw.power_tenth_mw.get() as f64 / 10_000.0,
        }
    }
}

impl From<PreciseMeasurement> for PreciseMeasurementRaw {
    fn from(m: PreciseMeasurement) -> Self {
        PreciseMeasurementRaw {
            voltage_tenth_mv: U32::new((m.voltage_v * 10_000.0) as u32),
            current_tenth_ma: U32::new((m.current_a * 10_000.0) as u32),
            power_tenth_mw: U32::new((m.power_w * 10_000.0) as u32),
        }
    }
}

impl From<CableStatsRaw> for CableStats {
    fn from(raw: CableStatsRaw) -> Self {
        CableStats {
            resistance_ohm: raw.resistance_tenth_mohm.get() as f64 / 10_000.0,
            temperature_c: raw.temperature_deci_c.get() as f64 / 10.0,
            // Low byte of the temperature word, read a second time as a flag.
            temp_unit: (raw.temperature_deci_c.get() & 0xFF) as u8,
        }
    }
}

impl From<CableStats> for CableStatsRaw {
    fn from(s: CableStats) -> Self {
        // The flag byte overlaps the temperature word, so only the
        // temperature survives the reverse direction.
        CableStatsRaw {
            resistance_tenth_mohm: U32::new((s.resistance_ohm * 10_000.0) as u32),
            reserved: 0,
            temperature_deci_c: U16::new((s.temperature_c * 10.0) as u16),
        }
    }
}

impl From<LineVoltagesRaw> for LineVoltages {
    fn from(raw: LineVoltagesRaw) -> Self {
        LineVoltages {
            dp_v: raw.dp_mv.get() as f64 / 1_000.0,
            dm_v: raw.dm_mv.get() as f64 / 1_000.0,
            reserved: raw.reserved.get(),
        }
    }
}

impl From<LineVoltages> for LineVoltagesRaw {
    fn from(v: LineVoltages) -> Self {
        LineVoltagesRaw {
            dp_mv: U16::new((v.dp_v * 1_000.0) as u16),
            dm_mv: U16::new((v.dm_v * 1_000.0) as u16),
            reserved: U16::new(v.reserved),
        }
    }
}

impl From<CoarseMeasurementRaw> for CoarseMeasurement {
    fn from(raw: CoarseMeasurementRaw) -> Self {
        CoarseMeasurement {
            voltage_v: raw.voltage_mv.get() as f64 / 1_000.0,
            current_a: raw.current_ma.get() as f64 / 1_000.0,
        }
    }
}

impl From<CoarseMeasurement> for CoarseMeasurementRaw {
    fn from(m: CoarseMeasurement) -> Self {
        CoarseMeasurementRaw {
            voltage_mv: U16::new((m.voltage_v * 1_000.0) as u16),
            current_ma: U16::new((m.current_a * 1_000.0) as u16),
        }
    }
}

impl From<ChargeStatsRaw> for ChargeStats {
    fn from(raw: ChargeStatsRaw) -> Self {
        ChargeStats {
            group: raw.group,
            energy_wh: raw.energy_raw.get() as f64 / 100_000.0,
            capacity_ah: raw.capacity_raw.get() as f64 / 100_000.0,
            elapsed_s: raw.elapsed_s.get(),
            runtime_s: raw.runtime_s.get(),
        }
    }
}

impl From<ChargeStats> for ChargeStatsRaw {
    fn from(s: ChargeStats) -> Self {
        ChargeStatsRaw {
            group: s.group,
            energy_raw: U32::new((s.energy_wh * 100_000.0) as u32),
            capacity_raw: U32::new((s.capacity_ah * 100_000.0) as u32),
            elapsed_s: U32::new(s.elapsed_s),
            runtime_s: U32::new(s.runtime_s),
        }
    }
}

/// The decoded, unit-scaled interpretation of one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeasurementRecord {
    DeviceInfo(DeviceInfo),
    Precise(PreciseMeasurement),
    Cable(CableStats),
    Line(LineVoltages),
    Coarse(CoarseMeasurement),
    Charge(ChargeStats),
    /// A frame type this crate does not know. Not an error: the payload is
    /// passed through so forward-compatible consumers can still log it.
    Unknown { frame_type: u8, payload: Vec<u8> },
}

fn payload_as<T>(frame: &Frame) -> Result<T, FnbError>
where
    T: FromBytes + KnownLayout + Immutable + Copy,
{
    T::read_from_bytes(frame.payload.as_ref()).map_err(|_| FnbError::SchemaMismatch {
        frame_type: frame.frame_type.into(),
        expected: size_of::<T>(),
        actual: frame.payload.len(),
    })
}

impl TryFrom<Frame> for MeasurementRecord {
    type Error = FnbError;

    /// Decodes one frame against the fixed per-type schema.
    ///
    /// Fails only when a recognized type carries the wrong payload length;
    /// a correct-length payload always decodes, and unrecognized types come
    /// back as [`MeasurementRecord::Unknown`].
    fn try_from(frame: Frame) -> Result<Self, FnbError> {
        let record = match frame.frame_type {
            FrameType::DeviceInfo => {
                MeasurementRecord::DeviceInfo(payload_as::<DeviceInfoRaw>(&frame)?.into())
            }
            FrameType::PreciseMeasurement => {
                MeasurementRecord::Precise(payload_as::<PreciseMeasurementRaw>(&frame)?.into())
            }
            FrameType::CableStats => {
                MeasurementRecord::Cable(payload_as::<CableStatsRaw>(&frame)?.into())
            }
            FrameType::LineVoltages => {
                MeasurementRecord::Line(payload_as::<LineVoltagesRaw>(&frame)?.into())
            }
            FrameType::CoarseMeasurement => {
                MeasurementRecord::Coarse(payload_as::<CoarseMeasurementRaw>(&frame)?.into())
            }
            FrameType::ChargeStats => {
                MeasurementRecord::Charge(payload_as::<ChargeStatsRaw>(&frame)?.into())
            }
            FrameType::Unknown(frame_type) => MeasurementRecord::Unknown {
                frame_type,
                payload: frame.payload.to_vec(),
            },
        };
        Ok(record)
    }
}

impl MeasurementRecord {
    /// `(topic-suffix, value)` pairs for an MQTT-style publisher, scoped by
    /// the caller under [`DeviceInfo::identity`].
    ///
    /// Coarse measurements publish nothing: they duplicate the precise
    /// stream at lower resolution. Unconfirmed fields go out under
    /// `unknown/{frame type}` so they stay observable without being named.
    pub fn published_values(&self) -> Vec<(String, String)> {
        match self {
            MeasurementRecord::DeviceInfo(info) => vec![
                ("fw_version".into(), format!("{}", info.fw_version)),
                ("boot".into(), format!("{}", info.boot_count)),
                ("unknown/3".into(), format!("{}", info.reserved)),
            ],
            MeasurementRecord::Precise(m) => vec![
                ("voltage".into(), format!("{:.4}", m.voltage_v)),
                ("current".into(), format!("{:.4}", m.current_a)),
                ("power".into(), format!("{:.4}", m.power_w)),
            ],
            MeasurementRecord::Cable(s) => vec![
                ("resistance".into(), format!("{:.4}", s.resistance_ohm)),
                ("temperature".into(), format!("{:.1}", s.temperature_c)),
                ("unknown/5".into(), format!("{}", s.temp_unit)),
            ],
            MeasurementRecord::Line(v) => vec![
                ("dp_voltage".into(), format!("{:.3}", v.dp_v)),
                ("dm_voltage".into(), format!("{:.3}", v.dm_v)),
                ("unknown/6".into(), format!("{}", v.reserved)),
            ],
            MeasurementRecord::Coarse(_) => vec![],
            MeasurementRecord::Charge(s) => vec![
                (format!("battery/{}/NRG", s.group), format!("{:.5}", s.energy_wh)),
                (format!("battery/{}/CAP", s.group), format!("{:.5}", s.capacity_ah)),
                (format!("battery/{}/time", s.group), format!("{}", s.elapsed_s)),
                ("runtime".into(), format!("{}", s.runtime_s)),
            ],
            MeasurementRecord::Unknown { .. } => vec![],
        }
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FNB{} sn {}, fw {}, boots {}",
            self.model, self.serial, self.fw_version, self.boot_count
        )
    }
}

impl fmt::Display for PreciseMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.4} V, {:.4} A, {:.4} W",
            self.voltage_v, self.current_a, self.power_w
        )
    }
}

impl fmt::Display for CableStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R: {:.4} Ω, T: {:.1} °C", self.resistance_ohm, self.temperature_c)
    }
}

impl fmt::Display for LineVoltages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D+: {:.3} V, D-: {:.3} V", self.dp_v, self.dm_v)
    }
}

impl fmt::Display for CoarseMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} V, {:.3} A", self.voltage_v, self.current_a)
    }
}

impl fmt::Display for ChargeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "group {}: {:.5} Wh, {:.5} Ah, charged {}, up {}",
            self.group,
            self.energy_wh,
            self.capacity_ah,
            self.elapsed_hms(),
            self.runtime_hms()
        )
    }
}

impl fmt::Display for MeasurementRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementRecord::DeviceInfo(r) => r.fmt(f),
            MeasurementRecord::Precise(r) => r.fmt(f),
            MeasurementRecord::Cable(r) => r.fmt(f),
            MeasurementRecord::Line(r) => r.fmt(f),
            MeasurementRecord::Coarse(r) => r.fmt(f),
            MeasurementRecord::Charge(r) => r.fmt(f),
            MeasurementRecord::Unknown { frame_type, payload } => {
                write!(f, "unknown type {frame_type:#04x}: {}", hex::encode(payload))
            }
        }
    }
}
