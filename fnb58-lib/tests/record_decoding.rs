//! Tests for per-type payload decoding and scaling

mod common;

use common::*;

fn decode_one(wire: &[u8]) -> MeasurementRecord {
    let mut extractor = FrameExtractor::new();
    let events = feed_all(&mut extractor, wire);
    assert_eq!(events.len(), 1, "expected exactly one frame");
    let FrameEvent::Frame(frame) = events[0].clone() else {
        panic!("expected a frame, got {:?}", events[0]);
    };
    MeasurementRecord::try_from(frame).expect("decode failed")
}

#[test]
fn test_coarse_measurement_concrete_bytes() {
    // 0x03E8 = 1000 mV, 0x0064 = 100 mA, plus the trailing checksum byte.
    let record = decode_one(&hex_to_bytes("aa0704e803640069"));
    assert_eq!(
        record,
        MeasurementRecord::Coarse(CoarseMeasurement {
            voltage_v: 1.000,
            current_a: 0.100,
        })
    );
}

#[test]
fn test_coarse_frame_without_checksum_byte_stays_buffered() {
    // The same frame minus its checksum byte is a truncated frame, not a
    // decodable one.
    let mut extractor = FrameExtractor::new();
    assert!(feed_all(&mut extractor, &hex_to_bytes("aa0704e8036400")).is_empty());
    assert_eq!(extractor.pending(), 7);
}

#[test]
fn test_device_info_decode() {
    let record = decode_one(&build_frame(0x03, &DEVICE_INFO_PAYLOAD));
    let MeasurementRecord::DeviceInfo(info) = record else {
        panic!("expected DeviceInfo, got {record:?}");
    };
    assert_eq!(info.model, 58);
    assert_eq!(info.fw_version, 102);
    assert_eq!(info.serial, 0xDEAD_BEEF);
    assert_eq!(info.boot_count, 17);
    assert_eq!(info.reserved, 513);
    assert_eq!(info.identity(), "FNB58_3735928559");
}

#[test]
fn test_precise_measurement_scaling() {
    // 51_234 -> 5.1234 V, 10_001 -> 1.0001 A, 51_239 -> 5.1239 W
    let payload = [
        0x22, 0xC8, 0x00, 0x00, // voltage
        0x11, 0x27, 0x00, 0x00, // current
        0x27, 0xC8, 0x00, 0x00, // power
    ];
    let record = decode_one(&build_frame(0x04, &payload));
    assert_eq!(
        record,
        MeasurementRecord::Precise(PreciseMeasurement {
            voltage_v: 51_234.0 / 10_000.0,
            current_a: 10_001.0 / 10_000.0,
            power_w: 51_239.0 / 10_000.0,
        })
    );
}

#[test]
fn test_raw_encoding_round_trip() {
    // Values exactly representable at the wire resolution survive the
    // scaled -> raw -> scaled round trip unchanged.
    let original = PreciseMeasurement {
        voltage_v: 5.0,
        current_a: 1.5,
        power_w: 7.5,
    };
    let raw = PreciseMeasurementRaw::from(original);
    let record = decode_one(&build_frame(0x04, zerocopy::IntoBytes::as_bytes(&raw)));
    assert_eq!(record, MeasurementRecord::Precise(original));

    let original = CoarseMeasurement {
        voltage_v: 9.0,
        current_a: 2.25,
    };
    let raw = CoarseMeasurementRaw::from(original);
    let record = decode_one(&build_frame(0x07, zerocopy::IntoBytes::as_bytes(&raw)));
    assert_eq!(record, MeasurementRecord::Coarse(original));
}

#[test]
fn test_cable_stats_overlapping_flag_byte() {
    // resistance 1234 -> 0.1234 ohm; byte 4 unused; temperature word 0x0117
    // (279 -> 27.9 C) whose low byte 0x17 doubles as the flag field.
    let payload = [0xD2, 0x04, 0x00, 0x00, 0x09, 0x17, 0x01];
    let record = decode_one(&build_frame(0x05, &payload));
    assert_eq!(
        record,
        MeasurementRecord::Cable(CableStats {
            resistance_ohm: 0.1234,
            temperature_c: 27.9,
            temp_unit: 0x17,
        })
    );
}

#[test]
fn test_line_voltages_decode() {
    // D+ 2500 mV, D- 600 mV, reserved 7
    let payload = [0xC4, 0x09, 0x58, 0x02, 0x07, 0x00];
    let record = decode_one(&build_frame(0x06, &payload));
    assert_eq!(
        record,
        MeasurementRecord::Line(LineVoltages {
            dp_v: 2.5,
            dm_v: 0.6,
            reserved: 7,
        })
    );
}

#[test]
fn test_charge_stats_decode_and_time_rendering() {
    // group 2, energy 1_234_567 (12.34567 Wh), capacity 765_432
    // (7.65432 Ah), elapsed 3725 s, runtime 2 days + 3661 s.
    let payload = [
        0x02, // group
        0x87, 0xD6, 0x12, 0x00, // energy
        0xF8, 0xAD, 0x0B, 0x00, // capacity
        0x8D, 0x0E, 0x00, 0x00, // elapsed_s
        0x4D, 0xB1, 0x02, 0x00, // runtime_s
    ];
    let record = decode_one(&build_frame(0x08, &payload));
    let MeasurementRecord::Charge(stats) = record else {
        panic!("expected ChargeStats, got {record:?}");
    };
    assert_eq!(stats.group, 2);
    assert_eq!(stats.energy_wh, 1_234_567.0 / 100_000.0);
    assert_eq!(stats.capacity_ah, 765_432.0 / 100_000.0);
    assert_eq!(stats.elapsed_hms(), "01:02:05");
    assert_eq!(stats.runtime_hms(), "2d 01:01:01");
}

#[test]
fn test_unknown_type_passes_payload_through() {
    let record = decode_one(&build_frame(0x0B, &[0xCA, 0xFE]));
    assert_eq!(
        record,
        MeasurementRecord::Unknown {
            frame_type: 0x0B,
            payload: vec![0xCA, 0xFE],
        }
    );
    assert!(record.published_values().is_empty());
}

#[test]
fn test_schema_mismatch_on_wrong_length() {
    // Type 0x04 declares 10 payload bytes instead of the required 12.
    let mut extractor = FrameExtractor::new();
    let events = feed_all(&mut extractor, &build_frame(0x04, &[0x00; 10]));
    let FrameEvent::Frame(frame) = events[0].clone() else {
        panic!("expected a frame");
    };

    let err = MeasurementRecord::try_from(frame).unwrap_err();
    assert_eq!(
        err,
        FnbError::SchemaMismatch {
            frame_type: 0x04,
            expected: 12,
            actual: 10,
        }
    );
    // The malformed frame was fully consumed; the stream is not stuck.
    assert_eq!(extractor.pending(), 0);
}

#[test]
fn test_published_values_formatting() {
    let record = MeasurementRecord::Precise(PreciseMeasurement {
        voltage_v: 5.0,
        current_a: 1.2345,
        power_w: 6.17255,
    });
    assert_eq!(
        record.published_values(),
        vec![
            ("voltage".to_string(), "5.0000".to_string()),
            ("current".to_string(), "1.2345".to_string()),
            ("power".to_string(), "6.1726".to_string()),
        ]
    );

    let record = MeasurementRecord::Charge(ChargeStats {
        group: 1,
        energy_wh: 0.5,
        capacity_ah: 0.1,
        elapsed_s: 60,
        runtime_s: 7200,
    });
    assert_eq!(
        record.published_values(),
        vec![
            ("battery/1/NRG".to_string(), "0.50000".to_string()),
            ("battery/1/CAP".to_string(), "0.10000".to_string()),
            ("battery/1/time".to_string(), "60".to_string()),
            ("runtime".to_string(), "7200".to_string()),
        ]
    );
}

#[test]
fn test_coarse_measurement_publishes_nothing() {
    let record = MeasurementRecord::Coarse(CoarseMeasurement {
        voltage_v: 5.0,
        current_a: 0.5,
    });
    assert!(record.published_values().is_empty());
}

#[test]
fn test_record_serializes_to_json() {
    let record = MeasurementRecord::Line(LineVoltages {
        dp_v: 2.7,
        dm_v: 2.7,
        reserved: 0,
    });
    let json = serde_json::to_string(&record).unwrap();
    let back: MeasurementRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
}
