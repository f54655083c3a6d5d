//! ---
//! chimera_section: "05-testing"
//! chimera_subsection: "integration-tests"
//! chimera_type: "source"
//! chimera_scope: "code"
//! chimera_description: "Cross-crate integration tests for the telemetry codec."
//! chimera_version: "v0.1.0"
//! chimera_owner: "telemetry"
//! ---
use chimera_devices::{EcuSample, InverterSample};
use chimera_wire::{Malformed, Record, ScalarValue, WireError};

fn bytes(text: &str) -> Vec<u8> {
    hex::decode(text).expect("valid hex fixture")
}

fn reason(err: WireError) -> Malformed {
    err.reason()
}

#[test]
fn inverter_golden_frames_are_ascending() {
    let mut sample = InverterSample::new();
    sample.set_speed(1200.0).set_temperature(85.5);
    let encoded = sample.encode_to_vec();
    assert_eq!(hex::encode(&encoded), "150000ab422d00009644");
    assert_eq!(sample.encoded_len(), encoded.len());

    let decoded = InverterSample::decode(&encoded).expect("golden bytes decode");
    assert_eq!(decoded.temperature(), 85.5);
    assert_eq!(decoded.speed(), 1200.0);
    assert!(!decoded.has_timestamp());
    assert_eq!(decoded.timestamp(), 0.0);
    assert_eq!(decoded.present_tags(), vec![2, 5]);
}

#[test]
fn every_inverter_field_has_its_own_key() {
    let mut sample = InverterSample::new();
    sample
        .set_timestamp(1.0)
        .set_temperature(1.0)
        .set_motor_temp(1.0)
        .set_torque(1.0)
        .set_speed(1.0);
    assert_eq!(
        hex::encode(sample.encode_to_vec()),
        "0d0000803f150000803f1d0000803f250000803f2d0000803f"
    );
}

#[test]
fn empty_ecu_sample_is_zero_bytes() {
    assert!(EcuSample::new().encode_to_vec().is_empty());
    let decoded = EcuSample::decode(&[]).expect("empty input");
    assert!(!decoded.has_timestamp());
    assert_eq!(decoded.get_field(1), Some(ScalarValue::Float(0.0)));
}

#[test]
fn negative_zero_keeps_its_sign() {
    let mut sample = EcuSample::new();
    sample.set_timestamp(-0.0);
    assert_eq!(hex::encode(sample.encode_to_vec()), "0d00000080");
    let decoded = EcuSample::decode(&sample.encode_to_vec()).unwrap();
    assert!(decoded.timestamp().is_sign_negative());
}

#[test]
fn repeated_tag_keeps_the_last_value() {
    let decoded = InverterSample::decode(&bytes("150000803f1500000040")).unwrap();
    assert_eq!(decoded.temperature(), 2.0);
    assert_eq!(decoded.encode_to_vec(), bytes("1500000040"));
}

#[test]
fn unknown_frames_of_every_wire_type_are_skipped() {
    // tag 9 varint, tag 10 fixed64, tag 11 bytes, tag 12 group{tag 1 varint}, tag 13 fixed32
    let fixture = concat!(
        "48ac02",
        "510102030405060708",
        "5a03616263",
        "630805",
        "64",
        "6d01020304",
        "2d00009644"
    );
    let decoded = InverterSample::decode(&bytes(fixture)).expect("unknown frames skipped");
    assert_eq!(decoded.present_tags(), vec![5]);
    assert_eq!(decoded.speed(), 1200.0);
}

#[test]
fn known_tag_with_other_wire_type_is_ignored() {
    // tag 2 as varint, then tag 5 as fixed32
    let decoded = InverterSample::decode(&bytes("10072d00009644")).unwrap();
    assert!(!decoded.has_temperature());
    assert!(decoded.has_speed());
}

#[test]
fn truncation_is_malformed_input() {
    let err = InverterSample::decode(&bytes("150000")).unwrap_err();
    assert_eq!(err.offset(), 1);
    assert_eq!(
        reason(err),
        Malformed::TruncatedPayload {
            needed: 4,
            remaining: 2
        }
    );

    assert_eq!(
        reason(InverterSample::decode(&bytes("5a05616263")).unwrap_err()),
        Malformed::LengthOverrun {
            length: 5,
            remaining: 3
        }
    );
    assert_eq!(
        reason(InverterSample::decode(&bytes("0d0000803f80")).unwrap_err()),
        Malformed::TruncatedVarint
    );
}

#[test]
fn structurally_invalid_frames_are_malformed_input() {
    assert_eq!(
        reason(EcuSample::decode(&bytes("0500000000")).unwrap_err()),
        Malformed::InvalidTag(0)
    );
    assert_eq!(
        reason(EcuSample::decode(&bytes("0e")).unwrap_err()),
        Malformed::InvalidWireType(6)
    );
    assert_eq!(
        reason(EcuSample::decode(&bytes("64")).unwrap_err()),
        Malformed::UnexpectedEndGroup(12)
    );
    assert_eq!(
        reason(EcuSample::decode(&bytes("63")).unwrap_err()),
        Malformed::UnterminatedGroup(12)
    );
}

#[test]
fn failed_merge_leaves_the_record_untouched() {
    let mut sample = InverterSample::new();
    sample.set_torque(12.0);
    let before = sample.clone();

    let err = sample.merge_from(&bytes("2d000096441500")).unwrap_err();
    assert!(matches!(err, WireError::MalformedInput { .. }));
    assert_eq!(sample, before);

    sample.merge_from(&bytes("2d00009644")).unwrap();
    assert_eq!(sample.torque(), 12.0);
    assert_eq!(sample.speed(), 1200.0);
}
