//! # DeviceLink Packet Decoder
//!
//! Decodes simulator answer packets into flight snapshots.

use super::protocol::*;
use crate::atmosphere::true_airspeed;
use crate::error::DecodeError;
use crate::flight::{FlightSnapshot, Origin};
use crate::units::{DEG_TO_RAD, KMH_TO_MPS};

/// Raw answer values in [`ANSWER_PARAMS`] order, simulator units
type AnswerValues = [f64; ANSWER_PARAMS.len()];

/// Split an answer packet into its parameter values
///
/// Every answer parameter must appear exactly once; order is free.
fn parse_answer(datagram: &[u8]) -> Result<AnswerValues, DecodeError> {
    let text = std::str::from_utf8(datagram)
        .map_err(|_| DecodeError::Malformed("packet is not ASCII text".to_string()))?;
    let text = text.trim_end_matches(['\0', '\r', '\n']);
    let text = text.strip_suffix(FIELD_SEPARATOR).unwrap_or(text);

    let mut fields = text.split(FIELD_SEPARATOR);
    match fields.next() {
        Some(PACKET_ANSWER) => {}
        other => {
            return Err(DecodeError::Malformed(format!(
                "expected answer packet, got kind {:?}",
                other.unwrap_or_default()
            )))
        }
    }

    let mut values: [Option<f64>; ANSWER_PARAMS.len()] = [None; ANSWER_PARAMS.len()];

    for field in fields {
        let (id, value) = field.split_once(VALUE_SEPARATOR).ok_or_else(|| {
            DecodeError::Malformed(format!("field {:?} has no value", field))
        })?;

        let id: u16 = id
            .parse()
            .map_err(|_| DecodeError::Malformed(format!("invalid parameter id {:?}", id)))?;

        let slot = ANSWER_PARAMS
            .iter()
            .position(|&param| param == id)
            .ok_or_else(|| DecodeError::Malformed(format!("unexpected parameter {}", id)))?;

        if values[slot].is_some() {
            return Err(DecodeError::Malformed(format!("duplicate parameter {}", id)));
        }

        let value: f64 = value.parse().map_err(|_| {
            DecodeError::Malformed(format!("invalid value {:?} for {}", value, param_name(id)))
        })?;

        values[slot] = Some(value);
    }

    let mut parsed = [0.0; ANSWER_PARAMS.len()];
    for (slot, value) in values.iter().enumerate() {
        parsed[slot] = value.ok_or_else(|| {
            DecodeError::Malformed(format!("missing parameter {}", ANSWER_PARAMS[slot]))
        })?;
    }

    Ok(parsed)
}

// Positions in ANSWER_PARAMS
const SLOT_TIME: usize = 0;
const SLOT_IAS: usize = 1;
const SLOT_ALTITUDE: usize = 2;
const SLOT_AZIMUTH: usize = 3;
const SLOT_ROLL: usize = 4;
const SLOT_PITCH: usize = 5;
const SLOT_LATITUDE: usize = 6;
const SLOT_LONGITUDE: usize = 7;

/// Parsed value at a slot, checked to be finite
fn value(values: &AnswerValues, slot: usize) -> Result<f64, DecodeError> {
    let value = values[slot];
    if !value.is_finite() {
        return Err(DecodeError::OutOfRange { field: param_name(ANSWER_PARAMS[slot]), value });
    }
    Ok(value)
}

/// Decode a simulator answer packet
///
/// # Arguments
///
/// * `datagram` - Raw datagram payload
/// * `origin` - Reference point for local positions
///
/// # Returns
///
/// * `Result<FlightSnapshot, DecodeError>` - Snapshot in SI units with rates
///   left at zero (see [`crate::flight::derive_rates`])
///
/// # Errors
///
/// Returns `Malformed` if:
/// - The packet is not text or not an answer packet
/// - A field is missing, duplicated, unknown or not numeric
///
/// Returns `OutOfRange` if:
/// - A value is not finite
/// - Time is negative, or latitude/longitude fall outside the globe
pub fn decode_inbound(datagram: &[u8], origin: &Origin) -> Result<FlightSnapshot, DecodeError> {
    let values = parse_answer(datagram)?;

    let t = value(&values, SLOT_TIME)?;
    if t < 0.0 {
        return Err(DecodeError::OutOfRange { field: param_name(PARAM_TIME), value: t });
    }

    let latitude = value(&values, SLOT_LATITUDE)?;
    if latitude.abs() > 90.0 {
        return Err(DecodeError::OutOfRange { field: param_name(PARAM_LATITUDE), value: latitude });
    }

    let longitude = value(&values, SLOT_LONGITUDE)?;
    if longitude.abs() > 180.0 {
        return Err(DecodeError::OutOfRange {
            field: param_name(PARAM_LONGITUDE),
            value: longitude,
        });
    }

    let ias = value(&values, SLOT_IAS)? * KMH_TO_MPS;
    let z = value(&values, SLOT_ALTITUDE)?;
    let azimuth = value(&values, SLOT_AZIMUTH)?;
    // Simulator reports roll positive left wing down
    let roll = -value(&values, SLOT_ROLL)?;
    let pitch = value(&values, SLOT_PITCH)?;

    let tas = true_airspeed(ias, z);
    // No wind: ground track is the horizontal component of TAS
    let groundspeed = tas * (pitch * DEG_TO_RAD).cos();
    let (x, y) = origin.to_local(latitude, longitude);

    Ok(FlightSnapshot {
        t,
        ias,
        tas,
        groundspeed,
        x,
        y,
        z,
        azimuth,
        pitch,
        roll,
        ..FlightSnapshot::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_match_answer_params() {
        assert_eq!(ANSWER_PARAMS[SLOT_TIME], PARAM_TIME);
        assert_eq!(ANSWER_PARAMS[SLOT_IAS], PARAM_IAS);
        assert_eq!(ANSWER_PARAMS[SLOT_ALTITUDE], PARAM_ALTITUDE);
        assert_eq!(ANSWER_PARAMS[SLOT_AZIMUTH], PARAM_AZIMUTH);
        assert_eq!(ANSWER_PARAMS[SLOT_ROLL], PARAM_ROLL);
        assert_eq!(ANSWER_PARAMS[SLOT_PITCH], PARAM_PITCH);
        assert_eq!(ANSWER_PARAMS[SLOT_LATITUDE], PARAM_LATITUDE);
        assert_eq!(ANSWER_PARAMS[SLOT_LONGITUDE], PARAM_LONGITUDE);
    }

    fn origin() -> Origin {
        Origin::new(45.0, -93.0)
    }

    const VALID: &str = "A/0\\12.5/30\\360/40\\0/42\\90/46\\10/48\\0/60\\45.001/62\\-93/";

    #[test]
    fn test_decode_valid_answer() {
        let snapshot = decode_inbound(VALID.as_bytes(), &origin()).unwrap();

        assert_eq!(snapshot.t, 12.5);
        assert!((snapshot.ias - 100.0).abs() < 1e-9);
        // Sea level: TAS equals IAS
        assert!((snapshot.tas - 100.0).abs() < 1e-9);
        assert!((snapshot.groundspeed - 100.0).abs() < 1e-9);
        assert_eq!(snapshot.z, 0.0);
        assert_eq!(snapshot.azimuth, 90.0);
        assert_eq!(snapshot.roll, -10.0);
        assert_eq!(snapshot.pitch, 0.0);
        assert!(snapshot.x.abs() < 1e-9);
        assert!((snapshot.y - 111.12).abs() < 1e-6);
        assert_eq!((snapshot.dx, snapshot.dy, snapshot.dz, snapshot.dt), (0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_decode_field_order_is_free() {
        let reordered = "A/62\\-93/60\\45.001/48\\0/46\\10/42\\90/40\\0/30\\360/0\\12.5";
        let a = decode_inbound(VALID.as_bytes(), &origin()).unwrap();
        let b = decode_inbound(reordered.as_bytes(), &origin()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_decode_tolerates_line_ending() {
        let packet = format!("{}\r\n", VALID);
        assert!(decode_inbound(packet.as_bytes(), &origin()).is_ok());
    }

    #[test]
    fn test_decode_altitude_raises_tas_and_pitch_lowers_groundspeed() {
        let packet = "A/0\\1/30\\360/40\\3000/42\\0/46\\0/48\\30/60\\45/62\\-93/";
        let snapshot = decode_inbound(packet.as_bytes(), &origin()).unwrap();
        assert!(snapshot.tas > snapshot.ias);
        let expected = snapshot.tas * (30.0f64).to_radians().cos();
        assert!((snapshot.groundspeed - expected).abs() < 1e-9);
    }

    #[test]
    fn test_decode_missing_field() {
        let packet = "A/0\\12.5/30\\360/40\\0/42\\90/46\\10/48\\0/60\\45.001/";
        match decode_inbound(packet.as_bytes(), &origin()) {
            Err(DecodeError::Malformed(msg)) => assert!(msg.contains("missing parameter 62")),
            other => panic!("Expected Malformed, got: {:?}", other),
        }
    }

    #[test]
    fn test_decode_extra_field() {
        let packet = format!("{}64\\1.0/", VALID);
        assert!(matches!(
            decode_inbound(packet.as_bytes(), &origin()),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_duplicate_field() {
        let packet = format!("{}30\\360/", VALID);
        match decode_inbound(packet.as_bytes(), &origin()) {
            Err(DecodeError::Malformed(msg)) => assert!(msg.contains("duplicate")),
            other => panic!("Expected Malformed, got: {:?}", other),
        }
    }

    #[test]
    fn test_decode_wrong_packet_kind() {
        let packet = VALID.replacen('A', "R", 1);
        assert!(matches!(
            decode_inbound(packet.as_bytes(), &origin()),
            Err(DecodeError::Malformed(_))
        ));
        assert!(matches!(decode_inbound(b"", &origin()), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_decode_non_numeric_value() {
        let packet = VALID.replace("40\\0", "40\\high");
        assert!(matches!(
            decode_inbound(packet.as_bytes(), &origin()),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_field_without_value() {
        let packet = VALID.replace("42\\90", "42");
        assert!(matches!(
            decode_inbound(packet.as_bytes(), &origin()),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_binary_garbage() {
        let garbage = [0xFFu8, 0xFE, 0x00, 0x41];
        assert!(matches!(decode_inbound(&garbage, &origin()), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_decode_out_of_range_latitude() {
        let packet = VALID.replace("60\\45.001", "60\\95.0");
        assert_eq!(
            decode_inbound(packet.as_bytes(), &origin()),
            Err(DecodeError::OutOfRange { field: "latitude", value: 95.0 })
        );
    }

    #[test]
    fn test_decode_non_finite_value() {
        let packet = VALID.replace("30\\360", "30\\NaN");
        assert!(matches!(
            decode_inbound(packet.as_bytes(), &origin()),
            Err(DecodeError::OutOfRange { field: "ias", .. })
        ));
    }

    #[test]
    fn test_decode_non_finite_reports_its_own_field() {
        let packet = VALID.replace("/40\\0/", "/40\\inf/");
        assert!(matches!(
            decode_inbound(packet.as_bytes(), &origin()),
            Err(DecodeError::OutOfRange { field: "altitude", .. })
        ));
    }

    #[test]
    fn test_decode_negative_time() {
        let packet = VALID.replace("0\\12.5", "0\\-1");
        assert!(matches!(
            decode_inbound(packet.as_bytes(), &origin()),
            Err(DecodeError::OutOfRange { field: "time", .. })
        ));
    }
}
