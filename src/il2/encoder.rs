//! # DeviceLink Packet Encoder
//!
//! Encodes autopilot control outputs into simulator command packets.

use std::fmt::Write;

use bytes::Bytes;

use super::protocol::*;
use crate::telemetry::ActuatorDesired;

/// Clamp a normalized value into range, mapping NaN to zero
///
/// Adding zero also folds `-0.0` into `0.0` so the text never shows `-0.0000`.
fn clamp_finite(value: f32, min: f32, max: f32) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    f64::from(value.clamp(min, max)) + 0.0
}

/// Encode a complete command packet
///
/// # Arguments
///
/// * `actuator` - Control outputs requested by the autopilot
///
/// # Returns
///
/// * `Bytes` - ASCII request packet: answer parameter requests, then the
///   power, aileron, elevator and rudder commands
///
/// # Examples
///
/// ```
/// use hitl_bridge::il2::encoder::encode_outbound;
/// use hitl_bridge::telemetry::ActuatorDesired;
///
/// let packet = encode_outbound(&ActuatorDesired::default());
/// assert!(packet.starts_with(b"R/0/30/40/"));
/// ```
pub fn encode_outbound(actuator: &ActuatorDesired) -> Bytes {
    // Simulator power runs from -1 (idle) to 1 (full)
    let power = clamp_finite(actuator.throttle, 0.0, 1.0) * 2.0 - 1.0;
    let ailerons = clamp_finite(actuator.roll, -1.0, 1.0);
    // Simulator elevator is positive nose down
    let elevator = clamp_finite(-actuator.pitch, -1.0, 1.0);
    let rudder = clamp_finite(actuator.yaw, -1.0, 1.0);

    let mut packet = String::with_capacity(96);
    packet.push_str(PACKET_REQUEST);
    for id in ANSWER_PARAMS {
        let _ = write!(packet, "{}{}", FIELD_SEPARATOR, id);
    }
    packet.push(FIELD_SEPARATOR);

    // Writing into a String cannot fail
    for (id, value) in [
        (CMD_POWER, power),
        (CMD_AILERONS, ailerons),
        (CMD_ELEVATOR, elevator),
        (CMD_RUDDER, rudder),
    ] {
        let _ = write!(packet, "{}{}{:.4}{}", id, VALUE_SEPARATOR, value + 0.0, FIELD_SEPARATOR);
    }

    Bytes::from(packet)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_text(packet: &Bytes) -> &str {
        std::str::from_utf8(packet).unwrap()
    }

    #[test]
    fn test_encode_neutral_packet() {
        let packet = encode_outbound(&ActuatorDesired::default());
        assert_eq!(
            as_text(&packet),
            "R/0/30/40/42/46/48/60/62/81\\-1.0000/85\\0.0000/87\\0.0000/89\\0.0000/"
        );
    }

    #[test]
    fn test_encode_control_values() {
        let actuator = ActuatorDesired { roll: 0.25, pitch: 0.5, yaw: -0.1, throttle: 0.8 };

        let packet = encode_outbound(&actuator);

        assert_eq!(
            as_text(&packet),
            "R/0/30/40/42/46/48/60/62/81\\0.6000/85\\0.2500/87\\-0.5000/89\\-0.1000/"
        );
    }

    #[test]
    fn test_encode_half_throttle_is_mid_power() {
        let actuator = ActuatorDesired { throttle: 0.5, ..ActuatorDesired::default() };
        assert!(as_text(&encode_outbound(&actuator)).contains("/81\\0.0000/"));
    }

    #[test]
    fn test_encode_clamps_out_of_range_outputs() {
        let actuator = ActuatorDesired { roll: 3.0, pitch: -2.0, yaw: -7.0, throttle: 1.5 };
        let packet = encode_outbound(&actuator);
        let text = as_text(&packet);

        assert!(text.contains("/81\\1.0000/"));
        assert!(text.contains("/85\\1.0000/"));
        assert!(text.contains("/87\\1.0000/"));
        assert!(text.contains("/89\\-1.0000/"));
    }

    #[test]
    fn test_encode_negative_throttle_is_idle() {
        let actuator = ActuatorDesired { throttle: -1.0, ..ActuatorDesired::default() };
        let packet = encode_outbound(&actuator);
        assert!(as_text(&packet).contains("/81\\-1.0000/"));
    }

    #[test]
    fn test_encode_nan_outputs_as_neutral() {
        let actuator = ActuatorDesired {
            roll: f32::NAN,
            pitch: f32::NAN,
            yaw: f32::NAN,
            throttle: f32::NAN,
        };
        let packet = encode_outbound(&actuator);
        let text = as_text(&packet);

        assert!(!text.contains("NaN"));
        assert!(text.contains("/81\\-1.0000/"));
        assert!(text.contains("/85\\0.0000/"));
        assert!(text.contains("/89\\0.0000/"));
    }

    #[test]
    fn test_encode_is_ascii() {
        let actuator = ActuatorDesired { roll: -0.333, pitch: 0.123, yaw: 0.9, throttle: 0.42 };
        let packet = encode_outbound(&actuator);
        assert!(packet.is_ascii());
        assert!(packet.ends_with(b"/"));
    }
}
