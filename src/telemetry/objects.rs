//! # Telemetry Object Data
//!
//! Plain data carried by the autopilot telemetry objects the bridge touches.

use crate::units::DEG_TO_RAD;

/// Identity of a telemetry object in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectId {
    ActuatorDesired,
    AltitudeActual,
    AttitudeActual,
    PositionActual,
    TelemetryStats,
}

impl ObjectId {
    /// Object name as registered in the store
    pub fn name(&self) -> &'static str {
        match self {
            ObjectId::ActuatorDesired => "ActuatorDesired",
            ObjectId::AltitudeActual => "AltitudeActual",
            ObjectId::AttitudeActual => "AttitudeActual",
            ObjectId::PositionActual => "PositionActual",
            ObjectId::TelemetryStats => "GCSTelemetryStats",
        }
    }
}

/// Control outputs requested by the autopilot
///
/// Roll, pitch and yaw are normalized to -1.0..=1.0, throttle to 0.0..=1.0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActuatorDesired {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub throttle: f32,
}

/// Barometric altitude reading
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AltitudeActual {
    /// Altitude in metres
    pub altitude: f32,
    /// Air temperature in °C
    pub temperature: f32,
    /// Static pressure in kPa
    pub pressure: f32,
}

/// Vehicle attitude in degrees plus the equivalent quaternion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeActual {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub q1: f32,
    pub q2: f32,
    pub q3: f32,
    pub q4: f32,
}

impl Default for AttitudeActual {
    fn default() -> Self {
        Self::from_euler(0.0, 0.0, 0.0)
    }
}

impl AttitudeActual {
    /// Build an attitude from roll, pitch and yaw in degrees
    ///
    /// The quaternion follows the aerospace Z-Y-X rotation order with `q1`
    /// as the scalar part.
    pub fn from_euler(roll: f64, pitch: f64, yaw: f64) -> Self {
        let (sr, cr) = (roll * DEG_TO_RAD / 2.0).sin_cos();
        let (sp, cp) = (pitch * DEG_TO_RAD / 2.0).sin_cos();
        let (sy, cy) = (yaw * DEG_TO_RAD / 2.0).sin_cos();

        let q1 = cr * cp * cy + sr * sp * sy;
        let q2 = sr * cp * cy - cr * sp * sy;
        let q3 = cr * sp * cy + sr * cp * sy;
        let q4 = cr * cp * sy - sr * sp * cy;

        Self {
            roll: roll as f32,
            pitch: pitch as f32,
            yaw: yaw as f32,
            q1: q1 as f32,
            q2: q2 as f32,
            q3: q3 as f32,
            q4: q4 as f32,
        }
    }
}

/// GPS fix quality reported in [`PositionActual`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FixStatus {
    #[default]
    NoGps,
    NoFix,
    Fix2D,
    Fix3D,
}

/// Global position and velocity
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PositionActual {
    pub status: FixStatus,
    /// Degrees
    pub latitude: f64,
    /// Degrees
    pub longitude: f64,
    /// Metres
    pub altitude: f32,
    /// Degrees from north
    pub heading: f32,
    /// m/s
    pub groundspeed: f32,
    pub velocity_north: f32,
    pub velocity_east: f32,
    pub velocity_down: f32,
    pub satellites: u8,
}

/// State of the ground station telemetry link
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TelemetryStatus {
    #[default]
    Disconnected,
    HandshakeReq,
    HandshakeAck,
    Connected,
}

/// Ground station telemetry link statistics (read-only for the bridge)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TelemetryStats {
    pub status: TelemetryStatus,
    /// Bytes per second
    pub tx_data_rate: f32,
    /// Bytes per second
    pub rx_data_rate: f32,
}

/// Who may write an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadWrite,
    ReadOnly,
}

/// When an object is pushed over the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    Periodic,
    OnChange,
    Manual,
    Never,
}

/// Per-object link settings for both the flight and the ground side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub flight_access: Access,
    pub gcs_access: Access,
    pub flight_telemetry_acked: bool,
    pub flight_update_mode: UpdateMode,
    pub flight_update_period_ms: u32,
    pub gcs_telemetry_acked: bool,
    pub gcs_update_mode: UpdateMode,
    pub gcs_update_period_ms: u32,
}

impl Default for ObjectMetadata {
    fn default() -> Self {
        Self {
            flight_access: Access::ReadWrite,
            gcs_access: Access::ReadWrite,
            flight_telemetry_acked: true,
            flight_update_mode: UpdateMode::OnChange,
            flight_update_period_ms: 0,
            gcs_telemetry_acked: true,
            gcs_update_mode: UpdateMode::OnChange,
            gcs_update_period_ms: 0,
        }
    }
}

impl ObjectMetadata {
    /// Metadata for an object the autopilot produces and the bridge reads
    ///
    /// The flight side streams it periodically without acks; the ground
    /// side never sends it back.
    pub fn input(update_period_ms: u32) -> Self {
        Self {
            flight_access: Access::ReadWrite,
            gcs_access: Access::ReadWrite,
            flight_telemetry_acked: false,
            flight_update_mode: UpdateMode::Periodic,
            flight_update_period_ms: update_period_ms,
            gcs_update_mode: UpdateMode::Never,
            ..Self::default()
        }
    }

    /// Metadata for an object the bridge produces and the autopilot consumes
    ///
    /// The autopilot may not overwrite it and never sends it; the ground side
    /// streams it periodically without acks.
    pub fn output(update_period_ms: u32) -> Self {
        Self {
            flight_access: Access::ReadOnly,
            gcs_access: Access::ReadWrite,
            flight_update_mode: UpdateMode::Never,
            gcs_telemetry_acked: false,
            gcs_update_mode: UpdateMode::Periodic,
            gcs_update_period_ms: update_period_ms,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(att: &AttitudeActual) -> f32 {
        (att.q1 * att.q1 + att.q2 * att.q2 + att.q3 * att.q3 + att.q4 * att.q4).sqrt()
    }

    #[test]
    fn test_level_attitude_is_identity_quaternion() {
        let att = AttitudeActual::default();
        assert_eq!(att.q1, 1.0);
        assert_eq!(att.q2, 0.0);
        assert_eq!(att.q3, 0.0);
        assert_eq!(att.q4, 0.0);
    }

    #[test]
    fn test_quaternion_is_normalized() {
        for (r, p, y) in [(10.0, 20.0, 30.0), (-45.0, 5.0, 270.0), (90.0, -30.0, 180.0)] {
            let att = AttitudeActual::from_euler(r, p, y);
            assert!((norm(&att) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_pure_yaw_quaternion() {
        let att = AttitudeActual::from_euler(0.0, 0.0, 90.0);
        let half = std::f32::consts::FRAC_1_SQRT_2;
        assert!((att.q1 - half).abs() < 1e-6);
        assert!((att.q4 - half).abs() < 1e-6);
        assert!(att.q2.abs() < 1e-6);
        assert!(att.q3.abs() < 1e-6);
        assert_eq!(att.yaw, 90.0);
    }

    #[test]
    fn test_input_metadata() {
        let meta = ObjectMetadata::input(75);
        assert_eq!(meta.flight_update_mode, UpdateMode::Periodic);
        assert_eq!(meta.flight_update_period_ms, 75);
        assert!(!meta.flight_telemetry_acked);
        assert_eq!(meta.gcs_update_mode, UpdateMode::Never);
        assert_eq!(meta.flight_access, Access::ReadWrite);
    }

    #[test]
    fn test_output_metadata() {
        let meta = ObjectMetadata::output(250);
        assert_eq!(meta.flight_access, Access::ReadOnly);
        assert_eq!(meta.flight_update_mode, UpdateMode::Never);
        assert_eq!(meta.gcs_update_mode, UpdateMode::Periodic);
        assert_eq!(meta.gcs_update_period_ms, 250);
        assert!(!meta.gcs_telemetry_acked);
    }

    #[test]
    fn test_object_names() {
        assert_eq!(ObjectId::ActuatorDesired.name(), "ActuatorDesired");
        assert_eq!(ObjectId::TelemetryStats.name(), "GCSTelemetryStats");
    }
}
