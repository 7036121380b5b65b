//! # DeviceLink Protocol Constants
//!
//! Packet layout shared by the encoder and decoder.
//!
//! A packet is ASCII text made of fields separated by `/`. The first field is
//! the packet kind. A key/value field is written `id\value`; a bare `id` in a
//! request asks the simulator to report that parameter in its answer.
//!
//! Control ids come in get/set pairs; the bridge only uses the odd set ids.
//!
//! ```text
//! R/0/30/40/42/46/48/60/62/81\0.5000/85\0.1000/87\-0.0500/89\0.0000/
//! A/0\12.340/30\245.0/40\812.5/42\87.3/46\-1.2/48\0.4/60\45.0021/62\-93.0007/
//! ```

/// Field separator
pub const FIELD_SEPARATOR: char = '/';

/// Separator between parameter id and value
pub const VALUE_SEPARATOR: char = '\\';

/// Packet kind sent to the simulator
pub const PACKET_REQUEST: &str = "R";

/// Packet kind received from the simulator
pub const PACKET_ANSWER: &str = "A";

/// Simulator time in seconds
pub const PARAM_TIME: u16 = 0;

/// Indicated airspeed in km/h
pub const PARAM_IAS: u16 = 30;

/// Altitude above sea level in metres
pub const PARAM_ALTITUDE: u16 = 40;

/// Azimuth (heading) in degrees
pub const PARAM_AZIMUTH: u16 = 42;

/// Roll in degrees, positive left wing down
pub const PARAM_ROLL: u16 = 46;

/// Pitch in degrees, positive nose up
pub const PARAM_PITCH: u16 = 48;

/// Latitude in degrees
pub const PARAM_LATITUDE: u16 = 60;

/// Longitude in degrees
pub const PARAM_LONGITUDE: u16 = 62;

/// Parameters requested from and reported by the simulator, in request order
pub const ANSWER_PARAMS: [u16; 8] = [
    PARAM_TIME,
    PARAM_IAS,
    PARAM_ALTITUDE,
    PARAM_AZIMUTH,
    PARAM_ROLL,
    PARAM_PITCH,
    PARAM_LATITUDE,
    PARAM_LONGITUDE,
];

/// Engine power, -1.0 (idle) ..= 1.0 (full)
pub const CMD_POWER: u16 = 81;

/// Aileron deflection, -1.0..=1.0
pub const CMD_AILERONS: u16 = 85;

/// Elevator deflection, -1.0..=1.0
pub const CMD_ELEVATOR: u16 = 87;

/// Rudder deflection, -1.0..=1.0
pub const CMD_RUDDER: u16 = 89;

/// Largest datagram the bridge expects to receive
pub const MAX_DATAGRAM_SIZE: usize = 2048;

/// Human readable name of an answer parameter
pub fn param_name(id: u16) -> &'static str {
    match id {
        PARAM_TIME => "time",
        PARAM_IAS => "ias",
        PARAM_ALTITUDE => "altitude",
        PARAM_AZIMUTH => "azimuth",
        PARAM_ROLL => "roll",
        PARAM_PITCH => "pitch",
        PARAM_LATITUDE => "latitude",
        PARAM_LONGITUDE => "longitude",
        _ => "unknown",
    }
}
