//! # Unit Conversion Constants
//!
//! Fixed conversion factors applied where values cross the simulator or
//! telemetry-object boundary. Business logic works in SI units throughout.

use std::f64::consts::PI;

/// Metres per second to kilometres per hour
pub const MPS_TO_KMH: f64 = 3.6;

/// Kilometres per hour to metres per second
pub const KMH_TO_MPS: f64 = 1.0 / MPS_TO_KMH;

/// Pascal per kilopascal
pub const PA_PER_KPA: f64 = 1000.0;

/// Degrees to radians
pub const DEG_TO_RAD: f64 = PI / 180.0;

/// Metres per degree of latitude (60 nautical miles of 1852 m)
pub const M_PER_DEG: f64 = 60.0 * 1852.0;

// Imperial and inverse factors. DeviceLink answers are metric, so the
// decoder does not apply these.

/// Feet to metres
pub const FT_TO_M: f64 = 0.3048;

/// Knots to metres per second
pub const KT_TO_MPS: f64 = 0.514444444;

/// Inches of mercury to kilopascal
pub const INHG_TO_KPA: f64 = 3.386;

/// Radians to degrees
pub const RAD_TO_DEG: f64 = 180.0 / PI;
