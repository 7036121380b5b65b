//! # Flight State
//!
//! Simulator vehicle state at one instant, and the rate derivation between
//! two consecutive states.

use crate::units::{DEG_TO_RAD, M_PER_DEG};

/// Geodetic reference point that local positions are measured from
///
/// Local coordinates use a flat-earth approximation around the origin:
/// `y` metres north and `x` metres east.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Origin {
    /// Degrees
    pub latitude: f64,
    /// Degrees
    pub longitude: f64,
}

impl Origin {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    fn metres_per_degree_longitude(&self) -> f64 {
        M_PER_DEG * (self.latitude * DEG_TO_RAD).cos()
    }

    /// Local `(x, y)` in metres for a latitude/longitude in degrees
    pub fn to_local(&self, latitude: f64, longitude: f64) -> (f64, f64) {
        let x = (longitude - self.longitude) * self.metres_per_degree_longitude();
        let y = (latitude - self.latitude) * M_PER_DEG;
        (x, y)
    }

    /// Latitude/longitude in degrees for a local `(x, y)` in metres
    pub fn to_geodetic(&self, x: f64, y: f64) -> (f64, f64) {
        let latitude = self.latitude + y / M_PER_DEG;
        let longitude = self.longitude + x / self.metres_per_degree_longitude();
        (latitude, longitude)
    }
}

/// Vehicle state decoded from one simulator answer packet
///
/// Speeds are in m/s, positions in metres relative to the reference origin
/// (`x` east, `y` north, `z` up), angles in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlightSnapshot {
    /// Simulator time in seconds
    pub t: f64,
    /// Seconds since the previous snapshot, never negative
    pub dt: f64,

    /// Indicated airspeed
    pub ias: f64,
    /// True airspeed
    pub tas: f64,
    pub groundspeed: f64,

    pub x: f64,
    pub y: f64,
    pub z: f64,

    /// Velocity, derived from consecutive positions
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,

    pub azimuth: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl FlightSnapshot {
    /// Horizontal speed from the derived velocity components
    pub fn horizontal_speed(&self) -> f64 {
        self.dx.hypot(self.dy)
    }
}

/// Fill the rate fields of `current` from the preceding snapshot
///
/// Velocities are the position deltas divided by the time delta. When the
/// time delta is not positive (first sample, duplicate or reordered packet)
/// the rates of `old` are carried over and `dt` is reported as zero.
pub fn derive_rates(current: FlightSnapshot, old: Option<&FlightSnapshot>) -> FlightSnapshot {
    let Some(old) = old else {
        return FlightSnapshot {
            dt: 0.0,
            dx: 0.0,
            dy: 0.0,
            dz: 0.0,
            ..current
        };
    };

    let dt = current.t - old.t;
    if dt <= 0.0 || dt.is_nan() {
        return FlightSnapshot {
            dt: 0.0,
            dx: old.dx,
            dy: old.dy,
            dz: old.dz,
            ..current
        };
    }

    FlightSnapshot {
        dt,
        dx: (current.x - old.x) / dt,
        dy: (current.y - old.y) / dt,
        dz: (current.z - old.z) / dt,
        ..current
    }
}
