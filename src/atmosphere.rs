//! # Atmosphere Model
//!
//! Troposphere approximation with a linear temperature lapse, used to turn
//! simulator altitude into barometric readings and indicated airspeed into
//! true airspeed.
//!
//! All functions are pure. Inputs above roughly 11 km are extrapolated along
//! the same lapse rate; the results lose physical meaning but never panic.

/// Specific gas constant for dry air in J/(kg·K)
pub const AIR_CONST: f64 = 287.058;

/// Air density at ground level in kg/m³
pub const GROUND_DENSITY: f64 = 1.225;

/// Ground temperature in °C
pub const TEMP_GROUND_CELSIUS: f64 = 15.0;

/// Ground temperature in K
pub const TEMP_GROUND: f64 = TEMP_GROUND_CELSIUS + 273.0;

/// Temperature lapse rate in K/m
pub const TEMP_LAPSE_RATE: f64 = -0.0065;

/// `-g / R` folded into a single constant
pub const AIR_CONST_FACTOR: f64 = -0.0341631947363104;

/// Exponent of the temperature ratio in the barometric pressure formula
const PRESSURE_EXPONENT: f64 = AIR_CONST_FACTOR / TEMP_LAPSE_RATE;

/// Exponent of the temperature ratio in the density formula
const DENSITY_EXPONENT: f64 = PRESSURE_EXPONENT - 1.0;

/// Static pressure at ground level in Pa implied by the constants above
pub const GROUND_PRESSURE: f64 = GROUND_DENSITY * AIR_CONST * TEMP_GROUND;

/// Air temperature in K at the given altitude in metres
pub fn temperature_at_altitude(altitude: f64) -> f64 {
    TEMP_GROUND + TEMP_LAPSE_RATE * altitude
}

/// Air temperature in °C at the given altitude in metres
pub fn temperature_celsius_at_altitude(altitude: f64) -> f64 {
    TEMP_GROUND_CELSIUS + TEMP_LAPSE_RATE * altitude
}

/// Air density in kg/m³ at the given altitude in metres
pub fn density_at_altitude(altitude: f64) -> f64 {
    let ratio = temperature_at_altitude(altitude) / TEMP_GROUND;
    GROUND_DENSITY * ratio.powf(DENSITY_EXPONENT)
}

/// Static pressure in Pa at the given altitude in metres
pub fn pressure_at_altitude(altitude: f64) -> f64 {
    density_at_altitude(altitude) * temperature_at_altitude(altitude) * AIR_CONST
}

/// Altitude in metres at which the model yields the given static pressure in Pa
///
/// Inverse of [`pressure_at_altitude`].
pub fn pressure_altitude(pressure: f64) -> f64 {
    let ratio = (pressure / GROUND_PRESSURE).powf(1.0 / PRESSURE_EXPONENT);
    TEMP_GROUND * (ratio - 1.0) / TEMP_LAPSE_RATE
}

/// Air density in kg/m³ for the given static pressure in Pa
///
/// Ideal gas relation with the temperature taken from the lapse-rate profile
/// at the matching pressure altitude.
pub fn air_density(pressure: f64) -> f64 {
    let temperature = temperature_at_altitude(pressure_altitude(pressure));
    pressure / (AIR_CONST * temperature)
}

/// True airspeed for an indicated airspeed at the given altitude
///
/// Incompressible approximation: IAS scaled by `sqrt(rho0 / rho)`.
/// Both speeds share whatever unit the caller uses.
pub fn true_airspeed(indicated_airspeed: f64, altitude: f64) -> f64 {
    if indicated_airspeed == 0.0 {
        return 0.0;
    }
    indicated_airspeed * (GROUND_DENSITY / density_at_altitude(altitude)).sqrt()
}
