//! # Constants and type definitions for skygeom
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **unit
//! type aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - Astronomical and geodetic constants (AU, speed of light, WGS84 ellipsoid)
//! - Unit conversions (degrees ↔ radians, arcseconds ↔ radians, days ↔ seconds)
//! - Time origin (J2000)
//! - Type aliases that carry the unit of a quantity in its name
//!
//! Every angle and length handled by the public API is typed with one of the aliases below,
//! so that a signature such as `fn separation(&self, other: &SkyCoord) -> Degree` states its
//! unit explicitly.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

/// MJD epoch of J2000.0 (2000-01-01 12:00:00 TT)
pub const T2000: f64 = 51544.5;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// WGS84 equatorial radius in kilometers
pub const EARTH_MAJOR_AXIS: Kilometer = 6378.137;

/// WGS84 flattening
pub const EARTH_FLATTENING: f64 = 1.0 / 298.257223563;

/// WGS84 polar radius in kilometers
pub const EARTH_MINOR_AXIS: Kilometer = EARTH_MAJOR_AXIS * (1.0 - EARTH_FLATTENING);

/// Speed of light in km/s
pub const VLIGHT: f64 = 2.99792458e5;

/// Speed of light in astronomical units per day
pub const VLIGHT_AU: f64 = VLIGHT / AU * SECONDS_PER_DAY;

/// Sidereal rotation rate of the Earth, in revolutions per UT1 day
pub const EARTH_ROTATION_RATE: f64 = 1.00273790934;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in arcseconds
pub type ArcSec = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in astronomical units
pub type AstronomicalUnit = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Distance in meters
pub type Meter = f64;
/// Modified Julian Date (days)
pub type MJD = f64;

// -------------------------------------------------------------------------------------------------
// Library defaults
// -------------------------------------------------------------------------------------------------

/// Ephemeris selected by [`SkyGeom::default_ephemeris`](crate::skygeom::SkyGeom::default_ephemeris).
pub const DEFAULT_EPHEMERIS: &str = "naif:de432s";

/// Observatory used when no site is given to the geometry helper.
pub const DEFAULT_SITE: &str = "ctio";

/// Environment variable overriding the ephemeris cache directory.
pub const CACHE_DIR_ENV: &str = "SKYGEOM_CACHE_DIR";

#[cfg(test)]
mod constants_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_light_speed_in_au_per_day() {
        assert_relative_eq!(VLIGHT_AU, 173.144_632_674, epsilon = 1e-8);
    }

    #[test]
    fn test_wgs84_polar_radius() {
        assert_relative_eq!(EARTH_MINOR_AXIS, 6356.752_314_245, epsilon = 1e-8);
    }
}
