//! # Ground-based observers
//!
//! Geodetic description of an observing site and its Earth-fixed (ITRS) position.
//!
//! ## Overview
//!
//! - [`EarthLocation`] stores the WGS84 geodetic coordinates of a site (longitude, latitude,
//!   height) together with its **normalized parallax constants** `ρ·cos φ'` and `ρ·sin φ'`.
//! - [`EarthLocation::itrs_position`] returns the geocentric Earth-fixed position in kilometers.
//! - [`sites`] holds the registry of named observatories (`"ctio"`, `"kpno"`, ...) used to resolve
//!   a site name into an [`EarthLocation`].
//!
//! The Earth-fixed position does not depend on time once polar motion is neglected: the
//! observation time only enters when the ITRS vector is rotated into a celestial frame
//! (see [`crate::coordinates::transforms`]).
//!
//! ## Ellipsoid
//!
//! The parallax constants are derived from the WGS84 ellipsoid
//! [`EARTH_MAJOR_AXIS`](crate::constants::EARTH_MAJOR_AXIS) /
//! [`EARTH_MINOR_AXIS`](crate::constants::EARTH_MINOR_AXIS), with the classical
//! parametric-latitude formulation, which is exact for a point at height `h` above the ellipsoid.
use std::fmt;

use nalgebra::Vector3;

use crate::constants::{Degree, Kilometer, Meter, AU, EARTH_MAJOR_AXIS, EARTH_MINOR_AXIS};
use crate::skygeom_errors::SkyGeomError;

pub mod sites;

/// Geodetic location of an observer on the Earth.
///
/// Longitude is counted positive toward the east, latitude is geodetic (WGS84).
#[derive(Debug, Clone, PartialEq)]
pub struct EarthLocation {
    /// East longitude (degrees).
    pub longitude: Degree,
    /// Geodetic latitude (degrees).
    pub latitude: Degree,
    /// Height above the WGS84 ellipsoid (meters).
    pub height: Meter,
    /// Normalized distance to the rotation axis, in units of the equatorial radius.
    pub rho_cos_phi: f64,
    /// Normalized distance to the equatorial plane, in units of the equatorial radius.
    pub rho_sin_phi: f64,
    /// Optional human readable name of the site.
    pub name: Option<String>,
}

impl EarthLocation {
    /// Create a location from WGS84 geodetic coordinates.
    ///
    /// Arguments
    /// ---------
    /// * `longitude`: east longitude in degrees
    /// * `latitude`: geodetic latitude in degrees, within [-90, 90]
    /// * `height`: height above the ellipsoid in meters
    ///
    /// Return
    /// ------
    /// * the location, or [`SkyGeomError::InvalidDeclination`] when the latitude is out of range
    pub fn from_geodetic(
        longitude: Degree,
        latitude: Degree,
        height: Meter,
    ) -> Result<Self, SkyGeomError> {
        if !latitude.is_finite() || latitude.abs() > 90.0 {
            return Err(SkyGeomError::InvalidDeclination(latitude));
        }
        let (rho_cos_phi, rho_sin_phi) = geodetic_to_parallax(latitude, height / 1000.0);
        Ok(EarthLocation {
            longitude,
            latitude,
            height,
            rho_cos_phi,
            rho_sin_phi,
            name: None,
        })
    }

    /// Attach a name to the location.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Geocentric Earth-fixed (ITRS) position of the site, in kilometers.
    pub fn itrs_position(&self) -> Vector3<Kilometer> {
        let (sin_lon, cos_lon) = self.longitude.to_radians().sin_cos();

        Vector3::new(
            EARTH_MAJOR_AXIS * self.rho_cos_phi * cos_lon,
            EARTH_MAJOR_AXIS * self.rho_cos_phi * sin_lon,
            EARTH_MAJOR_AXIS * self.rho_sin_phi,
        )
    }

    /// Geocentric Earth-fixed (ITRS) position of the site, in astronomical units.
    pub fn itrs_position_au(&self) -> Vector3<f64> {
        self.itrs_position() / AU
    }
}

impl fmt::Display for EarthLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name} ")?;
        }
        write!(
            f,
            "(lon: {:.6}°, lat: {:.6}°, h: {:.1} m)",
            self.longitude, self.latitude, self.height
        )
    }
}

/// Convert geodetic latitude and height into normalized parallax coordinates
/// on the Earth.
///
/// The resulting values are dimensionless and expressed in units of the Earth's equatorial
/// radius (`EARTH_MAJOR_AXIS`).
///
/// Arguments
/// ---------
/// * `lat` - Geodetic latitude of the observer in **radians**.
/// * `height` - Observer's altitude above the reference ellipsoid in **kilometers**.
///
/// Returns
/// -------
/// A tuple `(rho_cos_phi, rho_sin_phi)`.
///
/// ```text
/// u = atan( (sin φ * (b/a)) / cos φ )
/// ρ_sinφ = (b/a) * sin u + (h/a) * sin φ
/// ρ_cosφ = cos u + (h/a) * cos φ
/// ```
pub fn lat_alt_to_parallax(lat: f64, height: Kilometer) -> (f64, f64) {
    let axis_ratio = EARTH_MINOR_AXIS / EARTH_MAJOR_AXIS;

    // parametric latitude
    let u = (lat.sin() * axis_ratio).atan2(lat.cos());

    let rho_sin_phi = axis_ratio * u.sin() + (height / EARTH_MAJOR_AXIS) * lat.sin();
    let rho_cos_phi = u.cos() + (height / EARTH_MAJOR_AXIS) * lat.cos();

    (rho_cos_phi, rho_sin_phi)
}

/// Same as [`lat_alt_to_parallax`] with the latitude given in **degrees**.
pub fn geodetic_to_parallax(lat: Degree, height: Kilometer) -> (f64, f64) {
    lat_alt_to_parallax(lat.to_radians(), height)
}

#[cfg(test)]
mod observer_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn geodetic_to_parallax_test() {
        // latitude and height of Pan-STARRS 1, Haleakala
        let (pxy1, pz1) = geodetic_to_parallax(20.707233557, 3.067694);
        assert_abs_diff_eq!(pxy1, 0.9362410003211518, epsilon = 1e-8);
        assert_abs_diff_eq!(pz1, 0.35154299856304305, epsilon = 1e-8);
    }

    #[test]
    fn test_itrs_position_equator_and_pole() {
        let equator = EarthLocation::from_geodetic(90.0, 0.0, 0.0).unwrap();
        assert_abs_diff_eq!(
            equator.itrs_position(),
            Vector3::new(0.0, EARTH_MAJOR_AXIS, 0.0),
            epsilon = 1e-9
        );

        let pole = EarthLocation::from_geodetic(0.0, 90.0, 1000.0).unwrap();
        assert_abs_diff_eq!(
            pole.itrs_position(),
            Vector3::new(0.0, 0.0, EARTH_MINOR_AXIS + 1.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_ctio_itrs_position() {
        // WGS84 geocentric coordinates of Cerro Tololo
        let ctio = EarthLocation::from_geodetic(-70.815, -30.16527778, 2215.0).unwrap();
        let pos = ctio.itrs_position();
        assert_abs_diff_eq!(pos.x, 1814.3037455, epsilon = 1e-6);
        assert_abs_diff_eq!(pos.y, -5214.3657435, epsilon = 1e-6);
        assert_abs_diff_eq!(pos.z, -3187.3405662, epsilon = 1e-6);
    }

    #[test]
    fn test_invalid_latitude() {
        assert_eq!(
            EarthLocation::from_geodetic(0.0, 91.0, 0.0),
            Err(SkyGeomError::InvalidDeclination(91.0))
        );
    }

    #[test]
    fn test_display() {
        let loc = EarthLocation::from_geodetic(-70.815, -30.16527778, 2215.0)
            .unwrap()
            .with_name("ctio");
        assert_eq!(
            format!("{loc}"),
            "ctio (lon: -70.815000°, lat: -30.165278°, h: 2215.0 m)"
        );
    }
}
