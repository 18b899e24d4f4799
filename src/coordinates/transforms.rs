//! Conversions between the ICRS, GCRS and ITRS frames at one observation time.
//!
//! An [`EarthFrameTransform`] is built once per observation time. It samples the ephemeris for
//! the barycentric state of the Earth and evaluates the Earth rotation matrix, then converts any
//! number of coordinates:
//!
//! ```text
//!        translate by -E_bary            rotate by R = R3(GAST)·N·P
//! ICRS ─────────────────────────> GCRS ────────────────────────────> ITRS
//!        + annual aberration              (distance preserved)
//! ```
//!
//! * **ICRS → GCRS**: the barycentric vector is shifted to the geocenter and its direction
//!   corrected for the annual aberration of an observer moving with the Earth. The geocentric
//!   distance is kept. Coordinates without distance are treated as infinitely far: only the
//!   aberration applies.
//! * **GCRS ↔ ITRS**: pure rotation, `x_itrs = R · x_gcrs` and `x_gcrs = Rᵀ · x_itrs`.
//!
//! Polar motion, frame bias and gravitational light deflection are neglected (sub-arcsecond).
use hifitime::{ut1::Ut1Provider, Epoch};
use log::debug;
use nalgebra::{Matrix3, Vector3};

use crate::{
    ephemeris::SolarSystemEphemeris,
    observers::EarthLocation,
    ref_system::{correct_aberration, earth_rotation_matrix},
    skygeom_errors::SkyGeomError,
    time::format_isot,
};

use super::{Frame, SkyCoord};

/// Frame conversions at a fixed observation time.
#[derive(Debug, Clone)]
pub struct EarthFrameTransform {
    obstime: Epoch,
    earth_position: Vector3<f64>,
    earth_velocity: Vector3<f64>,
    gcrs_to_itrs: Matrix3<f64>,
}

/// Rebuild a coordinate from a Cartesian vector, keeping the "no distance" flag of the input.
fn rebuild(
    vector: &Vector3<f64>,
    frame: Frame,
    with_distance: bool,
) -> Result<SkyCoord, SkyGeomError> {
    let coord = SkyCoord::from_cartesian(vector, frame)?;
    Ok(if with_distance {
        coord
    } else {
        coord.without_distance()
    })
}

impl EarthFrameTransform {
    /// Prepare the conversions at `obstime`.
    ///
    /// Arguments
    /// ---------
    /// * `obstime`: the observation time
    /// * `ephemeris`: source of the barycentric Earth state
    /// * `ut1_provider`: optional Earth orientation parameters for the sidereal time
    ///
    /// Return
    /// ------
    /// * the transform, or the ephemeris error (missing segment, epoch out of coverage)
    pub fn new(
        obstime: &Epoch,
        ephemeris: &SolarSystemEphemeris,
        ut1_provider: Option<&Ut1Provider>,
    ) -> Result<Self, SkyGeomError> {
        let (earth_position, earth_velocity) = ephemeris.earth_barycentric_state(obstime)?;
        debug!(
            "Earth barycentric state at {}: {:?} AU, {:?} AU/day",
            format_isot(obstime),
            earth_position.as_slice(),
            earth_velocity.as_slice()
        );

        Ok(EarthFrameTransform {
            obstime: *obstime,
            earth_position,
            earth_velocity,
            gcrs_to_itrs: earth_rotation_matrix(obstime, ut1_provider),
        })
    }

    pub fn obstime(&self) -> Epoch {
        self.obstime
    }

    /// Barycentric position of the geocenter (AU).
    pub fn earth_position(&self) -> Vector3<f64> {
        self.earth_position
    }

    /// Barycentric velocity of the geocenter (AU/day).
    pub fn earth_velocity(&self) -> Vector3<f64> {
        self.earth_velocity
    }

    /// Rotation matrix from GCRS axes to ITRS axes.
    pub fn rotation(&self) -> Matrix3<f64> {
        self.gcrs_to_itrs
    }

    pub fn gcrs_frame(&self) -> Frame {
        Frame::Gcrs {
            obstime: self.obstime,
        }
    }

    pub fn itrs_frame(&self) -> Frame {
        Frame::Itrs {
            obstime: self.obstime,
        }
    }

    fn expect_frame(&self, coord: &SkyCoord, expected: Frame) -> Result<(), SkyGeomError> {
        if coord.frame() == expected {
            Ok(())
        } else {
            Err(SkyGeomError::FrameMismatch {
                expected: expected.to_string(),
                found: coord.frame().to_string(),
            })
        }
    }

    /// Barycentric ICRS → geocentric GCRS (parallax and annual aberration).
    pub fn icrs_to_gcrs(&self, coord: &SkyCoord) -> Result<SkyCoord, SkyGeomError> {
        self.expect_frame(coord, Frame::Icrs)?;

        let geocentric = match coord.distance() {
            Some(_) => coord.cartesian() - self.earth_position,
            None => coord.unit_vector(),
        };
        let apparent = correct_aberration(geocentric, self.earth_velocity);
        let apparent = apparent.normalize() * geocentric.norm();

        rebuild(&apparent, self.gcrs_frame(), coord.distance().is_some())
    }

    /// Geocentric GCRS → barycentric ICRS, inverse of [`Self::icrs_to_gcrs`] to first order in v/c.
    pub fn gcrs_to_icrs(&self, coord: &SkyCoord) -> Result<SkyCoord, SkyGeomError> {
        self.expect_frame(coord, self.gcrs_frame())?;

        let apparent = coord.cartesian();
        let geometric = correct_aberration(apparent, -self.earth_velocity);
        let geometric = geometric.normalize() * apparent.norm();

        match coord.distance() {
            Some(_) => rebuild(&(geometric + self.earth_position), Frame::Icrs, true),
            None => rebuild(&geometric, Frame::Icrs, false),
        }
    }

    /// GCRS → ITRS rotation.
    pub fn gcrs_to_itrs(&self, coord: &SkyCoord) -> Result<SkyCoord, SkyGeomError> {
        self.expect_frame(coord, self.gcrs_frame())?;
        rebuild(
            &(self.gcrs_to_itrs * coord.cartesian()),
            self.itrs_frame(),
            coord.distance().is_some(),
        )
    }

    /// ITRS → GCRS rotation.
    pub fn itrs_to_gcrs(&self, coord: &SkyCoord) -> Result<SkyCoord, SkyGeomError> {
        self.expect_frame(coord, self.itrs_frame())?;
        rebuild(
            &(self.gcrs_to_itrs.transpose() * coord.cartesian()),
            self.gcrs_frame(),
            coord.distance().is_some(),
        )
    }

    pub fn icrs_to_itrs(&self, coord: &SkyCoord) -> Result<SkyCoord, SkyGeomError> {
        self.gcrs_to_itrs(&self.icrs_to_gcrs(coord)?)
    }

    pub fn itrs_to_icrs(&self, coord: &SkyCoord) -> Result<SkyCoord, SkyGeomError> {
        self.gcrs_to_icrs(&self.itrs_to_gcrs(coord)?)
    }

    /// Convert `coord` into `target`, which must be ICRS or carry this transform's obstime.
    pub fn transform_to(&self, coord: &SkyCoord, target: Frame) -> Result<SkyCoord, SkyGeomError> {
        if matches!(target, Frame::Gcrs { .. } | Frame::Itrs { .. })
            && target.obstime() != Some(self.obstime)
        {
            return Err(SkyGeomError::FrameMismatch {
                expected: format_isot(&self.obstime),
                found: target.to_string(),
            });
        }

        match (coord.frame(), target) {
            (source, target) if source == target => Ok(*coord),
            (Frame::Icrs, Frame::Gcrs { .. }) => self.icrs_to_gcrs(coord),
            (Frame::Icrs, Frame::Itrs { .. }) => self.icrs_to_itrs(coord),
            (Frame::Gcrs { .. }, Frame::Icrs) => self.gcrs_to_icrs(coord),
            (Frame::Gcrs { .. }, Frame::Itrs { .. }) => self.gcrs_to_itrs(coord),
            (Frame::Itrs { .. }, Frame::Icrs) => self.itrs_to_icrs(coord),
            (Frame::Itrs { .. }, Frame::Gcrs { .. }) => self.itrs_to_gcrs(coord),
            (source, _) => Err(SkyGeomError::FrameMismatch {
                expected: self.gcrs_frame().to_string(),
                found: source.to_string(),
            }),
        }
    }

    /// Earth-fixed position of a site at this obstime, as an ITRS coordinate (AU).
    pub fn location_itrs(&self, location: &EarthLocation) -> Result<SkyCoord, SkyGeomError> {
        SkyCoord::from_cartesian(&location.itrs_position_au(), self.itrs_frame())
    }
}
