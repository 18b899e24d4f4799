//! # Sky coordinates
//!
//! A [`SkyCoord`] is a direction on the sky (right ascension, declination in degrees) in a named
//! reference [`Frame`], with an optional radial distance in AU. Coordinates are immutable:
//! every transform builds a new value.
//!
//! ## Frames
//!
//! | Frame | Origin | Axes |
//! |-------|--------|------|
//! | [`Frame::Icrs`] | solar system barycenter | ICRS |
//! | [`Frame::Gcrs`] | geocenter at `obstime` | ICRS, apparent (annual aberration applied) |
//! | [`Frame::Itrs`] | geocenter at `obstime` | Earth-fixed, rotating with the Earth |
//!
//! The conversions between frames live in [`transforms`].
//!
//! ## Cartesian form
//!
//! [`SkyCoord::cartesian`] returns `distance · û(ra, dec)`; a coordinate without distance is a unit
//! vector. [`SkyCoord::from_cartesian`] is the converse and keeps the norm as distance.
use std::fmt;

use hifitime::Epoch;
use nalgebra::Vector3;

use crate::{
    constants::{AstronomicalUnit, Degree, RADEG},
    ref_system::{cartesian_to_radec, radec_to_unit_vector},
    skygeom_errors::SkyGeomError,
    time::format_isot,
};

pub mod transforms;

/// Reference frame of a [`SkyCoord`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Frame {
    Icrs,
    Gcrs { obstime: Epoch },
    Itrs { obstime: Epoch },
}

impl Frame {
    /// Observation time attached to the frame, if any.
    pub fn obstime(&self) -> Option<Epoch> {
        match self {
            Frame::Icrs => None,
            Frame::Gcrs { obstime } | Frame::Itrs { obstime } => Some(*obstime),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Icrs => write!(f, "ICRS"),
            Frame::Gcrs { obstime } => write!(f, "GCRS(obstime={})", format_isot(obstime)),
            Frame::Itrs { obstime } => write!(f, "ITRS(obstime={})", format_isot(obstime)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyCoord {
    ra: Degree,
    dec: Degree,
    distance: Option<AstronomicalUnit>,
    frame: Frame,
}

impl SkyCoord {
    /// Build a coordinate in any frame.
    ///
    /// Arguments
    /// ---------
    /// * `ra`: right ascension in degrees, wrapped into [0, 360)
    /// * `dec`: declination in degrees, within [-90, 90]
    /// * `distance`: optional radial distance in AU, positive and finite
    /// * `frame`: the reference frame
    ///
    /// Return
    /// ------
    /// * the coordinate, or the validation error of the offending component
    pub fn new(
        ra: Degree,
        dec: Degree,
        distance: Option<AstronomicalUnit>,
        frame: Frame,
    ) -> Result<Self, SkyGeomError> {
        if !dec.is_finite() || dec.abs() > 90.0 {
            return Err(SkyGeomError::InvalidDeclination(dec));
        }
        if !ra.is_finite() {
            return Err(SkyGeomError::InvalidRightAscension(ra));
        }
        if let Some(d) = distance {
            if !d.is_finite() || d <= 0.0 {
                return Err(SkyGeomError::InvalidDistance(d));
            }
        }
        let ra = ra.rem_euclid(360.0);
        Ok(SkyCoord {
            ra: if ra >= 360.0 { 0.0 } else { ra },
            dec,
            distance,
            frame,
        })
    }

    /// Direction in the ICRS, without distance.
    pub fn icrs(ra: Degree, dec: Degree) -> Result<Self, SkyGeomError> {
        SkyCoord::new(ra, dec, None, Frame::Icrs)
    }

    /// Barycentric ICRS position at `distance` AU.
    pub fn icrs_with_distance(
        ra: Degree,
        dec: Degree,
        distance: AstronomicalUnit,
    ) -> Result<Self, SkyGeomError> {
        SkyCoord::new(ra, dec, Some(distance), Frame::Icrs)
    }

    /// Coordinate of a Cartesian position vector (AU) in `frame`; the norm becomes the distance.
    pub fn from_cartesian(position: &Vector3<f64>, frame: Frame) -> Result<Self, SkyGeomError> {
        let (alpha, delta, rho) = cartesian_to_radec(position);
        let dec = (delta / RADEG).clamp(-90.0, 90.0);
        SkyCoord::new(alpha / RADEG, dec, Some(rho), frame)
    }

    /// Direction of a non-zero vector in `frame`, without distance.
    pub(crate) fn direction_of(vector: &Vector3<f64>, frame: Frame) -> Self {
        let (alpha, delta, _) = cartesian_to_radec(vector);
        let ra = alpha / RADEG;
        SkyCoord {
            ra: if ra >= 360.0 { 0.0 } else { ra },
            dec: (delta / RADEG).clamp(-90.0, 90.0),
            distance: None,
            frame,
        }
    }

    /// Right ascension in degrees, in [0, 360).
    pub fn ra(&self) -> Degree {
        self.ra
    }

    /// Declination in degrees.
    pub fn dec(&self) -> Degree {
        self.dec
    }

    pub fn distance(&self) -> Option<AstronomicalUnit> {
        self.distance
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// Unit vector toward (ra, dec).
    pub fn unit_vector(&self) -> Vector3<f64> {
        radec_to_unit_vector(self.ra * RADEG, self.dec * RADEG)
    }

    /// Cartesian position in AU (a unit vector when there is no distance).
    pub fn cartesian(&self) -> Vector3<f64> {
        self.unit_vector() * self.distance.unwrap_or(1.0)
    }

    /// Same direction, distance dropped.
    pub fn without_distance(&self) -> Self {
        SkyCoord {
            distance: None,
            ..*self
        }
    }

    /// Same components labelled with another frame, no transformation applied.
    pub fn with_frame(&self, frame: Frame) -> Self {
        SkyCoord { frame, ..*self }
    }

    /// Great-circle separation with another coordinate, in degrees.
    ///
    /// Vincenty formula, accurate at every separation including antipodes and coincident points.
    /// Frames and distances are ignored: both coordinates are treated as directions.
    pub fn separation(&self, other: &SkyCoord) -> Degree {
        let (sd1, cd1) = (self.dec * RADEG).sin_cos();
        let (sd2, cd2) = (other.dec * RADEG).sin_cos();
        let (sdl, cdl) = ((other.ra - self.ra) * RADEG).sin_cos();

        let num1 = cd2 * sdl;
        let num2 = cd1 * sd2 - sd1 * cd2 * cdl;
        let denominator = sd1 * sd2 + cd1 * cd2 * cdl;

        num1.hypot(num2).atan2(denominator) / RADEG
    }
}

impl fmt::Display for SkyCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (ra: {:.6}°, dec: {:.6}°",
            self.frame, self.ra, self.dec
        )?;
        if let Some(distance) = self.distance {
            write!(f, ", distance: {distance:.9} AU")?;
        }
        write!(f, ")")
    }
}
