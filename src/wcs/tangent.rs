//! Gnomonic (TAN) projection without rotation.
//!
//! Pixel coordinates are 0-based `(x, y)`, `x` along the image width and `y` along the height.
//! The linear part maps a pixel to intermediate world coordinates (degrees):
//!
//! ```text
//! ξ = cdelt[0] · (x − crpix[0])      cdelt[0] = −scale   (RA grows toward −x)
//! η = cdelt[1] · (y − crpix[1])      cdelt[1] = +scale   (Dec grows toward +y)
//! ```
//!
//! and the tangent plane at the reference point `crval` is deprojected with
//!
//! ```text
//! û = normalize(û₀ + ξ·ê + η·n̂)
//! ```
//!
//! where `û₀` points to `crval`, `ê` is the local east unit vector and `n̂` the local north unit
//! vector (ξ, η converted to radians).
use nalgebra::Vector3;

use crate::{
    constants::{Degree, RADEG},
    coordinates::SkyCoord,
    skygeom_errors::SkyGeomError,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentProjection {
    crval: SkyCoord,
    crpix: [f64; 2],
    cdelt: [Degree; 2],
    east: Vector3<f64>,
    north: Vector3<f64>,
}

impl TangentProjection {
    /// Build a projection.
    ///
    /// Arguments
    /// -----------------
    /// * `crval`: sky coordinate of the reference pixel; the output frame of [`Self::pixel_to_world`]
    /// * `crpix`: reference pixel `(x, y)`, 0-based
    /// * `cdelt`: degrees per pixel along x and y, both non-zero
    ///
    /// Return
    /// ----------
    /// * the projection, or [`SkyGeomError::NotProjectable`] when a `cdelt` is zero or not finite
    pub fn new(crval: &SkyCoord, crpix: [f64; 2], cdelt: [Degree; 2]) -> Result<Self, SkyGeomError> {
        if cdelt.iter().any(|c| !c.is_finite() || *c == 0.0) {
            return Err(SkyGeomError::NotProjectable);
        }

        let (sa, ca) = (crval.ra() * RADEG).sin_cos();
        let (sd, cd) = (crval.dec() * RADEG).sin_cos();

        Ok(TangentProjection {
            crval: crval.without_distance(),
            crpix,
            cdelt,
            east: Vector3::new(-sa, ca, 0.0),
            north: Vector3::new(-sd * ca, -sd * sa, cd),
        })
    }

    pub fn crval(&self) -> &SkyCoord {
        &self.crval
    }

    pub fn crpix(&self) -> [f64; 2] {
        self.crpix
    }

    pub fn cdelt(&self) -> [Degree; 2] {
        self.cdelt
    }

    /// Pixel scale along y, degrees per pixel.
    pub fn pixel_scale(&self) -> Degree {
        self.cdelt[1].abs()
    }

    /// Same projection with a square pixel of `scale` degrees.
    pub fn with_pixel_scale(&self, scale: Degree) -> Result<Self, SkyGeomError> {
        TangentProjection::new(&self.crval, self.crpix, [-scale, scale])
    }

    /// Sky coordinate of pixel `(x, y)`, in the frame of `crval`.
    pub fn pixel_to_world(&self, x: f64, y: f64) -> SkyCoord {
        let xi = self.cdelt[0] * (x - self.crpix[0]) * RADEG;
        let eta = self.cdelt[1] * (y - self.crpix[1]) * RADEG;

        let direction = self.crval.unit_vector() + self.east * xi + self.north * eta;
        SkyCoord::direction_of(&direction, self.crval.frame())
    }

    /// Pixel `(x, y)` of a sky coordinate.
    ///
    /// Return
    /// ----------
    /// * the fractional pixel, or [`SkyGeomError::NotProjectable`] when the coordinate is 90° or
    ///   more away from `crval`
    pub fn world_to_pixel(&self, coord: &SkyCoord) -> Result<(f64, f64), SkyGeomError> {
        let u = coord.unit_vector();
        let d = u.dot(&self.crval.unit_vector());
        if d <= 0.0 {
            return Err(SkyGeomError::NotProjectable);
        }

        let xi = u.dot(&self.east) / d / RADEG;
        let eta = u.dot(&self.north) / d / RADEG;
        Ok((
            self.crpix[0] + xi / self.cdelt[0],
            self.crpix[1] + eta / self.cdelt[1],
        ))
    }
}

#[cfg(test)]
mod tangent_test {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn projection(ra: Degree, dec: Degree) -> TangentProjection {
        let crval = SkyCoord::icrs(ra, dec).unwrap();
        TangentProjection::new(&crval, [10.0, 5.0], [-0.1, 0.1]).unwrap()
    }

    #[test]
    fn test_reference_pixel_maps_to_crval() {
        let proj = projection(120.0, -35.0);
        let sky = proj.pixel_to_world(10.0, 5.0);
        assert_abs_diff_eq!(sky.separation(proj.crval()), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_axis_orientation() {
        let proj = projection(0.0, 0.0);
        // one pixel toward -x is east: RA increases
        let east = proj.pixel_to_world(9.0, 5.0);
        assert_relative_eq!(east.ra(), (0.1 * RADEG).atan() / RADEG, epsilon = 1e-12);
        assert_abs_diff_eq!(east.dec(), 0.0, epsilon = 1e-12);
        // +y is north
        let north = proj.pixel_to_world(10.0, 6.0);
        assert_relative_eq!(north.dec(), (0.1 * RADEG).atan() / RADEG, epsilon = 1e-12);
    }

    #[test]
    fn test_world_pixel_round_trip() {
        let proj = projection(300.0, 62.0);
        for (x, y) in [(0.0, 0.0), (31.5, -4.0), (10.0, 5.0), (-200.0, 150.0)] {
            let (px, py) = proj.world_to_pixel(&proj.pixel_to_world(x, y)).unwrap();
            assert_abs_diff_eq!(px, x, epsilon = 1e-8);
            assert_abs_diff_eq!(py, y, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_not_projectable() {
        let proj = projection(0.0, 0.0);
        let behind = SkyCoord::icrs(180.0, 0.0).unwrap();
        assert_eq!(proj.world_to_pixel(&behind), Err(SkyGeomError::NotProjectable));
        let crval = SkyCoord::icrs(0.0, 0.0).unwrap();
        assert_eq!(
            TangentProjection::new(&crval, [0.0, 0.0], [0.0, 0.1]),
            Err(SkyGeomError::NotProjectable)
        );
    }

    #[test]
    fn test_with_pixel_scale() {
        let proj = projection(0.0, 0.0).with_pixel_scale(0.25).unwrap();
        assert_eq!(proj.cdelt(), [-0.25, 0.25]);
        assert_eq!(proj.pixel_scale(), 0.25);
        assert_eq!(proj.crpix(), [10.0, 5.0]);
    }
}
