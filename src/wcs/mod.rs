//! # Tangent projections of synthetic images
//!
//! Build a [`TangentProjection`] for an image of a given shape and field of view, and measure
//! the field of view a projection actually spans.
//!
//! ## Conventions
//!
//! * `img_shape` is `[height, width]`; field-of-view arrays follow the same axis order
//!   (`[0]` along the height, `[1]` along the width).
//! * The reference pixel is `((width − 1) / 2, (height − 1) / 2)` with integer division, 0-based:
//!   the central pixel for odd sizes, the lower of the two central pixels for even sizes.
//! * The field of view along an axis is the great-circle separation between the first and the
//!   last pixel centers on the line through the reference pixel. A dimension of 1 gives 0.
//!
//! ## Solving for the field of view
//!
//! Under TAN the measured field of view is a non-linear, increasing function of the pixel scale.
//! With `solve_for_image_fov` the scale is refined by [`solve_pixel_scale`] (Brent's method from
//! the `roots` crate) until the field of view along axis 0 matches the request within
//! [`FOV_SOLVER_TOLERANCE`].
//!
//! ```rust
//! use skygeom::coordinates::SkyCoord;
//! use skygeom::wcs::{calc_actual_image_fov, construct_wcs_tangent_projection};
//!
//! let center = SkyCoord::icrs(0.0, 0.0).unwrap();
//! let proj = construct_wcs_tangent_projection(&center, [16, 16], 3.5, true).unwrap();
//! let fov = calc_actual_image_fov(&proj, [16, 16]).unwrap();
//! assert!((fov[0] - 3.5).abs() < 1e-8);
//! ```
use log::debug;
use roots::{find_root_brent, SearchError, SimpleConvergency};

use crate::{constants::Degree, coordinates::SkyCoord, skygeom_errors::SkyGeomError};

pub mod tangent;

pub use tangent::TangentProjection;

/// Iteration budget of the field-of-view solver (bracketing plus Brent iterations).
pub const FOV_SOLVER_MAX_ITER: usize = 100;

/// Accepted field-of-view error of the solver, degrees.
pub const FOV_SOLVER_TOLERANCE: Degree = 1e-9;

fn validate_shape(img_shape: [usize; 2]) -> Result<(), SkyGeomError> {
    if img_shape.contains(&0) {
        return Err(SkyGeomError::InvalidImageShape(img_shape));
    }
    Ok(())
}

fn reference_pixel(img_shape: [usize; 2]) -> [f64; 2] {
    let [height, width] = img_shape;
    [((width - 1) / 2) as f64, ((height - 1) / 2) as f64]
}

/// Field of view of a projection over a (validated) image shape.
fn measure_fov(projection: &TangentProjection, img_shape: [usize; 2]) -> [Degree; 2] {
    let [height, width] = img_shape;
    let [x_ref, y_ref] = projection.crpix();

    let axis0 = projection
        .pixel_to_world(x_ref, 0.0)
        .separation(&projection.pixel_to_world(x_ref, (height - 1) as f64));
    let axis1 = projection
        .pixel_to_world(0.0, y_ref)
        .separation(&projection.pixel_to_world((width - 1) as f64, y_ref));

    [axis0, axis1]
}

/// Construct a TAN projection for an image.
///
/// Arguments
/// -----------------
/// * `reference_coord`: sky coordinate placed at the reference pixel.
/// * `img_shape`: `[height, width]` in pixels, both at least 1.
/// * `image_fov`: requested field of view along axis 0 (degrees), in (0, 180).
/// * `solve_for_image_fov`: refine the pixel scale so that the measured field of view along
///   axis 0 equals `image_fov`; otherwise the scale is `image_fov / height`.
///
/// Return
/// ----------
/// * the projection, or
/// * [`SkyGeomError::InvalidImageShape`] / [`SkyGeomError::InvalidFieldOfView`] for invalid inputs,
/// * [`SkyGeomError::FovSolverDidNotConverge`] when the requested field of view cannot be reached.
pub fn construct_wcs_tangent_projection(
    reference_coord: &SkyCoord,
    img_shape: [usize; 2],
    image_fov: Degree,
    solve_for_image_fov: bool,
) -> Result<TangentProjection, SkyGeomError> {
    validate_shape(img_shape)?;
    if !image_fov.is_finite() || image_fov <= 0.0 || image_fov >= 180.0 {
        return Err(SkyGeomError::InvalidFieldOfView(image_fov));
    }

    let initial_scale = image_fov / img_shape[0] as f64;
    let scale = if solve_for_image_fov {
        solve_pixel_scale(initial_scale, image_fov, img_shape, reference_coord)?
    } else {
        initial_scale
    };

    TangentProjection::new(
        reference_coord,
        reference_pixel(img_shape),
        [-scale, scale],
    )
}

/// Measure the field of view spanned by `projection` over an image of shape `img_shape`.
///
/// Return
/// ----------
/// * `[fov_axis0, fov_axis1]` in degrees, or [`SkyGeomError::InvalidImageShape`]
pub fn calc_actual_image_fov(
    projection: &TangentProjection,
    img_shape: [usize; 2],
) -> Result<[Degree; 2], SkyGeomError> {
    validate_shape(img_shape)?;
    Ok(measure_fov(projection, img_shape))
}

/// Find the pixel scale whose measured field of view along axis 0 equals `target_fov`.
///
/// The root is bracketed between `initial_scale` (which always undershoots, `atan(t) < t`) and
/// successive doublings of it, then refined by Brent's method. An image of height 1 has a zero
/// field of view along axis 0 whatever the scale: `initial_scale` is returned unchanged.
///
/// Arguments
/// -----------------
/// * `initial_scale`: starting pixel scale (degrees per pixel), positive.
/// * `target_fov`: requested field of view along axis 0 (degrees).
/// * `img_shape`: `[height, width]`.
/// * `reference`: reference coordinate of the projection.
///
/// Return
/// ----------
/// * the pixel scale, or [`SkyGeomError::FovSolverDidNotConverge`] when no scale reaches the
///   target within [`FOV_SOLVER_MAX_ITER`] iterations.
pub fn solve_pixel_scale(
    initial_scale: Degree,
    target_fov: Degree,
    img_shape: [usize; 2],
    reference: &SkyCoord,
) -> Result<Degree, SkyGeomError> {
    validate_shape(img_shape)?;
    if img_shape[0] == 1 {
        return Ok(initial_scale);
    }

    let not_converged = SkyGeomError::FovSolverDidNotConverge {
        target: target_fov,
        iterations: FOV_SOLVER_MAX_ITER,
    };
    if !initial_scale.is_finite() || initial_scale <= 0.0 {
        return Err(not_converged);
    }

    let base = TangentProjection::new(
        reference,
        reference_pixel(img_shape),
        [-initial_scale, initial_scale],
    )?;
    let residual = |scale: f64| -> f64 {
        match base.with_pixel_scale(scale) {
            Ok(projection) => measure_fov(&projection, img_shape)[0] - target_fov,
            Err(_) => f64::NAN,
        }
    };

    let lower = initial_scale;
    let mut upper = 2.0 * initial_scale;
    let mut bracket_steps = 1;
    while residual(upper) < 0.0 {
        if bracket_steps >= FOV_SOLVER_MAX_ITER / 2 {
            return Err(not_converged);
        }
        upper *= 2.0;
        bracket_steps += 1;
    }
    debug!("field of view {target_fov}° bracketed in [{lower}, {upper}] deg/pixel after {bracket_steps} steps");

    let mut convergency = SimpleConvergency {
        eps: 1e-13,
        max_iter: FOV_SOLVER_MAX_ITER - bracket_steps,
    };
    let scale = match find_root_brent(lower, upper, &residual, &mut convergency) {
        Ok(scale) => scale,
        Err(SearchError::NoConvergency) => return Err(not_converged),
        Err(err) => return Err(err.into()),
    };

    let error = residual(scale).abs();
    if !(error <= FOV_SOLVER_TOLERANCE) {
        return Err(not_converged);
    }
    debug!("pixel scale {scale} deg/pixel reaches {target_fov}° within {error:e}°");
    Ok(scale)
}

#[cfg(test)]
mod wcs_test {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn origin() -> SkyCoord {
        SkyCoord::icrs(0.0, 0.0).unwrap()
    }

    #[test]
    fn test_reference_pixel_convention() {
        assert_eq!(reference_pixel([1, 1]), [0.0, 0.0]);
        assert_eq!(reference_pixel([2, 2]), [0.0, 0.0]);
        assert_eq!(reference_pixel([64, 32]), [15.0, 31.0]);
        assert_eq!(reference_pixel([5, 7]), [3.0, 2.0]);
    }

    #[test]
    fn test_initial_scale_without_solving() {
        let proj = construct_wcs_tangent_projection(&origin(), [16, 8], 3.2, false).unwrap();
        assert_eq!(proj.cdelt(), [-0.2, 0.2]);
        assert_eq!(proj.crpix(), [3.0, 7.0]);
    }

    #[test]
    fn test_one_pixel_row_is_degenerate() {
        let proj = construct_wcs_tangent_projection(&origin(), [1, 10], 3.5, true).unwrap();
        assert_eq!(proj.pixel_scale(), 3.5);
        let fov = calc_actual_image_fov(&proj, [1, 10]).unwrap();
        assert_eq!(fov[0], 0.0);
        assert!(fov[1] > 0.0);
    }

    #[test]
    fn test_solver_16x16() {
        let scale = solve_pixel_scale(3.5 / 16.0, 3.5, [16, 16], &origin()).unwrap();
        assert_relative_eq!(scale, 0.2334068860466122, max_relative = 1e-9);
    }

    #[test]
    fn test_solver_unreachable_target() {
        // two rows: pixel 0 sits on the reference, the field of view stays below 90°
        assert_eq!(
            solve_pixel_scale(60.0, 120.0, [2, 2], &origin()),
            Err(SkyGeomError::FovSolverDidNotConverge {
                target: 120.0,
                iterations: FOV_SOLVER_MAX_ITER
            })
        );
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            construct_wcs_tangent_projection(&origin(), [0, 4], 1.0, false),
            Err(SkyGeomError::InvalidImageShape([0, 4]))
        );
        assert_eq!(
            construct_wcs_tangent_projection(&origin(), [4, 4], 0.0, false),
            Err(SkyGeomError::InvalidFieldOfView(0.0))
        );
        assert_eq!(
            construct_wcs_tangent_projection(&origin(), [4, 4], 180.0, true),
            Err(SkyGeomError::InvalidFieldOfView(180.0))
        );
        let proj = construct_wcs_tangent_projection(&origin(), [4, 4], 1.0, false).unwrap();
        assert_eq!(
            calc_actual_image_fov(&proj, [4, 0]),
            Err(SkyGeomError::InvalidImageShape([4, 0]))
        );
    }

    #[test]
    fn test_fov_is_independent_of_reference_position() {
        let a = construct_wcs_tangent_projection(&origin(), [32, 64], 15.0, true).unwrap();
        let b = construct_wcs_tangent_projection(&SkyCoord::icrs(211.0, 67.0).unwrap(), [32, 64], 15.0, true)
            .unwrap();
        let fa = calc_actual_image_fov(&a, [32, 64]).unwrap();
        let fb = calc_actual_image_fov(&b, [32, 64]).unwrap();
        assert_abs_diff_eq!(fa[0], fb[0], epsilon = 1e-8);
        assert_abs_diff_eq!(fa[1], fb[1], epsilon = 1e-8);
    }
}
