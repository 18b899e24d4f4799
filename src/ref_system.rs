//! # Earth orientation and reference-frame rotations
//!
//! Rotation matrices connecting the celestial (GCRS/ICRS aligned) and terrestrial (ITRS) frames:
//!
//! - [`prec`]: IAU 1976 precession, J2000 mean equator → mean equator of date
//! - [`rnut80`]: IAU 1980 nutation, mean equator of date → true equator of date
//! - [`gmst`](crate::time::gmst) + [`equequ`]: Greenwich apparent sidereal time
//! - [`earth_rotation_matrix`]: full celestial → terrestrial rotation
//!
//! All matrices follow the **frame rotation** convention: for a rotation matrix `R` going from
//! frame A to frame B, the coordinates of a fixed vector satisfy `x_B = R · x_A`.
//!
//! Polar motion and the ICRS frame bias (both below 0.1 arcsec) are neglected.
use hifitime::{ut1::Ut1Provider, Epoch};
use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::{
    constants::{ArcSec, Radian, DPI, MJD, RADEG, RADSEC, T2000, VLIGHT_AU},
    time::{gmst, mjd_tt, mjd_ut1},
};

/// Compute the mean obliquity of the ecliptic (IAU 1976).
///
/// Arguments
/// ---------
/// * `tjm`: Modified Julian Date (TT time scale).
///
/// Returns
/// --------
/// * Mean obliquity ε in radians.
pub fn obleq(tjm: MJD) -> Radian {
    let ob0 = ((23.0 * 3600.0 + 26.0 * 60.0) + 21.448) * RADSEC;
    let ob1 = -46.815 * RADSEC;
    let ob2 = -0.0006 * RADSEC;
    let ob3 = 0.00181 * RADSEC;

    let t = (tjm - T2000) / 36525.0;

    ((ob3 * t + ob2) * t + ob1) * t + ob0
}

/// Elementary rotation of the coordinate frame around one of its axes.
///
/// The frame is rotated by `alpha` (positive counter-clockwise when looking from the tip of the
/// axis toward the origin); the returned matrix converts coordinates expressed in the old frame
/// into the rotated one.
///
/// # Arguments
///
/// * `alpha` - Rotation angle in **radians**.
/// * `k` - Index of the axis of rotation: `0` → X, `1` → Y, `2` → Z. Indices above 2 wrap to Z.
pub fn rotmt(alpha: Radian, k: usize) -> Matrix3<f64> {
    let axis = match k {
        0 => Vector3::x_axis(),
        1 => Vector3::y_axis(),
        _ => Vector3::z_axis(),
    };

    // a frame rotation is the inverse of the vector rotation
    Rotation3::from_axis_angle(&axis, -alpha).into()
}

/// One periodic term of the IAU 1980 nutation series.
///
/// `args` holds the integer multipliers of the fundamental arguments (D, M, M', F, Ω); the
/// coefficients are in units of 0.0001 arcsec (and 0.0001 arcsec per Julian century).
struct NutationTerm {
    args: [f64; 5],
    psi: (f64, f64),
    eps: (f64, f64),
}

const fn term(args: [f64; 5], psi: (f64, f64), eps: (f64, f64)) -> NutationTerm {
    NutationTerm { args, psi, eps }
}

// Principal terms of the IAU 1980 theory (amplitudes ≥ 0.0005 arcsec).
#[rustfmt::skip]
const NUTATION_TERMS: [NutationTerm; 49] = [
    term([ 0.,  0.,  0.,  0., 1.], (-171996.0, -174.2), (92025.0,  8.9)),
    term([-2.,  0.,  0.,  2., 2.], ( -13187.0,   -1.6), ( 5736.0, -3.1)),
    term([ 0.,  0.,  0.,  2., 2.], (  -2274.0,   -0.2), (  977.0, -0.5)),
    term([ 0.,  0.,  0.,  0., 2.], (   2062.0,    0.2), ( -895.0,  0.5)),
    term([ 0.,  1.,  0.,  0., 0.], (   1426.0,   -3.4), (   54.0, -0.1)),
    term([ 0.,  0.,  1.,  0., 0.], (    712.0,    0.1), (   -7.0,  0.0)),
    term([-2.,  1.,  0.,  2., 2.], (   -517.0,    1.2), (  224.0, -0.6)),
    term([ 0.,  0.,  0.,  2., 1.], (   -386.0,   -0.4), (  200.0,  0.0)),
    term([ 0.,  0.,  1.,  2., 2.], (   -301.0,    0.0), (  129.0, -0.1)),
    term([-2., -1.,  0.,  2., 2.], (    217.0,   -0.5), (  -95.0,  0.3)),
    term([-2.,  0.,  1.,  0., 0.], (   -158.0,    0.0), (    0.0,  0.0)),
    term([-2.,  0.,  0.,  2., 1.], (    129.0,    0.1), (  -70.0,  0.0)),
    term([ 0.,  0., -1.,  2., 2.], (    123.0,    0.0), (  -53.0,  0.0)),
    term([ 2.,  0.,  0.,  0., 0.], (     63.0,    0.0), (    0.0,  0.0)),
    term([ 0.,  0.,  1.,  0., 1.], (     63.0,    0.1), (  -33.0,  0.0)),
    term([ 2.,  0., -1.,  2., 2.], (    -59.0,    0.0), (   26.0,  0.0)),
    term([ 0.,  0., -1.,  0., 1.], (    -58.0,   -0.1), (   32.0,  0.0)),
    term([ 0.,  0.,  1.,  2., 1.], (    -51.0,    0.0), (   27.0,  0.0)),
    term([-2.,  0.,  2.,  0., 0.], (     48.0,    0.0), (    0.0,  0.0)),
    term([ 0.,  0., -2.,  2., 1.], (     46.0,    0.0), (  -24.0,  0.0)),
    term([ 2.,  0.,  0.,  2., 2.], (    -38.0,    0.0), (   16.0,  0.0)),
    term([ 0.,  0.,  2.,  2., 2.], (    -31.0,    0.0), (   13.0,  0.0)),
    term([ 0.,  0.,  2.,  0., 0.], (     29.0,    0.0), (    0.0,  0.0)),
    term([-2.,  0.,  1.,  2., 2.], (     29.0,    0.0), (  -12.0,  0.0)),
    term([ 0.,  0.,  0.,  2., 0.], (     26.0,    0.0), (    0.0,  0.0)),
    term([-2.,  0.,  0.,  2., 0.], (    -22.0,    0.0), (    0.0,  0.0)),
    term([ 0.,  0., -1.,  2., 1.], (     21.0,    0.0), (  -10.0,  0.0)),
    term([ 0.,  2.,  0.,  0., 0.], (     17.0,   -0.1), (    0.0,  0.0)),
    term([ 2.,  0., -1.,  0., 1.], (     16.0,    0.0), (   -8.0,  0.0)),
    term([-2.,  2.,  0.,  2., 2.], (    -16.0,    0.1), (    7.0,  0.0)),
    term([ 0.,  1.,  0.,  0., 1.], (    -15.0,    0.0), (    9.0,  0.0)),
    term([-2.,  0.,  1.,  0., 1.], (    -13.0,    0.0), (    7.0,  0.0)),
    term([ 0., -1.,  0.,  0., 1.], (    -12.0,    0.0), (    6.0,  0.0)),
    term([ 0.,  0.,  2., -2., 0.], (     11.0,    0.0), (    0.0,  0.0)),
    term([ 2.,  0., -1.,  2., 1.], (    -10.0,    0.0), (    5.0,  0.0)),
    term([ 2.,  0.,  1.,  2., 2.], (     -8.0,    0.0), (    3.0,  0.0)),
    term([ 0.,  1.,  0.,  2., 2.], (      7.0,    0.0), (   -3.0,  0.0)),
    term([-2.,  1.,  1.,  0., 0.], (     -7.0,    0.0), (    0.0,  0.0)),
    term([ 0., -1.,  0.,  2., 2.], (     -7.0,    0.0), (    3.0,  0.0)),
    term([ 2.,  0.,  0.,  2., 1.], (     -7.0,    0.0), (    3.0,  0.0)),
    term([ 2.,  0.,  1.,  0., 0.], (      6.0,    0.0), (    0.0,  0.0)),
    term([-2.,  0.,  2.,  2., 2.], (      6.0,    0.0), (   -3.0,  0.0)),
    term([-2.,  0.,  1.,  2., 1.], (      6.0,    0.0), (   -3.0,  0.0)),
    term([ 2.,  0., -2.,  0., 1.], (     -6.0,    0.0), (    3.0,  0.0)),
    term([ 2.,  0.,  0.,  0., 1.], (     -6.0,    0.0), (    3.0,  0.0)),
    term([ 0., -1.,  1.,  0., 0.], (      5.0,    0.0), (    0.0,  0.0)),
    term([-2., -1.,  0.,  2., 1.], (     -5.0,    0.0), (    3.0,  0.0)),
    term([-2.,  0.,  0.,  0., 1.], (     -5.0,    0.0), (    3.0,  0.0)),
    term([ 0.,  0.,  2.,  2., 1.], (     -5.0,    0.0), (    3.0,  0.0)),
];

/// Compute the nutation angles in longitude and obliquity (IAU 1980, principal terms).
///
/// Arguments
/// ---------
/// * `tjm`: Modified Julian Date (in TT time scale).
///
/// Returns
/// --------
/// * A tuple `(Δψ, Δε)` in arcseconds.
///
/// The fundamental arguments (mean elongation of the Moon D, mean anomalies of the Sun M and of
/// the Moon M', argument of latitude of the Moon F, longitude of the lunar node Ω) are cubic
/// polynomials in Julian centuries from J2000. The truncated series stays within a few
/// milliarcseconds of the complete 106-term model.
pub fn nutn80(tjm: MJD) -> (ArcSec, ArcSec) {
    let t = (tjm - T2000) / 36525.0;
    let t2 = t * t;
    let t3 = t2 * t;

    let moon_anomaly = (485866.733 + 1717915922.633 * t + 31.310 * t2 + 0.064 * t3) * RADSEC;
    let sun_anomaly = (1287099.804 + 129596581.224 * t - 0.577 * t2 - 0.012 * t3) * RADSEC;
    let latitude_arg = (335778.877 + 1739527263.137 * t - 13.257 * t2 + 0.011 * t3) * RADSEC;
    let elongation = (1072261.307 + 1602961601.328 * t - 6.891 * t2 + 0.019 * t3) * RADSEC;
    let node = (450160.280 - 6962890.539 * t + 7.455 * t2 + 0.008 * t3) * RADSEC;

    let fundamental = [
        elongation % DPI,
        sun_anomaly % DPI,
        moon_anomaly % DPI,
        latitude_arg % DPI,
        node % DPI,
    ];

    let (dpsi, deps) = NUTATION_TERMS.iter().fold((0.0, 0.0), |(dpsi, deps), term| {
        let arg: f64 = term
            .args
            .iter()
            .zip(fundamental.iter())
            .map(|(k, a)| k * a)
            .sum();
        (
            dpsi + (term.psi.0 + term.psi.1 * t) * arg.sin(),
            deps + (term.eps.0 + term.eps.1 * t) * arg.cos(),
        )
    });

    (dpsi * 1e-4, deps * 1e-4)
}

/// Nutation matrix (IAU 1980): mean equator and equinox of date → true equator and equinox of date.
///
/// `N = R1(−ε − Δε) · R3(−Δψ) · R1(ε)`
pub fn rnut80(tjm: MJD) -> Matrix3<f64> {
    let epsm = obleq(tjm);
    let (dpsi, deps) = nutn80(tjm);
    let epst = epsm + deps * RADSEC;

    rotmt(-epst, 0) * rotmt(-dpsi * RADSEC, 2) * rotmt(epsm, 0)
}

/// Equation of the equinoxes (radians): GAST − GMST = Δψ · cos ε.
pub fn equequ(tjm: MJD) -> Radian {
    let oblm = obleq(tjm);
    let (dpsi, _) = nutn80(tjm);
    RADSEC * dpsi * oblm.cos()
}

/// Precession matrix (IAU 1976): J2000 mean equator → mean equator and equinox of date.
///
/// `P = R3(−z) · R2(θ) · R3(−ζ)` with
///
/// ```text
/// ζ(T) = (0.6406161 + 0.0000839·T + 0.0000050·T²) · T  [deg]
/// θ(T) = (0.5567530 − 0.0001185·T − 0.0000116·T²) · T  [deg]
/// z(T) = (0.6406161 + 0.0003041·T + 0.0000051·T²) · T  [deg]
/// ```
pub fn prec(tjm: MJD) -> Matrix3<f64> {
    let t = (tjm - T2000) / 36525.0;

    let zeta = ((0.0000050 * t + 0.0000839) * t + 0.6406161) * t * RADEG;
    let z = ((0.0000051 * t + 0.0003041) * t + 0.6406161) * t * RADEG;
    let theta = ((-0.0000116 * t - 0.0001185) * t + 0.5567530) * t * RADEG;

    rotmt(-z, 2) * rotmt(theta, 1) * rotmt(-zeta, 2)
}

/// Rotation from the celestial frame (GCRS axes) to the terrestrial frame (ITRS) at `epoch`.
///
/// `R = R3(GAST) · N · P`, where GAST is computed from UT1 (see [`mjd_ut1`]) while the precession
/// and nutation arguments use TT.
///
/// Arguments
/// ---------
/// * `epoch`: the observation epoch
/// * `ut1_provider`: optional Earth orientation parameters
///
/// Returns
/// --------
/// * the matrix `R` such that `x_itrs = R · x_gcrs`
pub fn earth_rotation_matrix(epoch: &Epoch, ut1_provider: Option<&Ut1Provider>) -> Matrix3<f64> {
    let tt = mjd_tt(epoch);
    let gast = gmst(mjd_ut1(epoch, ut1_provider)) + equequ(tt);

    rotmt(gast, 2) * rnut80(tt) * prec(tt)
}

/// Apply the annual aberration to a relative position vector.
///
/// First-order (v ≪ c) light-time shift of the apparent direction for an observer moving at
/// `vrel` with respect to the barycenter.
///
/// Arguments
/// ---------
/// * `xrel`: relative position vector from observer to object [AU].
/// * `vrel`: velocity of the observer relative to the barycenter [AU/day].
///
/// Returns
/// --------
/// * Corrected position vector `xrel + (‖xrel‖ / c) · vrel`, not normalized.
pub fn correct_aberration(xrel: Vector3<f64>, vrel: Vector3<f64>) -> Vector3<f64> {
    let dt = xrel.norm() / VLIGHT_AU;
    xrel + dt * vrel
}

/// Convert a 3D Cartesian position vector to right ascension and declination.
///
/// Returns
/// --------
/// * Tuple `(α, δ, ρ)`:
///     - `α`: right ascension in radians, in the range [0, 2π).
///     - `δ`: declination in radians, in the range [−π/2, +π/2].
///     - `ρ`: Euclidean norm of the vector.
///
/// A zero vector gives `(0.0, 0.0, 0.0)`.
pub fn cartesian_to_radec(cartesian_position: &Vector3<f64>) -> (Radian, Radian, f64) {
    let pos_norm = cartesian_position.norm();
    if pos_norm == 0. {
        return (0.0, 0.0, pos_norm);
    }

    let delta = (cartesian_position.z / pos_norm).clamp(-1.0, 1.0).asin();
    let alpha = cartesian_position
        .y
        .atan2(cartesian_position.x)
        .rem_euclid(DPI);
    // rem_euclid can round up to exactly 2π for tiny negative inputs
    let alpha = if alpha >= DPI { 0.0 } else { alpha };
    (alpha, delta, pos_norm)
}

/// Unit vector pointing to (α, δ), both in radians.
pub fn radec_to_unit_vector(alpha: Radian, delta: Radian) -> Vector3<f64> {
    let (sa, ca) = alpha.sin_cos();
    let (sd, cd) = delta.sin_cos();
    Vector3::new(cd * ca, cd * sa, sd)
}

#[cfg(test)]
mod ref_system_test {

    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_obliquity() {
        let obl = obleq(T2000);
        assert_relative_eq!(obl, 0.40909280422232897, epsilon = 1e-15);
    }

    #[test]
    fn test_nutn80() {
        // complete IAU 1980 values at J2000: Δψ = -13.923385", Δε = -5.773808"
        let (dpsi, deps) = nutn80(T2000);
        assert_abs_diff_eq!(dpsi, -13.923385169502602, epsilon = 1e-2);
        assert_abs_diff_eq!(deps, -5.773808263765919, epsilon = 1e-2);
    }

    #[test]
    fn test_rotmt_is_frame_rotation() {
        // rotating the frame by +90° around Z brings the old Y axis onto the new X axis
        let r = rotmt(FRAC_PI_2, 2);
        let v = r * Vector3::new(0.0, 1.0, 0.0);
        assert_abs_diff_eq!(v, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-15);
    }

    #[test]
    fn test_prec_identity_at_j2000() {
        assert_abs_diff_eq!(prec(T2000), Matrix3::identity(), epsilon = 1e-15);
    }

    #[test]
    fn test_prec_moves_equinox_eastward() {
        // R2(θ)·R3(-ζ)·x̂ = (cos θ cos ζ, sin ζ, sin θ cos ζ), then R3(-z) adds z to the right
        // ascension: the J2000 equinox lies north of the equator of date
        let p = prec(T2000 + 36525.0);
        let x_date = p * Vector3::x();
        let (alpha, delta, _) = cartesian_to_radec(&x_date);

        let zeta = (0.0000050 + 0.0000839 + 0.6406161) * RADEG;
        let z = (0.0000051 + 0.0003041 + 0.6406161) * RADEG;
        let theta = (-0.0000116 - 0.0001185 + 0.5567530) * RADEG;
        let expected = z + zeta.sin().atan2(theta.cos() * zeta.cos());
        assert_abs_diff_eq!(alpha, expected, epsilon = 1e-12);
        assert_abs_diff_eq!(alpha / RADEG, 1.2816605, epsilon = 1e-7);
        assert_abs_diff_eq!(delta, (theta.sin() * zeta.cos()).asin(), epsilon = 1e-12);
    }

    #[test]
    fn test_rnut80_is_orthonormal() {
        let n = rnut80(60023.5);
        assert_abs_diff_eq!(n * n.transpose(), Matrix3::identity(), epsilon = 1e-14);
    }

    #[test]
    fn test_earth_rotation_matrix_z_axis() {
        let epoch = Epoch::from_gregorian_utc_hms(2023, 3, 20, 16, 0, 0);
        let r = earth_rotation_matrix(&epoch, None);
        // the celestial pole only moves by precession-nutation (< 0.2° from J2000 in 2023)
        let z = r * Vector3::z();
        assert!(z.z > (0.2 * RADEG).cos());
    }

    #[test]
    fn test_cartesian_to_radec() {
        let (alpha, delta, rho) = cartesian_to_radec(&Vector3::new(0.0, -2.0, 0.0));
        assert_abs_diff_eq!(alpha, 1.5 * std::f64::consts::PI, epsilon = 1e-15);
        assert_abs_diff_eq!(delta, 0.0, epsilon = 1e-15);
        assert_eq!(rho, 2.0);

        assert_eq!(cartesian_to_radec(&Vector3::zeros()), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_radec_round_trip() {
        let v = radec_to_unit_vector(1.2, -0.4);
        let (alpha, delta, rho) = cartesian_to_radec(&v);
        assert_abs_diff_eq!(alpha, 1.2, epsilon = 1e-14);
        assert_abs_diff_eq!(delta, -0.4, epsilon = 1e-14);
        assert_abs_diff_eq!(rho, 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_correct_aberration_magnitude() {
        // 30 km/s transverse velocity gives ~20.5" of aberration
        let x = Vector3::new(1.0, 0.0, 0.0);
        let v = Vector3::new(0.0, 30.0 / crate::constants::AU * 86400.0, 0.0);
        let corrected = correct_aberration(x, v);
        let angle = (corrected.y / corrected.x).atan() / RADSEC;
        assert_abs_diff_eq!(angle, 20.64, epsilon = 0.05);
    }
}
