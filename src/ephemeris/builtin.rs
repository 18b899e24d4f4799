//! Analytic low-precision solar system model.
//!
//! The barycentric Earth is assembled from three pieces:
//!
//! * the heliocentric Earth-Moon barycenter, from the JPL approximate Keplerian elements
//!   (Standish, valid 1800-2050),
//! * the solar offset with respect to the barycenter, from the same elements for the four giant
//!   planets weighted by their masses,
//! * the Earth offset with respect to the Earth-Moon barycenter, from the principal terms of the
//!   lunar theory (Meeus, *Astronomical Algorithms*, ch. 47).
//!
//! Positions are in AU in the ICRS-aligned mean equator and equinox of J2000. The agreement with
//! DE4xx is at the 1e-4 AU level, good enough for offline use and for tests that do not ship an
//! SPK kernel.
use hifitime::Epoch;
use nalgebra::Vector3;

use crate::{
    constants::{Degree, AU, RADEG, T2000},
    ref_system::obleq,
    time::mjd_tt,
};

use super::StateVector;

/// Mean Keplerian elements and their rates per Julian century.
struct KeplerianRates {
    a: [f64; 2],
    e: [f64; 2],
    incl: [Degree; 2],
    mean_longitude: [Degree; 2],
    long_perihelion: [Degree; 2],
    long_node: [Degree; 2],
    /// Sun / body mass ratio.
    mass_ratio: f64,
}

const EARTH_MOON_BARYCENTER: KeplerianRates = KeplerianRates {
    a: [1.00000261, 0.00000562],
    e: [0.01671123, -0.00004392],
    incl: [-0.00001531, -0.01294668],
    mean_longitude: [100.46457166, 35999.37244981],
    long_perihelion: [102.93768193, 0.32327364],
    long_node: [0.0, 0.0],
    mass_ratio: 328900.56,
};

const GIANT_PLANETS: [KeplerianRates; 4] = [
    // Jupiter
    KeplerianRates {
        a: [5.20288700, -0.00011607],
        e: [0.04838624, -0.00013253],
        incl: [1.30439695, -0.00183714],
        mean_longitude: [34.39644051, 3034.74612775],
        long_perihelion: [14.72847983, 0.21252668],
        long_node: [100.47390909, 0.20469106],
        mass_ratio: 1047.3486,
    },
    // Saturn
    KeplerianRates {
        a: [9.53667594, -0.00125060],
        e: [0.05386179, -0.00050991],
        incl: [2.48599187, 0.00193609],
        mean_longitude: [49.95424423, 1222.49362201],
        long_perihelion: [92.59887831, -0.41897216],
        long_node: [113.66242448, -0.28867794],
        mass_ratio: 3497.898,
    },
    // Uranus
    KeplerianRates {
        a: [19.18916464, -0.00196176],
        e: [0.04725744, -0.00004397],
        incl: [0.77263783, -0.00242939],
        mean_longitude: [313.23810451, 428.48202785],
        long_perihelion: [170.95427630, 0.40805281],
        long_node: [74.01692503, 0.04240589],
        mass_ratio: 22902.98,
    },
    // Neptune
    KeplerianRates {
        a: [30.06992276, 0.00026291],
        e: [0.00859048, 0.00005105],
        incl: [1.77004347, 0.00035372],
        mean_longitude: [-55.12002969, 218.45945325],
        long_perihelion: [44.96476227, -0.32241464],
        long_node: [131.78422574, -0.00508664],
        mass_ratio: 19412.24,
    },
];

/// Earth / Moon mass ratio.
const EARTH_MOON_MASS_RATIO: f64 = 81.30056;

/// Mean distance of the Moon used by the lunar series (km).
const MOON_MEAN_DISTANCE: f64 = 385000.56;

/// General precession in longitude (degrees per Julian century).
const PRECESSION_IN_LONGITUDE: Degree = 1.396971;

// (D, M, M', F) multipliers, longitude coefficient (1e-6 deg), distance coefficient (1e-3 km)
const LUNAR_LONGITUDE_DISTANCE: [([f64; 4], f64, f64); 13] = [
    ([0., 0., 1., 0.], 6288774.0, -20905355.0),
    ([2., 0., -1., 0.], 1274027.0, -3699111.0),
    ([2., 0., 0., 0.], 658314.0, -2955968.0),
    ([0., 0., 2., 0.], 213618.0, -569925.0),
    ([0., 1., 0., 0.], -185116.0, 48888.0),
    ([0., 0., 0., 2.], -114332.0, -3149.0),
    ([2., 0., -2., 0.], 58793.0, 246158.0),
    ([2., -1., -1., 0.], 57066.0, -152138.0),
    ([2., 0., 1., 0.], 53322.0, -170733.0),
    ([2., -1., 0., 0.], 45758.0, -204586.0),
    ([0., 1., -1., 0.], -40923.0, -129620.0),
    ([1., 0., 0., 0.], -34720.0, 108743.0),
    ([0., 1., 1., 0.], -30383.0, 104755.0),
];

// (D, M, M', F) multipliers, latitude coefficient (1e-6 deg)
const LUNAR_LATITUDE: [([f64; 4], f64); 8] = [
    ([0., 0., 0., 1.], 5128122.0),
    ([0., 0., 1., 1.], 280602.0),
    ([0., 0., 1., -1.], 277693.0),
    ([2., 0., 0., -1.], 173237.0),
    ([2., 0., -1., 1.], 55413.0),
    ([2., 0., -1., -1.], 46271.0),
    ([2., 0., 0., 1.], 32573.0),
    ([0., 0., 2., 1.], 17198.0),
];

/// Half-step of the central difference used for velocities (days).
const VELOCITY_STEP_DAYS: f64 = 0.05;

/// Solve Kepler's equation `E - e sin E = M` by Newton iterations.
fn eccentric_anomaly(mean_anomaly: f64, ecc: f64) -> f64 {
    let mut ecc_anom = mean_anomaly + ecc * mean_anomaly.sin();
    for _ in 0..30 {
        let delta =
            (ecc_anom - ecc * ecc_anom.sin() - mean_anomaly) / (1.0 - ecc * ecc_anom.cos());
        ecc_anom -= delta;
        if delta.abs() < 1e-14 {
            break;
        }
    }
    ecc_anom
}

impl KeplerianRates {
    /// Heliocentric position in the J2000 ecliptic frame (AU).
    fn heliocentric_ecliptic(&self, t: f64) -> Vector3<f64> {
        let at = |p: [f64; 2]| p[0] + p[1] * t;

        let a = at(self.a);
        let ecc = at(self.e);
        let incl = at(self.incl) * RADEG;
        let long_node = at(self.long_node) * RADEG;
        let long_peri = at(self.long_perihelion) * RADEG;
        let mean_long = at(self.mean_longitude) * RADEG;

        let arg_peri = long_peri - long_node;
        let mean_anomaly = (mean_long - long_peri).rem_euclid(std::f64::consts::TAU);
        let ecc_anom = eccentric_anomaly(mean_anomaly, ecc);

        let xp = a * (ecc_anom.cos() - ecc);
        let yp = a * (1.0 - ecc * ecc).sqrt() * ecc_anom.sin();

        let (sw, cw) = arg_peri.sin_cos();
        let (so, co) = long_node.sin_cos();
        let (si, ci) = incl.sin_cos();

        Vector3::new(
            (cw * co - sw * so * ci) * xp + (-sw * co - cw * so * ci) * yp,
            (cw * so + sw * co * ci) * xp + (-sw * so + cw * co * ci) * yp,
            (sw * si) * xp + (cw * si) * yp,
        )
    }
}

/// Geocentric Moon in the J2000 ecliptic frame (AU).
fn moon_geocentric_ecliptic(t: f64) -> Vector3<f64> {
    let mean_longitude = 218.3164477 + 481267.88123421 * t;
    let args = [
        297.8501921 + 445267.1114034 * t,
        357.5291092 + 35999.0502909 * t,
        134.9633964 + 477198.8675055 * t,
        93.2720950 + 483202.0175233 * t,
    ];
    let angle = |mult: &[f64; 4]| {
        mult.iter()
            .zip(args.iter())
            .map(|(m, a)| m * a)
            .sum::<f64>()
            * RADEG
    };

    let (sum_l, sum_r) = LUNAR_LONGITUDE_DISTANCE
        .iter()
        .fold((0.0, 0.0), |(sl, sr), (mult, l, r)| {
            let theta = angle(mult);
            (sl + l * theta.sin(), sr + r * theta.cos())
        });
    let sum_b: f64 = LUNAR_LATITUDE
        .iter()
        .map(|(mult, b)| b * angle(mult).sin())
        .sum();

    let lambda = (mean_longitude + sum_l * 1e-6 - PRECESSION_IN_LONGITUDE * t) * RADEG;
    let beta = sum_b * 1e-6 * RADEG;
    let distance = (MOON_MEAN_DISTANCE + sum_r * 1e-3) / AU;

    Vector3::new(
        distance * beta.cos() * lambda.cos(),
        distance * beta.cos() * lambda.sin(),
        distance * beta.sin(),
    )
}

/// Rotate a J2000 ecliptic vector to the mean equator of J2000.
fn ecliptic_to_equatorial(ecl: &Vector3<f64>) -> Vector3<f64> {
    let (se, ce) = obleq(T2000).sin_cos();
    Vector3::new(ecl.x, ce * ecl.y - se * ecl.z, se * ecl.y + ce * ecl.z)
}

fn sun_barycentric_ecliptic(t: f64) -> Vector3<f64> {
    let (weighted, total_mass) = GIANT_PLANETS
        .iter()
        .chain(std::iter::once(&EARTH_MOON_BARYCENTER))
        .fold((Vector3::<f64>::zeros(), 1.0), |(acc, mass), body| {
            let m = 1.0 / body.mass_ratio;
            (acc + body.heliocentric_ecliptic(t) * m, mass + m)
        });
    -weighted / total_mass
}

fn earth_barycentric_ecliptic(t: f64) -> Vector3<f64> {
    let emb = EARTH_MOON_BARYCENTER.heliocentric_ecliptic(t);
    let earth_wrt_emb = -moon_geocentric_ecliptic(t) / (1.0 + EARTH_MOON_MASS_RATIO);
    sun_barycentric_ecliptic(t) + emb + earth_wrt_emb
}

fn julian_centuries(epoch: &Epoch) -> f64 {
    (mjd_tt(epoch) - T2000) / 36525.0
}

/// Barycentric position of the Sun (AU, equatorial J2000).
pub fn sun_barycentric_position(epoch: &Epoch) -> Vector3<f64> {
    ecliptic_to_equatorial(&sun_barycentric_ecliptic(julian_centuries(epoch)))
}

/// Geocentric position of the Moon (AU, equatorial J2000).
pub fn moon_geocentric_position(epoch: &Epoch) -> Vector3<f64> {
    ecliptic_to_equatorial(&moon_geocentric_ecliptic(julian_centuries(epoch)))
}

/// Heliocentric position of the Earth (AU, equatorial J2000).
pub fn earth_heliocentric_position(epoch: &Epoch) -> Vector3<f64> {
    let t = julian_centuries(epoch);
    ecliptic_to_equatorial(&(earth_barycentric_ecliptic(t) - sun_barycentric_ecliptic(t)))
}

/// Barycentric state of the Earth.
///
/// Arguments
/// -----------------
/// * `epoch`: the time of the state, any time scale.
///
/// Return
/// ----------
/// * position in AU and velocity in AU/day, equatorial J2000. The velocity is a central
///   difference of the position over ±0.05 day.
pub fn earth_barycentric_state(epoch: &Epoch) -> StateVector {
    let t = julian_centuries(epoch);
    let dt = VELOCITY_STEP_DAYS / 36525.0;

    let position = ecliptic_to_equatorial(&earth_barycentric_ecliptic(t));
    let forward = ecliptic_to_equatorial(&earth_barycentric_ecliptic(t + dt));
    let backward = ecliptic_to_equatorial(&earth_barycentric_ecliptic(t - dt));

    StateVector {
        position,
        velocity: (forward - backward) / (2.0 * VELOCITY_STEP_DAYS),
    }
}
