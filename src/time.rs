use hifitime::{ut1::Ut1Provider, Epoch, TimeScale};
use log::warn;
use std::str::FromStr;

use crate::{
    constants::{DPI, EARTH_ROTATION_RATE, MJD, SECONDS_PER_DAY, T2000},
    skygeom_errors::SkyGeomError,
};

/// Parse an observation time and normalize it to the UTC time scale.
///
/// Accepted inputs are ISO-8601 calendar dates `YYYY-MM-DDTHH:MM:SS[.fff]`, optionally followed
/// by a time scale suffix (`UTC`, `TT`, `TAI`, `TDB`, ...). Without suffix the date is read as UTC.
///
/// Argument
/// --------
/// * `obstime`: the observation time as an `isot` string
///
/// Return
/// ------
/// * the epoch expressed in the UTC time scale
/// * [`SkyGeomError::InvalidObsTime`] if the string cannot be parsed
pub fn parse_obstime(obstime: &str) -> Result<Epoch, SkyGeomError> {
    let trimmed = obstime.trim();
    if trimmed.is_empty() {
        return Err(SkyGeomError::InvalidObsTime(obstime.to_string()));
    }
    Epoch::from_str(trimmed)
        .map(|epoch| epoch.to_time_scale(TimeScale::UTC))
        .map_err(|_| SkyGeomError::InvalidObsTime(obstime.to_string()))
}

/// Render an epoch as `YYYY-MM-DDTHH:MM:SS.sss UTC`.
pub fn format_isot(epoch: &Epoch) -> String {
    let (year, month, day, hour, minute, second, nanos) = epoch.to_gregorian_utc();
    format!(
        "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}.{:03} UTC",
        nanos / 1_000_000
    )
}

/// Modified julian date in the TT time scale
pub fn mjd_tt(epoch: &Epoch) -> MJD {
    epoch.to_mjd_tt_days()
}

/// Ephemeris time (TDB seconds past J2000), the time argument of the NAIF kernels
pub fn et_seconds(epoch: &Epoch) -> f64 {
    epoch.to_et_seconds()
}

/// Modified julian date in the UT1 time scale
///
/// When a [`Ut1Provider`] is available the UT1 − TAI offset is read from it. Otherwise UTC is used
/// as a stand-in for UT1 (|UT1 − UTC| < 0.9 s by construction of the leap second system).
///
/// Arguments
/// ---------
/// * `epoch`: the epoch to convert
/// * `ut1_provider`: optional Earth orientation parameters
///
/// Return
/// ------
/// * the MJD of `epoch` in UT1
pub fn mjd_ut1(epoch: &Epoch, ut1_provider: Option<&Ut1Provider>) -> MJD {
    match ut1_provider {
        // hifitime stores UT1 as an epoch offset from TAI: reading it back as a TAI date gives UT1
        Some(provider) => epoch.to_ut1(provider).to_mjd_tai_days(),
        None => {
            warn!("no UT1 provider configured, using UTC as UT1 for the Earth rotation angle");
            epoch.to_mjd_utc_days()
        }
    }
}

/// Compute the Greenwich Mean Sidereal Time (GMST) in radians
/// for a given Modified Julian Date (UT1 time scale).
///
/// IAU 1982 polynomial for the mean sidereal time at 0h UT1, plus the rotation accumulated
/// during the fraction of the day.
///
/// # Arguments
/// * `tjm` - Modified Julian Date (MJD, UT1 time scale)
///
/// # Returns
/// * GMST angle in radians, normalized to the interval [0, 2π).
///
/// # References
/// * Explanatory Supplement to the Astronomical Almanac (1992).
pub fn gmst(tjm: MJD) -> f64 {
    // coefficients for GMST at 0h UT1 (seconds)
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;

    let itjm = tjm.floor();
    let t = (itjm - T2000) / 36525.0;

    let gmst0 = (((C3 * t + C2) * t + C1) * t + C0) * DPI / SECONDS_PER_DAY;

    let h = (tjm - itjm) * DPI;
    (gmst0 + h * EARTH_ROTATION_RATE).rem_euclid(DPI)
}
