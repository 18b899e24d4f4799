//! # Observer / object geometry at a fixed barycentric distance
//!
//! [`DistCalcHelper`] places a hypothetical object at a given barycentric distance along an ICRS
//! direction and computes, at one observation time, how a ground-based observer sees it.
//!
//! ## Quantities
//!
//! | Field | Frame | Meaning |
//! |-------|-------|---------|
//! | `helio` | ICRS | barycentric position of interest, `distance` AU along (ra, dec) |
//! | `obs_pos_itrs` | ITRS | Earth-fixed position of the observing site |
//! | `observer_to_object` | ICRS axes | `helio` carried ICRS → ITRS → GCRS, read back as an ICRS vector |
//! | `cobs` | ICRS | direction of `observer_to_object`, without distance |
//! | `obs_pos` | ICRS | `helio − observer_to_object`, in AU |
//!
//! By construction `obs_pos + observer_to_object == helio` in Cartesian coordinates.
//!
//! ## Example
//!
//! ```rust,no_run
//! use skygeom::distance_calc_helper::{DistCalcHelper, DistCalcParams};
//! use skygeom::skygeom::SkyGeom;
//!
//! let ctx = SkyGeom::default_ephemeris().unwrap();
//! let helper = DistCalcHelper::new(&ctx, DistCalcParams::default()).unwrap();
//! println!("{helper}");
//! ```
use std::fmt;

use hifitime::Epoch;
use log::debug;

use crate::{
    constants::{AstronomicalUnit, Degree, DEFAULT_SITE},
    coordinates::{transforms::EarthFrameTransform, Frame, SkyCoord},
    observers::EarthLocation,
    skygeom::SkyGeom,
    skygeom_errors::SkyGeomError,
    time::{format_isot, parse_obstime},
};

/// Inputs of a [`DistCalcHelper`].
#[derive(Debug, Clone, PartialEq)]
pub struct DistCalcParams {
    /// Right ascension of the position of interest (degrees).
    pub ra: Degree,
    /// Declination of the position of interest (degrees).
    pub dec: Degree,
    /// Observation time, ISO-8601 (`isot`), read as UTC without suffix.
    pub obstime: String,
    /// Distance from the barycenter to the position of interest (AU).
    pub distance: AstronomicalUnit,
    /// Observatory name or alias.
    pub site: String,
}

impl Default for DistCalcParams {
    fn default() -> Self {
        DistCalcParams {
            ra: 90.0,
            dec: 23.43952556,
            obstime: "2023-03-20T16:00:00".to_string(),
            distance: 10.0,
            site: DEFAULT_SITE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistCalcHelper {
    distance: AstronomicalUnit,
    obstime: Epoch,
    site: EarthLocation,
    helio: SkyCoord,
    obs_pos_itrs: SkyCoord,
    obs_pos: SkyCoord,
    observer_to_object: SkyCoord,
    cobs: SkyCoord,
}

impl DistCalcHelper {
    /// Compute the observer / object geometry.
    ///
    /// Arguments
    /// -----------------
    /// * `ctx`: context providing the ephemeris, the UT1 provider and the site registry.
    /// * `params`: position of interest, observation time and site.
    ///
    /// Return
    /// ----------
    /// * the helper with every derived quantity, or
    /// * [`SkyGeomError::InvalidObsTime`] for a malformed time,
    /// * [`SkyGeomError::InvalidDistance`] / [`SkyGeomError::InvalidDeclination`] for invalid
    ///   inputs, checked before any transform,
    /// * [`SkyGeomError::UnknownSite`] or the ephemeris error, propagated unchanged.
    pub fn new(ctx: &SkyGeom, params: DistCalcParams) -> Result<Self, SkyGeomError> {
        let obstime = parse_obstime(&params.obstime)?;
        let helio = SkyCoord::icrs_with_distance(params.ra, params.dec, params.distance)?;

        let site = ctx.get_site(&params.site)?.clone();
        let transform =
            EarthFrameTransform::new(&obstime, ctx.get_ephemeris()?, ctx.get_ut1_provider())?;

        let obs_pos_itrs = transform.location_itrs(&site)?;

        let through_itrs = transform.icrs_to_itrs(&helio)?;
        let observer_to_object = transform
            .itrs_to_gcrs(&through_itrs)?
            .with_frame(Frame::Icrs);
        let cobs = observer_to_object.without_distance();

        let obs_pos = SkyCoord::from_cartesian(
            &(helio.cartesian() - observer_to_object.cartesian()),
            Frame::Icrs,
        )?;

        debug!(
            "observer geometry at {} from {}: cobs = ({:.6}, {:.6})",
            format_isot(&obstime),
            params.site,
            cobs.ra(),
            cobs.dec()
        );

        Ok(DistCalcHelper {
            distance: params.distance,
            obstime,
            site,
            helio,
            obs_pos_itrs,
            obs_pos,
            observer_to_object,
            cobs,
        })
    }

    /// Distance from the barycenter to the position of interest (AU).
    pub fn distance(&self) -> AstronomicalUnit {
        self.distance
    }

    /// Observation time, UTC.
    pub fn obstime(&self) -> Epoch {
        self.obstime
    }

    pub fn site(&self) -> &EarthLocation {
        &self.site
    }

    /// The barycentric position of interest.
    pub fn helio(&self) -> &SkyCoord {
        &self.helio
    }

    /// The observer position in the ITRS frame.
    pub fn obs_pos_itrs(&self) -> &SkyCoord {
        &self.obs_pos_itrs
    }

    /// The vector from the barycenter to the observer (AU).
    pub fn obs_pos(&self) -> &SkyCoord {
        &self.obs_pos
    }

    /// The vector from the observer to the position of interest, ICRS axes.
    pub fn observer_to_object(&self) -> &SkyCoord {
        &self.observer_to_object
    }

    /// The line of sight recorded by the observer, without distance.
    pub fn cobs(&self) -> &SkyCoord {
        &self.cobs
    }
}

impl fmt::Display for DistCalcHelper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "distance={} AU", self.distance)?;
        writeln!(f, "t1={}", format_isot(&self.obstime))?;
        writeln!(f, "helio={}", self.helio)?;
        writeln!(f, "obs_pos_itrs={}", self.obs_pos_itrs)?;
        writeln!(f, "obs_pos={}", self.obs_pos)?;
        writeln!(f, "observer_to_object={}", self.observer_to_object)?;
        write!(f, "cobs={}", self.cobs)
    }
}

#[cfg(test)]
mod dist_calc_helper_test {
    use super::*;
    use approx::assert_relative_eq;

    fn builtin() -> SkyGeom {
        SkyGeom::new("builtin").unwrap()
    }

    #[test]
    fn test_default_params() {
        let params = DistCalcParams::default();
        assert_eq!(params.ra, 90.0);
        assert_eq!(params.dec, 23.43952556);
        assert_eq!(params.obstime, "2023-03-20T16:00:00");
        assert_eq!(params.distance, 10.0);
        assert_eq!(params.site, "ctio");
    }

    #[test]
    fn test_closure_law() {
        let helper = DistCalcHelper::new(&builtin(), DistCalcParams::default()).unwrap();
        assert_relative_eq!(
            helper.obs_pos().cartesian() + helper.observer_to_object().cartesian(),
            helper.helio().cartesian(),
            epsilon = 1e-12
        );
        assert_eq!(helper.cobs().distance(), None);
        assert_eq!(helper.cobs().ra(), helper.observer_to_object().ra());
    }

    #[test]
    fn test_invalid_inputs_are_rejected_first() {
        let ctx = SkyGeom::new("naif:/nonexistent/de432s.bsp").unwrap();
        let bad_distance = DistCalcParams {
            distance: -1.0,
            ..Default::default()
        };
        assert_eq!(
            DistCalcHelper::new(&ctx, bad_distance),
            Err(SkyGeomError::InvalidDistance(-1.0))
        );

        let bad_dec = DistCalcParams {
            dec: 91.0,
            ..Default::default()
        };
        assert_eq!(
            DistCalcHelper::new(&ctx, bad_dec),
            Err(SkyGeomError::InvalidDeclination(91.0))
        );

        let bad_time = DistCalcParams {
            obstime: "yesterday".into(),
            ..Default::default()
        };
        assert_eq!(
            DistCalcHelper::new(&ctx, bad_time),
            Err(SkyGeomError::InvalidObsTime("yesterday".into()))
        );
    }

    #[test]
    fn test_display_has_seven_lines() {
        let helper = DistCalcHelper::new(&builtin(), DistCalcParams::default()).unwrap();
        let rendered = helper.to_string();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "distance=10 AU");
        assert_eq!(lines[1], "t1=2023-03-20T16:00:00.000 UTC");
        assert!(lines[2].starts_with("helio=ICRS (ra: 90.000000°, dec: 23.439526°"));
        assert!(lines[3].starts_with("obs_pos_itrs=ITRS(obstime=2023-03-20T16:00:00.000 UTC)"));
        assert!(lines[6].starts_with("cobs=ICRS"));
    }
}
