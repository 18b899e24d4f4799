//! Solar system ephemerides giving the barycentric state of the Earth.
//!
//! Two backends are available:
//!
//! * [`SolarSystemEphemeris::Naif`]: a NAIF SPK kernel (`de432s`, `de440`, ...) read by
//!   [`naif::naif_data::NaifData`],
//! * [`SolarSystemEphemeris::Builtin`]: the analytic model of [`builtin`], which needs no file.
//!
//! The backend is selected by an [`EphemFileSource`], usually parsed from a string:
//!
//! ```text
//! "builtin"                 -> analytic model
//! "naif:de432s"             -> kernel de432s.bsp from the cache (or NAIF with `jpl-download`)
//! "naif:/data/kernel.bsp"   -> explicit kernel path
//! ```
use std::fmt;

use camino::Utf8PathBuf;
use hifitime::Epoch;
use log::debug;
use nalgebra::Vector3;

use crate::{
    constants::{AU, SECONDS_PER_DAY},
    env_state::SkyGeomEnv,
    skygeom_errors::SkyGeomError,
    time::et_seconds,
};

use self::{
    download_jpl_file::get_ephemeris_file, naif::naif_data::NaifData,
    naif::naif_version::NaifVersion,
};

pub mod builtin;
pub mod download_jpl_file;
pub mod naif;

/// Position and velocity of a body.
///
/// Units depend on the producer: NAIF segments give km and km/s, [`StateVector::to_au`]
/// converts them to AU and AU/day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl StateVector {
    /// Convert a km, km/s state into AU, AU/day.
    pub fn to_au(&self) -> StateVector {
        StateVector {
            position: self.position / AU,
            velocity: self.velocity * SECONDS_PER_DAY / AU,
        }
    }
}

/// Where the solar system ephemeris comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum EphemFileSource {
    Builtin,
    Naif(NaifVersion),
    NaifPath(Utf8PathBuf),
}

impl TryFrom<&str> for EphemFileSource {
    type Error = SkyGeomError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("builtin") {
            return Ok(EphemFileSource::Builtin);
        }

        let Some((kind, target)) = value.split_once(':') else {
            return Err(SkyGeomError::InvalidEphemFileSource(value.to_string()));
        };

        match kind.to_lowercase().as_str() {
            "naif" if target.ends_with(".bsp") => {
                Ok(EphemFileSource::NaifPath(Utf8PathBuf::from(target)))
            }
            "naif" => Ok(EphemFileSource::Naif(target.parse()?)),
            _ => Err(SkyGeomError::InvalidEphemFileSource(value.to_string())),
        }
    }
}

impl fmt::Display for EphemFileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EphemFileSource::Builtin => write!(f, "builtin"),
            EphemFileSource::Naif(version) => write!(f, "naif:{version}"),
            EphemFileSource::NaifPath(path) => write!(f, "naif:{path}"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SolarSystemEphemeris {
    Builtin,
    Naif(NaifData),
}

impl SolarSystemEphemeris {
    /// Open the ephemeris described by `file_source`.
    ///
    /// Arguments
    /// ---------
    /// * `file_source`: the backend selection
    /// * `env`: environment holding the kernel cache directory
    ///
    /// Return
    /// ------
    /// * the loaded ephemeris, or the resolution / parsing error of the kernel
    pub fn new(file_source: &EphemFileSource, env: &SkyGeomEnv) -> Result<Self, SkyGeomError> {
        match file_source {
            EphemFileSource::Builtin => {
                debug!("using the builtin analytic ephemeris");
                Ok(SolarSystemEphemeris::Builtin)
            }
            EphemFileSource::Naif(_) | EphemFileSource::NaifPath(_) => {
                let file_path = get_ephemeris_file(file_source, env)?;
                debug!("opening ephemeris {file_source} from {file_path}");
                Ok(SolarSystemEphemeris::Naif(NaifData::read_naif_file(
                    &file_path,
                )?))
            }
        }
    }

    /// Barycentric position (AU) and velocity (AU/day) of the Earth, ICRS axes.
    pub fn earth_barycentric_state(
        &self,
        epoch: &Epoch,
    ) -> Result<(Vector3<f64>, Vector3<f64>), SkyGeomError> {
        let state = match self {
            SolarSystemEphemeris::Builtin => builtin::earth_barycentric_state(epoch),
            SolarSystemEphemeris::Naif(naif_data) => {
                naif_data.earth_barycentric(et_seconds(epoch))?.to_au()
            }
        };
        Ok((state.position, state.velocity))
    }
}

#[cfg(test)]
mod ephemeris_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_file_source() {
        assert_eq!(
            EphemFileSource::try_from("builtin").unwrap(),
            EphemFileSource::Builtin
        );
        assert_eq!(
            EphemFileSource::try_from("naif:de432s").unwrap(),
            EphemFileSource::Naif(NaifVersion::DE432s)
        );
        assert_eq!(
            EphemFileSource::try_from("NAIF:DE440").unwrap(),
            EphemFileSource::Naif(NaifVersion::DE440)
        );
        assert_eq!(
            EphemFileSource::try_from("naif:/data/my_kernel.bsp").unwrap(),
            EphemFileSource::NaifPath("/data/my_kernel.bsp".into())
        );
    }

    #[test]
    fn test_invalid_file_source() {
        assert_eq!(
            EphemFileSource::try_from("horizon:DE440"),
            Err(SkyGeomError::InvalidEphemFileSource("horizon:DE440".into()))
        );
        assert_eq!(
            EphemFileSource::try_from("de432s"),
            Err(SkyGeomError::InvalidEphemFileSource("de432s".into()))
        );
        assert_eq!(
            EphemFileSource::try_from("naif:de999"),
            Err(SkyGeomError::InvalidJPLEphemFileVersion("de999".into()))
        );
    }

    #[test]
    fn test_display_round_trip() {
        for source in ["builtin", "naif:de432s", "naif:/tmp/k.bsp"] {
            let parsed = EphemFileSource::try_from(source).unwrap();
            assert_eq!(parsed.to_string(), source);
        }
    }

    #[test]
    fn test_state_to_au() {
        let state = StateVector {
            position: Vector3::new(AU, 0.0, -2.0 * AU),
            velocity: Vector3::new(AU / SECONDS_PER_DAY, 0.0, 0.0),
        }
        .to_au();
        assert_relative_eq!(state.position, Vector3::new(1.0, 0.0, -2.0));
        assert_relative_eq!(state.velocity, Vector3::new(1.0, 0.0, 0.0));
    }
}
