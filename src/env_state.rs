//! # skygeom environment state
//!
//! This module defines [`crate::env_state::SkyGeomEnv`], the **shared environment object** used
//! across the crate. It carries:
//!
//! - An optional **UT1 provider** from [hifitime](https://docs.rs/hifitime), used for Earth
//!   rotation when the caller has Earth orientation parameters at hand.
//! - The **ephemeris cache directory**, where NAIF kernels are looked up (and downloaded to when
//!   the `jpl-download` feature is enabled).
//!
//! ## Structure
//!
//! ```text
//! SkyGeomEnv
//! ├── ut1_provider (Option<hifitime::Ut1Provider>)
//! └── cache_dir    (camino::Utf8PathBuf)
//! ```
//!
//! ## Notes
//!
//! - Nothing is downloaded at construction time. Without a UT1 provider the Earth rotation angle
//!   is computed from UTC, which is accurate to |UT1 − UTC| < 0.9 s.
//! - The cache directory defaults to `<cache dir>/skygeom_cache/jpl_ephem` as reported by
//!   [`directories::BaseDirs`], and can be overridden with the `SKYGEOM_CACHE_DIR` environment
//!   variable.
use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use hifitime::ut1::Ut1Provider;

use crate::{constants::CACHE_DIR_ENV, skygeom_errors::SkyGeomError};

/// This object is passed to the various functions in the library
/// to provide access to the state of the library
///
/// # Fields
///
/// * `ut1_provider` - An optional provider used to get UT1 from UTC
/// * `cache_dir` - Directory holding the cached JPL/NAIF ephemeris files
#[derive(Debug, Clone)]
pub struct SkyGeomEnv {
    pub ut1_provider: Option<Ut1Provider>,
    pub cache_dir: Utf8PathBuf,
}

impl SkyGeomEnv {
    /// Create a new environment
    ///
    /// Return
    /// ------
    /// * A new environment without UT1 provider, pointing to the default cache directory
    /// * An error if no cache directory can be determined for the current user
    pub fn new() -> Result<Self, SkyGeomError> {
        Ok(SkyGeomEnv {
            ut1_provider: None,
            cache_dir: SkyGeomEnv::default_cache_dir()?,
        })
    }

    /// Build an environment using an explicit cache directory.
    pub fn with_cache_dir(cache_dir: &Utf8Path) -> Self {
        SkyGeomEnv {
            ut1_provider: None,
            cache_dir: cache_dir.to_path_buf(),
        }
    }

    /// Resolve the default ephemeris cache directory.
    ///
    /// Return
    /// ------
    /// * `$SKYGEOM_CACHE_DIR` when set, otherwise `<user cache dir>/skygeom_cache/jpl_ephem`
    pub fn default_cache_dir() -> Result<Utf8PathBuf, SkyGeomError> {
        if let Ok(dir) = std::env::var(CACHE_DIR_ENV) {
            if !dir.is_empty() {
                return Ok(Utf8PathBuf::from(dir));
            }
        }

        let base_dir = BaseDirs::new().ok_or_else(|| {
            SkyGeomError::UnableToCreateBaseDir("cannot find the user base directory".into())
        })?;
        let cache_path = Utf8Path::from_path(base_dir.cache_dir()).ok_or_else(|| {
            SkyGeomError::Utf8PathError(format!(
                "cache directory is not valid UTF-8: {}",
                base_dir.cache_dir().display()
            ))
        })?;
        Ok(cache_path.join("skygeom_cache").join("jpl_ephem"))
    }
}

#[cfg(test)]
mod env_state_test {
    use super::*;

    #[test]
    fn test_default_cache_dir_layout() {
        if std::env::var(CACHE_DIR_ENV).is_ok() {
            return;
        }
        let Ok(dir) = SkyGeomEnv::default_cache_dir() else {
            return;
        };
        assert!(dir.ends_with("skygeom_cache/jpl_ephem"));
    }

    #[test]
    fn test_explicit_cache_dir() {
        let env = SkyGeomEnv::with_cache_dir(Utf8Path::new("/tmp/skygeom"));
        assert_eq!(env.cache_dir, Utf8PathBuf::from("/tmp/skygeom"));
        assert!(env.ut1_provider.is_none());
    }
}
