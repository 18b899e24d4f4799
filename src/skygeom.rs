//! # SkyGeom context
//!
//! [`SkyGeom`] is the explicit context object threaded through the geometry computations. It
//! owns:
//!
//! * the **ephemeris selection** ([`EphemFileSource`]) and the lazily opened
//!   [`SolarSystemEphemeris`], cached in a [`OnceCell`] on first use,
//! * the **environment** ([`SkyGeomEnv`]): optional UT1 provider and kernel cache directory,
//! * the **site registry** ([`SiteRegistry`]) resolving observatory names.
//!
//! There is no process-wide default: callers build a context (or several) and pass it by
//! reference. A `SkyGeom` is `Send + Sync`; once the ephemeris is loaded it is never mutated,
//! so one context can be shared between threads.
//!
//! ## Example
//!
//! ```rust,no_run
//! use skygeom::skygeom::SkyGeom;
//!
//! let ctx = SkyGeom::new("builtin").unwrap();
//! let ctio = ctx.get_site("ctio").unwrap();
//! println!("{ctio}");
//! ```
use camino::Utf8Path;
use hifitime::ut1::Ut1Provider;
use once_cell::sync::OnceCell;

use crate::{
    constants::DEFAULT_EPHEMERIS,
    ephemeris::{EphemFileSource, SolarSystemEphemeris},
    env_state::SkyGeomEnv,
    observers::{sites::SiteRegistry, EarthLocation},
    skygeom_errors::SkyGeomError,
};

#[derive(Debug, Clone)]
pub struct SkyGeom {
    env_state: SkyGeomEnv,
    sites: SiteRegistry,
    ephem_source: EphemFileSource,
    ephemeris: OnceCell<SolarSystemEphemeris>,
}

impl SkyGeom {
    /// Construct a new [`SkyGeom`] context.
    ///
    /// The ephemeris file itself is **not** opened yet; it is lazily initialized the first time
    /// [`get_ephemeris`](crate::skygeom::SkyGeom::get_ephemeris) is called.
    ///
    /// Arguments
    /// -----------------
    /// * `ephem_source`: A source descriptor resolvable into an [`EphemFileSource`]
    ///   (e.g., `"naif:de432s"`, `"naif:/data/de440.bsp"` or `"builtin"`).
    ///
    /// Return
    /// ----------
    /// * A new [`SkyGeom`] instance, or an error if the source descriptor is invalid or no cache
    ///   directory can be determined.
    pub fn new(ephem_source: &str) -> Result<Self, SkyGeomError> {
        let ephem_source = EphemFileSource::try_from(ephem_source)?;
        Ok(SkyGeom {
            env_state: SkyGeomEnv::new()?,
            sites: SiteRegistry::new(),
            ephem_source,
            ephemeris: OnceCell::new(),
        })
    }

    /// Context using the default NAIF kernel ([`DEFAULT_EPHEMERIS`]).
    pub fn default_ephemeris() -> Result<Self, SkyGeomError> {
        SkyGeom::new(DEFAULT_EPHEMERIS)
    }

    /// Use Earth orientation parameters for the sidereal time.
    pub fn with_ut1_provider(mut self, ut1_provider: Ut1Provider) -> Self {
        self.env_state.ut1_provider = Some(ut1_provider);
        self
    }

    /// Look up (and download to) another kernel cache directory.
    pub fn with_cache_dir(mut self, cache_dir: &Utf8Path) -> Self {
        self.env_state.cache_dir = cache_dir.to_path_buf();
        self.ephemeris = OnceCell::new();
        self
    }

    /// Register a custom observatory, shadowing a built-in site with the same name and its aliases.
    pub fn with_site(mut self, name: &str, location: EarthLocation) -> Self {
        self.sites.insert(name, location);
        self
    }

    pub fn ephem_source(&self) -> &EphemFileSource {
        &self.ephem_source
    }

    /// Get the lazily-initialized solar system ephemeris.
    ///
    /// If this is the first call, the ephemeris is opened and cached in an internal [`OnceCell`].
    /// Subsequent calls return the same reference.
    ///
    /// Return
    /// ----------
    /// * `&SolarSystemEphemeris` on success, or a [`SkyGeomError`] if the source cannot be opened.
    ///   A failed open is not cached: the next call tries again.
    pub fn get_ephemeris(&self) -> Result<&SolarSystemEphemeris, SkyGeomError> {
        self.ephemeris
            .get_or_try_init(|| SolarSystemEphemeris::new(&self.ephem_source, &self.env_state))
    }

    /// Resolve an observatory by name or alias (case-insensitive).
    pub fn get_site(&self, name: &str) -> Result<&EarthLocation, SkyGeomError> {
        self.sites.get(name)
    }

    /// Access the UT1 provider from the environment, if any.
    pub fn get_ut1_provider(&self) -> Option<&Ut1Provider> {
        self.env_state.ut1_provider.as_ref()
    }

    pub fn env(&self) -> &SkyGeomEnv {
        &self.env_state
    }
}
