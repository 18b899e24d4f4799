//! Planetary ephemeris versions distributed by NAIF.
//!
//! Parsing is case-insensitive: `"de432s"`, `"DE432s"` and `"DE432S"` all select
//! [`NaifVersion::DE432s`].
//!
//! ```rust
//! use skygeom::ephemeris::naif::naif_version::NaifVersion;
//!
//! let v: NaifVersion = "de432s".parse().unwrap();
//! assert_eq!(v.get_filename(), "de432s.bsp");
//! ```

use std::{fmt, str::FromStr};

use crate::skygeom_errors::SkyGeomError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaifVersion {
    DE430,
    DE432s,
    DE435,
    DE438,
    DE440,
    DE440s,
    DE442,
}

impl NaifVersion {
    /// Canonical NAIF filename of the kernel (e.g., `"de440.bsp"`).
    pub fn get_filename(&self) -> &'static str {
        match self {
            NaifVersion::DE430 => "de430.bsp",
            NaifVersion::DE432s => "de432s.bsp",
            NaifVersion::DE435 => "de435.bsp",
            NaifVersion::DE438 => "de438.bsp",
            NaifVersion::DE440 => "de440.bsp",
            NaifVersion::DE440s => "de440s.bsp",
            NaifVersion::DE442 => "de442.bsp",
        }
    }

    /// Download location in the NAIF generic kernels tree.
    pub fn url(&self) -> String {
        format!(
            "https://naif.jpl.nasa.gov/pub/naif/generic_kernels/spk/planets/{}",
            self.get_filename()
        )
    }
}

impl fmt::Display for NaifVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stem = self.get_filename().trim_end_matches(".bsp");
        write!(f, "{stem}")
    }
}

impl FromStr for NaifVersion {
    type Err = SkyGeomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "de430" => Ok(NaifVersion::DE430),
            "de432s" => Ok(NaifVersion::DE432s),
            "de435" => Ok(NaifVersion::DE435),
            "de438" => Ok(NaifVersion::DE438),
            "de440" => Ok(NaifVersion::DE440),
            "de440s" => Ok(NaifVersion::DE440s),
            "de442" => Ok(NaifVersion::DE442),
            _ => Err(SkyGeomError::InvalidJPLEphemFileVersion(s.to_string())),
        }
    }
}
