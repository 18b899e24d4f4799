//! NAIF integer codes of the bodies read from planetary SPK kernels.
use std::fmt;

use crate::skygeom_errors::SkyGeomError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NaifIds {
    SolarSystemBarycenter,
    MercuryBarycenter,
    VenusBarycenter,
    EarthMoonBarycenter,
    MarsBarycenter,
    JupiterBarycenter,
    SaturnBarycenter,
    UranusBarycenter,
    NeptuneBarycenter,
    PlutoBarycenter,
    Sun,
    Moon,
    Earth,
}

impl NaifIds {
    pub fn from_id(id: i32) -> Result<Self, SkyGeomError> {
        use NaifIds::*;
        Ok(match id {
            0 => SolarSystemBarycenter,
            1 => MercuryBarycenter,
            2 => VenusBarycenter,
            3 => EarthMoonBarycenter,
            4 => MarsBarycenter,
            5 => JupiterBarycenter,
            6 => SaturnBarycenter,
            7 => UranusBarycenter,
            8 => NeptuneBarycenter,
            9 => PlutoBarycenter,
            10 => Sun,
            301 => Moon,
            399 => Earth,
            _ => {
                return Err(SkyGeomError::InvalidDafFile(format!(
                    "unsupported NAIF body code {id}"
                )))
            }
        })
    }

    pub fn to_id(&self) -> i32 {
        use NaifIds::*;
        match self {
            SolarSystemBarycenter => 0,
            MercuryBarycenter => 1,
            VenusBarycenter => 2,
            EarthMoonBarycenter => 3,
            MarsBarycenter => 4,
            JupiterBarycenter => 5,
            SaturnBarycenter => 6,
            UranusBarycenter => 7,
            NeptuneBarycenter => 8,
            PlutoBarycenter => 9,
            Sun => 10,
            Moon => 301,
            Earth => 399,
        }
    }
}

impl From<NaifIds> for i32 {
    fn from(naif_id: NaifIds) -> Self {
        naif_id.to_id()
    }
}

impl TryFrom<i32> for NaifIds {
    type Error = SkyGeomError;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        NaifIds::from_id(id)
    }
}

impl fmt::Display for NaifIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NaifIds::SolarSystemBarycenter => "Solar System Barycenter",
            NaifIds::MercuryBarycenter => "Mercury Barycenter",
            NaifIds::VenusBarycenter => "Venus Barycenter",
            NaifIds::EarthMoonBarycenter => "EarthMoonBarycenter",
            NaifIds::MarsBarycenter => "Mars Barycenter",
            NaifIds::JupiterBarycenter => "Jupiter Barycenter",
            NaifIds::SaturnBarycenter => "Saturn Barycenter",
            NaifIds::UranusBarycenter => "Uranus Barycenter",
            NaifIds::NeptuneBarycenter => "Neptune Barycenter",
            NaifIds::PlutoBarycenter => "Pluto Barycenter",
            NaifIds::Sun => "Sun",
            NaifIds::Moon => "Moon",
            NaifIds::Earth => "Earth",
        };
        write!(f, "{name}")
    }
}
